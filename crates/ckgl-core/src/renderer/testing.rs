// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A minimal backend for unit tests: fabricates handles and records primitive names.

use crate::renderer::api::*;
use crate::renderer::error::{RenderResult, ShaderError};
use crate::renderer::traits::GraphicsBackend;

#[derive(Debug)]
pub(crate) struct CallLog {
    caps: BackendCapabilities,
    next_handle: u32,
    pub(crate) calls: Vec<&'static str>,
}

impl CallLog {
    pub(crate) fn new(caps: BackendCapabilities) -> Self {
        Self {
            caps,
            next_handle: 0,
            calls: Vec::new(),
        }
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.calls.iter().filter(|c| **c == name).count()
    }

    fn call(&mut self, name: &'static str) -> RenderResult<()> {
        self.calls.push(name);
        Ok(())
    }

    fn fresh(&mut self, name: &'static str) -> RenderResult<ResourceHandle> {
        self.calls.push(name);
        self.next_handle += 1;
        Ok(ResourceHandle::new(self.next_handle).expect("handle counter starts at 1"))
    }
}

impl GraphicsBackend for CallLog {
    fn capabilities(&self) -> BackendCapabilities {
        self.caps
    }
    fn create_texture(&mut self) -> RenderResult<ResourceHandle> {
        self.fresh("create_texture")
    }
    fn delete_texture(&mut self, _: ResourceHandle) -> RenderResult<()> {
        self.call("delete_texture")
    }
    fn texture_image_2d(
        &mut self,
        _: TextureTarget,
        _: u32,
        _: u32,
        _: TextureFormat,
        _: Option<&[u8]>,
    ) -> RenderResult<()> {
        self.call("texture_image_2d")
    }
    fn texture_parameter(&mut self, _: TextureTarget, _: TextureParameter) -> RenderResult<()> {
        self.call("texture_parameter")
    }
    fn create_program(&mut self, vertex: &str, _: &str) -> RenderResult<ResourceHandle> {
        if vertex.is_empty() {
            return Err(ShaderError::CompilationFailed {
                stage: ShaderStage::Vertex,
                log: "empty source".into(),
            }
            .into());
        }
        self.fresh("create_program")
    }
    fn delete_program(&mut self, _: ResourceHandle) -> RenderResult<()> {
        self.call("delete_program")
    }
    fn uniform_location(
        &mut self,
        _: ResourceHandle,
        name: &str,
    ) -> RenderResult<Option<UniformLocation>> {
        self.calls.push("uniform_location");
        Ok(name.strip_prefix("u_").map(|rest| UniformLocation(rest.len() as u32)))
    }
    fn set_uniform(&mut self, _: UniformLocation, _: &UniformValue) -> RenderResult<()> {
        self.call("set_uniform")
    }
    fn create_framebuffer(&mut self) -> RenderResult<ResourceHandle> {
        self.fresh("create_framebuffer")
    }
    fn delete_framebuffer(&mut self, _: ResourceHandle) -> RenderResult<()> {
        self.call("delete_framebuffer")
    }
    fn framebuffer_texture(
        &mut self,
        _: FramebufferTarget,
        _: FramebufferAttachment,
        _: TextureTarget,
        _: ResourceHandle,
    ) -> RenderResult<()> {
        self.call("framebuffer_texture")
    }
    fn draw_buffers(&mut self, _: usize) -> RenderResult<()> {
        self.call("draw_buffers")
    }
    fn read_buffer(&mut self, _: u32) -> RenderResult<()> {
        self.call("read_buffer")
    }
    fn framebuffer_status(&mut self, _: FramebufferTarget) -> RenderResult<()> {
        self.call("framebuffer_status")
    }
    fn framebuffer_binding(&mut self, _: FramebufferTarget) -> RenderResult<Option<ResourceHandle>> {
        self.calls.push("framebuffer_binding");
        Ok(None)
    }
    fn create_vertex_array(&mut self) -> RenderResult<ResourceHandle> {
        self.fresh("create_vertex_array")
    }
    fn delete_vertex_array(&mut self, _: ResourceHandle) -> RenderResult<()> {
        self.call("delete_vertex_array")
    }
    fn create_buffer(&mut self) -> RenderResult<ResourceHandle> {
        self.fresh("create_buffer")
    }
    fn delete_buffer(&mut self, _: ResourceHandle) -> RenderResult<()> {
        self.call("delete_buffer")
    }
    fn buffer_data(&mut self, _: BufferTarget, _: &[u8], _: BufferUsage) -> RenderResult<()> {
        self.call("buffer_data")
    }
    fn enable_vertex_attribute(&mut self, _: u32) -> RenderResult<()> {
        self.call("enable_vertex_attribute")
    }
    fn vertex_attribute_pointer(&mut self, _: u32, _: &VertexAttribute, _: u32) -> RenderResult<()> {
        self.call("vertex_attribute_pointer")
    }
    fn vertex_attribute_divisor(&mut self, _: u32, _: u32) -> RenderResult<()> {
        self.call("vertex_attribute_divisor")
    }
    fn active_texture(&mut self, _: usize) -> RenderResult<()> {
        self.call("active_texture")
    }
    fn bind_texture(
        &mut self,
        _: usize,
        _: TextureTarget,
        _: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.call("bind_texture")
    }
    fn use_program(&mut self, _: Option<ResourceHandle>) -> RenderResult<()> {
        self.call("use_program")
    }
    fn bind_framebuffer(
        &mut self,
        _: FramebufferTarget,
        _: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.call("bind_framebuffer")
    }
    fn bind_vertex_array(&mut self, _: Option<ResourceHandle>) -> RenderResult<()> {
        self.call("bind_vertex_array")
    }
    fn bind_buffer(&mut self, _: BufferTarget, _: Option<ResourceHandle>) -> RenderResult<()> {
        self.call("bind_buffer")
    }
    fn set_enabled(&mut self, _: Capability, _: bool) -> RenderResult<()> {
        self.call("set_enabled")
    }
    fn blend_func(&mut self, _: BlendFactor, _: BlendFactor) -> RenderResult<()> {
        self.call("blend_func")
    }
    fn blend_func_separate(
        &mut self,
        _: BlendFactor,
        _: BlendFactor,
        _: BlendFactor,
        _: BlendFactor,
    ) -> RenderResult<()> {
        self.call("blend_func_separate")
    }
    fn blend_equation(&mut self, _: BlendEquation) -> RenderResult<()> {
        self.call("blend_equation")
    }
    fn blend_equation_separate(&mut self, _: BlendEquation, _: BlendEquation) -> RenderResult<()> {
        self.call("blend_equation_separate")
    }
    fn depth_func(&mut self, _: CompareFunction) -> RenderResult<()> {
        self.call("depth_func")
    }
    fn depth_mask(&mut self, _: bool) -> RenderResult<()> {
        self.call("depth_mask")
    }
    fn color_mask(&mut self, _: ColorMask) -> RenderResult<()> {
        self.call("color_mask")
    }
    fn cull_face(&mut self, _: Face) -> RenderResult<()> {
        self.call("cull_face")
    }
    fn front_face(&mut self, _: FrontFace) -> RenderResult<()> {
        self.call("front_face")
    }
    fn polygon_mode(&mut self, _: PolygonMode) -> RenderResult<()> {
        self.call("polygon_mode")
    }
    fn clear_color(&mut self, _: Color) -> RenderResult<()> {
        self.call("clear_color")
    }
    fn clear_depth(&mut self, _: f32) -> RenderResult<()> {
        self.call("clear_depth")
    }
    fn viewport(&mut self, _: RectI) -> RenderResult<()> {
        self.call("viewport")
    }
    fn scissor(&mut self, _: RectI) -> RenderResult<()> {
        self.call("scissor")
    }
    fn depth_range(&mut self, _: DepthRange) -> RenderResult<()> {
        self.call("depth_range")
    }
    fn clear(&mut self, _: ClearFlags) -> RenderResult<()> {
        self.call("clear")
    }
    fn draw_arrays(&mut self, _: PrimitiveTopology, _: u32, _: u32) -> RenderResult<()> {
        self.call("draw_arrays")
    }
    fn draw_elements(
        &mut self,
        _: PrimitiveTopology,
        _: u32,
        _: IndexFormat,
        _: usize,
    ) -> RenderResult<()> {
        self.call("draw_elements")
    }
    fn draw_arrays_instanced(
        &mut self,
        _: PrimitiveTopology,
        _: u32,
        _: u32,
        _: u32,
    ) -> RenderResult<()> {
        self.call("draw_arrays_instanced")
    }
    fn draw_elements_instanced(
        &mut self,
        _: PrimitiveTopology,
        _: u32,
        _: IndexFormat,
        _: usize,
        _: u32,
    ) -> RenderResult<()> {
        self.call("draw_elements_instanced")
    }
    fn blit_framebuffer(
        &mut self,
        _: RectI,
        _: RectI,
        _: ClearFlags,
        _: BlitFilter,
    ) -> RenderResult<()> {
        self.call("blit_framebuffer")
    }
}
