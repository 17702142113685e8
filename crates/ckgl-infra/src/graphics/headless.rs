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

//! A backend without a GPU.
//!
//! It fabricates object names, validates that they are live when used and counts every
//! primitive it receives. CI runs and the sandbox use it to observe exactly what the caches
//! let through.

use std::collections::{BTreeMap, HashMap, HashSet};

use ckgl_core::renderer::api::{
    BackendCapabilities, BackendLimits, BlendEquation, BlendFactor, BlitFilter, BufferTarget,
    BufferUsage, Capability, ClearFlags, Color, ColorMask, CompareFunction, DepthRange, Face,
    FramebufferAttachment, FramebufferTarget, FrontFace, GraphicsBackendType, IndexFormat,
    PolygonMode, PrimitiveTopology, RectI, ResourceHandle, ResourceKind, ShaderStage,
    TextureFormat, TextureParameter, TextureTarget, UniformLocation, UniformValue,
    VertexAttribute,
};
use ckgl_core::renderer::{
    GraphicsBackend, RenderError, RenderResult, ResourceError, ShaderError,
};

/// A [`GraphicsBackend`] that records instead of rendering.
#[derive(Debug)]
pub struct HeadlessBackend {
    capabilities: BackendCapabilities,
    next_name: u32,
    live: HashMap<ResourceKind, HashSet<ResourceHandle>>,
    uniforms: HashMap<(ResourceHandle, String), UniformLocation>,
    calls: BTreeMap<&'static str, u64>,
    draw_framebuffer: Option<ResourceHandle>,
}

impl HeadlessBackend {
    /// Emulates `backend` with default limits.
    pub fn new(backend: GraphicsBackendType) -> Self {
        Self::with_capabilities(BackendCapabilities::for_backend(
            backend,
            BackendLimits::default(),
        ))
    }

    /// Emulates a device with exactly `capabilities`.
    pub fn with_capabilities(capabilities: BackendCapabilities) -> Self {
        log::debug!("Headless backend emulating {:?}", capabilities.backend);
        Self {
            capabilities,
            next_name: 0,
            live: HashMap::new(),
            uniforms: HashMap::new(),
            calls: BTreeMap::new(),
            draw_framebuffer: None,
        }
    }

    /// How many times the primitive `name` (e.g. `"bind_texture"`) was called.
    pub fn call_count(&self, name: &str) -> u64 {
        self.calls.get(name).copied().unwrap_or(0)
    }

    /// The number of primitive calls of any kind.
    pub fn total_calls(&self) -> u64 {
        self.calls.values().sum()
    }

    /// Per-primitive call counts, sorted by name.
    pub fn calls(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.calls.iter().map(|(name, count)| (*name, *count))
    }

    /// Forgets every recorded call.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The number of live objects of `kind`.
    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.live.get(&kind).map_or(0, HashSet::len)
    }

    fn record(&mut self, name: &'static str) {
        *self.calls.entry(name).or_insert(0) += 1;
    }

    fn create(&mut self, name: &'static str, kind: ResourceKind) -> RenderResult<ResourceHandle> {
        self.record(name);
        self.next_name += 1;
        let handle = ResourceHandle::new(self.next_name).ok_or_else(|| {
            RenderError::from(ResourceError::CreationFailed {
                kind,
                details: "object names exhausted".into(),
            })
        })?;
        self.live.entry(kind).or_default().insert(handle);
        Ok(handle)
    }

    fn delete(
        &mut self,
        name: &'static str,
        kind: ResourceKind,
        handle: ResourceHandle,
    ) -> RenderResult<()> {
        self.record(name);
        let removed = self
            .live
            .get_mut(&kind)
            .is_some_and(|live| live.remove(&handle));
        if !removed {
            return Err(ResourceError::DestroyedHandle { kind, handle }.into());
        }
        if kind == ResourceKind::Shader {
            self.uniforms.retain(|(program, _), _| *program != handle);
        }
        if kind == ResourceKind::Framebuffer && self.draw_framebuffer == Some(handle) {
            self.draw_framebuffer = None;
        }
        Ok(())
    }

    fn check_live(&self, kind: ResourceKind, handle: Option<ResourceHandle>) -> RenderResult<()> {
        match handle {
            Some(handle) if !self.live.get(&kind).is_some_and(|l| l.contains(&handle)) => {
                Err(ResourceError::DestroyedHandle { kind, handle }.into())
            }
            _ => Ok(()),
        }
    }

    fn bind(
        &mut self,
        name: &'static str,
        kind: ResourceKind,
        handle: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.check_live(kind, handle)?;
        self.record(name);
        Ok(())
    }

    fn require(&self, available: bool, operation: &'static str) -> RenderResult<()> {
        if available {
            Ok(())
        } else {
            Err(RenderError::unsupported(operation, self.capabilities.backend))
        }
    }

    fn check_location(&self, location: u32) -> RenderResult<()> {
        let limit = self.capabilities.max_vertex_attributes;
        if usize::try_from(location).map_or(true, |l| l >= limit) {
            return Err(ResourceError::InvalidVertexLayout(format!(
                "attribute location {location} exceeds the limit of {limit}"
            ))
            .into());
        }
        Ok(())
    }

    fn ok(&mut self, name: &'static str) -> RenderResult<()> {
        self.record(name);
        Ok(())
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    fn create_texture(&mut self) -> RenderResult<ResourceHandle> {
        self.create("create_texture", ResourceKind::Texture)
    }

    fn delete_texture(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.delete("delete_texture", ResourceKind::Texture, handle)
    }

    fn texture_image_2d(
        &mut self,
        target: TextureTarget,
        _width: u32,
        _height: u32,
        _format: TextureFormat,
        _data: Option<&[u8]>,
    ) -> RenderResult<()> {
        self.require(self.capabilities.supports_texture_target(target), "One-dimensional textures")?;
        self.ok("texture_image_2d")
    }

    fn texture_parameter(
        &mut self,
        _target: TextureTarget,
        _parameter: TextureParameter,
    ) -> RenderResult<()> {
        self.ok("texture_parameter")
    }

    fn create_program(&mut self, vertex: &str, fragment: &str) -> RenderResult<ResourceHandle> {
        for (stage, source) in [(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)] {
            if source.trim().is_empty() {
                self.record("create_program");
                return Err(ShaderError::CompilationFailed {
                    stage,
                    log: "empty source".into(),
                }
                .into());
            }
        }
        self.create("create_program", ResourceKind::Shader)
    }

    fn delete_program(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.delete("delete_program", ResourceKind::Shader, handle)
    }

    fn uniform_location(
        &mut self,
        program: ResourceHandle,
        name: &str,
    ) -> RenderResult<Option<UniformLocation>> {
        self.check_live(ResourceKind::Shader, Some(program))?;
        self.record("uniform_location");
        let next = self
            .uniforms
            .keys()
            .filter(|(owner, _)| *owner == program)
            .count();
        let next = UniformLocation(u32::try_from(next).unwrap_or(u32::MAX));
        let location = *self
            .uniforms
            .entry((program, name.to_string()))
            .or_insert(next);
        Ok(Some(location))
    }

    fn set_uniform(&mut self, _location: UniformLocation, _value: &UniformValue) -> RenderResult<()> {
        self.ok("set_uniform")
    }

    fn create_framebuffer(&mut self) -> RenderResult<ResourceHandle> {
        self.create("create_framebuffer", ResourceKind::Framebuffer)
    }

    fn delete_framebuffer(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.delete("delete_framebuffer", ResourceKind::Framebuffer, handle)
    }

    fn framebuffer_texture(
        &mut self,
        _target: FramebufferTarget,
        _attachment: FramebufferAttachment,
        _texture_target: TextureTarget,
        texture: ResourceHandle,
    ) -> RenderResult<()> {
        self.check_live(ResourceKind::Texture, Some(texture))?;
        self.ok("framebuffer_texture")
    }

    fn draw_buffers(&mut self, count: usize) -> RenderResult<()> {
        if count > self.capabilities.max_draw_buffers {
            return Err(ResourceError::InvalidAttachment(format!(
                "{count} draw buffers exceed the limit of {}",
                self.capabilities.max_draw_buffers
            ))
            .into());
        }
        self.ok("draw_buffers")
    }

    fn read_buffer(&mut self, _attachment: u32) -> RenderResult<()> {
        self.ok("read_buffer")
    }

    fn framebuffer_status(&mut self, _target: FramebufferTarget) -> RenderResult<()> {
        self.ok("framebuffer_status")
    }

    fn framebuffer_binding(
        &mut self,
        _target: FramebufferTarget,
    ) -> RenderResult<Option<ResourceHandle>> {
        self.record("framebuffer_binding");
        Ok(self.draw_framebuffer)
    }

    fn create_vertex_array(&mut self) -> RenderResult<ResourceHandle> {
        self.create("create_vertex_array", ResourceKind::VertexArray)
    }

    fn delete_vertex_array(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.delete("delete_vertex_array", ResourceKind::VertexArray, handle)
    }

    fn create_buffer(&mut self) -> RenderResult<ResourceHandle> {
        self.create("create_buffer", ResourceKind::Buffer)
    }

    fn delete_buffer(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.delete("delete_buffer", ResourceKind::Buffer, handle)
    }

    fn buffer_data(
        &mut self,
        _target: BufferTarget,
        _data: &[u8],
        _usage: BufferUsage,
    ) -> RenderResult<()> {
        self.ok("buffer_data")
    }

    fn enable_vertex_attribute(&mut self, location: u32) -> RenderResult<()> {
        self.check_location(location)?;
        self.ok("enable_vertex_attribute")
    }

    fn vertex_attribute_pointer(
        &mut self,
        location: u32,
        _attribute: &VertexAttribute,
        _stride: u32,
    ) -> RenderResult<()> {
        self.check_location(location)?;
        self.ok("vertex_attribute_pointer")
    }

    fn vertex_attribute_divisor(&mut self, location: u32, _divisor: u32) -> RenderResult<()> {
        self.require(self.capabilities.instancing, "Instanced vertex attributes")?;
        self.check_location(location)?;
        self.ok("vertex_attribute_divisor")
    }

    fn active_texture(&mut self, unit: usize) -> RenderResult<()> {
        if unit >= self.capabilities.max_texture_units {
            return Err(ResourceError::SlotOutOfRange {
                kind: ResourceKind::Texture,
                slot: unit,
                capacity: self.capabilities.max_texture_units,
            }
            .into());
        }
        self.ok("active_texture")
    }

    fn bind_texture(
        &mut self,
        _unit: usize,
        _target: TextureTarget,
        texture: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.bind("bind_texture", ResourceKind::Texture, texture)
    }

    fn use_program(&mut self, program: Option<ResourceHandle>) -> RenderResult<()> {
        self.bind("use_program", ResourceKind::Shader, program)
    }

    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.bind("bind_framebuffer", ResourceKind::Framebuffer, framebuffer)?;
        if target != FramebufferTarget::Read {
            self.draw_framebuffer = framebuffer;
        }
        Ok(())
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<ResourceHandle>) -> RenderResult<()> {
        self.bind("bind_vertex_array", ResourceKind::VertexArray, vertex_array)
    }

    fn bind_buffer(
        &mut self,
        _target: BufferTarget,
        buffer: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.bind("bind_buffer", ResourceKind::Buffer, buffer)
    }

    fn set_enabled(&mut self, _capability: Capability, _enabled: bool) -> RenderResult<()> {
        self.ok("set_enabled")
    }

    fn blend_func(&mut self, _src: BlendFactor, _dst: BlendFactor) -> RenderResult<()> {
        self.ok("blend_func")
    }

    fn blend_func_separate(
        &mut self,
        _color_src: BlendFactor,
        _color_dst: BlendFactor,
        _alpha_src: BlendFactor,
        _alpha_dst: BlendFactor,
    ) -> RenderResult<()> {
        self.ok("blend_func_separate")
    }

    fn blend_equation(&mut self, equation: BlendEquation) -> RenderResult<()> {
        self.require(
            !equation.is_min_max() || self.capabilities.blend_min_max,
            "MIN/MAX blend equations",
        )?;
        self.ok("blend_equation")
    }

    fn blend_equation_separate(
        &mut self,
        color: BlendEquation,
        alpha: BlendEquation,
    ) -> RenderResult<()> {
        self.require(
            !(color.is_min_max() || alpha.is_min_max()) || self.capabilities.blend_min_max,
            "MIN/MAX blend equations",
        )?;
        self.ok("blend_equation_separate")
    }

    fn depth_func(&mut self, _function: CompareFunction) -> RenderResult<()> {
        self.ok("depth_func")
    }

    fn depth_mask(&mut self, _enabled: bool) -> RenderResult<()> {
        self.ok("depth_mask")
    }

    fn color_mask(&mut self, _mask: ColorMask) -> RenderResult<()> {
        self.ok("color_mask")
    }

    fn cull_face(&mut self, _face: Face) -> RenderResult<()> {
        self.ok("cull_face")
    }

    fn front_face(&mut self, _winding: FrontFace) -> RenderResult<()> {
        self.ok("front_face")
    }

    fn polygon_mode(&mut self, _mode: PolygonMode) -> RenderResult<()> {
        self.require(self.capabilities.polygon_mode, "glPolygonMode")?;
        self.ok("polygon_mode")
    }

    fn clear_color(&mut self, _color: Color) -> RenderResult<()> {
        self.ok("clear_color")
    }

    fn clear_depth(&mut self, _depth: f32) -> RenderResult<()> {
        self.ok("clear_depth")
    }

    fn viewport(&mut self, _rect: RectI) -> RenderResult<()> {
        self.ok("viewport")
    }

    fn scissor(&mut self, _rect: RectI) -> RenderResult<()> {
        self.ok("scissor")
    }

    fn depth_range(&mut self, _range: DepthRange) -> RenderResult<()> {
        self.ok("depth_range")
    }

    fn clear(&mut self, _flags: ClearFlags) -> RenderResult<()> {
        self.ok("clear")
    }

    fn draw_arrays(
        &mut self,
        _topology: PrimitiveTopology,
        _first: u32,
        _count: u32,
    ) -> RenderResult<()> {
        self.ok("draw_arrays")
    }

    fn draw_elements(
        &mut self,
        _topology: PrimitiveTopology,
        _count: u32,
        _format: IndexFormat,
        _offset: usize,
    ) -> RenderResult<()> {
        self.ok("draw_elements")
    }

    fn draw_arrays_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _first: u32,
        _count: u32,
        _instances: u32,
    ) -> RenderResult<()> {
        self.require(self.capabilities.instancing, "Instanced drawing")?;
        self.ok("draw_arrays_instanced")
    }

    fn draw_elements_instanced(
        &mut self,
        _topology: PrimitiveTopology,
        _count: u32,
        _format: IndexFormat,
        _offset: usize,
        _instances: u32,
    ) -> RenderResult<()> {
        self.require(self.capabilities.instancing, "Instanced drawing")?;
        self.ok("draw_elements_instanced")
    }

    fn blit_framebuffer(
        &mut self,
        _src: RectI,
        _dst: RectI,
        _mask: ClearFlags,
        _filter: BlitFilter,
    ) -> RenderResult<()> {
        self.require(self.capabilities.framebuffer_blit, "glBlitFramebuffer")?;
        self.ok("blit_framebuffer")
    }
}
