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

//! Shared test support: a backend that records every primitive it receives.

#![allow(dead_code)]

use ckgl_core::renderer::*;
use ckgl_core::RendererConfig;
use std::collections::HashMap;

/// One recorded primitive, with raw handle values for easy comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ResourceKind, u32),
    Delete(ResourceKind, u32),
    TextureImage(TextureTarget, u32, u32, TextureFormat),
    TextureParameter(TextureTarget, TextureParameter),
    UniformLocation(String),
    SetUniform(UniformLocation, UniformValue),
    FramebufferTexture(FramebufferAttachment, u32),
    DrawBuffers(usize),
    ReadBuffer(u32),
    FramebufferStatus,
    FramebufferQuery(FramebufferTarget),
    BufferData(BufferTarget, usize),
    EnableVertexAttribute(u32),
    VertexAttributePointer(u32, VertexAttribute, u32),
    VertexAttributeDivisor(u32, u32),
    ActiveTexture(usize),
    BindTexture(usize, TextureTarget, Option<u32>),
    UseProgram(Option<u32>),
    BindFramebuffer(FramebufferTarget, Option<u32>),
    BindVertexArray(Option<u32>),
    BindBuffer(BufferTarget, Option<u32>),
    SetEnabled(Capability, bool),
    BlendFunc(BlendFactor, BlendFactor),
    BlendFuncSeparate(BlendFactor, BlendFactor, BlendFactor, BlendFactor),
    BlendEquation(BlendEquation),
    BlendEquationSeparate(BlendEquation, BlendEquation),
    DepthFunc(CompareFunction),
    DepthMask(bool),
    ColorMask(ColorMask),
    CullFace(Face),
    FrontFace(FrontFace),
    PolygonMode(PolygonMode),
    ClearColor(Color),
    ClearDepth(f32),
    Viewport(RectI),
    Scissor(RectI),
    DepthRange(DepthRange),
    Clear(ClearFlags),
    DrawArrays(PrimitiveTopology, u32, u32),
    DrawElements(PrimitiveTopology, u32, IndexFormat, usize),
    DrawArraysInstanced(PrimitiveTopology, u32, u32, u32),
    DrawElementsInstanced(PrimitiveTopology, u32, IndexFormat, usize, u32),
    Blit(RectI, RectI, ClearFlags, BlitFilter),
}

impl Call {
    /// Returns `true` for the bind primitives.
    pub fn is_bind(&self) -> bool {
        matches!(
            self,
            Call::BindTexture(..)
                | Call::UseProgram(_)
                | Call::BindFramebuffer(..)
                | Call::BindVertexArray(_)
                | Call::BindBuffer(..)
        )
    }
}

#[derive(Debug, Default)]
struct NameAllocator {
    next: u32,
    freed: Vec<u32>,
}

/// The slice of driver state that depends on other bindings, modelled the way GL keeps it.
#[derive(Debug, Default)]
pub struct DriverModel {
    pub active_unit: usize,
    /// Texture bound on each unit, for the 2D target.
    pub units: HashMap<usize, u32>,
    pub vertex_array: Option<u32>,
    /// Index buffer attached to each vertex array (`None` is the default one).
    pub index_buffers: HashMap<Option<u32>, u32>,
    pub draw_framebuffer: Option<u32>,
    /// The texture each parameter write landed on.
    pub parameter_writes: Vec<(Option<u32>, TextureParameter)>,
    /// The index buffer each indexed draw read from.
    pub index_reads: Vec<Option<u32>>,
}

/// A backend that recycles deleted names, like real drivers do, and logs every call.
#[derive(Debug)]
pub struct RecordingBackend {
    caps: BackendCapabilities,
    names: HashMap<ResourceKind, NameAllocator>,
    uniforms: HashMap<String, u32>,
    pub calls: Vec<Call>,
    pub driver: DriverModel,
    /// When set, every non-creating primitive fails without being recorded.
    pub failing: bool,
}

impl RecordingBackend {
    pub fn new(backend: GraphicsBackendType) -> Self {
        Self::with_capabilities(BackendCapabilities::for_backend(
            backend,
            BackendLimits::default(),
        ))
    }

    pub fn with_capabilities(caps: BackendCapabilities) -> Self {
        Self {
            caps,
            names: HashMap::new(),
            uniforms: HashMap::new(),
            calls: Vec::new(),
            driver: DriverModel::default(),
            failing: false,
        }
    }

    /// Declares `name` as an active uniform of every program.
    pub fn with_uniform(mut self, name: &str) -> Self {
        let location = self.uniforms.len() as u32;
        self.uniforms.insert(name.to_string(), location);
        self
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn bind_calls(&self) -> usize {
        self.count(Call::is_bind)
    }

    fn allocate(&mut self, kind: ResourceKind) -> RenderResult<ResourceHandle> {
        let names = self.names.entry(kind).or_default();
        let raw = match names.freed.pop() {
            Some(raw) => raw,
            None => {
                names.next += 1;
                names.next
            }
        };
        self.calls.push(Call::Create(kind, raw));
        ResourceHandle::new(raw).ok_or_else(|| RenderError::Backend("name space exhausted".into()))
    }

    fn free(&mut self, kind: ResourceKind, handle: ResourceHandle) -> RenderResult<()> {
        self.names.entry(kind).or_default().freed.push(handle.get());
        self.record(Call::Delete(kind, handle.get()))
    }

    fn record(&mut self, call: Call) -> RenderResult<()> {
        if self.failing {
            return Err(RenderError::Backend(format!("injected failure on {call:?}")));
        }
        self.calls.push(call);
        Ok(())
    }
}

fn raw(handle: Option<ResourceHandle>) -> Option<u32> {
    handle.map(ResourceHandle::get)
}

impl GraphicsBackend for RecordingBackend {
    fn capabilities(&self) -> BackendCapabilities {
        self.caps
    }

    fn create_texture(&mut self) -> RenderResult<ResourceHandle> {
        self.allocate(ResourceKind::Texture)
    }

    fn delete_texture(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.free(ResourceKind::Texture, handle)
    }

    fn texture_image_2d(
        &mut self,
        target: TextureTarget,
        width: u32,
        height: u32,
        format: TextureFormat,
        _data: Option<&[u8]>,
    ) -> RenderResult<()> {
        self.record(Call::TextureImage(target, width, height, format))
    }

    fn texture_parameter(
        &mut self,
        target: TextureTarget,
        parameter: TextureParameter,
    ) -> RenderResult<()> {
        self.record(Call::TextureParameter(target, parameter))?;
        let texture = self.driver.units.get(&self.driver.active_unit).copied();
        self.driver.parameter_writes.push((texture, parameter));
        Ok(())
    }

    fn create_program(&mut self, vertex: &str, fragment: &str) -> RenderResult<ResourceHandle> {
        if !fragment.contains("main") {
            return Err(ShaderError::CompilationFailed {
                stage: ShaderStage::Fragment,
                log: "no entry point".into(),
            }
            .into());
        }
        if vertex.is_empty() {
            return Err(ShaderError::LinkFailed {
                log: "missing vertex stage".into(),
            }
            .into());
        }
        self.allocate(ResourceKind::Shader)
    }

    fn delete_program(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.free(ResourceKind::Shader, handle)
    }

    fn uniform_location(
        &mut self,
        _program: ResourceHandle,
        name: &str,
    ) -> RenderResult<Option<UniformLocation>> {
        self.calls.push(Call::UniformLocation(name.to_string()));
        Ok(self.uniforms.get(name).copied().map(UniformLocation))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) -> RenderResult<()> {
        self.record(Call::SetUniform(location, *value))
    }

    fn create_framebuffer(&mut self) -> RenderResult<ResourceHandle> {
        self.allocate(ResourceKind::Framebuffer)
    }

    fn delete_framebuffer(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.free(ResourceKind::Framebuffer, handle)
    }

    fn framebuffer_texture(
        &mut self,
        _target: FramebufferTarget,
        attachment: FramebufferAttachment,
        _texture_target: TextureTarget,
        texture: ResourceHandle,
    ) -> RenderResult<()> {
        self.record(Call::FramebufferTexture(attachment, texture.get()))
    }

    fn draw_buffers(&mut self, count: usize) -> RenderResult<()> {
        self.record(Call::DrawBuffers(count))
    }

    fn read_buffer(&mut self, attachment: u32) -> RenderResult<()> {
        self.record(Call::ReadBuffer(attachment))
    }

    fn framebuffer_status(&mut self, _target: FramebufferTarget) -> RenderResult<()> {
        self.record(Call::FramebufferStatus)
    }

    fn framebuffer_binding(
        &mut self,
        target: FramebufferTarget,
    ) -> RenderResult<Option<ResourceHandle>> {
        self.record(Call::FramebufferQuery(target))?;
        Ok(self.driver.draw_framebuffer.and_then(ResourceHandle::new))
    }

    fn create_vertex_array(&mut self) -> RenderResult<ResourceHandle> {
        self.allocate(ResourceKind::VertexArray)
    }

    fn delete_vertex_array(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.free(ResourceKind::VertexArray, handle)
    }

    fn create_buffer(&mut self) -> RenderResult<ResourceHandle> {
        self.allocate(ResourceKind::Buffer)
    }

    fn delete_buffer(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        self.free(ResourceKind::Buffer, handle)
    }

    fn buffer_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        _usage: BufferUsage,
    ) -> RenderResult<()> {
        self.record(Call::BufferData(target, data.len()))
    }

    fn enable_vertex_attribute(&mut self, location: u32) -> RenderResult<()> {
        self.record(Call::EnableVertexAttribute(location))
    }

    fn vertex_attribute_pointer(
        &mut self,
        location: u32,
        attribute: &VertexAttribute,
        stride: u32,
    ) -> RenderResult<()> {
        self.record(Call::VertexAttributePointer(location, *attribute, stride))
    }

    fn vertex_attribute_divisor(&mut self, location: u32, divisor: u32) -> RenderResult<()> {
        self.record(Call::VertexAttributeDivisor(location, divisor))
    }

    fn active_texture(&mut self, unit: usize) -> RenderResult<()> {
        self.record(Call::ActiveTexture(unit))?;
        self.driver.active_unit = unit;
        Ok(())
    }

    fn bind_texture(
        &mut self,
        unit: usize,
        target: TextureTarget,
        texture: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.record(Call::BindTexture(unit, target, raw(texture)))?;
        self.driver.active_unit = unit;
        match raw(texture) {
            Some(name) => self.driver.units.insert(unit, name),
            None => self.driver.units.remove(&unit),
        };
        Ok(())
    }

    fn use_program(&mut self, program: Option<ResourceHandle>) -> RenderResult<()> {
        self.record(Call::UseProgram(raw(program)))
    }

    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.record(Call::BindFramebuffer(target, raw(framebuffer)))?;
        if target != FramebufferTarget::Read {
            self.driver.draw_framebuffer = raw(framebuffer);
        }
        Ok(())
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<ResourceHandle>) -> RenderResult<()> {
        self.record(Call::BindVertexArray(raw(vertex_array)))?;
        self.driver.vertex_array = raw(vertex_array);
        Ok(())
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        self.record(Call::BindBuffer(target, raw(buffer)))?;
        if target == BufferTarget::Index {
            let vertex_array = self.driver.vertex_array;
            match raw(buffer) {
                Some(name) => self.driver.index_buffers.insert(vertex_array, name),
                None => self.driver.index_buffers.remove(&vertex_array),
            };
        }
        Ok(())
    }

    fn set_enabled(&mut self, capability: Capability, enabled: bool) -> RenderResult<()> {
        self.record(Call::SetEnabled(capability, enabled))
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> RenderResult<()> {
        self.record(Call::BlendFunc(src, dst))
    }

    fn blend_func_separate(
        &mut self,
        color_src: BlendFactor,
        color_dst: BlendFactor,
        alpha_src: BlendFactor,
        alpha_dst: BlendFactor,
    ) -> RenderResult<()> {
        self.record(Call::BlendFuncSeparate(
            color_src, color_dst, alpha_src, alpha_dst,
        ))
    }

    fn blend_equation(&mut self, equation: BlendEquation) -> RenderResult<()> {
        self.record(Call::BlendEquation(equation))
    }

    fn blend_equation_separate(
        &mut self,
        color: BlendEquation,
        alpha: BlendEquation,
    ) -> RenderResult<()> {
        self.record(Call::BlendEquationSeparate(color, alpha))
    }

    fn depth_func(&mut self, function: CompareFunction) -> RenderResult<()> {
        self.record(Call::DepthFunc(function))
    }

    fn depth_mask(&mut self, enabled: bool) -> RenderResult<()> {
        self.record(Call::DepthMask(enabled))
    }

    fn color_mask(&mut self, mask: ColorMask) -> RenderResult<()> {
        self.record(Call::ColorMask(mask))
    }

    fn cull_face(&mut self, face: Face) -> RenderResult<()> {
        self.record(Call::CullFace(face))
    }

    fn front_face(&mut self, winding: FrontFace) -> RenderResult<()> {
        self.record(Call::FrontFace(winding))
    }

    fn polygon_mode(&mut self, mode: PolygonMode) -> RenderResult<()> {
        self.record(Call::PolygonMode(mode))
    }

    fn clear_color(&mut self, color: Color) -> RenderResult<()> {
        self.record(Call::ClearColor(color))
    }

    fn clear_depth(&mut self, depth: f32) -> RenderResult<()> {
        self.record(Call::ClearDepth(depth))
    }

    fn viewport(&mut self, rect: RectI) -> RenderResult<()> {
        self.record(Call::Viewport(rect))
    }

    fn scissor(&mut self, rect: RectI) -> RenderResult<()> {
        self.record(Call::Scissor(rect))
    }

    fn depth_range(&mut self, range: DepthRange) -> RenderResult<()> {
        self.record(Call::DepthRange(range))
    }

    fn clear(&mut self, flags: ClearFlags) -> RenderResult<()> {
        self.record(Call::Clear(flags))
    }

    fn draw_arrays(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> RenderResult<()> {
        self.record(Call::DrawArrays(topology, first, count))
    }

    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        offset: usize,
    ) -> RenderResult<()> {
        self.record(Call::DrawElements(topology, count, format, offset))?;
        let index_buffer = self
            .driver
            .index_buffers
            .get(&self.driver.vertex_array)
            .copied();
        self.driver.index_reads.push(index_buffer);
        Ok(())
    }

    fn draw_arrays_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        instances: u32,
    ) -> RenderResult<()> {
        self.record(Call::DrawArraysInstanced(topology, first, count, instances))
    }

    fn draw_elements_instanced(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        offset: usize,
        instances: u32,
    ) -> RenderResult<()> {
        self.record(Call::DrawElementsInstanced(
            topology, count, format, offset, instances,
        ))
    }

    fn blit_framebuffer(
        &mut self,
        src: RectI,
        dst: RectI,
        mask: ClearFlags,
        filter: BlitFilter,
    ) -> RenderResult<()> {
        self.record(Call::Blit(src, dst, mask, filter))
    }
}

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

/// Creates a context over a fresh recording backend and forgets the calls made by the
/// initial reset.
pub fn context(backend: GraphicsBackendType) -> RenderContext<RecordingBackend> {
    context_with(RecordingBackend::new(backend))
}

/// Like [`context`], over a preconfigured backend.
pub fn context_with(backend: RecordingBackend) -> RenderContext<RecordingBackend> {
    init_logging();
    let config = RendererConfig {
        backend: backend.capabilities().backend,
        ..RendererConfig::default()
    };
    let mut ctx = RenderContext::new(backend, config).expect("context creation");
    ctx.backend_mut().calls.clear();
    ctx
}

/// Registers `raw` as a live texture name without going through a wrapper.
pub fn handle(raw: u32) -> ResourceHandle {
    ResourceHandle::new(raw).expect("non-zero handle")
}
