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

//! The frame-driver surface: one graphics context with its caches.

use crate::config::RendererConfig;
use crate::renderer::api::*;
use crate::renderer::cache::{BindingCache, StateTracker, DRAW_FRAMEBUFFER_SLOT};
use crate::renderer::error::{RenderError, RenderResult};
use crate::renderer::hooks::{ChangeEvent, ChangeSink, RenderHooks};
use crate::renderer::stats::ChangeCounters;
use crate::renderer::traits::GraphicsBackend;

/// Owns a backend together with the binding cache, state tracker, counters and hooks
/// that belong to its graphics context.
///
/// There is exactly one `RenderContext` per driver context, used from the thread that
/// owns it. Resource wrappers such as [`Texture`](crate::renderer::resources::Texture)
/// take the context by `&mut` for every operation that reaches the driver.
#[derive(Debug)]
pub struct RenderContext<B: GraphicsBackend> {
    backend: B,
    capabilities: BackendCapabilities,
    bindings: BindingCache,
    state: StateTracker,
    counters: ChangeCounters,
    hooks: RenderHooks,
    config: RendererConfig,
    window_size: (u32, u32),
}

macro_rules! sink {
    ($ctx:ident) => {
        ChangeSink::new(&mut $ctx.counters, &mut $ctx.hooks).with_trace($ctx.config.trace_changes)
    };
}

impl<B: GraphicsBackend> RenderContext<B> {
    /// Wraps `backend`, validates `config` against its capabilities and applies the baseline.
    pub fn new(backend: B, config: RendererConfig) -> RenderResult<Self> {
        let capabilities = backend.capabilities();
        config.validate(&capabilities)?;
        log::debug!(
            "Creating render context for {:?} ({} texture units)",
            capabilities.backend,
            capabilities.max_texture_units
        );
        let mut ctx = Self {
            backend,
            capabilities,
            bindings: BindingCache::new(&capabilities),
            state: StateTracker::new(capabilities),
            counters: ChangeCounters::new(),
            hooks: RenderHooks::new(),
            window_size: config.window_size,
            config,
        };
        ctx.reset_state()?;
        Ok(ctx)
    }

    // --- Frame lifecycle ---

    /// Starts a new frame: every counter goes back to zero. Cached bindings and state persist.
    pub fn pre_draw(&mut self) {
        self.counters.pre_draw();
    }

    /// Force-applies the configured baseline state, bypassing the cache.
    pub fn reset_state(&mut self) -> RenderResult<()> {
        let window = self.window_rect();
        self.state.reset(&self.config.baseline, window, &mut self.backend)
    }

    /// Forgets every cached binding and state value.
    ///
    /// Call this after anything touched the driver behind the context's back, including
    /// direct use of [`backend_mut`](Self::backend_mut).
    pub fn invalidate(&mut self) {
        log::debug!("Invalidating binding and state caches");
        self.bindings.invalidate_all();
        self.state.invalidate();
    }

    /// Records a new default-framebuffer size. If the default framebuffer is the current
    /// draw target, viewport and scissor follow it immediately.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.window_size = (width, height);
        let draw = self
            .bindings
            .current(ResourceKind::Framebuffer, DRAW_FRAMEBUFFER_SLOT);
        if draw == Some(SlotState::Unbound) {
            let rect = self.window_rect();
            self.set_viewport(rect)?;
            self.set_scissor_rect(rect)?;
        }
        Ok(())
    }

    /// The default-framebuffer size.
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// The default-framebuffer rectangle.
    pub fn window_rect(&self) -> RectI {
        RectI::from_size(self.window_size.0, self.window_size.1)
    }

    // --- Bindings ---

    /// Binds through the cache. See [`BindingCache::bind`].
    pub fn bind(
        &mut self,
        kind: ResourceKind,
        slot: usize,
        handle: Option<ResourceHandle>,
        target: BindTarget,
    ) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.bindings
            .bind(kind, slot, handle, target, &mut self.backend, &mut sink)
    }

    /// Binds a texture to a texture unit through the cache.
    pub fn bind_texture(
        &mut self,
        unit: usize,
        target: TextureTarget,
        texture: Option<ResourceHandle>,
    ) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.bindings
            .bind_texture(unit, target, texture, &mut self.backend, &mut sink)
    }

    /// Makes `unit` the active texture unit unless the cache knows it already is.
    pub fn select_texture_unit(&mut self, unit: usize) -> RenderResult<bool> {
        self.bindings.select_texture_unit(unit, &mut self.backend)
    }

    /// Makes a program current through the cache.
    pub fn use_program(&mut self, program: Option<ResourceHandle>) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.bindings
            .use_program(program, &mut self.backend, &mut sink)
    }

    /// Binds a framebuffer through the cache.
    pub fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<ResourceHandle>,
    ) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.bindings
            .bind_framebuffer(target, framebuffer, &mut self.backend, &mut sink)
    }

    /// Binds a vertex array through the cache.
    pub fn bind_vertex_array(&mut self, vertex_array: Option<ResourceHandle>) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.bindings
            .bind_vertex_array(vertex_array, &mut self.backend, &mut sink)
    }

    /// Binds a buffer through the cache.
    pub fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<ResourceHandle>,
    ) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.bindings
            .bind_buffer(target, buffer, &mut self.backend, &mut sink)
    }

    // --- Pipeline state ---

    /// Sets the blend state through the tracker.
    pub fn set_blend(&mut self, blend: BlendState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state.set_blend(blend, &mut self.backend, &mut sink)
    }

    /// Sets the depth-test state through the tracker.
    pub fn set_depth(&mut self, depth: DepthState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state.set_depth(depth, &mut self.backend, &mut sink)
    }

    /// Sets face culling through the tracker.
    pub fn set_cull_mode(&mut self, cull_mode: CullModeState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_cull_mode(cull_mode, &mut self.backend, &mut sink)
    }

    /// Sets the front-facing winding through the tracker.
    pub fn set_front_face(&mut self, front_face: FrontFaceState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_front_face(front_face, &mut self.backend, &mut sink)
    }

    /// Sets the polygon mode through the tracker.
    pub fn set_polygon_mode(&mut self, polygon_mode: PolygonModeState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_polygon_mode(polygon_mode, &mut self.backend, &mut sink)
    }

    /// Sets the colour write mask through the tracker.
    pub fn set_color_mask(&mut self, color_mask: ColorMaskState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_color_mask(color_mask, &mut self.backend, &mut sink)
    }

    /// Sets the depth write mask through the tracker.
    pub fn set_depth_mask(&mut self, depth_mask: DepthMaskState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_depth_mask(depth_mask, &mut self.backend, &mut sink)
    }

    /// Sets the clear colour through the tracker.
    pub fn set_clear_color(&mut self, color: Color) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_clear_color(color, &mut self.backend, &mut sink)
    }

    /// Sets the clear depth through the tracker.
    pub fn set_clear_depth(&mut self, depth: f32) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_clear_depth(depth, &mut self.backend, &mut sink)
    }

    /// Sets the viewport through the tracker.
    pub fn set_viewport(&mut self, viewport: RectI) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_viewport(viewport, &mut self.backend, &mut sink)
    }

    /// Sets the scissor toggle and rectangle through the tracker.
    pub fn set_scissor(&mut self, scissor: ScissorState) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state.set_scissor(scissor, &mut self.backend, &mut sink)
    }

    /// Changes the scissor rectangle, keeping the toggle.
    pub fn set_scissor_rect(&mut self, rect: RectI) -> RenderResult<bool> {
        let enabled = self.state.scissor().enabled;
        self.set_scissor(ScissorState::new(enabled, rect))
    }

    /// Enables or disables the scissor test, keeping the rectangle.
    pub fn set_scissor_test(&mut self, enabled: bool) -> RenderResult<bool> {
        let rect = self.state.scissor().rect;
        self.set_scissor(ScissorState::new(enabled, rect))
    }

    /// Sets the depth range through the tracker.
    pub fn set_depth_range(&mut self, range: DepthRange) -> RenderResult<bool> {
        let mut sink = sink!(self);
        self.state
            .set_depth_range(range, &mut self.backend, &mut sink)
    }

    // --- Clears and draws ---

    /// Clears the selected buffers of the draw framebuffer.
    pub fn clear(&mut self, flags: ClearFlags) -> RenderResult<()> {
        self.backend.clear(flags)
    }

    /// Clears colour and depth, setting the clear colour first.
    pub fn clear_color(&mut self, color: Color) -> RenderResult<()> {
        self.set_clear_color(color)?;
        self.clear(ClearFlags::COLOR | ClearFlags::DEPTH)
    }

    /// Clears depth only, setting the clear depth first.
    pub fn clear_depth(&mut self, depth: f32) -> RenderResult<()> {
        self.set_clear_depth(depth)?;
        self.clear(ClearFlags::DEPTH)
    }

    /// Clears colour and depth, setting both clear values first.
    pub fn clear_all(&mut self, color: Color, depth: f32) -> RenderResult<()> {
        self.set_clear_color(color)?;
        self.set_clear_depth(depth)?;
        self.clear(ClearFlags::COLOR | ClearFlags::DEPTH)
    }

    /// Draws `count` vertices starting at vertex `offset`.
    pub fn draw(&mut self, topology: PrimitiveTopology, offset: u32, count: u32) -> RenderResult<()> {
        self.backend.draw_arrays(topology, offset, count)?;
        self.counters.record_draw_call();
        Ok(())
    }

    /// Draws `count` indices starting at index `offset` of the bound index buffer.
    pub fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        offset: u32,
        count: u32,
        format: IndexFormat,
    ) -> RenderResult<()> {
        let byte_offset = offset as usize * format.size();
        self.backend
            .draw_elements(topology, count, format, byte_offset)?;
        self.counters.record_draw_call();
        Ok(())
    }

    /// Draws `instances` copies of `count` vertices.
    pub fn draw_instanced(
        &mut self,
        topology: PrimitiveTopology,
        offset: u32,
        count: u32,
        instances: u32,
    ) -> RenderResult<()> {
        self.require(self.capabilities.instancing, "Instanced drawing")?;
        self.backend
            .draw_arrays_instanced(topology, offset, count, instances)?;
        self.counters.record_draw_call();
        Ok(())
    }

    /// Draws `instances` copies of `count` indices.
    pub fn draw_indexed_instanced(
        &mut self,
        topology: PrimitiveTopology,
        offset: u32,
        count: u32,
        format: IndexFormat,
        instances: u32,
    ) -> RenderResult<()> {
        self.require(self.capabilities.instancing, "Instanced drawing")?;
        let byte_offset = offset as usize * format.size();
        self.backend
            .draw_elements_instanced(topology, count, format, byte_offset, instances)?;
        self.counters.record_draw_call();
        Ok(())
    }

    // --- Accessors ---

    /// The counters of the current frame.
    pub fn counters(&self) -> &ChangeCounters {
        &self.counters
    }

    /// The registered hooks.
    pub fn hooks(&self) -> &RenderHooks {
        &self.hooks
    }

    /// Mutable access to the hooks, to register or clear listeners.
    pub fn hooks_mut(&mut self) -> &mut RenderHooks {
        &mut self.hooks
    }

    /// The binding cache.
    pub fn bindings(&self) -> &BindingCache {
        &self.bindings
    }

    /// The state tracker.
    pub fn state(&self) -> &StateTracker {
        &self.state
    }

    /// The configuration the context was created with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The backend's capabilities.
    pub fn capabilities(&self) -> &BackendCapabilities {
        &self.capabilities
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend. Binds or state changes made this way bypass the
    /// caches; call [`invalidate`](Self::invalidate) afterwards.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the context and returns the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    // --- Crate-internal plumbing for resource wrappers ---

    pub(crate) fn register(&mut self, kind: ResourceKind, handle: ResourceHandle) {
        self.bindings.register(kind, handle);
    }

    pub(crate) fn release(&mut self, kind: ResourceKind, handle: ResourceHandle) {
        self.bindings.release(kind, handle);
    }

    pub(crate) fn forget_bindings(&mut self, kind: ResourceKind) {
        self.bindings.invalidate(kind);
    }

    pub(crate) fn emit_uniform(
        &mut self,
        location: UniformLocation,
        value: &UniformValue,
    ) -> RenderResult<()> {
        let backend = &mut self.backend;
        let mut sink = ChangeSink::new(&mut self.counters, &mut self.hooks)
            .with_trace(self.config.trace_changes);
        sink.emit(ChangeEvent::Uniform, || backend.set_uniform(location, value))
    }

    pub(crate) fn record_blit(&mut self) {
        self.counters.record_blit();
    }

    pub(crate) fn require(&self, available: bool, operation: &'static str) -> RenderResult<()> {
        if available {
            Ok(())
        } else {
            Err(RenderError::unsupported(operation, self.capabilities.backend))
        }
    }
}
