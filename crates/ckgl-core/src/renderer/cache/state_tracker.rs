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

//! The state tracker: last-applied pipeline state per category.

use crate::renderer::api::*;
use crate::renderer::error::{RenderError, RenderResult};
use crate::renderer::hooks::{ChangeEvent, ChangeSink};
use crate::renderer::traits::GraphicsBackend;

/// Caches the last-applied value of every [`StateCategory`] and elides redundant transitions.
///
/// Values are compared structurally. A category that was never applied (or was invalidated)
/// always emits on its next set, because the driver's real value is unknown. Capability
/// checks run before the first primitive of a transition, so an unsupported request never
/// leaves the pipeline half-applied.
#[derive(Debug, Clone)]
pub struct StateTracker {
    state: PipelineState,
    viewport: RectI,
    scissor: ScissorState,
    applied: [bool; StateCategory::COUNT],
    capabilities: BackendCapabilities,
}

impl StateTracker {
    /// Creates a tracker that knows nothing about the driver state yet.
    pub fn new(capabilities: BackendCapabilities) -> Self {
        Self {
            state: PipelineState::default(),
            viewport: RectI::default(),
            scissor: ScissorState::default(),
            applied: [false; StateCategory::COUNT],
            capabilities,
        }
    }

    /// The last-applied window-independent state.
    ///
    /// Only meaningful for categories where [`is_applied`](Self::is_applied) is `true`.
    pub fn current(&self) -> &PipelineState {
        &self.state
    }

    /// The last-applied viewport.
    pub fn viewport(&self) -> RectI {
        self.viewport
    }

    /// The last-applied scissor state.
    pub fn scissor(&self) -> ScissorState {
        self.scissor
    }

    /// Returns `true` if `category` holds a value known to match the driver.
    pub fn is_applied(&self, category: StateCategory) -> bool {
        self.applied[category.index()]
    }

    /// Forgets every category, so the next set of each reaches the backend.
    pub fn invalidate(&mut self) {
        self.applied = [false; StateCategory::COUNT];
    }

    /// Sets the blend state.
    ///
    /// Emits the enable toggle, then one combined `blend_func` when colour and alpha share
    /// factors (`blend_func_separate` otherwise), then one combined `blend_equation` when they
    /// share the equation (`blend_equation_separate` otherwise).
    /// ## Errors
    /// * `RenderError::Unsupported` for `Min`/`Max` equations on a backend without them.
    pub fn set_blend(
        &mut self,
        blend: BlendState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.blend == blend;
        if !(unchanged && self.is_applied(StateCategory::Blend)) {
            self.check_blend(&blend)?;
        }
        let changed = self.apply(StateCategory::Blend, unchanged, sink, || {
            emit_blend(backend, &blend)
        })?;
        self.state.blend = blend;
        Ok(changed)
    }

    /// Sets the depth-test state.
    pub fn set_depth(
        &mut self,
        depth: DepthState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.depth == depth;
        let changed = self.apply(StateCategory::Depth, unchanged, sink, || {
            emit_depth(backend, &depth)
        })?;
        self.state.depth = depth;
        Ok(changed)
    }

    /// Sets the face-culling state.
    pub fn set_cull_mode(
        &mut self,
        cull_mode: CullModeState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.cull_mode == cull_mode;
        let changed = self.apply(StateCategory::CullMode, unchanged, sink, || {
            emit_cull_mode(backend, &cull_mode)
        })?;
        self.state.cull_mode = cull_mode;
        Ok(changed)
    }

    /// Sets the front-facing winding.
    pub fn set_front_face(
        &mut self,
        front_face: FrontFaceState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.front_face == front_face;
        let changed = self.apply(StateCategory::FrontFace, unchanged, sink, || {
            backend.front_face(front_face.0)
        })?;
        self.state.front_face = front_face;
        Ok(changed)
    }

    /// Sets the polygon mode.
    /// ## Errors
    /// * `RenderError::Unsupported` on backends without `glPolygonMode`, whatever the mode.
    pub fn set_polygon_mode(
        &mut self,
        polygon_mode: PolygonModeState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        self.check_polygon_mode()?;
        let unchanged = self.state.polygon_mode == polygon_mode;
        let changed = self.apply(StateCategory::PolygonMode, unchanged, sink, || {
            backend.polygon_mode(polygon_mode.0)
        })?;
        self.state.polygon_mode = polygon_mode;
        Ok(changed)
    }

    /// Sets the colour write mask.
    pub fn set_color_mask(
        &mut self,
        color_mask: ColorMaskState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.color_mask == color_mask;
        let changed = self.apply(StateCategory::ColorMask, unchanged, sink, || {
            backend.color_mask(color_mask.0)
        })?;
        self.state.color_mask = color_mask;
        Ok(changed)
    }

    /// Sets the depth write mask.
    pub fn set_depth_mask(
        &mut self,
        depth_mask: DepthMaskState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.depth_mask == depth_mask;
        let changed = self.apply(StateCategory::DepthMask, unchanged, sink, || {
            backend.depth_mask(depth_mask.0)
        })?;
        self.state.depth_mask = depth_mask;
        Ok(changed)
    }

    /// Sets the clear colour.
    pub fn set_clear_color(
        &mut self,
        color: Color,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.clear_color == color;
        let changed = self.apply(StateCategory::ClearColor, unchanged, sink, || {
            backend.clear_color(color)
        })?;
        self.state.clear_color = color;
        Ok(changed)
    }

    /// Sets the clear depth.
    pub fn set_clear_depth(
        &mut self,
        depth: f32,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.state.clear_depth == depth;
        let changed = self.apply(StateCategory::ClearDepth, unchanged, sink, || {
            backend.clear_depth(depth)
        })?;
        self.state.clear_depth = depth;
        Ok(changed)
    }

    /// Sets the viewport rectangle.
    pub fn set_viewport(
        &mut self,
        viewport: RectI,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.viewport == viewport;
        let changed = self.apply(StateCategory::Viewport, unchanged, sink, || {
            backend.viewport(viewport)
        })?;
        self.viewport = viewport;
        Ok(changed)
    }

    /// Sets the scissor test toggle and rectangle.
    pub fn set_scissor(
        &mut self,
        scissor: ScissorState,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let unchanged = self.scissor == scissor;
        let changed = self.apply(StateCategory::Scissor, unchanged, sink, || {
            emit_scissor(backend, &scissor)
        })?;
        self.scissor = scissor;
        self.state.scissor_test = scissor.enabled;
        Ok(changed)
    }

    /// Sets the depth range. Both ends are clamped into `[0, 1]` before comparison.
    pub fn set_depth_range(
        &mut self,
        range: DepthRange,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let range = range.clamped();
        let unchanged = self.state.depth_range == range;
        let changed = self.apply(StateCategory::DepthRange, unchanged, sink, || {
            backend.depth_range(range)
        })?;
        self.state.depth_range = range;
        Ok(changed)
    }

    /// Force-applies `baseline`, with viewport and scissor covering `window`.
    ///
    /// Every category is emitted regardless of the cache, because foreign code may have
    /// changed the driver state behind the tracker's back. A reset is not a frame change:
    /// no counter moves and no hook fires. Polygon mode is skipped on backends without it.
    pub fn reset(
        &mut self,
        baseline: &PipelineState,
        window: RectI,
        backend: &mut dyn GraphicsBackend,
    ) -> RenderResult<()> {
        self.check_blend(&baseline.blend)?;
        let polygon_mode = self.capabilities.polygon_mode;
        if !polygon_mode && baseline.polygon_mode.0 != PolygonMode::Fill {
            self.check_polygon_mode()?;
        }
        let scissor = ScissorState::new(baseline.scissor_test, window);
        let depth_range = baseline.depth_range.clamped();

        self.invalidate();
        emit_blend(backend, &baseline.blend)?;
        emit_depth(backend, &baseline.depth)?;
        emit_cull_mode(backend, &baseline.cull_mode)?;
        backend.front_face(baseline.front_face.0)?;
        if polygon_mode {
            backend.polygon_mode(baseline.polygon_mode.0)?;
        }
        backend.color_mask(baseline.color_mask.0)?;
        backend.depth_mask(baseline.depth_mask.0)?;
        backend.clear_color(baseline.clear_color)?;
        backend.clear_depth(baseline.clear_depth)?;
        backend.viewport(window)?;
        emit_scissor(backend, &scissor)?;
        backend.depth_range(depth_range)?;

        self.state = PipelineState {
            depth_range,
            ..*baseline
        };
        self.viewport = window;
        self.scissor = scissor;
        self.applied = [true; StateCategory::COUNT];
        if !polygon_mode {
            self.applied[StateCategory::PolygonMode.index()] = false;
        }
        log::debug!("Pipeline state reset to baseline ({window:?})");
        Ok(())
    }

    fn check_blend(&self, blend: &BlendState) -> RenderResult<()> {
        if blend.uses_min_max() && !self.capabilities.blend_min_max {
            return Err(RenderError::unsupported(
                "MIN/MAX blend equations",
                self.capabilities.backend,
            ));
        }
        Ok(())
    }

    fn check_polygon_mode(&self) -> RenderResult<()> {
        if !self.capabilities.polygon_mode {
            return Err(RenderError::unsupported(
                "glPolygonMode",
                self.capabilities.backend,
            ));
        }
        Ok(())
    }

    /// Emits a transition unless the category is applied and `unchanged`.
    ///
    /// The category is marked unapplied while the primitives run, so a backend failure
    /// leaves it unknown instead of cached with a value the driver may not hold.
    fn apply<F>(
        &mut self,
        category: StateCategory,
        unchanged: bool,
        sink: &mut ChangeSink<'_>,
        primitives: F,
    ) -> RenderResult<bool>
    where
        F: FnOnce() -> RenderResult<()>,
    {
        let index = category.index();
        if unchanged && self.applied[index] {
            return Ok(false);
        }
        self.applied[index] = false;
        sink.emit(ChangeEvent::State(category), primitives)?;
        self.applied[index] = true;
        Ok(true)
    }
}

fn emit_blend(backend: &mut dyn GraphicsBackend, blend: &BlendState) -> RenderResult<()> {
    backend.set_enabled(Capability::Blend, blend.enabled)?;
    if blend.factors_shared() {
        backend.blend_func(blend.color_src, blend.color_dst)?;
    } else {
        backend.blend_func_separate(
            blend.color_src,
            blend.color_dst,
            blend.alpha_src,
            blend.alpha_dst,
        )?;
    }
    if blend.equations_shared() {
        backend.blend_equation(blend.color_equation)
    } else {
        backend.blend_equation_separate(blend.color_equation, blend.alpha_equation)
    }
}

fn emit_depth(backend: &mut dyn GraphicsBackend, depth: &DepthState) -> RenderResult<()> {
    backend.set_enabled(Capability::DepthTest, depth.enabled)?;
    backend.depth_func(depth.function)
}

fn emit_cull_mode(backend: &mut dyn GraphicsBackend, cull: &CullModeState) -> RenderResult<()> {
    backend.set_enabled(Capability::CullFace, cull.enabled)?;
    backend.cull_face(cull.face)
}

fn emit_scissor(backend: &mut dyn GraphicsBackend, scissor: &ScissorState) -> RenderResult<()> {
    backend.set_enabled(Capability::ScissorTest, scissor.enabled)?;
    backend.scissor(scissor.rect)
}
