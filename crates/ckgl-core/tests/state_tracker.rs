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

//! Integration tests for pipeline state tracking through a render context.

mod common;

use ckgl_core::renderer::*;
use ckgl_core::{RenderContext, RendererConfig};
use common::{context, Call, RecordingBackend};

/// Helper: the number of recorded calls matching `predicate`.
fn count(ctx: &RenderContext<RecordingBackend>, predicate: impl Fn(&Call) -> bool) -> usize {
    ctx.backend().count(predicate)
}

// ─────────────────────────────────────────────────────────────────────────────
// Elision by structural equality
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_independently_built_equal_states_emit_once() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    let first = BlendState::new(true, BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    let second = BlendState::separate(
        true,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
    );
    assert!(ctx.set_blend(first).unwrap());
    assert!(!ctx.set_blend(second).unwrap(), "equal values must be elided");

    assert_eq!(
        ctx.backend().calls,
        vec![
            Call::SetEnabled(Capability::Blend, true),
            Call::BlendFunc(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            Call::BlendEquation(BlendEquation::Add),
        ]
    );
    assert_eq!(ctx.counters().state_changes(), 1);
}

#[test]
fn test_baseline_values_are_elided_after_context_creation() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let baseline = PipelineState::default();

    assert!(!ctx.set_blend(baseline.blend).unwrap());
    assert!(!ctx.set_depth(baseline.depth).unwrap());
    assert!(!ctx.set_cull_mode(baseline.cull_mode).unwrap());
    assert!(!ctx.set_front_face(baseline.front_face).unwrap());
    assert!(!ctx.set_polygon_mode(baseline.polygon_mode).unwrap());
    assert!(!ctx.set_color_mask(baseline.color_mask).unwrap());
    assert!(!ctx.set_depth_mask(baseline.depth_mask).unwrap());
    assert!(!ctx.set_clear_color(baseline.clear_color).unwrap());
    assert!(!ctx.set_clear_depth(baseline.clear_depth).unwrap());
    assert!(!ctx.set_viewport(ctx.window_rect()).unwrap());
    assert!(!ctx.set_depth_range(baseline.depth_range).unwrap());

    assert!(ctx.backend().calls.is_empty());
    assert_eq!(ctx.counters().state_changes(), 0);
}

#[test]
fn test_state_changes_count_transitions_not_primitives() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    ctx.set_depth(DepthState::LESS).unwrap();
    ctx.set_cull_mode(CullModeState::BACK).unwrap();
    ctx.set_depth(DepthState::LESS).unwrap();

    assert_eq!(ctx.counters().state_changes(), 2);
    assert_eq!(ctx.backend().calls.len(), 4, "each transition is two primitives");
}

// ─────────────────────────────────────────────────────────────────────────────
// Blend call selection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shared_factors_use_combined_calls() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    ctx.set_blend(BlendState::ADDITIVE).unwrap();

    assert_eq!(count(&ctx, |c| matches!(c, Call::BlendFunc(..))), 1);
    assert_eq!(count(&ctx, |c| matches!(c, Call::BlendFuncSeparate(..))), 0);
    assert_eq!(count(&ctx, |c| matches!(c, Call::BlendEquation(_))), 1);
}

#[test]
fn test_split_factors_and_equations_use_separate_calls() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let blend = BlendState::separate(
        true,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::One,
        BlendFactor::Zero,
    )
    .with_equations(BlendEquation::Add, BlendEquation::Max);

    ctx.set_blend(blend).unwrap();

    assert_eq!(
        ctx.backend().calls,
        vec![
            Call::SetEnabled(Capability::Blend, true),
            Call::BlendFuncSeparate(
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
                BlendFactor::One,
                BlendFactor::Zero,
            ),
            Call::BlendEquationSeparate(BlendEquation::Add, BlendEquation::Max),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Capability checks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_polygon_mode_is_unsupported_on_webgl() {
    let mut ctx = context(GraphicsBackendType::WebGL2);

    for mode in [PolygonMode::Line, PolygonMode::Fill] {
        let err = ctx.set_polygon_mode(PolygonModeState(mode)).unwrap_err();
        assert_eq!(
            err,
            RenderError::Unsupported {
                operation: "glPolygonMode",
                backend: GraphicsBackendType::WebGL2,
            }
        );
    }
    assert!(ctx.backend().calls.is_empty(), "no primitive may be emitted");
    assert_eq!(ctx.counters().state_changes(), 0);
}

#[test]
fn test_polygon_mode_works_on_desktop() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    assert!(ctx.set_polygon_mode(PolygonModeState(PolygonMode::Line)).unwrap());
    assert_eq!(
        ctx.backend().calls,
        vec![Call::PolygonMode(PolygonMode::Line)]
    );
}

#[test]
fn test_min_max_blend_requires_capability() {
    let blend = BlendState::ADDITIVE.with_equation(BlendEquation::Max);

    let mut webgl = context(GraphicsBackendType::WebGL);
    let err = webgl.set_blend(blend).unwrap_err();
    assert!(matches!(err, RenderError::Unsupported { .. }));
    assert!(webgl.backend().calls.is_empty());
    assert_eq!(webgl.state().current().blend, BlendState::NONE);

    let mut webgl2 = context(GraphicsBackendType::WebGL2);
    assert!(webgl2.set_blend(blend).unwrap());
}

#[test]
fn test_illegal_raw_value_is_rejected() {
    let err = BlendFactor::try_from(999).unwrap_err();
    assert_eq!(
        err,
        RenderError::IllegalValue {
            type_name: "BlendFactor",
            value: 999,
        }
    );
    assert_eq!(
        CompareFunction::try_from(CompareFunction::Greater.index() as u32).unwrap(),
        CompareFunction::Greater
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Reset, invalidation and failures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reset_emits_everything_without_counting() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    ctx.set_depth(DepthState::LESS).unwrap();
    ctx.pre_draw();
    ctx.backend_mut().calls.clear();

    ctx.reset_state().unwrap();

    let calls = &ctx.backend().calls;
    assert!(calls.contains(&Call::SetEnabled(Capability::DepthTest, false)));
    assert!(calls.contains(&Call::PolygonMode(PolygonMode::Fill)));
    assert!(calls.contains(&Call::Viewport(ctx.window_rect())));
    assert!(calls.contains(&Call::DepthRange(DepthRange::default())));
    assert_eq!(ctx.counters().state_changes(), 0, "a reset is not a frame change");
    assert_eq!(ctx.state().current(), &PipelineState::default());
}

#[test]
fn test_reset_skips_polygon_mode_without_support() {
    let ctx = context(GraphicsBackendType::WebGL2);

    assert!(!ctx.state().is_applied(StateCategory::PolygonMode));
    assert!(ctx.state().is_applied(StateCategory::Blend));
}

#[test]
fn test_invalidate_forces_reemission() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    ctx.invalidate();

    assert!(ctx.set_depth(DepthState::NONE).unwrap(), "unknown state must be emitted");
    assert!(!ctx.set_depth(DepthState::NONE).unwrap());
}

#[test]
fn test_failed_primitive_leaves_category_unknown() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    ctx.backend_mut().failing = true;
    assert!(ctx.set_depth(DepthState::LESS).is_err());
    assert!(!ctx.state().is_applied(StateCategory::Depth));
    assert_eq!(ctx.counters().state_changes(), 0, "failures are not counted");

    ctx.backend_mut().failing = false;
    assert!(
        ctx.set_depth(DepthState::NONE).unwrap(),
        "the baseline value must be re-emitted after a failure"
    );
}

#[test]
fn test_depth_range_is_clamped_before_comparison() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    assert!(!ctx.set_depth_range(DepthRange { near: -1.0, far: 4.0 }).unwrap());
    assert!(ctx.set_depth_range(DepthRange::new(0.25, 0.75)).unwrap());
    assert_eq!(
        ctx.backend().calls,
        vec![Call::DepthRange(DepthRange::new(0.25, 0.75))]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewport and clears
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_resize_follows_default_framebuffer() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    ctx.bind_framebuffer(FramebufferTarget::Both, None).unwrap();
    ctx.backend_mut().calls.clear();

    ctx.resize(800, 600).unwrap();

    let rect = RectI::new(0, 0, 800, 600);
    assert_eq!(ctx.state().viewport(), rect);
    assert_eq!(ctx.state().scissor().rect, rect);
    assert!(ctx.backend().calls.contains(&Call::Viewport(rect)));
}

#[test]
fn test_clear_color_sets_value_once() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    ctx.clear_color(Color::CORNFLOWER_BLUE).unwrap();
    ctx.clear_color(Color::CORNFLOWER_BLUE).unwrap();

    let both = ClearFlags::COLOR | ClearFlags::DEPTH;
    assert_eq!(
        ctx.backend().calls,
        vec![
            Call::ClearColor(Color::CORNFLOWER_BLUE),
            Call::Clear(both),
            Call::Clear(both),
        ]
    );
}

#[test]
fn test_draws_are_counted_and_offsets_scaled() {
    let mut ctx = context(GraphicsBackendType::OpenGL);

    ctx.draw(PrimitiveTopology::TriangleList, 0, 3).unwrap();
    ctx.draw_indexed(PrimitiveTopology::TriangleList, 6, 6, IndexFormat::Uint16)
        .unwrap();

    assert_eq!(ctx.counters().draw_calls(), 2);
    assert_eq!(
        ctx.backend().calls[1],
        Call::DrawElements(PrimitiveTopology::TriangleList, 6, IndexFormat::Uint16, 12)
    );
}

#[test]
fn test_baseline_from_config_is_applied() {
    let mut config = RendererConfig::default();
    config.baseline.depth = DepthState::LESS_EQUAL;
    let backend = RecordingBackend::new(GraphicsBackendType::OpenGL);

    let mut ctx = RenderContext::new(backend, config).unwrap();

    assert!(ctx
        .backend()
        .calls
        .contains(&Call::DepthFunc(CompareFunction::LessEqual)));
    ctx.backend_mut().calls.clear();
    assert!(!ctx.set_depth(DepthState::LESS_EQUAL).unwrap());
}
