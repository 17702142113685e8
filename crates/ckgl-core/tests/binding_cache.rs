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

//! Integration tests for the binding cache.
//!
//! These drive [`BindingCache`] directly over a recording backend, then through the
//! resource wrappers, and check which binds reach the driver and how they are counted.

mod common;

use ckgl_core::renderer::cache::{DRAW_FRAMEBUFFER_SLOT, READ_FRAMEBUFFER_SLOT};
use ckgl_core::renderer::resources::{Buffer, Framebuffer, Texture, TextureSampler, VertexArray};
use ckgl_core::renderer::*;
use common::{context, handle, Call, RecordingBackend};

/// Helper: a cache, its counters and hooks, and the backend it drives.
struct Harness {
    cache: BindingCache,
    counters: ChangeCounters,
    hooks: RenderHooks,
    backend: RecordingBackend,
}

impl Harness {
    fn new() -> Self {
        let backend = RecordingBackend::new(GraphicsBackendType::OpenGL);
        Self {
            cache: BindingCache::new(&backend.capabilities()),
            counters: ChangeCounters::new(),
            hooks: RenderHooks::new(),
            backend,
        }
    }

    /// Helper: registers raw names as live textures.
    fn with_textures(mut self, names: &[u32]) -> Self {
        for &name in names {
            self.cache.register(ResourceKind::Texture, handle(name));
        }
        self
    }

    fn bind_texture(&mut self, unit: usize, name: u32) -> RenderResult<bool> {
        let mut sink = ChangeSink::new(&mut self.counters, &mut self.hooks);
        self.cache.bind_texture(
            unit,
            TextureTarget::Texture2D,
            Some(handle(name)),
            &mut self.backend,
            &mut sink,
        )
    }

    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        name: Option<u32>,
    ) -> RenderResult<bool> {
        let mut sink = ChangeSink::new(&mut self.counters, &mut self.hooks);
        self.cache.bind_framebuffer(
            target,
            name.map(handle),
            &mut self.backend,
            &mut sink,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Elision
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_binding_same_texture_twice_reaches_backend_once() {
    let mut h = Harness::new().with_textures(&[7]);

    assert!(h.bind_texture(0, 7).unwrap(), "first bind must reach the backend");
    assert!(!h.bind_texture(0, 7).unwrap(), "second bind must be elided");

    assert_eq!(h.backend.bind_calls(), 1);
    assert_eq!(h.counters.swaps(), 1);
    assert_eq!(h.counters.swaps_of(ResourceKind::Texture), 1);
}

#[test]
fn test_alternating_binds_are_all_emitted() {
    let mut h = Harness::new().with_textures(&[1, 2]);

    h.bind_texture(0, 1).unwrap();
    h.bind_texture(0, 2).unwrap();
    h.bind_texture(0, 1).unwrap();

    assert_eq!(
        h.backend.calls,
        vec![
            Call::BindTexture(0, TextureTarget::Texture2D, Some(1)),
            Call::BindTexture(0, TextureTarget::Texture2D, Some(2)),
            Call::BindTexture(0, TextureTarget::Texture2D, Some(1)),
        ]
    );
    assert_eq!(h.counters.swaps(), 3);
}

#[test]
fn test_slots_are_independent_per_unit() {
    let mut h = Harness::new().with_textures(&[5]);

    assert!(h.bind_texture(0, 5).unwrap());
    assert!(h.bind_texture(1, 5).unwrap(), "unit 1 has its own slot");
    assert!(!h.bind_texture(1, 5).unwrap());

    assert_eq!(h.counters.swaps(), 2);
}

#[test]
fn test_unknown_slot_forces_first_bind_even_for_default() {
    let mut h = Harness::new();

    assert!(
        h.bind_framebuffer(FramebufferTarget::Draw, None).unwrap(),
        "an unknown slot must not be assumed to hold the default object"
    );
    assert!(!h.bind_framebuffer(FramebufferTarget::Draw, None).unwrap());
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_slot_out_of_range_is_rejected_without_side_effects() {
    let mut h = Harness::new().with_textures(&[1]);
    let capacity = h.cache.capacity(ResourceKind::Texture);

    let err = h.bind_texture(capacity, 1).unwrap_err();

    assert_eq!(
        err,
        RenderError::Resource(ResourceError::SlotOutOfRange {
            kind: ResourceKind::Texture,
            slot: capacity,
            capacity,
        })
    );
    assert!(h.backend.calls.is_empty(), "nothing may reach the backend");
    assert_eq!(h.counters.swaps(), 0);
}

#[test]
fn test_unregistered_handle_is_rejected() {
    let mut h = Harness::new();

    let err = h.bind_texture(0, 3).unwrap_err();

    assert!(matches!(
        err,
        RenderError::Resource(ResourceError::DestroyedHandle {
            kind: ResourceKind::Texture,
            ..
        })
    ));
    assert!(h.backend.calls.is_empty());
}

#[test]
fn test_generic_bind_rejects_mismatched_target() {
    let mut h = Harness::new().with_textures(&[1]);
    let mut sink = ChangeSink::new(&mut h.counters, &mut h.hooks);

    let err = h
        .cache
        .bind(
            ResourceKind::Texture,
            0,
            Some(handle(1)),
            BindTarget::Buffer(BufferTarget::Vertex),
            &mut h.backend,
            &mut sink,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        RenderError::Resource(ResourceError::InvalidTarget { .. })
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle lifetime
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_recycled_name_is_bound_after_destroy() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let sampler = TextureSampler::default();

    let first = Texture::new_2d(&mut ctx, 4, 4, TextureFormat::Rgba8, None, sampler).unwrap();
    first.bind(&mut ctx, 3).unwrap();
    let name = first.handle();
    first.destroy(&mut ctx).unwrap();
    assert_eq!(
        ctx.bindings().current(ResourceKind::Texture, 3),
        Some(SlotState::Unbound),
        "destroying a bound texture must clear its slot"
    );

    let second = Texture::new_2d(&mut ctx, 4, 4, TextureFormat::Rgba8, None, sampler).unwrap();
    assert_eq!(second.handle(), name, "the backend recycles deleted names");
    ctx.backend_mut().calls.clear();

    assert!(
        second.bind(&mut ctx, 3).unwrap(),
        "a recycled name must not be mistaken for the destroyed object"
    );
    assert_eq!(
        ctx.backend().calls,
        vec![Call::BindTexture(3, TextureTarget::Texture2D, Some(name.get()))]
    );
    second.destroy(&mut ctx).unwrap();
}

#[test]
fn test_binding_destroyed_handle_fails() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let texture =
        Texture::new_2d(&mut ctx, 2, 2, TextureFormat::R8, None, TextureSampler::default())
            .unwrap();
    let name = texture.handle();
    texture.destroy(&mut ctx).unwrap();

    let err = ctx
        .bind_texture(0, TextureTarget::Texture2D, Some(name))
        .unwrap_err();

    assert_eq!(
        err,
        RenderError::Resource(ResourceError::DestroyedHandle {
            kind: ResourceKind::Texture,
            handle: name,
        })
    );
}

#[test]
fn test_invalidate_forgets_every_slot() {
    let mut h = Harness::new().with_textures(&[1]);
    h.bind_texture(0, 1).unwrap();

    h.cache.invalidate_all();

    assert_eq!(
        h.cache.current(ResourceKind::Texture, 0),
        Some(SlotState::Unknown)
    );
    assert!(h.bind_texture(0, 1).unwrap(), "an invalidated slot must rebind");
}

// ─────────────────────────────────────────────────────────────────────────────
// Framebuffer targets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_framebuffer_both_collapses_into_one_bind() {
    let mut h = Harness::new();
    h.cache.register(ResourceKind::Framebuffer, handle(4));

    h.bind_framebuffer(FramebufferTarget::Both, Some(4)).unwrap();

    assert_eq!(
        h.backend.calls,
        vec![Call::BindFramebuffer(FramebufferTarget::Both, Some(4))]
    );
    assert_eq!(h.counters.swaps_of(ResourceKind::Framebuffer), 1);
    for slot in [READ_FRAMEBUFFER_SLOT, DRAW_FRAMEBUFFER_SLOT] {
        assert!(h
            .cache
            .current(ResourceKind::Framebuffer, slot)
            .is_some_and(|s| s.holds(handle(4))));
    }
}

#[test]
fn test_framebuffer_both_only_touches_stale_target() {
    let mut h = Harness::new();
    h.cache.register(ResourceKind::Framebuffer, handle(4));
    h.bind_framebuffer(FramebufferTarget::Read, Some(4)).unwrap();
    h.backend.calls.clear();

    h.bind_framebuffer(FramebufferTarget::Both, Some(4)).unwrap();

    assert_eq!(
        h.backend.calls,
        vec![Call::BindFramebuffer(FramebufferTarget::Draw, Some(4))]
    );
    assert!(!h.bind_framebuffer(FramebufferTarget::Both, Some(4)).unwrap());
}

#[test]
fn test_framebuffer_creation_restores_previous_binding() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    Framebuffer::bind_default(&mut ctx).unwrap();

    let fbo = Framebuffer::new(&mut ctx, 64, 32, 1, TextureFormat::Rgba8, None).unwrap();

    assert_eq!(
        ctx.bindings()
            .current(ResourceKind::Framebuffer, DRAW_FRAMEBUFFER_SLOT),
        Some(SlotState::Unbound)
    );
    assert!(!fbo.is_bound(&ctx));
    fbo.destroy(&mut ctx).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Index buffers follow the vertex array
// ─────────────────────────────────────────────────────────────────────────────

/// Helper: counts the index buffer binds that reached the driver.
fn index_binds(ctx: &RenderContext<RecordingBackend>) -> usize {
    ctx.backend()
        .count(|c| matches!(c, Call::BindBuffer(BufferTarget::Index, Some(_))))
}

#[test]
fn test_index_buffer_rebinds_after_vertex_array_switch() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let a = VertexArray::new(&mut ctx).unwrap();
    let b = VertexArray::new(&mut ctx).unwrap();
    let indices = Buffer::new(&mut ctx, BufferTarget::Index, BufferUsage::Static).unwrap();

    a.bind(&mut ctx).unwrap();
    assert!(indices.bind(&mut ctx).unwrap());
    b.bind(&mut ctx).unwrap();
    assert!(
        indices.bind(&mut ctx).unwrap(),
        "the second vertex array has no index buffer attached yet"
    );
    assert_eq!(index_binds(&ctx), 2);

    a.bind(&mut ctx).unwrap();
    assert!(
        !indices.bind(&mut ctx).unwrap(),
        "the first vertex array still holds the index buffer"
    );
    assert_eq!(index_binds(&ctx), 2);

    indices.destroy(&mut ctx).unwrap();
    a.destroy(&mut ctx).unwrap();
    b.destroy(&mut ctx).unwrap();
}

#[test]
fn test_elided_index_binds_match_what_the_driver_reads() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let a = VertexArray::new(&mut ctx).unwrap();
    let b = VertexArray::new(&mut ctx).unwrap();
    let first = Buffer::new(&mut ctx, BufferTarget::Index, BufferUsage::Static).unwrap();
    let second = Buffer::new(&mut ctx, BufferTarget::Index, BufferUsage::Static).unwrap();

    for (vao, indices) in [(&a, &first), (&b, &second), (&a, &first), (&b, &second)] {
        vao.bind(&mut ctx).unwrap();
        indices.bind(&mut ctx).unwrap();
        ctx.draw_indexed(PrimitiveTopology::TriangleList, 0, 3, IndexFormat::Uint16)
            .unwrap();
    }

    let (first_name, second_name) = (first.handle().get(), second.handle().get());
    assert_eq!(
        ctx.backend().driver.index_reads,
        vec![
            Some(first_name),
            Some(second_name),
            Some(first_name),
            Some(second_name)
        ]
    );
    assert_eq!(index_binds(&ctx), 2, "later index binds are carried by the vertex arrays");

    first.destroy(&mut ctx).unwrap();
    second.destroy(&mut ctx).unwrap();
    a.destroy(&mut ctx).unwrap();
    b.destroy(&mut ctx).unwrap();
}

#[test]
fn test_destroyed_index_buffer_is_forgotten_by_every_vertex_array() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let a = VertexArray::new(&mut ctx).unwrap();
    let b = VertexArray::new(&mut ctx).unwrap();
    let indices = Buffer::new(&mut ctx, BufferTarget::Index, BufferUsage::Static).unwrap();
    a.bind(&mut ctx).unwrap();
    indices.bind(&mut ctx).unwrap();
    b.bind(&mut ctx).unwrap();
    let name = indices.handle();
    indices.destroy(&mut ctx).unwrap();

    let recycled = Buffer::new(&mut ctx, BufferTarget::Index, BufferUsage::Static).unwrap();
    assert_eq!(recycled.handle(), name, "the backend recycles deleted names");
    a.bind(&mut ctx).unwrap();

    assert_eq!(
        ctx.bindings().current(ResourceKind::Buffer, BufferTarget::Index.index()),
        Some(SlotState::Unknown)
    );
    assert!(recycled.bind(&mut ctx).unwrap());

    recycled.destroy(&mut ctx).unwrap();
    a.destroy(&mut ctx).unwrap();
    b.destroy(&mut ctx).unwrap();
}

#[test]
fn test_destroying_bound_vertex_array_falls_back_to_default_index_binding() {
    let mut ctx = context(GraphicsBackendType::OpenGL);
    let indices = Buffer::new(&mut ctx, BufferTarget::Index, BufferUsage::Static).unwrap();
    VertexArray::unbind(&mut ctx).unwrap();
    indices.bind(&mut ctx).unwrap();

    let vao = VertexArray::new(&mut ctx).unwrap();
    vao.bind(&mut ctx).unwrap();
    assert_eq!(
        ctx.bindings().current(ResourceKind::Buffer, BufferTarget::Index.index()),
        Some(SlotState::Unknown),
        "a fresh vertex array has no known index binding"
    );
    vao.destroy(&mut ctx).unwrap();

    assert_eq!(
        ctx.bindings().current(ResourceKind::VertexArray, 0),
        Some(SlotState::Unbound)
    );
    assert!(
        !indices.bind(&mut ctx).unwrap(),
        "the default vertex array kept its index buffer"
    );
    indices.destroy(&mut ctx).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Counters across frames
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_counters_reset_each_frame_but_cache_persists() {
    let mut h = Harness::new().with_textures(&[5, 9]);

    h.bind_texture(0, 5).unwrap();
    h.bind_texture(0, 5).unwrap();
    h.bind_texture(1, 9).unwrap();
    assert_eq!(h.counters.swaps(), 2, "frame 1 has two effective binds");
    assert_eq!(h.backend.bind_calls(), 2);

    h.counters.pre_draw();
    assert_eq!(h.counters.swaps(), 0, "pre_draw zeroes every counter");

    assert!(!h.bind_texture(0, 5).unwrap(), "the cache survives the frame boundary");
    assert_eq!(h.counters.swaps(), 0);
    assert_eq!(h.backend.bind_calls(), 2);
}

#[test]
fn test_swaps_equal_emitted_binds_over_mixed_sequence() {
    let mut h = Harness::new().with_textures(&[1, 2, 3]);
    let sequence = [(0, 1), (0, 1), (1, 2), (0, 3), (1, 2), (0, 1), (2, 3), (2, 3)];

    for (unit, name) in sequence {
        h.bind_texture(unit, name).unwrap();
    }

    assert_eq!(h.counters.swaps() as usize, h.backend.bind_calls());
    assert_eq!(h.counters.swaps(), 5);
}

#[test]
fn test_hooks_observe_each_emitted_bind() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut h = Harness::new().with_textures(&[1]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink_log = Rc::clone(&seen);
    h.hooks.on_changed(move |event| sink_log.borrow_mut().push(event));

    h.bind_texture(0, 1).unwrap();
    h.bind_texture(0, 1).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![ChangeEvent::Bind(ResourceKind::Texture)],
        "elided binds must not fire hooks"
    );
}
