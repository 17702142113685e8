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

//! The binding cache: which object occupies which binding slot.

use crate::renderer::api::*;
use crate::renderer::error::{RenderResult, ResourceError};
use crate::renderer::hooks::{ChangeEvent, ChangeSink};
use crate::renderer::traits::GraphicsBackend;
use std::collections::{HashMap, HashSet};

/// Slot of the framebuffer table that tracks the read target.
pub const READ_FRAMEBUFFER_SLOT: usize = 0;
/// Slot of the framebuffer table that tracks the draw target.
pub const DRAW_FRAMEBUFFER_SLOT: usize = 1;

/// Tracks the object bound to every binding slot and elides redundant binds.
///
/// One slot table is kept per [`ResourceKind`], sized once from the backend's
/// capabilities. The cache also keeps the set of live handles per kind: binding a handle
/// that was never registered, or that was released, is a programmer error. Releasing a
/// handle clears every slot that still references it, so a driver recycling the same name
/// for a new object can never be mistaken for "already bound".
///
/// Two pieces of driver state are not plain slots and are tracked on the side:
///
/// - The index buffer binding belongs to the bound vertex array. The cache remembers it per
///   vertex array (key `None` is the default one) and swaps it into the index slot whenever
///   a vertex array bind reaches the backend.
/// - The active texture unit, which texture uploads and parameter writes apply to. Texture
///   binds leave their unit active; [`select_texture_unit`](Self::select_texture_unit)
///   re-selects a unit when a bind was elided.
#[derive(Debug, Clone)]
pub struct BindingCache {
    slots: [Vec<SlotState>; ResourceKind::COUNT],
    live: [HashSet<ResourceHandle>; ResourceKind::COUNT],
    index_buffers: HashMap<Option<ResourceHandle>, SlotState>,
    active_unit: Option<usize>,
}

impl BindingCache {
    /// Creates a cache whose slots are all [`SlotState::Unknown`].
    pub fn new(capabilities: &BackendCapabilities) -> Self {
        Self {
            slots: std::array::from_fn(|i| {
                vec![SlotState::Unknown; capabilities.slot_capacity(ResourceKind::ALL[i])]
            }),
            live: std::array::from_fn(|_| HashSet::new()),
            index_buffers: HashMap::new(),
            active_unit: None,
        }
    }

    /// The number of slots kept for `kind`.
    pub fn capacity(&self, kind: ResourceKind) -> usize {
        self.slots[kind.index()].len()
    }

    /// What the cache knows about slot `slot` of `kind`, or `None` if out of range.
    pub fn current(&self, kind: ResourceKind, slot: usize) -> Option<SlotState> {
        self.slots[kind.index()].get(slot).copied()
    }

    /// The texture unit the cache knows to be active, if any.
    pub fn active_texture_unit(&self) -> Option<usize> {
        self.active_unit
    }

    /// The index buffer binding remembered for `vertex_array` (`None` for the default one).
    pub fn index_buffer_of(&self, vertex_array: Option<ResourceHandle>) -> SlotState {
        self.index_buffers
            .get(&vertex_array)
            .copied()
            .unwrap_or(SlotState::Unknown)
    }

    /// Iterates over the slots of `kind`.
    pub fn slots(&self, kind: ResourceKind) -> impl Iterator<Item = BindingSlot> + '_ {
        self.slots[kind.index()]
            .iter()
            .enumerate()
            .map(|(index, state)| BindingSlot {
                index,
                state: *state,
            })
    }

    /// Records a freshly created object as live.
    pub fn register(&mut self, kind: ResourceKind, handle: ResourceHandle) {
        self.live[kind.index()].insert(handle);
    }

    /// Returns `true` if `handle` is a live object of `kind`.
    pub fn is_live(&self, kind: ResourceKind, handle: ResourceHandle) -> bool {
        self.live[kind.index()].contains(&handle)
    }

    /// Forgets a destroyed object and clears every slot still holding it.
    ///
    /// Deleting a bound object reverts its slot to the default object, so the slot becomes
    /// `Unbound`. Programs are the exception: a deleted program stays in use until another
    /// one is made current, so its slot becomes `Unknown`.
    ///
    /// Returns the number of slots that were cleared.
    pub fn release(&mut self, kind: ResourceKind, handle: ResourceHandle) -> usize {
        self.live[kind.index()].remove(&handle);
        let after = match kind {
            ResourceKind::Shader => SlotState::Unknown,
            _ => SlotState::Unbound,
        };
        let mut cleared = 0;
        for slot in self.slots[kind.index()].iter_mut() {
            if slot.holds(handle) {
                *slot = after;
                cleared += 1;
            }
        }
        match kind {
            ResourceKind::Buffer => {
                // Other vertex arrays keep the dead name attached; it may be recycled.
                for binding in self.index_buffers.values_mut() {
                    if binding.holds(handle) {
                        *binding = SlotState::Unknown;
                    }
                }
                self.remember_index_binding();
            }
            ResourceKind::VertexArray => {
                self.index_buffers.remove(&Some(handle));
                if cleared > 0 {
                    self.slots[ResourceKind::Buffer.index()][BufferTarget::Index.index()] =
                        self.index_buffer_of(None);
                }
            }
            _ => {}
        }
        if cleared > 0 {
            log::trace!("Released {kind} {handle}, cleared {cleared} slot(s)");
        }
        cleared
    }

    /// Forgets every slot of `kind`.
    pub fn invalidate(&mut self, kind: ResourceKind) {
        self.slots[kind.index()].fill(SlotState::Unknown);
        match kind {
            ResourceKind::Texture => self.active_unit = None,
            ResourceKind::VertexArray | ResourceKind::Buffer => self.index_buffers.clear(),
            _ => {}
        }
    }

    /// Forgets every slot, so the next bind of each reaches the backend.
    ///
    /// Used after context loss or after foreign code touched the driver state.
    pub fn invalidate_all(&mut self) {
        for kind in ResourceKind::ALL {
            self.invalidate(kind);
        }
    }

    /// Binds `handle` to `slot` of `kind`.
    ///
    /// `target` must match the kind: a texture target for textures, a buffer target for
    /// buffers (whose slot is the target's index), [`BindTarget::None`] otherwise. For
    /// framebuffers slot 0 is the read target and slot 1 the draw target.
    ///
    /// ## Returns
    /// `Ok(true)` if the backend was called, `Ok(false)` if the bind was elided.
    /// ## Errors
    /// * `ResourceError::SlotOutOfRange` if `slot` exceeds the kind's capacity.
    /// * `ResourceError::DestroyedHandle` if `handle` is not a live object of `kind`.
    /// * `ResourceError::InvalidTarget` if `target` does not belong to `kind`.
    pub fn bind(
        &mut self,
        kind: ResourceKind,
        slot: usize,
        handle: Option<ResourceHandle>,
        target: BindTarget,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        self.check_slot(kind, slot)?;
        match (kind, target) {
            (ResourceKind::Texture, BindTarget::Texture(texture_target)) => {
                self.bind_texture(slot, texture_target, handle, backend, sink)
            }
            (ResourceKind::Shader, BindTarget::None) => self.use_program(handle, backend, sink),
            (ResourceKind::Framebuffer, BindTarget::None) => {
                let fb_target = if slot == READ_FRAMEBUFFER_SLOT {
                    FramebufferTarget::Read
                } else {
                    FramebufferTarget::Draw
                };
                self.bind_framebuffer(fb_target, handle, backend, sink)
            }
            (ResourceKind::VertexArray, BindTarget::None) => {
                self.bind_vertex_array(handle, backend, sink)
            }
            (ResourceKind::Buffer, BindTarget::Buffer(buffer_target))
                if buffer_target.index() == slot =>
            {
                self.bind_buffer(buffer_target, handle, backend, sink)
            }
            _ => Err(ResourceError::InvalidTarget { kind, target }.into()),
        }
    }

    /// Binds a texture to texture unit `unit`.
    pub fn bind_texture(
        &mut self,
        unit: usize,
        target: TextureTarget,
        texture: Option<ResourceHandle>,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let desired = self.validate(ResourceKind::Texture, unit, texture, BindTarget::Texture(target))?;
        let result = self.swap(ResourceKind::Texture, unit, desired, sink, || {
            backend.bind_texture(unit, target, texture)
        });
        match result {
            Ok(true) => self.active_unit = Some(unit),
            Ok(false) => {}
            Err(_) => self.active_unit = None,
        }
        result
    }

    /// Makes `unit` the active texture unit unless it already is.
    ///
    /// Not a bind: it is neither counted nor reported to hooks.
    ///
    /// ## Returns
    /// `Ok(true)` if the backend was called.
    /// ## Errors
    /// * `ResourceError::SlotOutOfRange` if `unit` exceeds the number of texture units.
    pub fn select_texture_unit(
        &mut self,
        unit: usize,
        backend: &mut dyn GraphicsBackend,
    ) -> RenderResult<bool> {
        self.check_slot(ResourceKind::Texture, unit)?;
        if self.active_unit == Some(unit) {
            return Ok(false);
        }
        self.active_unit = None;
        backend.active_texture(unit)?;
        self.active_unit = Some(unit);
        log::trace!("Selected texture unit {unit}");
        Ok(true)
    }

    /// Makes a program current.
    pub fn use_program(
        &mut self,
        program: Option<ResourceHandle>,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let desired = self.validate(ResourceKind::Shader, 0, program, BindTarget::None)?;
        self.swap(ResourceKind::Shader, 0, desired, sink, || backend.use_program(program))
    }

    /// Binds a framebuffer to `target`. `None` selects the default framebuffer.
    ///
    /// Binding to [`FramebufferTarget::Both`] emits a single combined bind when both slots
    /// are stale, a bind to the one stale target otherwise. Either way it counts as one swap.
    pub fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<ResourceHandle>,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let kind = ResourceKind::Framebuffer;
        let desired = self.validate(kind, READ_FRAMEBUFFER_SLOT, framebuffer, BindTarget::None)?;
        let table = &self.slots[kind.index()];
        let read_stale = matches!(target, FramebufferTarget::Read | FramebufferTarget::Both)
            && table[READ_FRAMEBUFFER_SLOT] != desired;
        let draw_stale = matches!(target, FramebufferTarget::Draw | FramebufferTarget::Both)
            && table[DRAW_FRAMEBUFFER_SLOT] != desired;

        let emitted = match (read_stale, draw_stale) {
            (false, false) => return Ok(false),
            (true, true) => FramebufferTarget::Both,
            (true, false) => FramebufferTarget::Read,
            (false, true) => FramebufferTarget::Draw,
        };
        let touched: &[usize] = match emitted {
            FramebufferTarget::Read => &[READ_FRAMEBUFFER_SLOT],
            FramebufferTarget::Draw => &[DRAW_FRAMEBUFFER_SLOT],
            FramebufferTarget::Both => &[READ_FRAMEBUFFER_SLOT, DRAW_FRAMEBUFFER_SLOT],
        };

        for &slot in touched {
            self.slots[kind.index()][slot] = SlotState::Unknown;
        }
        sink.emit(ChangeEvent::Bind(kind), || {
            backend.bind_framebuffer(emitted, framebuffer)
        })?;
        for &slot in touched {
            self.slots[kind.index()][slot] = desired;
        }
        Ok(true)
    }

    /// Binds a vertex array object.
    pub fn bind_vertex_array(
        &mut self,
        vertex_array: Option<ResourceHandle>,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let kind = ResourceKind::VertexArray;
        let desired = self.validate(kind, 0, vertex_array, BindTarget::None)?;
        let result = self.swap(kind, 0, desired, sink, || backend.bind_vertex_array(vertex_array));
        let index = match result {
            Ok(false) => return result,
            Ok(true) => self.index_buffer_of(vertex_array),
            Err(_) => SlotState::Unknown,
        };
        self.slots[ResourceKind::Buffer.index()][BufferTarget::Index.index()] = index;
        result
    }

    /// Binds a buffer object to `target`.
    pub fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<ResourceHandle>,
        backend: &mut dyn GraphicsBackend,
        sink: &mut ChangeSink<'_>,
    ) -> RenderResult<bool> {
        let kind = ResourceKind::Buffer;
        let desired = self.validate(kind, target.index(), buffer, BindTarget::Buffer(target))?;
        let result = self.swap(kind, target.index(), desired, sink, || {
            backend.bind_buffer(target, buffer)
        });
        if target == BufferTarget::Index {
            self.remember_index_binding();
        }
        result
    }

    /// Stores the index slot as the binding of the current vertex array, if that is known.
    fn remember_index_binding(&mut self) {
        let vertex_array = match self.slots[ResourceKind::VertexArray.index()][0] {
            SlotState::Unknown => return,
            SlotState::Unbound => None,
            SlotState::Bound { handle, .. } => Some(handle),
        };
        let index = self.slots[ResourceKind::Buffer.index()][BufferTarget::Index.index()];
        if index == SlotState::Unknown {
            self.index_buffers.remove(&vertex_array);
        } else {
            self.index_buffers.insert(vertex_array, index);
        }
    }

    fn check_slot(&self, kind: ResourceKind, slot: usize) -> RenderResult<()> {
        let capacity = self.capacity(kind);
        if slot >= capacity {
            return Err(ResourceError::SlotOutOfRange {
                kind,
                slot,
                capacity,
            }
            .into());
        }
        Ok(())
    }

    /// Checks the slot and the handle, and returns the state the bind would produce.
    fn validate(
        &self,
        kind: ResourceKind,
        slot: usize,
        handle: Option<ResourceHandle>,
        target: BindTarget,
    ) -> RenderResult<SlotState> {
        self.check_slot(kind, slot)?;
        if let Some(handle) = handle {
            if !self.is_live(kind, handle) {
                return Err(ResourceError::DestroyedHandle { kind, handle }.into());
            }
        }
        Ok(SlotState::from_binding(handle, target))
    }

    /// Runs `primitive` unless the slot already holds `desired`.
    ///
    /// While the primitive runs the slot is `Unknown`, so a failing backend leaves it unknown
    /// rather than stale.
    fn swap<F>(
        &mut self,
        kind: ResourceKind,
        slot: usize,
        desired: SlotState,
        sink: &mut ChangeSink<'_>,
        primitive: F,
    ) -> RenderResult<bool>
    where
        F: FnOnce() -> RenderResult<()>,
    {
        let entry = &mut self.slots[kind.index()][slot];
        if *entry == desired {
            return Ok(false);
        }
        *entry = SlotState::Unknown;
        sink.emit(ChangeEvent::Bind(kind), primitive)?;
        self.slots[kind.index()][slot] = desired;
        Ok(true)
    }
}
