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

//! Opaque resource handles and the binding-slot vocabulary of the cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// An opaque driver name for a GPU-side object.
///
/// Zero is never a valid handle: "no object" is expressed as `Option::<ResourceHandle>::None`,
/// so a default framebuffer or an unbound program can never be confused with a live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceHandle(NonZeroU32);

impl ResourceHandle {
    /// Wraps a raw driver name, returning `None` for zero.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Wraps an already non-zero driver name.
    pub const fn from_non_zero(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    /// The raw driver name.
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The raw driver name as a `NonZeroU32`.
    pub const fn non_zero(self) -> NonZeroU32 {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kinds of GPU objects whose bindings are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Textures, bound per texture unit.
    Texture,
    /// Linked shader programs.
    Shader,
    /// Framebuffer objects, bound per read/draw target.
    Framebuffer,
    /// Vertex array objects.
    VertexArray,
    /// Vertex and index buffers.
    Buffer,
}

impl ResourceKind {
    /// All resource kinds.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Texture,
        ResourceKind::Shader,
        ResourceKind::Framebuffer,
        ResourceKind::VertexArray,
        ResourceKind::Buffer,
    ];

    /// The number of resource kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// The position of this kind in [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifies the bind point within a slot for kinds that have more than one.
///
/// Two binds of the same handle to the same slot only elide when the target matches too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindTarget {
    /// The kind has a single bind point per slot.
    None,
    /// A texture target.
    Texture(super::enums::TextureTarget),
    /// A buffer target.
    Buffer(super::enums::BufferTarget),
}

/// What the cache knows about a binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotState {
    /// Nothing is known; the next bind always reaches the backend.
    #[default]
    Unknown,
    /// The slot holds no object (or the default object for the kind).
    Unbound,
    /// The slot holds `handle` on `target`.
    Bound {
        /// The bound object.
        handle: ResourceHandle,
        /// The bind point it occupies.
        target: BindTarget,
    },
}

impl SlotState {
    /// The state a bind of `handle` on `target` produces.
    pub fn from_binding(handle: Option<ResourceHandle>, target: BindTarget) -> Self {
        match handle {
            Some(handle) => SlotState::Bound { handle, target },
            None => SlotState::Unbound,
        }
    }

    /// The bound handle, if the slot is known to hold one.
    pub fn handle(&self) -> Option<ResourceHandle> {
        match self {
            SlotState::Bound { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    /// Returns `true` if the slot is known to hold `handle`.
    pub fn holds(&self, handle: ResourceHandle) -> bool {
        self.handle() == Some(handle)
    }
}

/// One hardware binding point: a texture unit, a framebuffer target, the program slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    /// Index of the slot within its kind's table.
    pub index: usize,
    /// What the slot currently holds.
    pub state: SlotState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::enums::TextureTarget;

    #[test]
    fn zero_is_not_a_handle() {
        assert!(ResourceHandle::new(0).is_none());
        assert_eq!(ResourceHandle::new(7).map(ResourceHandle::get), Some(7));
    }

    #[test]
    fn slot_state_from_binding() {
        let handle = ResourceHandle::new(3).unwrap();
        let target = BindTarget::Texture(TextureTarget::Texture2D);
        assert_eq!(SlotState::from_binding(None, target), SlotState::Unbound);
        let bound = SlotState::from_binding(Some(handle), target);
        assert!(bound.holds(handle));
        assert!(!SlotState::Unknown.holds(handle));
        assert_eq!(SlotState::Unbound.handle(), None);
    }
}
