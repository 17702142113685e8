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

//! GPU resource wrappers.
//!
//! Each wrapper owns exactly one driver object. Creation registers the handle with the
//! context's binding cache; `destroy` consumes the wrapper, releases the handle from every
//! slot and deletes the object. A wrapper dropped without `destroy` leaks its object and
//! logs a warning.

mod buffer;
mod framebuffer;
mod geometry_input;
mod shader;
mod texture;
mod vertex_array;

pub use self::buffer::Buffer;
pub use self::framebuffer::Framebuffer;
pub use self::geometry_input::{GeometryInput, VertexStream};
pub use self::shader::Shader;
pub use self::texture::{Texture, TextureSampler};
pub use self::vertex_array::VertexArray;

use crate::renderer::api::{ResourceHandle, ResourceKind};

fn warn_leak(kind: ResourceKind, handle: ResourceHandle) {
    log::warn!("{kind} {handle} was dropped without being destroyed; the GPU object leaks");
}
