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

use super::warn_leak;
use crate::renderer::api::{ResourceHandle, ResourceKind};
use crate::renderer::context::RenderContext;
use crate::renderer::error::RenderResult;
use crate::renderer::traits::GraphicsBackend;

/// A vertex array object.
#[derive(Debug)]
pub struct VertexArray {
    handle: ResourceHandle,
    destroyed: bool,
}

impl VertexArray {
    /// Creates a vertex array object.
    /// ## Errors
    /// * `RenderError::Unsupported` on backends without vertex array objects.
    pub fn new<B: GraphicsBackend>(ctx: &mut RenderContext<B>) -> RenderResult<Self> {
        ctx.require(ctx.capabilities().vertex_array_objects, "Vertex array objects")?;
        let handle = ctx.backend_mut().create_vertex_array()?;
        ctx.register(ResourceKind::VertexArray, handle);
        Ok(Self {
            handle,
            destroyed: false,
        })
    }

    /// Binds the vertex array.
    pub fn bind<B: GraphicsBackend>(&self, ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        ctx.bind_vertex_array(Some(self.handle))
    }

    /// Unbinds whatever vertex array is bound.
    pub fn unbind<B: GraphicsBackend>(ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        ctx.bind_vertex_array(None)
    }

    /// Returns `true` if the cache knows the vertex array to be bound.
    pub fn is_bound<B: GraphicsBackend>(&self, ctx: &RenderContext<B>) -> bool {
        ctx.bindings()
            .current(ResourceKind::VertexArray, 0)
            .is_some_and(|slot| slot.holds(self.handle))
    }

    /// Releases the vertex array from the cache and deletes it.
    pub fn destroy<B: GraphicsBackend>(mut self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.destroyed = true;
        ctx.release(ResourceKind::VertexArray, self.handle);
        ctx.backend_mut().delete_vertex_array(self.handle)
    }

    /// The driver name.
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        if !self.destroyed {
            warn_leak(ResourceKind::VertexArray, self.handle);
        }
    }
}
