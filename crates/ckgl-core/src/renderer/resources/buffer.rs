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
use crate::renderer::api::{BufferTarget, BufferUsage, ResourceHandle, ResourceKind};
use crate::renderer::context::RenderContext;
use crate::renderer::error::RenderResult;
use crate::renderer::traits::GraphicsBackend;

/// A vertex or index buffer object.
#[derive(Debug)]
pub struct Buffer {
    handle: ResourceHandle,
    target: BufferTarget,
    usage: BufferUsage,
    size: usize,
    destroyed: bool,
}

impl Buffer {
    /// Creates an empty buffer for `target`.
    pub fn new<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        target: BufferTarget,
        usage: BufferUsage,
    ) -> RenderResult<Self> {
        let handle = ctx.backend_mut().create_buffer()?;
        ctx.register(ResourceKind::Buffer, handle);
        Ok(Self {
            handle,
            target,
            usage,
            size: 0,
            destroyed: false,
        })
    }

    /// Binds the buffer to its target.
    pub fn bind<B: GraphicsBackend>(&self, ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        ctx.bind_buffer(self.target, Some(self.handle))
    }

    /// Binds the buffer and replaces its contents with `data`.
    pub fn set_data<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        data: &[u8],
    ) -> RenderResult<()> {
        self.bind(ctx)?;
        ctx.backend_mut().buffer_data(self.target, data, self.usage)?;
        self.size = data.len();
        Ok(())
    }

    /// Releases the buffer from the cache and deletes it.
    pub fn destroy<B: GraphicsBackend>(mut self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.destroyed = true;
        ctx.release(ResourceKind::Buffer, self.handle);
        ctx.backend_mut().delete_buffer(self.handle)
    }

    /// The driver name.
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    /// The bind target.
    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// The usage hint.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size of the last upload in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if !self.destroyed {
            warn_leak(ResourceKind::Buffer, self.handle);
        }
    }
}
