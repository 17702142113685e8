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


//! Geometry input: a vertex array configured from vertex streams plus an optional index
//! buffer.
//!
//! Configuring the vertex array attaches the index buffer to it, so the index binding
//! travels with the vertex array from then on.

use crate::renderer::api::{BufferTarget, ResourceHandle, VertexFormat};
use crate::renderer::context::RenderContext;
use crate::renderer::error::{RenderError, RenderResult, ResourceError};
use crate::renderer::resources::{Buffer, VertexArray};
use crate::renderer::traits::GraphicsBackend;

/// One vertex buffer and the layout of the vertices inside it.
#[derive(Debug, Clone, Copy)]
pub struct VertexStream<'a> {
    /// A buffer created for [`BufferTarget::Vertex`].
    pub buffer: &'a Buffer,
    /// How each vertex is laid out in `buffer`.
    pub format: &'a VertexFormat,
}

impl<'a> VertexStream<'a> {
    /// Pairs `buffer` with its layout.
    pub fn new(buffer: &'a Buffer, format: &'a VertexFormat) -> Self {
        Self { buffer, format }
    }
}

/// A vertex array with its attribute pointers and index buffer set up.
///
/// Attribute locations are numbered across all streams in order: the attributes of the
/// second stream continue where the first stream stopped.
#[derive(Debug)]
pub struct GeometryInput {
    vertex_array: VertexArray,
    index_buffer: Option<ResourceHandle>,
    attribute_count: u32,
}

impl GeometryInput {
    /// Creates a vertex array and records every stream and the index buffer into it.
    ///
    /// The vertex array is left bound.
    ///
    /// ## Arguments
    /// * `index_buffer` - An index buffer to attach, or `None` for non-indexed geometry.
    /// * `streams` - The vertex buffers, in attribute location order.
    ///
    /// ## Errors
    /// * `ResourceError::InvalidVertexLayout` if `streams` is empty, a buffer has the wrong
    ///   target, or the attributes need more locations than the backend has.
    /// * `RenderError::Unsupported` if an attribute has a divisor and the backend cannot
    ///   draw instanced.
    pub fn new<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        index_buffer: Option<&Buffer>,
        streams: &[VertexStream<'_>],
    ) -> RenderResult<Self> {
        let attribute_count = validate(ctx, index_buffer, streams)?;
        let vertex_array = VertexArray::new(ctx)?;
        match configure(ctx, &vertex_array, index_buffer, streams) {
            Ok(()) => {
                log::debug!(
                    "Geometry input {} configured: {} stream(s), {attribute_count} attribute(s)",
                    vertex_array.handle(),
                    streams.len()
                );
                Ok(Self {
                    vertex_array,
                    index_buffer: index_buffer.map(Buffer::handle),
                    attribute_count,
                })
            }
            Err(err) => {
                if let Err(cleanup) = vertex_array.destroy(ctx) {
                    log::warn!("Failed to delete a half-configured vertex array: {cleanup}");
                }
                Err(err)
            }
        }
    }

    /// Binds the vertex array, and with it the attached index buffer.
    pub fn bind<B: GraphicsBackend>(&self, ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        self.vertex_array.bind(ctx)
    }

    /// Returns `true` if the cache knows the vertex array to be bound.
    pub fn is_bound<B: GraphicsBackend>(&self, ctx: &RenderContext<B>) -> bool {
        self.vertex_array.is_bound(ctx)
    }

    /// Deletes the vertex array. The buffers stay alive; they belong to the caller.
    pub fn destroy<B: GraphicsBackend>(self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.vertex_array.destroy(ctx)
    }

    /// The vertex array.
    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    /// The index buffer recorded into the vertex array, if any.
    pub fn index_buffer(&self) -> Option<ResourceHandle> {
        self.index_buffer
    }

    /// Returns `true` if the geometry is drawn with indices.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// The number of attribute locations in use, `0..attribute_count`.
    pub fn attribute_count(&self) -> u32 {
        self.attribute_count
    }
}

fn invalid(msg: String) -> ResourceError {
    ResourceError::InvalidVertexLayout(msg)
}

/// Checks everything that can be checked before touching the driver. Returns the number of
/// attribute locations the streams need.
fn validate<B: GraphicsBackend>(
    ctx: &RenderContext<B>,
    index_buffer: Option<&Buffer>,
    streams: &[VertexStream<'_>],
) -> RenderResult<u32> {
    if streams.is_empty() {
        return Err(invalid("at least one vertex stream is required".into()).into());
    }
    if let Some(buffer) = index_buffer.filter(|b| b.target() != BufferTarget::Index) {
        return Err(invalid(format!("buffer {} is not an index buffer", buffer.handle())).into());
    }
    if let Some(stream) = streams
        .iter()
        .find(|s| s.buffer.target() != BufferTarget::Vertex)
    {
        return Err(invalid(format!(
            "buffer {} is not a vertex buffer",
            stream.buffer.handle()
        ))
        .into());
    }

    let count: usize = streams.iter().map(|s| s.format.attributes().len()).sum();
    let limit = ctx.capabilities().max_vertex_attributes;
    if count > limit {
        return Err(invalid(format!(
            "{count} attributes exceed the limit of {limit} locations"
        ))
        .into());
    }
    let instanced = streams
        .iter()
        .flat_map(|s| s.format.attributes())
        .any(|a| a.divisor > 0);
    ctx.require(!instanced || ctx.capabilities().instancing, "Instanced vertex attributes")?;

    u32::try_from(count).map_err(|_| RenderError::from(invalid(format!("{count} attributes"))))
}

fn configure<B: GraphicsBackend>(
    ctx: &mut RenderContext<B>,
    vertex_array: &VertexArray,
    index_buffer: Option<&Buffer>,
    streams: &[VertexStream<'_>],
) -> RenderResult<()> {
    vertex_array.bind(ctx)?;
    let mut location = 0;
    for stream in streams {
        stream.buffer.bind(ctx)?;
        for attribute in stream.format.attributes() {
            let backend = ctx.backend_mut();
            backend.enable_vertex_attribute(location)?;
            backend.vertex_attribute_pointer(location, attribute, stream.format.stride())?;
            if attribute.divisor > 0 {
                backend.vertex_attribute_divisor(location, attribute.divisor)?;
            }
            location += 1;
        }
    }
    // Recorded last so the vertex array owns it.
    if let Some(buffer) = index_buffer {
        buffer.bind(ctx)?;
    }
    Ok(())
}
