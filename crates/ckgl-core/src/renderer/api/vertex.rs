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


//! Vertex layouts: how attribute data is laid out inside a vertex buffer.

use super::enums::VertexType;
use crate::renderer::error::{RenderResult, ResourceError};
use serde::{Deserialize, Serialize};

/// One attribute of a vertex: `count` components of `ty` at byte `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttribute {
    /// The component type.
    pub ty: VertexType,
    /// Number of components, 1 to 4.
    pub count: u32,
    /// Integer components are mapped to `[0, 1]` / `[-1, 1]` when read as floats.
    pub normalized: bool,
    /// Byte offset inside the vertex. Filled in by [`VertexFormat::new`].
    pub offset: u32,
    /// Instances drawn per attribute advance. `0` advances per vertex.
    pub divisor: u32,
}

impl VertexAttribute {
    /// A per-vertex attribute. Its offset is assigned by the format it is placed in.
    pub const fn new(ty: VertexType, count: u32, normalized: bool) -> Self {
        Self {
            ty,
            count,
            normalized,
            offset: 0,
            divisor: 0,
        }
    }

    /// The same attribute, advancing once every `divisor` instances.
    pub const fn per_instance(self, divisor: u32) -> Self {
        Self { divisor, ..self }
    }

    /// The size of the attribute in bytes.
    pub fn size(&self) -> u32 {
        self.ty.size() * self.count
    }
}

/// The layout of one interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexFormat {
    stride: u32,
    attributes: Vec<VertexAttribute>,
}

impl VertexFormat {
    /// Packs `attributes` back to back. The stride is the sum of their sizes.
    /// ## Errors
    /// * `ResourceError::InvalidVertexLayout` for an empty list or a component count
    ///   outside `1..=4`.
    pub fn new(attributes: &[VertexAttribute]) -> RenderResult<Self> {
        Self::validate(attributes)?;
        let mut offset = 0;
        let attributes = attributes
            .iter()
            .map(|attribute| {
                let placed = VertexAttribute {
                    offset,
                    ..*attribute
                };
                offset += attribute.size();
                placed
            })
            .collect();
        Ok(Self {
            stride: offset,
            attributes,
        })
    }

    /// Uses the offsets given in `attributes` and an explicit `stride`, for vertices with
    /// padding or fields in a different order.
    /// ## Errors
    /// * `ResourceError::InvalidVertexLayout` if an attribute does not fit inside `stride`.
    pub fn with_stride(stride: u32, attributes: &[VertexAttribute]) -> RenderResult<Self> {
        Self::validate(attributes)?;
        if let Some(attribute) = attributes
            .iter()
            .find(|a| a.offset + a.size() > stride)
        {
            return Err(ResourceError::InvalidVertexLayout(format!(
                "attribute at offset {} ({} bytes) does not fit in a {stride}-byte vertex",
                attribute.offset,
                attribute.size()
            ))
            .into());
        }
        Ok(Self {
            stride,
            attributes: attributes.to_vec(),
        })
    }

    fn validate(attributes: &[VertexAttribute]) -> RenderResult<()> {
        if attributes.is_empty() {
            return Err(ResourceError::InvalidVertexLayout(
                "at least one attribute is required".into(),
            )
            .into());
        }
        if let Some(attribute) = attributes.iter().find(|a| !(1..=4).contains(&a.count)) {
            return Err(ResourceError::InvalidVertexLayout(format!(
                "{} components per attribute, expected 1 to 4",
                attribute.count
            ))
            .into());
        }
        Ok(())
    }

    /// Bytes between two consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// The attributes with their final offsets.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Returns `true` if any attribute advances per instance.
    pub fn is_instanced(&self) -> bool {
        self.attributes.iter().any(|a| a.divisor > 0)
    }
}
