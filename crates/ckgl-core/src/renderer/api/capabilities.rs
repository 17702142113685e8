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

//! Describes what a backend can do, discovered once when it is created.

use super::enums::{BufferTarget, GraphicsBackendType, TextureTarget};
use super::handle::ResourceKind;
use serde::{Deserialize, Serialize};

/// Numeric limits queried from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendLimits {
    /// Number of combined texture image units.
    pub max_texture_units: usize,
    /// Number of simultaneous draw buffers.
    pub max_draw_buffers: usize,
    /// Number of colour attachments per framebuffer.
    pub max_color_attachments: usize,
    /// Number of generic vertex attribute locations.
    pub max_vertex_attributes: usize,
}

impl Default for BackendLimits {
    /// The minimums guaranteed by OpenGL ES 3.0.
    fn default() -> Self {
        Self {
            max_texture_units: 32,
            max_draw_buffers: 4,
            max_color_attachments: 4,
            max_vertex_attributes: 16,
        }
    }
}

/// The immutable capability set of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendCapabilities {
    /// The API family.
    pub backend: GraphicsBackendType,
    /// Number of texture units, which is the capacity of the texture slot table.
    pub max_texture_units: usize,
    /// Number of simultaneous draw buffers.
    pub max_draw_buffers: usize,
    /// Number of colour attachments per framebuffer.
    pub max_color_attachments: usize,
    /// Number of generic vertex attribute locations.
    pub max_vertex_attributes: usize,
    /// `glPolygonMode` is available.
    pub polygon_mode: bool,
    /// `MIN`/`MAX` blend equations are available.
    pub blend_min_max: bool,
    /// `glBlitFramebuffer` is available.
    pub framebuffer_blit: bool,
    /// Vertex array objects are available.
    pub vertex_array_objects: bool,
    /// Instanced draws are available.
    pub instancing: bool,
    /// One-dimensional textures are available.
    pub texture_1d: bool,
}

impl BackendCapabilities {
    /// Fills the feature switches for `backend` and takes the numeric limits from `limits`.
    pub fn for_backend(backend: GraphicsBackendType, limits: BackendLimits) -> Self {
        let desktop = backend == GraphicsBackendType::OpenGL;
        let webgl1 = backend == GraphicsBackendType::WebGL;
        let attachment_limit = if webgl1 { 1 } else { usize::MAX };
        Self {
            backend,
            max_texture_units: limits.max_texture_units,
            max_draw_buffers: limits.max_draw_buffers.min(attachment_limit),
            max_color_attachments: limits.max_color_attachments.min(attachment_limit),
            max_vertex_attributes: limits.max_vertex_attributes,
            polygon_mode: desktop,
            blend_min_max: !webgl1,
            framebuffer_blit: !webgl1,
            vertex_array_objects: true,
            instancing: !webgl1,
            texture_1d: desktop,
        }
    }

    /// The number of binding slots the cache keeps for `kind`.
    pub fn slot_capacity(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Texture => self.max_texture_units,
            // Read and draw targets.
            ResourceKind::Framebuffer => 2,
            ResourceKind::Buffer => BufferTarget::COUNT,
            ResourceKind::Shader | ResourceKind::VertexArray => 1,
        }
    }

    /// Returns `true` if textures of `target` can be created on this backend.
    pub fn supports_texture_target(&self, target: TextureTarget) -> bool {
        !target.is_1d() || self.texture_1d
    }
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self::for_backend(GraphicsBackendType::OpenGL, BackendLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_gl_has_every_feature() {
        let caps = BackendCapabilities::default();
        assert!(caps.polygon_mode && caps.blend_min_max && caps.framebuffer_blit);
        assert!(caps.supports_texture_target(TextureTarget::Texture1D));
        assert_eq!(caps.slot_capacity(ResourceKind::Texture), 32);
        assert_eq!(caps.slot_capacity(ResourceKind::Framebuffer), 2);
        assert_eq!(caps.slot_capacity(ResourceKind::Shader), 1);
        assert_eq!(caps.slot_capacity(ResourceKind::Buffer), 2);
    }

    #[test]
    fn webgl1_is_reduced() {
        let caps = BackendCapabilities::for_backend(GraphicsBackendType::WebGL, BackendLimits::default());
        assert!(!caps.polygon_mode);
        assert!(!caps.blend_min_max);
        assert!(!caps.framebuffer_blit);
        assert_eq!(caps.max_color_attachments, 1);
        assert!(!caps.supports_texture_target(TextureTarget::Texture1DArray));
        assert!(!caps.instancing);
        assert_eq!(caps.max_vertex_attributes, 16);
    }

    #[test]
    fn embedded_backends_lack_polygon_mode() {
        for backend in [GraphicsBackendType::OpenGLES, GraphicsBackendType::WebGL2] {
            let caps = BackendCapabilities::for_backend(backend, BackendLimits::default());
            assert!(!caps.polygon_mode);
            assert!(!caps.texture_1d);
            assert!(caps.framebuffer_blit);
        }
    }
}
