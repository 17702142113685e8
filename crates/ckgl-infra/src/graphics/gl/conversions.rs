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

//! Static lookup tables from engine enums to OpenGL constants.
//!
//! Every table is indexed by the enum's raw code, so a table whose length does not match the
//! variant count fails to compile.

use ckgl_core::renderer::api::{
    BlendEquation, BlendFactor, BlitFilter, BufferTarget, BufferUsage, Capability, ClearFlags,
    CompareFunction, Face, FramebufferAttachment, FramebufferTarget, FrontFace,
    GraphicsBackendType, IndexFormat, PolygonMode, PrimitiveTopology, ShaderStage,
    TextureFilter, TextureFormat, TextureParameter, TextureTarget, TextureWrap, VertexType,
};

/// A local extension trait to convert engine types into OpenGL values.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into the OpenGL representation.
    fn into_gl(self) -> T;
}

macro_rules! gl_tables {
    ($($ty:ident => [$($value:expr),* $(,)?];)*) => {
        $(
            impl IntoGl<u32> for $ty {
                fn into_gl(self) -> u32 {
                    const TABLE: [u32; $ty::COUNT] = [$($value),*];
                    TABLE[self.index()]
                }
            }
        )*
    };
}

gl_tables! {
    BlendFactor => [
        glow::ZERO,
        glow::ONE,
        glow::SRC_COLOR,
        glow::ONE_MINUS_SRC_COLOR,
        glow::SRC_ALPHA,
        glow::ONE_MINUS_SRC_ALPHA,
        glow::DST_ALPHA,
        glow::ONE_MINUS_DST_ALPHA,
        glow::DST_COLOR,
        glow::ONE_MINUS_DST_COLOR,
        glow::SRC_ALPHA_SATURATE,
        glow::CONSTANT_COLOR,
        glow::ONE_MINUS_CONSTANT_COLOR,
        glow::CONSTANT_ALPHA,
        glow::ONE_MINUS_CONSTANT_ALPHA,
    ];
    BlendEquation => [
        glow::FUNC_ADD,
        glow::FUNC_SUBTRACT,
        glow::FUNC_REVERSE_SUBTRACT,
        glow::MIN,
        glow::MAX,
    ];
    CompareFunction => [
        glow::NEVER,
        glow::LESS,
        glow::EQUAL,
        glow::LEQUAL,
        glow::GREATER,
        glow::NOTEQUAL,
        glow::GEQUAL,
        glow::ALWAYS,
    ];
    Face => [glow::FRONT, glow::BACK, glow::FRONT_AND_BACK];
    FrontFace => [glow::CW, glow::CCW];
    PolygonMode => [glow::FILL, glow::LINE, glow::POINT];
    PrimitiveTopology => [
        glow::POINTS,
        glow::LINES,
        glow::LINE_LOOP,
        glow::LINE_STRIP,
        glow::TRIANGLES,
        glow::TRIANGLE_STRIP,
        glow::TRIANGLE_FAN,
    ];
    IndexFormat => [glow::UNSIGNED_BYTE, glow::UNSIGNED_SHORT, glow::UNSIGNED_INT];
    TextureTarget => [
        glow::TEXTURE_1D,
        glow::TEXTURE_1D_ARRAY,
        glow::TEXTURE_2D,
        glow::TEXTURE_2D_ARRAY,
        glow::TEXTURE_2D_MULTISAMPLE,
        glow::TEXTURE_3D,
        glow::TEXTURE_CUBE_MAP,
    ];
    TextureFilter => [
        glow::NEAREST,
        glow::LINEAR,
        glow::NEAREST_MIPMAP_NEAREST,
        glow::LINEAR_MIPMAP_NEAREST,
        glow::NEAREST_MIPMAP_LINEAR,
        glow::LINEAR_MIPMAP_LINEAR,
    ];
    TextureWrap => [glow::CLAMP_TO_EDGE, glow::REPEAT, glow::MIRRORED_REPEAT];
    BufferTarget => [glow::ARRAY_BUFFER, glow::ELEMENT_ARRAY_BUFFER];
    BufferUsage => [glow::STATIC_DRAW, glow::DYNAMIC_DRAW, glow::STREAM_DRAW];
    VertexType => [
        glow::BYTE,
        glow::UNSIGNED_BYTE,
        glow::SHORT,
        glow::UNSIGNED_SHORT,
        glow::INT,
        glow::UNSIGNED_INT,
        glow::FLOAT,
    ];
    FramebufferTarget => [glow::READ_FRAMEBUFFER, glow::DRAW_FRAMEBUFFER, glow::FRAMEBUFFER];
    BlitFilter => [glow::NEAREST, glow::LINEAR];
    ShaderStage => [glow::VERTEX_SHADER, glow::FRAGMENT_SHADER];
    Capability => [glow::BLEND, glow::DEPTH_TEST, glow::CULL_FACE, glow::SCISSOR_TEST];
}

impl IntoGl<u32> for FramebufferAttachment {
    fn into_gl(self) -> u32 {
        match self {
            FramebufferAttachment::Color(index) => glow::COLOR_ATTACHMENT0 + index,
            FramebufferAttachment::Depth => glow::DEPTH_ATTACHMENT,
            FramebufferAttachment::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

impl IntoGl<u32> for ClearFlags {
    fn into_gl(self) -> u32 {
        let mut mask = 0;
        if self.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        mask
    }
}

/// A texture parameter as a `(pname, value)` pair for `glTexParameteri`.
impl IntoGl<(u32, i32)> for TextureParameter {
    fn into_gl(self) -> (u32, i32) {
        // GL enum values are small positive integers, they fit in `i32`.
        match self {
            TextureParameter::MinFilter(f) => (glow::TEXTURE_MIN_FILTER, f.into_gl() as i32),
            TextureParameter::MagFilter(f) => (glow::TEXTURE_MAG_FILTER, f.into_gl() as i32),
            TextureParameter::WrapS(w) => (glow::TEXTURE_WRAP_S, w.into_gl() as i32),
            TextureParameter::WrapT(w) => (glow::TEXTURE_WRAP_T, w.into_gl() as i32),
        }
    }
}

/// The three enums `glTexImage*` needs to describe a texture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlTextureFormat {
    /// The sized internal format.
    pub internal: u32,
    /// The pixel format of uploaded data.
    pub format: u32,
    /// The component type of uploaded data.
    pub ty: u32,
}

const TEXTURE_FORMATS: [GlTextureFormat; TextureFormat::COUNT] = [
    tex(glow::R8, glow::RED, glow::UNSIGNED_BYTE),
    tex(glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
    tex(glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
    tex(glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
    tex(glow::R32F, glow::RED, glow::FLOAT),
    tex(glow::RG32F, glow::RG, glow::FLOAT),
    tex(glow::RGBA16F, glow::RGBA, glow::HALF_FLOAT),
    tex(glow::RGBA32F, glow::RGBA, glow::FLOAT),
    tex(glow::DEPTH_COMPONENT16, glow::DEPTH_COMPONENT, glow::UNSIGNED_SHORT),
    tex(glow::DEPTH_COMPONENT24, glow::DEPTH_COMPONENT, glow::UNSIGNED_INT),
    tex(glow::DEPTH_COMPONENT32F, glow::DEPTH_COMPONENT, glow::FLOAT),
    tex(glow::DEPTH24_STENCIL8, glow::DEPTH_STENCIL, glow::UNSIGNED_INT_24_8),
];

const fn tex(internal: u32, format: u32, ty: u32) -> GlTextureFormat {
    GlTextureFormat {
        internal,
        format,
        ty,
    }
}

/// Looks up the upload description of `format` for `backend`.
///
/// WebGL 1 only accepts unsized internal formats, so there the internal format equals the
/// pixel format.
pub fn texture_format(format: TextureFormat, backend: GraphicsBackendType) -> GlTextureFormat {
    let mut gl = TEXTURE_FORMATS[format.index()];
    if backend == GraphicsBackendType::WebGL {
        gl.internal = gl.format;
    }
    gl
}

/// A readable name for a `glCheckFramebufferStatus` result.
pub fn framebuffer_status_name(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_COMPLETE => "complete",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "incomplete multisample",
        glow::FRAMEBUFFER_UNSUPPORTED => "unsupported format combination",
        _ => "unknown status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn blend_factors_map_to_distinct_constants() {
        let values: HashSet<u32> = BlendFactor::ALL.iter().map(|f| f.into_gl()).collect();
        assert_eq!(values.len(), BlendFactor::COUNT);
        assert_eq!(BlendFactor::Zero.into_gl(), glow::ZERO);
        assert_eq!(BlendFactor::OneMinusConstantAlpha.into_gl(), glow::ONE_MINUS_CONSTANT_ALPHA);
    }

    #[test]
    fn tables_follow_declaration_order() {
        assert_eq!(CompareFunction::LessEqual.into_gl(), glow::LEQUAL);
        assert_eq!(CompareFunction::Always.into_gl(), glow::ALWAYS);
        assert_eq!(PrimitiveTopology::TriangleFan.into_gl(), glow::TRIANGLE_FAN);
        assert_eq!(TextureTarget::CubeMap.into_gl(), glow::TEXTURE_CUBE_MAP);
        assert_eq!(TextureFilter::LinearMipmapLinear.into_gl(), glow::LINEAR_MIPMAP_LINEAR);
        assert_eq!(FramebufferTarget::Both.into_gl(), glow::FRAMEBUFFER);
        assert_eq!(Capability::ScissorTest.into_gl(), glow::SCISSOR_TEST);
        assert_eq!(VertexType::UnsignedShort.into_gl(), glow::UNSIGNED_SHORT);
        assert_eq!(VertexType::Float.into_gl(), glow::FLOAT);
    }

    #[test]
    fn clear_flags_combine_into_mask() {
        let mask = (ClearFlags::COLOR | ClearFlags::DEPTH).into_gl();
        assert_eq!(mask, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        assert_eq!(ClearFlags::EMPTY.into_gl(), 0);
    }

    #[test]
    fn colour_attachments_are_offset_from_zero() {
        assert_eq!(FramebufferAttachment::Color(0).into_gl(), glow::COLOR_ATTACHMENT0);
        assert_eq!(FramebufferAttachment::Color(3).into_gl(), glow::COLOR_ATTACHMENT3);
        assert_eq!(
            FramebufferAttachment::DepthStencil.into_gl(),
            glow::DEPTH_STENCIL_ATTACHMENT
        );
    }

    #[test]
    fn texture_parameters_pair_name_and_value() {
        let (pname, value) = TextureParameter::WrapS(TextureWrap::Repeat).into_gl();
        assert_eq!(pname, glow::TEXTURE_WRAP_S);
        assert_eq!(value, glow::REPEAT as i32);
    }

    #[test]
    fn webgl1_uses_unsized_internal_formats() {
        let desktop = texture_format(TextureFormat::Rgba8, GraphicsBackendType::OpenGL);
        assert_eq!(desktop.internal, glow::RGBA8);

        let webgl = texture_format(TextureFormat::Rgba8, GraphicsBackendType::WebGL);
        assert_eq!(webgl.internal, glow::RGBA);
        assert_eq!(webgl.ty, glow::UNSIGNED_BYTE);
    }

    #[test]
    fn depth_formats_use_depth_pixel_formats() {
        for format in TextureFormat::ALL.into_iter().filter(|f| f.is_depth()) {
            let gl = texture_format(format, GraphicsBackendType::OpenGL);
            assert!(
                gl.format == glow::DEPTH_COMPONENT || gl.format == glow::DEPTH_STENCIL,
                "{format:?} must upload as depth"
            );
        }
    }
}
