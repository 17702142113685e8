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

//! Engine-level enums shared by every backend.
//!
//! Each enum carries an `ALL` table listing its variants in declaration order. The
//! position in that table is the enum's raw code, which is what `TryFrom<u32>` accepts and
//! what backends use to index their static lookup tables.

use crate::ckgl_bitflags;
use crate::renderer::error::RenderError;
use serde::{Deserialize, Serialize};

/// Implements raw-code conversion for an enum that declares an `ALL` table.
macro_rules! raw_codes {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                /// The number of variants.
                pub const COUNT: usize = Self::ALL.len();

                /// The raw code of this variant, i.e. its position in [`Self::ALL`].
                pub fn index(self) -> usize {
                    // `ALL` is in declaration order, so the discriminant is the position.
                    self as usize
                }
            }

            impl TryFrom<u32> for $ty {
                type Error = RenderError;

                fn try_from(value: u32) -> Result<Self, Self::Error> {
                    Self::ALL
                        .get(value as usize)
                        .copied()
                        .ok_or(RenderError::IllegalValue {
                            type_name: stringify!($ty),
                            value,
                        })
                }
            }
        )*
    };
}

/// The graphics API family a backend drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Desktop OpenGL 3.3+.
    #[default]
    OpenGL,
    /// OpenGL ES 3.0+.
    OpenGLES,
    /// WebGL 1.0.
    WebGL,
    /// WebGL 2.0.
    WebGL2,
}

impl GraphicsBackendType {
    /// All backend types.
    pub const ALL: [GraphicsBackendType; 4] = [
        GraphicsBackendType::OpenGL,
        GraphicsBackendType::OpenGLES,
        GraphicsBackendType::WebGL,
        GraphicsBackendType::WebGL2,
    ];

    /// Returns `true` for the browser-hosted backends.
    pub fn is_web(self) -> bool {
        matches!(self, GraphicsBackendType::WebGL | GraphicsBackendType::WebGL2)
    }
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// `0`
    Zero,
    /// `1`
    One,
    /// The source colour.
    SrcColor,
    /// `1 - src.rgb`
    OneMinusSrcColor,
    /// The source alpha.
    SrcAlpha,
    /// `1 - src.a`
    OneMinusSrcAlpha,
    /// The destination alpha.
    DstAlpha,
    /// `1 - dst.a`
    OneMinusDstAlpha,
    /// The destination colour.
    DstColor,
    /// `1 - dst.rgb`
    OneMinusDstColor,
    /// `min(src.a, 1 - dst.a)`
    SrcAlphaSaturate,
    /// The constant blend colour.
    ConstantColor,
    /// `1 - constant.rgb`
    OneMinusConstantColor,
    /// The constant blend alpha.
    ConstantAlpha,
    /// `1 - constant.a`
    OneMinusConstantAlpha,
}

impl BlendFactor {
    /// All blend factors.
    pub const ALL: [BlendFactor; 15] = [
        BlendFactor::Zero,
        BlendFactor::One,
        BlendFactor::SrcColor,
        BlendFactor::OneMinusSrcColor,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha,
        BlendFactor::DstColor,
        BlendFactor::OneMinusDstColor,
        BlendFactor::SrcAlphaSaturate,
        BlendFactor::ConstantColor,
        BlendFactor::OneMinusConstantColor,
        BlendFactor::ConstantAlpha,
        BlendFactor::OneMinusConstantAlpha,
    ];
}

/// The operation combining source and destination in a blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendEquation {
    /// `src + dst`
    #[default]
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
}

impl BlendEquation {
    /// All blend equations.
    pub const ALL: [BlendEquation; 5] = [
        BlendEquation::Add,
        BlendEquation::Subtract,
        BlendEquation::ReverseSubtract,
        BlendEquation::Min,
        BlendEquation::Max,
    ];

    /// `Min` and `Max` need `EXT_blend_minmax` on WebGL 1.
    pub fn is_min_max(self) -> bool {
        matches!(self, BlendEquation::Min | BlendEquation::Max)
    }
}

/// The comparison function used for depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if the incoming value is less than the stored one.
    #[default]
    Less,
    /// Passes on equality.
    Equal,
    /// Passes if less or equal.
    LessEqual,
    /// Passes if greater.
    Greater,
    /// Passes on inequality.
    NotEqual,
    /// Passes if greater or equal.
    GreaterEqual,
    /// Always passes.
    Always,
}

impl CompareFunction {
    /// All compare functions.
    pub const ALL: [CompareFunction; 8] = [
        CompareFunction::Never,
        CompareFunction::Less,
        CompareFunction::Equal,
        CompareFunction::LessEqual,
        CompareFunction::Greater,
        CompareFunction::NotEqual,
        CompareFunction::GreaterEqual,
        CompareFunction::Always,
    ];
}

/// A polygon face selector, used for culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Face {
    /// Front-facing polygons.
    Front,
    /// Back-facing polygons.
    #[default]
    Back,
    /// Both faces.
    FrontAndBack,
}

impl Face {
    /// All faces.
    pub const ALL: [Face; 3] = [Face::Front, Face::Back, Face::FrontAndBack];
}

/// The winding order that makes a triangle front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Clockwise winding.
    Clockwise,
    /// Counter-clockwise winding (the GL default).
    #[default]
    CounterClockwise,
}

impl FrontFace {
    /// All winding orders.
    pub const ALL: [FrontFace; 2] = [FrontFace::Clockwise, FrontFace::CounterClockwise];
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolygonMode {
    /// Filled polygons.
    #[default]
    Fill,
    /// Wireframe.
    Line,
    /// Vertices only.
    Point,
}

impl PolygonMode {
    /// All polygon modes.
    pub const ALL: [PolygonMode; 3] = [PolygonMode::Fill, PolygonMode::Line, PolygonMode::Point];
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Isolated points.
    PointList,
    /// Isolated line segments.
    LineList,
    /// A closed line loop.
    LineLoop,
    /// A connected line strip.
    LineStrip,
    /// Isolated triangles.
    TriangleList,
    /// A triangle strip.
    TriangleStrip,
    /// A triangle fan.
    TriangleFan,
}

impl PrimitiveTopology {
    /// All topologies.
    pub const ALL: [PrimitiveTopology; 7] = [
        PrimitiveTopology::PointList,
        PrimitiveTopology::LineList,
        PrimitiveTopology::LineLoop,
        PrimitiveTopology::LineStrip,
        PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip,
        PrimitiveTopology::TriangleFan,
    ];
}

/// The element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFormat {
    /// 8-bit indices.
    Uint8,
    /// 16-bit indices.
    Uint16,
    /// 32-bit indices.
    Uint32,
}

impl IndexFormat {
    /// All index formats.
    pub const ALL: [IndexFormat; 3] = [IndexFormat::Uint8, IndexFormat::Uint16, IndexFormat::Uint32];

    /// The size of one index in bytes.
    pub fn size(self) -> usize {
        match self {
            IndexFormat::Uint8 => 1,
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// The bind target of a texture. Part of a texture slot's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureTarget {
    /// A one-dimensional texture. Desktop OpenGL only.
    Texture1D,
    /// An array of one-dimensional textures. Desktop OpenGL only.
    Texture1DArray,
    /// A two-dimensional texture.
    Texture2D,
    /// An array of two-dimensional textures.
    Texture2DArray,
    /// A multisampled two-dimensional texture.
    Texture2DMultisample,
    /// A three-dimensional texture.
    Texture3D,
    /// A cube map.
    CubeMap,
}

impl TextureTarget {
    /// All texture targets.
    pub const ALL: [TextureTarget; 7] = [
        TextureTarget::Texture1D,
        TextureTarget::Texture1DArray,
        TextureTarget::Texture2D,
        TextureTarget::Texture2DArray,
        TextureTarget::Texture2DMultisample,
        TextureTarget::Texture3D,
        TextureTarget::CubeMap,
    ];

    /// Returns `true` for the one-dimensional targets.
    pub fn is_1d(self) -> bool {
        matches!(self, TextureTarget::Texture1D | TextureTarget::Texture1DArray)
    }
}

/// The storage format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// One 8-bit channel.
    R8,
    /// Two 8-bit channels.
    Rg8,
    /// Three 8-bit channels.
    Rgb8,
    /// Four 8-bit channels.
    Rgba8,
    /// One 32-bit float channel.
    R32F,
    /// Two 32-bit float channels.
    Rg32F,
    /// Four 16-bit float channels.
    Rgba16F,
    /// Four 32-bit float channels.
    Rgba32F,
    /// 16-bit depth.
    Depth16,
    /// 24-bit depth.
    Depth24,
    /// 32-bit float depth.
    Depth32F,
    /// 24-bit depth with 8-bit stencil.
    Depth24Stencil8,
}

impl TextureFormat {
    /// All texture formats.
    pub const ALL: [TextureFormat; 12] = [
        TextureFormat::R8,
        TextureFormat::Rg8,
        TextureFormat::Rgb8,
        TextureFormat::Rgba8,
        TextureFormat::R32F,
        TextureFormat::Rg32F,
        TextureFormat::Rgba16F,
        TextureFormat::Rgba32F,
        TextureFormat::Depth16,
        TextureFormat::Depth24,
        TextureFormat::Depth32F,
        TextureFormat::Depth24Stencil8,
    ];

    /// The size of one texel in bytes as uploaded from client memory.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rg8 => 2,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
            TextureFormat::R32F => 4,
            TextureFormat::Rg32F => 8,
            TextureFormat::Rgba16F => 8,
            TextureFormat::Rgba32F => 16,
            TextureFormat::Depth16 => 2,
            TextureFormat::Depth24 => 4,
            TextureFormat::Depth32F => 4,
            TextureFormat::Depth24Stencil8 => 4,
        }
    }

    /// Returns `true` for depth and depth-stencil formats.
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16
                | TextureFormat::Depth24
                | TextureFormat::Depth32F
                | TextureFormat::Depth24Stencil8
        )
    }

    /// Returns `true` if the format carries a stencil component.
    pub fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8)
    }
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureFilter {
    /// Nearest texel.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
    /// Nearest texel from the nearest mip.
    NearestMipmapNearest,
    /// Bilinear from the nearest mip.
    LinearMipmapNearest,
    /// Nearest texel, blended between mips.
    NearestMipmapLinear,
    /// Trilinear.
    LinearMipmapLinear,
}

impl TextureFilter {
    /// All texture filters.
    pub const ALL: [TextureFilter; 6] = [
        TextureFilter::Nearest,
        TextureFilter::Linear,
        TextureFilter::NearestMipmapNearest,
        TextureFilter::LinearMipmapNearest,
        TextureFilter::NearestMipmapLinear,
        TextureFilter::LinearMipmapLinear,
    ];

    /// The filter usable for magnification: mipmap variants collapse onto
    /// `Linear` or `Nearest` according to their texel filter.
    pub fn for_magnification(self) -> TextureFilter {
        match self {
            TextureFilter::Linear
            | TextureFilter::LinearMipmapNearest
            | TextureFilter::LinearMipmapLinear => TextureFilter::Linear,
            TextureFilter::Nearest
            | TextureFilter::NearestMipmapNearest
            | TextureFilter::NearestMipmapLinear => TextureFilter::Nearest,
        }
    }
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureWrap {
    /// Clamp to the edge texel.
    #[default]
    Clamp,
    /// Repeat.
    Repeat,
    /// Repeat, mirroring every other tile.
    MirroredRepeat,
}

impl TextureWrap {
    /// All wrap modes.
    pub const ALL: [TextureWrap; 3] = [
        TextureWrap::Clamp,
        TextureWrap::Repeat,
        TextureWrap::MirroredRepeat,
    ];
}

/// A texture parameter write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    /// Minification filter.
    MinFilter(TextureFilter),
    /// Magnification filter.
    MagFilter(TextureFilter),
    /// Wrapping along S/X.
    WrapS(TextureWrap),
    /// Wrapping along T/Y.
    WrapT(TextureWrap),
}

/// The binding point of a buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Vertex,
    /// Index data.
    Index,
}

impl BufferTarget {
    /// All buffer targets.
    pub const ALL: [BufferTarget; 2] = [BufferTarget::Vertex, BufferTarget::Index];
}

/// The update frequency hint of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BufferUsage {
    /// Written once.
    Static,
    /// Written occasionally.
    #[default]
    Default,
    /// Written every frame.
    Dynamic,
}

impl BufferUsage {
    /// All usages.
    pub const ALL: [BufferUsage; 3] = [BufferUsage::Static, BufferUsage::Default, BufferUsage::Dynamic];
}

/// The component type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexType {
    /// `i8`
    Byte,
    /// `u8`
    UnsignedByte,
    /// `i16`
    Short,
    /// `u16`
    UnsignedShort,
    /// `i32`
    Int,
    /// `u32`
    UnsignedInt,
    /// `f32`
    Float,
}

impl VertexType {
    /// All vertex component types.
    pub const ALL: [VertexType; 7] = [
        VertexType::Byte,
        VertexType::UnsignedByte,
        VertexType::Short,
        VertexType::UnsignedShort,
        VertexType::Int,
        VertexType::UnsignedInt,
        VertexType::Float,
    ];

    /// The size of one component in bytes.
    pub fn size(self) -> u32 {
        match self {
            VertexType::Byte | VertexType::UnsignedByte => 1,
            VertexType::Short | VertexType::UnsignedShort => 2,
            VertexType::Int | VertexType::UnsignedInt | VertexType::Float => 4,
        }
    }
}

/// A framebuffer binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FramebufferTarget {
    /// The read framebuffer (blit source).
    Read,
    /// The draw framebuffer (render target).
    Draw,
    /// Both read and draw.
    Both,
}

impl FramebufferTarget {
    /// All framebuffer targets.
    pub const ALL: [FramebufferTarget; 3] = [
        FramebufferTarget::Read,
        FramebufferTarget::Draw,
        FramebufferTarget::Both,
    ];
}

/// An attachment point of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FramebufferAttachment {
    /// The colour attachment with this index.
    Color(u32),
    /// The depth attachment.
    Depth,
    /// The combined depth-stencil attachment.
    DepthStencil,
}

impl FramebufferAttachment {
    /// The attachment a depth texture of `format` is attached to.
    pub fn for_depth_format(format: TextureFormat) -> Self {
        if format.has_stencil() {
            FramebufferAttachment::DepthStencil
        } else {
            FramebufferAttachment::Depth
        }
    }
}

/// The filter applied when a blit scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlitFilter {
    /// Nearest texel.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
}

impl BlitFilter {
    /// All blit filters.
    pub const ALL: [BlitFilter; 2] = [BlitFilter::Nearest, BlitFilter::Linear];
}

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl ShaderStage {
    /// All stages.
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];
}

/// A fixed-function toggle of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Blending.
    Blend,
    /// Depth testing.
    DepthTest,
    /// Face culling.
    CullFace,
    /// Scissor testing.
    ScissorTest,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Capability; 4] = [
        Capability::Blend,
        Capability::DepthTest,
        Capability::CullFace,
        Capability::ScissorTest,
    ];
}

raw_codes!(
    GraphicsBackendType,
    BlendFactor,
    BlendEquation,
    CompareFunction,
    Face,
    FrontFace,
    PolygonMode,
    PrimitiveTopology,
    IndexFormat,
    TextureTarget,
    TextureFormat,
    TextureFilter,
    TextureWrap,
    BufferTarget,
    BufferUsage,
    VertexType,
    FramebufferTarget,
    BlitFilter,
    ShaderStage,
    Capability,
);

ckgl_bitflags! {
    /// The buffers affected by a clear or a blit.
    pub struct ClearFlags: u32 {
        /// The colour buffer.
        const COLOR = 1 << 0;
        /// The depth buffer.
        const DEPTH = 1 << 1;
        /// The stencil buffer.
        const STENCIL = 1 << 2;
    }
}
