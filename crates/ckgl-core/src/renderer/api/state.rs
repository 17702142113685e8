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

//! Pipeline state values.
//!
//! Every value here is immutable and compared structurally: two independently built but
//! field-equal values are the same state, and applying the second one is a no-op.

use super::enums::{
    BlendEquation, BlendFactor, CompareFunction, Face, FrontFace, PolygonMode,
};
use crate::ckgl_bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The blend configuration of the colour output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendState {
    /// Whether blending is enabled at all.
    pub enabled: bool,
    /// Source factor for the RGB channels.
    pub color_src: BlendFactor,
    /// Source factor for the alpha channel.
    pub alpha_src: BlendFactor,
    /// Destination factor for the RGB channels.
    pub color_dst: BlendFactor,
    /// Destination factor for the alpha channel.
    pub alpha_dst: BlendFactor,
    /// Equation for the RGB channels.
    pub color_equation: BlendEquation,
    /// Equation for the alpha channel.
    pub alpha_equation: BlendEquation,
}

impl BlendState {
    /// Blending disabled.
    pub const NONE: BlendState = BlendState::disabled();
    /// Source replaces destination.
    pub const OPAQUE: BlendState = BlendState::new(true, BlendFactor::One, BlendFactor::Zero);
    /// Classic non-premultiplied alpha blending.
    pub const ALPHA_BLEND: BlendState = BlendState::new(
        true,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
    );
    /// Alpha-weighted additive blending.
    pub const ADDITIVE: BlendState = BlendState::new(true, BlendFactor::SrcAlpha, BlendFactor::One);
    /// Darkens the destination by the source colour.
    pub const SUBTRACTIVE: BlendState = BlendState::new(
        true,
        BlendFactor::Zero,
        BlendFactor::OneMinusSrcColor,
    );

    /// The same factors for colour and alpha, additive equations.
    pub const fn new(enabled: bool, src: BlendFactor, dst: BlendFactor) -> Self {
        Self::separate(enabled, src, dst, src, dst)
    }

    /// Distinct colour and alpha factors, additive equations.
    pub const fn separate(
        enabled: bool,
        color_src: BlendFactor,
        color_dst: BlendFactor,
        alpha_src: BlendFactor,
        alpha_dst: BlendFactor,
    ) -> Self {
        Self {
            enabled,
            color_src,
            alpha_src,
            color_dst,
            alpha_dst,
            color_equation: BlendEquation::Add,
            alpha_equation: BlendEquation::Add,
        }
    }

    /// Blending off, with the GL default factors.
    pub const fn disabled() -> Self {
        Self::new(false, BlendFactor::One, BlendFactor::Zero)
    }

    /// Returns a copy using `equation` on both colour and alpha.
    #[must_use]
    pub const fn with_equation(self, equation: BlendEquation) -> Self {
        self.with_equations(equation, equation)
    }

    /// Returns a copy with separate colour and alpha equations.
    #[must_use]
    pub const fn with_equations(self, color: BlendEquation, alpha: BlendEquation) -> Self {
        Self {
            color_equation: color,
            alpha_equation: alpha,
            ..self
        }
    }

    /// Returns `true` if colour and alpha use the same source and destination factors.
    pub fn factors_shared(&self) -> bool {
        self.color_src == self.alpha_src && self.color_dst == self.alpha_dst
    }

    /// Returns `true` if colour and alpha use the same equation.
    pub fn equations_shared(&self) -> bool {
        self.color_equation == self.alpha_equation
    }

    /// Returns `true` if either equation is `Min` or `Max`.
    pub fn uses_min_max(&self) -> bool {
        self.color_equation.is_min_max() || self.alpha_equation.is_min_max()
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::NONE
    }
}

/// The depth-test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthState {
    /// Whether depth testing is enabled.
    pub enabled: bool,
    /// The comparison applied when enabled.
    pub function: CompareFunction,
}

impl DepthState {
    /// Depth testing disabled.
    pub const NONE: DepthState = DepthState::new(false, CompareFunction::Less);
    /// Standard "closer wins" testing.
    pub const LESS: DepthState = DepthState::new(true, CompareFunction::Less);
    /// "Closer or equal wins", for multi-pass rendering.
    pub const LESS_EQUAL: DepthState = DepthState::new(true, CompareFunction::LessEqual);

    /// Builds a depth state.
    pub const fn new(enabled: bool, function: CompareFunction) -> Self {
        Self { enabled, function }
    }
}

impl Default for DepthState {
    fn default() -> Self {
        Self::NONE
    }
}

/// The face-culling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CullModeState {
    /// Whether culling is enabled.
    pub enabled: bool,
    /// The faces discarded when enabled.
    pub face: Face,
}

impl CullModeState {
    /// Culling disabled.
    pub const NONE: CullModeState = CullModeState::new(false, Face::Back);
    /// Back faces are culled.
    pub const BACK: CullModeState = CullModeState::new(true, Face::Back);
    /// Front faces are culled.
    pub const FRONT: CullModeState = CullModeState::new(true, Face::Front);

    /// Builds a cull mode.
    pub const fn new(enabled: bool, face: Face) -> Self {
        Self { enabled, face }
    }
}

impl Default for CullModeState {
    fn default() -> Self {
        Self::NONE
    }
}

/// The winding considered front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrontFaceState(pub FrontFace);

/// The rasterization mode of polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PolygonModeState(pub PolygonMode);

ckgl_bitflags! {
    /// The colour channels written by draws.
    pub struct ColorMask: u8 {
        /// Red.
        const R = 1 << 0;
        /// Green.
        const G = 1 << 1;
        /// Blue.
        const B = 1 << 2;
        /// Alpha.
        const A = 1 << 3;
        /// Every channel.
        const ALL = 0b1111;
    }
}

impl ColorMask {
    /// The mask as per-channel booleans in RGBA order.
    pub fn channels(self) -> [bool; 4] {
        [
            self.contains(ColorMask::R),
            self.contains(ColorMask::G),
            self.contains(ColorMask::B),
            self.contains(ColorMask::A),
        ]
    }
}

impl Serialize for ColorMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for ColorMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        ColorMask::from_bits(bits)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour mask bits {bits:#06b}")))
    }
}

/// The colour write mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorMaskState(pub ColorMask);

impl Default for ColorMaskState {
    fn default() -> Self {
        Self(ColorMask::ALL)
    }
}

/// Whether depth writes are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthMaskState(pub bool);

impl Default for DepthMaskState {
    fn default() -> Self {
        Self(true)
    }
}

/// A linear RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// Cornflower blue.
    pub const CORNFLOWER_BLUE: Color = Color::rgba(0.392, 0.584, 0.929, 1.0);

    /// Builds a colour from its components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// An integer rectangle in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectI {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl RectI {
    /// Builds a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Right edge (exclusive).
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Top edge (exclusive).
    pub const fn top(&self) -> i32 {
        self.y + self.height
    }
}

/// The scissor rectangle and whether the scissor test is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScissorState {
    /// Whether the scissor test is enabled.
    pub enabled: bool,
    /// The scissor rectangle.
    pub rect: RectI,
}

impl ScissorState {
    /// Builds a scissor state.
    pub const fn new(enabled: bool, rect: RectI) -> Self {
        Self { enabled, rect }
    }
}

/// The mapping of normalized depth onto window depth. Both ends lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    /// Window depth of the near plane.
    pub near: f32,
    /// Window depth of the far plane.
    pub far: f32,
}

impl DepthRange {
    /// Builds a depth range, clamping both ends into `[0, 1]`.
    pub fn new(near: f32, far: f32) -> Self {
        Self {
            near: clamp_unit(near),
            far: clamp_unit(far),
        }
    }

    /// Returns a copy with both ends clamped into `[0, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.near, self.far)
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: 1.0,
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// The categories of pipeline state the tracker caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateCategory {
    /// [`BlendState`].
    Blend,
    /// [`DepthState`].
    Depth,
    /// [`CullModeState`].
    CullMode,
    /// [`FrontFaceState`].
    FrontFace,
    /// [`PolygonModeState`].
    PolygonMode,
    /// [`ColorMaskState`].
    ColorMask,
    /// [`DepthMaskState`].
    DepthMask,
    /// The clear colour.
    ClearColor,
    /// The clear depth.
    ClearDepth,
    /// The viewport rectangle.
    Viewport,
    /// [`ScissorState`].
    Scissor,
    /// [`DepthRange`].
    DepthRange,
}

impl StateCategory {
    /// All tracked categories.
    pub const ALL: [StateCategory; 12] = [
        StateCategory::Blend,
        StateCategory::Depth,
        StateCategory::CullMode,
        StateCategory::FrontFace,
        StateCategory::PolygonMode,
        StateCategory::ColorMask,
        StateCategory::DepthMask,
        StateCategory::ClearColor,
        StateCategory::ClearDepth,
        StateCategory::Viewport,
        StateCategory::Scissor,
        StateCategory::DepthRange,
    ];

    /// The number of categories.
    pub const COUNT: usize = Self::ALL.len();

    /// The position of this category in [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A full snapshot of the window-independent pipeline state.
///
/// The `Default` value is the baseline restored by a reset. Viewport and scissor rectangles
/// follow the window size and are not part of the baseline; only the scissor test toggle is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineState {
    /// Blend configuration.
    pub blend: BlendState,
    /// Depth-test configuration.
    pub depth: DepthState,
    /// Face culling.
    pub cull_mode: CullModeState,
    /// Front-facing winding.
    pub front_face: FrontFaceState,
    /// Polygon rasterization mode.
    pub polygon_mode: PolygonModeState,
    /// Colour write mask.
    pub color_mask: ColorMaskState,
    /// Depth write mask.
    pub depth_mask: DepthMaskState,
    /// Colour used by colour clears.
    pub clear_color: Color,
    /// Depth used by depth clears.
    pub clear_depth: f32,
    /// Depth range mapping.
    pub depth_range: DepthRange,
    /// Whether the scissor test is enabled.
    pub scissor_test: bool,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            blend: BlendState::NONE,
            depth: DepthState::NONE,
            cull_mode: CullModeState::NONE,
            front_face: FrontFaceState(FrontFace::CounterClockwise),
            polygon_mode: PolygonModeState(PolygonMode::Fill),
            color_mask: ColorMaskState(ColorMask::ALL),
            depth_mask: DepthMaskState(true),
            clear_color: Color::TRANSPARENT,
            clear_depth: 1.0,
            depth_range: DepthRange::default(),
            scissor_test: false,
        }
    }
}
