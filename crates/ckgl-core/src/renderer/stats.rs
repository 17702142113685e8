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

//! Per-frame change counters.

use crate::renderer::api::ResourceKind;
use std::fmt;

/// Counts the non-elided operations of the current frame.
///
/// Every real bind, state transition, uniform write, draw and blit increments exactly one
/// counter. Elided operations increment nothing. The frame driver calls
/// [`pre_draw`](Self::pre_draw) once per frame to start over; only the cache contents,
/// not the counters, survive across frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeCounters {
    swaps: [u32; ResourceKind::COUNT],
    uniform_swaps: u32,
    state_changes: u32,
    draw_calls: u32,
    blits: u32,
    frame: u64,
}

impl ChangeCounters {
    /// Creates zeroed counters at frame 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter and advances the frame number.
    pub fn pre_draw(&mut self) {
        *self = Self {
            frame: self.frame.wrapping_add(1),
            ..Self::default()
        };
    }

    /// Total binding swaps over every resource kind.
    pub fn swaps(&self) -> u32 {
        self.swaps.iter().sum()
    }

    /// Binding swaps of one resource kind.
    pub fn swaps_of(&self, kind: ResourceKind) -> u32 {
        self.swaps[kind.index()]
    }

    /// Uniform writes that reached the backend.
    pub fn uniform_swaps(&self) -> u32 {
        self.uniform_swaps
    }

    /// Pipeline state transitions that reached the backend.
    pub fn state_changes(&self) -> u32 {
        self.state_changes
    }

    /// Draw calls issued.
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    /// Framebuffer blits issued.
    pub fn blits(&self) -> u32 {
        self.blits
    }

    /// The number of `pre_draw` calls so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Copies the counters into a plain value for overlays and logs.
    pub fn snapshot(&self) -> FrameStats {
        FrameStats {
            frame: self.frame,
            swaps: self.swaps(),
            texture_swaps: self.swaps_of(ResourceKind::Texture),
            shader_swaps: self.swaps_of(ResourceKind::Shader),
            framebuffer_swaps: self.swaps_of(ResourceKind::Framebuffer),
            uniform_swaps: self.uniform_swaps,
            state_changes: self.state_changes,
            draw_calls: self.draw_calls,
            blits: self.blits,
        }
    }

    pub(crate) fn record_swap(&mut self, kind: ResourceKind) {
        self.swaps[kind.index()] += 1;
    }

    pub(crate) fn record_uniform_swap(&mut self) {
        self.uniform_swaps += 1;
    }

    pub(crate) fn record_state_change(&mut self) {
        self.state_changes += 1;
    }

    pub(crate) fn record_draw_call(&mut self) {
        self.draw_calls += 1;
    }

    pub(crate) fn record_blit(&mut self) {
        self.blits += 1;
    }
}

/// A copy of the counters of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// The frame number.
    pub frame: u64,
    /// Total binding swaps.
    pub swaps: u32,
    /// Texture binding swaps.
    pub texture_swaps: u32,
    /// Program binding swaps.
    pub shader_swaps: u32,
    /// Framebuffer binding swaps.
    pub framebuffer_swaps: u32,
    /// Uniform writes.
    pub uniform_swaps: u32,
    /// Pipeline state transitions.
    pub state_changes: u32,
    /// Draw calls.
    pub draw_calls: u32,
    /// Blits.
    pub blits: u32,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} | swaps {} (tex {}, shader {}, fb {}) | uniforms {} | state {} | draws {} | blits {}",
            self.frame,
            self.swaps,
            self.texture_swaps,
            self.shader_swaps,
            self.framebuffer_swaps,
            self.uniform_swaps,
            self.state_changes,
            self.draw_calls,
            self.blits,
        )
    }
}
