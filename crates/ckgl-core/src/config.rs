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

//! Renderer configuration.

use crate::renderer::api::{BackendCapabilities, GraphicsBackendType, PipelineState, PolygonMode};
use crate::renderer::error::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};

/// Settings a [`RenderContext`](crate::renderer::RenderContext) is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// The backend family the context expects to drive.
    pub backend: GraphicsBackendType,
    /// The pipeline state restored by every reset.
    pub baseline: PipelineState,
    /// Initial size of the default framebuffer, in pixels.
    pub window_size: (u32, u32),
    /// If `true`, every emitted change is logged at `trace` level.
    pub trace_changes: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: GraphicsBackendType::OpenGL,
            baseline: PipelineState::default(),
            window_size: (1280, 720),
            trace_changes: false,
        }
    }
}

impl RendererConfig {
    /// Parses a configuration from JSON. Missing fields take their default.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::InvalidConfig(e.to_string()))
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> RenderResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RenderError::InvalidConfig(e.to_string()))
    }

    /// Checks the configuration against the capabilities of the backend it will drive.
    pub fn validate(&self, capabilities: &BackendCapabilities) -> RenderResult<()> {
        if self.backend != capabilities.backend {
            return Err(RenderError::InvalidConfig(format!(
                "configured for {:?} but the backend is {:?}",
                self.backend, capabilities.backend
            )));
        }
        if self.window_size.0 == 0 || self.window_size.1 == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "window size {}x{} is empty",
                self.window_size.0, self.window_size.1
            )));
        }
        let baseline = &self.baseline;
        if baseline.polygon_mode.0 != PolygonMode::Fill && !capabilities.polygon_mode {
            return Err(RenderError::InvalidConfig(format!(
                "baseline polygon mode {:?} is not available on {:?}",
                baseline.polygon_mode.0, capabilities.backend
            )));
        }
        if baseline.blend.uses_min_max() && !capabilities.blend_min_max {
            return Err(RenderError::InvalidConfig(format!(
                "baseline blend equations are not available on {:?}",
                capabilities.backend
            )));
        }
        if !(0.0..=1.0).contains(&baseline.clear_depth) {
            return Err(RenderError::InvalidConfig(format!(
                "baseline clear depth {} is outside [0, 1]",
                baseline.clear_depth
            )));
        }
        Ok(())
    }
}
