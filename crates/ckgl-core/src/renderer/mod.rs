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

//! Provides the render-state deduplication core.
//!
//! A draw first resolves the state it needs (program, textures, blend, depth, culling)
//! through the [`BindingCache`] and the [`StateTracker`]. They call into the
//! [`GraphicsBackend`] only when the cached value differs from the requested one, and every
//! call that does go through is counted by [`ChangeCounters`] for per-frame diagnostics.
//!
//! [`RenderContext`] ties one backend to its caches and is what the frame driver and the
//! resource wrappers in [`resources`] talk to.

pub mod api;
pub mod cache;
pub mod context;
pub mod error;
pub mod hooks;
pub mod resources;
pub mod stats;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use self::api::*;
pub use self::cache::{BindingCache, StateTracker};
pub use self::context::RenderContext;
pub use self::error::{RenderError, RenderResult, ResourceError, ShaderError};
pub use self::hooks::{ChangeEvent, ChangeSink, RenderHooks};
pub use self::stats::{ChangeCounters, FrameStats};
pub use self::traits::GraphicsBackend;
