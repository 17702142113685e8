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

//! Redundant-call elision for bindings and pipeline state.
//!
//! - [`BindingCache`]: which object is bound to which slot.
//! - [`StateTracker`]: the last-applied value of every pipeline state category.

mod binding;
mod state_tracker;

pub use self::binding::{BindingCache, DRAW_FRAMEBUFFER_SLOT, READ_FRAMEBUFFER_SLOT};
pub use self::state_tracker::StateTracker;
