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

//! Listeners notified around every non-elided change.

use crate::renderer::api::{ResourceKind, StateCategory};
use crate::renderer::error::RenderResult;
use crate::renderer::stats::ChangeCounters;
use std::fmt;

/// What kind of change is about to happen, or has just happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// A resource of this kind is being bound to a slot.
    Bind(ResourceKind),
    /// A pipeline state category is being transitioned.
    State(StateCategory),
    /// A uniform is being written.
    Uniform,
}

type Listener = Box<dyn FnMut(ChangeEvent)>;

/// Registered "changing" and "changed" listeners.
///
/// Listeners run synchronously on the rendering thread, only for operations that actually
/// reach the backend.
#[derive(Default)]
pub struct RenderHooks {
    changing: Vec<Listener>,
    changed: Vec<Listener>,
}

impl RenderHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener invoked right before the backend primitive.
    pub fn on_changing(&mut self, listener: impl FnMut(ChangeEvent) + 'static) {
        self.changing.push(Box::new(listener));
    }

    /// Registers a listener invoked right after the backend primitive succeeded.
    pub fn on_changed(&mut self, listener: impl FnMut(ChangeEvent) + 'static) {
        self.changed.push(Box::new(listener));
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.changing.clear();
        self.changed.clear();
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.changing.is_empty() && self.changed.is_empty()
    }

    fn fire_changing(&mut self, event: ChangeEvent) {
        for listener in &mut self.changing {
            listener(event);
        }
    }

    fn fire_changed(&mut self, event: ChangeEvent) {
        for listener in &mut self.changed {
            listener(event);
        }
    }
}

impl fmt::Debug for RenderHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHooks")
            .field("changing", &self.changing.len())
            .field("changed", &self.changed.len())
            .finish()
    }
}

/// Brackets an emitted primitive with the hooks and the matching counter.
///
/// The caches receive a sink for every operation and call [`emit`](Self::emit) only after
/// deciding the operation cannot be elided.
pub struct ChangeSink<'a> {
    counters: &'a mut ChangeCounters,
    hooks: &'a mut RenderHooks,
    trace: bool,
}

impl<'a> ChangeSink<'a> {
    /// Builds a sink over `counters` and `hooks`.
    pub fn new(counters: &'a mut ChangeCounters, hooks: &'a mut RenderHooks) -> Self {
        Self {
            counters,
            hooks,
            trace: false,
        }
    }

    /// Logs every emitted change at `trace` level.
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Fires the changing hooks, runs `primitive`, then counts the change and fires the
    /// changed hooks. Nothing is counted if `primitive` fails.
    pub fn emit<F>(&mut self, event: ChangeEvent, primitive: F) -> RenderResult<()>
    where
        F: FnOnce() -> RenderResult<()>,
    {
        self.hooks.fire_changing(event);
        primitive()?;
        match event {
            ChangeEvent::Bind(kind) => self.counters.record_swap(kind),
            ChangeEvent::State(_) => self.counters.record_state_change(),
            ChangeEvent::Uniform => self.counters.record_uniform_swap(),
        }
        if self.trace {
            log::trace!("Emitted {event:?}");
        }
        self.hooks.fire_changed(event);
        Ok(())
    }

    /// Read access to the counters being incremented.
    pub fn counters(&self) -> &ChangeCounters {
        self.counters
    }
}
