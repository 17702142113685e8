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

use super::warn_leak;
use crate::renderer::api::*;
use crate::renderer::context::RenderContext;
use crate::renderer::error::{RenderResult, ShaderError};
use crate::renderer::traits::GraphicsBackend;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct CachedUniform {
    location: UniformLocation,
    value: Option<UniformValue>,
}

/// A linked shader program with a per-uniform value cache.
///
/// Uniform values live in the program object, so the cache is per program and survives
/// across frames and rebinds.
#[derive(Debug)]
pub struct Shader {
    handle: ResourceHandle,
    uniforms: HashMap<String, CachedUniform>,
    destroyed: bool,
}

impl Shader {
    /// Compiles and links a program.
    pub fn new<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<Self> {
        let handle = ctx
            .backend_mut()
            .create_program(vertex_source, fragment_source)?;
        ctx.register(ResourceKind::Shader, handle);
        log::trace!("Linked program {handle}");
        Ok(Self {
            handle,
            uniforms: HashMap::new(),
            destroyed: false,
        })
    }

    /// Makes the program current.
    pub fn bind<B: GraphicsBackend>(&self, ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        ctx.use_program(Some(self.handle))
    }

    /// Returns `true` if the cache knows the program to be current.
    pub fn is_bound<B: GraphicsBackend>(&self, ctx: &RenderContext<B>) -> bool {
        ctx.bindings()
            .current(ResourceKind::Shader, 0)
            .is_some_and(|slot| slot.holds(self.handle))
    }

    /// Resolves the location of an active uniform, caching the lookup.
    /// ## Errors
    /// * `ShaderError::UniformNotFound` if the program has no active uniform `name`.
    pub fn uniform_location<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        name: &str,
    ) -> RenderResult<UniformLocation> {
        if let Some(cached) = self.uniforms.get(name) {
            return Ok(cached.location);
        }
        let location = ctx
            .backend_mut()
            .uniform_location(self.handle, name)?
            .ok_or_else(|| ShaderError::UniformNotFound {
                name: name.to_string(),
            })?;
        self.uniforms.insert(
            name.to_string(),
            CachedUniform {
                location,
                value: None,
            },
        );
        Ok(location)
    }

    /// Binds the program and writes a uniform, unless it already holds `value`.
    ///
    /// ## Returns
    /// `Ok(true)` if the write reached the backend and was counted as a uniform swap.
    pub fn set_uniform<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> RenderResult<bool> {
        let value = value.into();
        self.bind(ctx)?;
        let location = self.uniform_location(ctx, name)?;
        if self.cached_value(name) == Some(value) {
            return Ok(false);
        }
        ctx.emit_uniform(location, &value)?;
        if let Some(cached) = self.uniforms.get_mut(name) {
            cached.value = Some(value);
        }
        Ok(true)
    }

    fn cached_value(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).and_then(|cached| cached.value)
    }

    /// Releases the program from the cache and deletes it.
    pub fn destroy<B: GraphicsBackend>(mut self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.destroyed = true;
        ctx.release(ResourceKind::Shader, self.handle);
        ctx.backend_mut().delete_program(self.handle)
    }

    /// The driver name.
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if !self.destroyed {
            warn_leak(ResourceKind::Shader, self.handle);
        }
    }
}
