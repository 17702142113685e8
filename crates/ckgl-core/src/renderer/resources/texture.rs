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
use crate::renderer::error::{RenderError, RenderResult, ResourceError};
use crate::renderer::traits::GraphicsBackend;

/// Sampling parameters applied when a texture is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureSampler {
    /// Minification filter.
    pub min_filter: TextureFilter,
    /// Magnification filter. Mipmap variants collapse to `Linear` or `Nearest`.
    pub mag_filter: TextureFilter,
    /// Wrapping along X.
    pub wrap_x: TextureWrap,
    /// Wrapping along Y.
    pub wrap_y: TextureWrap,
}

impl TextureSampler {
    /// Same filter on both axes, same wrap on both axes.
    pub fn new(filter: TextureFilter, wrap: TextureWrap) -> Self {
        Self {
            min_filter: filter,
            mag_filter: filter.for_magnification(),
            wrap_x: wrap,
            wrap_y: wrap,
        }
    }
}

/// A texture object and its sampling parameters.
///
/// Uploads and parameter setters bind the texture to unit 0 and make that unit active
/// first. Setters skip the driver call when the parameter already has the requested value.
#[derive(Debug)]
pub struct Texture {
    handle: ResourceHandle,
    target: TextureTarget,
    width: u32,
    height: u32,
    format: TextureFormat,
    sampler: TextureSampler,
    destroyed: bool,
}

impl Texture {
    /// Creates a two-dimensional texture.
    /// ## Arguments
    /// * `data` - Tightly packed texels covering the whole texture, or `None`.
    /// ## Errors
    /// * `ResourceError::InvalidDimensions` for an empty extent.
    /// * `ResourceError::InsufficientData` if `data` is shorter than
    ///   `width * height * format.bytes_per_pixel()`.
    pub fn new_2d<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        sampler: TextureSampler,
    ) -> RenderResult<Self> {
        Self::create(ctx, TextureTarget::Texture2D, width, height, format, data, sampler)
    }

    /// Creates a one-dimensional texture. Only desktop OpenGL has them.
    pub fn new_1d<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        width: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        sampler: TextureSampler,
    ) -> RenderResult<Self> {
        Self::create(ctx, TextureTarget::Texture1D, width, 1, format, data, sampler)
    }

    fn create<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        target: TextureTarget,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        sampler: TextureSampler,
    ) -> RenderResult<Self> {
        if !ctx.capabilities().supports_texture_target(target) {
            return Err(RenderError::unsupported(
                "One-dimensional textures",
                ctx.capabilities().backend,
            ));
        }
        if width == 0 || height == 0 {
            return Err(ResourceError::InvalidDimensions { width, height }.into());
        }
        if let Some(data) = data {
            let expected = width as usize * height as usize * format.bytes_per_pixel();
            if data.len() < expected {
                return Err(ResourceError::InsufficientData {
                    expected,
                    actual: data.len(),
                }
                .into());
            }
        }

        let handle = ctx.backend_mut().create_texture()?;
        ctx.register(ResourceKind::Texture, handle);
        let mut texture = Self {
            handle,
            target,
            width,
            height,
            format,
            sampler: TextureSampler::default(),
            destroyed: false,
        };
        if let Err(err) = texture.upload(ctx, data, sampler) {
            // Best effort: the upload error is the one worth reporting.
            let _ = texture.destroy(ctx);
            return Err(err);
        }
        log::trace!("Created {target:?} texture {handle} ({width}x{height} {format:?})");
        Ok(texture)
    }

    fn upload<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        data: Option<&[u8]>,
        sampler: TextureSampler,
    ) -> RenderResult<()> {
        self.bind_for_update(ctx)?;
        ctx.backend_mut()
            .texture_image_2d(self.target, self.width, self.height, self.format, data)?;
        self.write_parameter(ctx, TextureParameter::MinFilter(sampler.min_filter))?;
        self.write_parameter(
            ctx,
            TextureParameter::MagFilter(sampler.mag_filter.for_magnification()),
        )?;
        self.write_parameter(ctx, TextureParameter::WrapS(sampler.wrap_x))?;
        self.write_parameter(ctx, TextureParameter::WrapT(sampler.wrap_y))
    }

    /// Binds the texture to texture unit `unit`.
    pub fn bind<B: GraphicsBackend>(
        &self,
        ctx: &mut RenderContext<B>,
        unit: usize,
    ) -> RenderResult<bool> {
        ctx.bind_texture(unit, self.target, Some(self.handle))
    }

    /// Binds to unit 0 and makes it active. The bind alone is not enough: when it is elided,
    /// another unit may still be active from a later bind.
    fn bind_for_update<B: GraphicsBackend>(&self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.bind(ctx, 0)?;
        ctx.select_texture_unit(0)?;
        Ok(())
    }

    /// Returns `true` if the cache knows the texture to be bound to `unit`.
    pub fn is_bound<B: GraphicsBackend>(&self, ctx: &RenderContext<B>, unit: usize) -> bool {
        ctx.bindings()
            .current(ResourceKind::Texture, unit)
            .is_some_and(|slot| slot.holds(self.handle))
    }

    /// Sets both the minification and the magnification filter.
    pub fn set_filter<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        filter: TextureFilter,
    ) -> RenderResult<()> {
        self.set_min_filter(ctx, filter)?;
        self.set_mag_filter(ctx, filter)
    }

    /// Sets the minification filter.
    pub fn set_min_filter<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        filter: TextureFilter,
    ) -> RenderResult<()> {
        if self.sampler.min_filter == filter {
            return Ok(());
        }
        self.write_parameter(ctx, TextureParameter::MinFilter(filter))
    }

    /// Sets the magnification filter. Mipmap variants collapse to `Linear` or `Nearest`.
    pub fn set_mag_filter<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        filter: TextureFilter,
    ) -> RenderResult<()> {
        let filter = filter.for_magnification();
        if self.sampler.mag_filter == filter {
            return Ok(());
        }
        self.write_parameter(ctx, TextureParameter::MagFilter(filter))
    }

    /// Sets the wrap mode on both axes.
    pub fn set_wrap<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        wrap: TextureWrap,
    ) -> RenderResult<()> {
        self.set_wrap_x(ctx, wrap)?;
        self.set_wrap_y(ctx, wrap)
    }

    /// Sets the wrap mode along X.
    pub fn set_wrap_x<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        wrap: TextureWrap,
    ) -> RenderResult<()> {
        if self.sampler.wrap_x == wrap {
            return Ok(());
        }
        self.write_parameter(ctx, TextureParameter::WrapS(wrap))
    }

    /// Sets the wrap mode along Y.
    pub fn set_wrap_y<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        wrap: TextureWrap,
    ) -> RenderResult<()> {
        if self.sampler.wrap_y == wrap {
            return Ok(());
        }
        self.write_parameter(ctx, TextureParameter::WrapT(wrap))
    }

    fn write_parameter<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        parameter: TextureParameter,
    ) -> RenderResult<()> {
        self.bind_for_update(ctx)?;
        ctx.backend_mut().texture_parameter(self.target, parameter)?;
        match parameter {
            TextureParameter::MinFilter(f) => self.sampler.min_filter = f,
            TextureParameter::MagFilter(f) => self.sampler.mag_filter = f,
            TextureParameter::WrapS(w) => self.sampler.wrap_x = w,
            TextureParameter::WrapT(w) => self.sampler.wrap_y = w,
        }
        Ok(())
    }

    /// Releases the texture from every slot and deletes it.
    pub fn destroy<B: GraphicsBackend>(mut self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.destroyed = true;
        ctx.release(ResourceKind::Texture, self.handle);
        ctx.backend_mut().delete_texture(self.handle)
    }

    /// The driver name.
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    /// The bind target.
    pub fn target(&self) -> TextureTarget {
        self.target
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The storage format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// The current sampling parameters.
    pub fn sampler(&self) -> TextureSampler {
        self.sampler
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if !self.destroyed {
            warn_leak(ResourceKind::Texture, self.handle);
        }
    }
}
