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

use super::texture::{Texture, TextureSampler};
use super::warn_leak;
use crate::renderer::api::*;
use crate::renderer::cache::DRAW_FRAMEBUFFER_SLOT;
use crate::renderer::context::RenderContext;
use crate::renderer::error::{RenderResult, ResourceError};
use crate::renderer::traits::GraphicsBackend;

/// An off-screen render target: a framebuffer object with its colour textures and an
/// optional depth texture.
///
/// The framebuffer owns its textures and destroys all of them with itself.
#[derive(Debug)]
pub struct Framebuffer {
    handle: ResourceHandle,
    width: u32,
    height: u32,
    textures: Vec<Texture>,
    depth_texture: Option<Texture>,
    destroyed: bool,
}

impl Framebuffer {
    /// Creates a framebuffer with `color_textures` colour attachments and an optional depth
    /// attachment. The previously bound framebuffer is bound again afterwards.
    /// ## Errors
    /// * `ResourceError::InvalidAttachment` for zero or too many colour textures, a depth
    ///   colour format, or a non-depth depth format.
    /// * `ResourceError::IncompleteFramebuffer` if the driver rejects the combination.
    pub fn new<B: GraphicsBackend>(
        ctx: &mut RenderContext<B>,
        width: u32,
        height: u32,
        color_textures: usize,
        color_format: TextureFormat,
        depth_format: Option<TextureFormat>,
    ) -> RenderResult<Self> {
        let caps = *ctx.capabilities();
        if color_textures < 1 {
            return Err(ResourceError::InvalidAttachment(
                "a framebuffer needs at least one colour texture".into(),
            )
            .into());
        }
        let limit = caps.max_color_attachments.min(caps.max_draw_buffers);
        if color_textures > limit {
            return Err(ResourceError::InvalidAttachment(format!(
                "{color_textures} colour textures requested, the backend allows {limit}"
            ))
            .into());
        }
        if color_format.is_depth() {
            return Err(ResourceError::InvalidAttachment(format!(
                "colour format {color_format:?} is a depth format"
            ))
            .into());
        }
        if let Some(format) = depth_format.filter(|f| !f.is_depth()) {
            return Err(ResourceError::InvalidAttachment(format!(
                "depth format {format:?} is not a depth format"
            ))
            .into());
        }
        if width == 0 || height == 0 {
            return Err(ResourceError::InvalidDimensions { width, height }.into());
        }

        let previous = match ctx
            .bindings()
            .current(ResourceKind::Framebuffer, DRAW_FRAMEBUFFER_SLOT)
        {
            Some(SlotState::Bound { handle, .. }) => Some(handle),
            Some(SlotState::Unbound) => None,
            _ => ctx
                .backend_mut()
                .framebuffer_binding(FramebufferTarget::Draw)?,
        };
        let handle = ctx.backend_mut().create_framebuffer()?;
        ctx.register(ResourceKind::Framebuffer, handle);
        let mut framebuffer = Self {
            handle,
            width,
            height,
            textures: Vec::with_capacity(color_textures),
            depth_texture: None,
            destroyed: false,
        };

        let attached = framebuffer
            .attach(ctx, color_textures, color_format, depth_format)
            .and_then(|()| restore_binding(ctx, previous));
        if let Err(err) = attached {
            // Best effort: the attachment error is the one worth reporting.
            let _ = framebuffer.destroy(ctx);
            return Err(err);
        }
        log::trace!(
            "Created framebuffer {handle} ({width}x{height}, {color_textures} x {color_format:?}, depth {depth_format:?})"
        );
        Ok(framebuffer)
    }

    fn attach<B: GraphicsBackend>(
        &mut self,
        ctx: &mut RenderContext<B>,
        color_textures: usize,
        color_format: TextureFormat,
        depth_format: Option<TextureFormat>,
    ) -> RenderResult<()> {
        ctx.bind_framebuffer(FramebufferTarget::Both, Some(self.handle))?;
        for index in 0..color_textures {
            let texture = Texture::new_2d(
                ctx,
                self.width,
                self.height,
                color_format,
                None,
                TextureSampler::default(),
            )?;
            let texture_handle = texture.handle();
            self.textures.push(texture);
            // `index` is bounded by the attachment limit, far below `u32::MAX`.
            ctx.backend_mut().framebuffer_texture(
                FramebufferTarget::Both,
                FramebufferAttachment::Color(index as u32),
                TextureTarget::Texture2D,
                texture_handle,
            )?;
        }
        ctx.backend_mut().draw_buffers(color_textures)?;
        if let Some(format) = depth_format {
            let texture = Texture::new_2d(
                ctx,
                self.width,
                self.height,
                format,
                None,
                TextureSampler::default(),
            )?;
            let texture_handle = texture.handle();
            self.depth_texture = Some(texture);
            ctx.backend_mut().framebuffer_texture(
                FramebufferTarget::Both,
                FramebufferAttachment::for_depth_format(format),
                TextureTarget::Texture2D,
                texture_handle,
            )?;
        }
        ctx.backend_mut().framebuffer_status(FramebufferTarget::Both)
    }

    /// Binds the framebuffer as read and draw target and sets viewport and scissor to its size.
    pub fn bind<B: GraphicsBackend>(&self, ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        let changed = ctx.bind_framebuffer(FramebufferTarget::Both, Some(self.handle))?;
        let rect = self.rect();
        ctx.set_viewport(rect)?;
        ctx.set_scissor_rect(rect)?;
        Ok(changed)
    }

    /// Binds the default framebuffer and sets viewport and scissor to the window size.
    pub fn bind_default<B: GraphicsBackend>(ctx: &mut RenderContext<B>) -> RenderResult<bool> {
        let changed = ctx.bind_framebuffer(FramebufferTarget::Both, None)?;
        let rect = ctx.window_rect();
        ctx.set_viewport(rect)?;
        ctx.set_scissor_rect(rect)?;
        Ok(changed)
    }

    /// Returns `true` if the cache knows this framebuffer to be the draw target.
    pub fn is_bound<B: GraphicsBackend>(&self, ctx: &RenderContext<B>) -> bool {
        ctx.bindings()
            .current(ResourceKind::Framebuffer, DRAW_FRAMEBUFFER_SLOT)
            .is_some_and(|slot| slot.holds(self.handle))
    }

    /// Copies colour attachment `attachment` onto `dst` of `target` (`None` for the
    /// default framebuffer).
    ///
    /// Leaves this framebuffer bound for reading, `target` bound for drawing, the viewport
    /// covering `target` and the scissor test disabled.
    /// ## Errors
    /// * `RenderError::Unsupported` on backends without `glBlitFramebuffer`.
    /// * `ResourceError::InvalidAttachment` if there is no colour texture `attachment`.
    pub fn blit_to<B: GraphicsBackend>(
        &self,
        ctx: &mut RenderContext<B>,
        target: Option<&Framebuffer>,
        attachment: usize,
        filter: BlitFilter,
        dst: RectI,
    ) -> RenderResult<()> {
        ctx.require(ctx.capabilities().framebuffer_blit, "glBlitFramebuffer")?;
        if attachment >= self.textures.len() {
            return Err(ResourceError::InvalidAttachment(format!(
                "framebuffer {} has no colour texture {attachment}",
                self.handle
            ))
            .into());
        }
        ctx.set_scissor_test(false)?;
        ctx.bind_framebuffer(FramebufferTarget::Read, Some(self.handle))?;
        ctx.bind_framebuffer(FramebufferTarget::Draw, target.map(Framebuffer::handle))?;
        let viewport = match target {
            Some(target) => target.rect(),
            None => ctx.window_rect(),
        };
        ctx.set_viewport(viewport)?;
        // Bounded by the attachment limit.
        ctx.backend_mut().read_buffer(attachment as u32)?;
        ctx.backend_mut()
            .blit_framebuffer(self.rect(), dst, ClearFlags::COLOR, filter)?;
        ctx.record_blit();
        Ok(())
    }

    /// [`blit_to`](Self::blit_to) onto a rectangle of this framebuffer's size at the origin.
    pub fn blit_to_full<B: GraphicsBackend>(
        &self,
        ctx: &mut RenderContext<B>,
        target: Option<&Framebuffer>,
        attachment: usize,
        filter: BlitFilter,
    ) -> RenderResult<()> {
        self.blit_to(ctx, target, attachment, filter, self.rect())
    }

    /// Destroys the framebuffer, every colour texture and the depth texture.
    ///
    /// Every object is deleted even if an earlier deletion fails; the first error is returned.
    pub fn destroy<B: GraphicsBackend>(mut self, ctx: &mut RenderContext<B>) -> RenderResult<()> {
        self.destroyed = true;
        ctx.release(ResourceKind::Framebuffer, self.handle);
        let mut result = ctx.backend_mut().delete_framebuffer(self.handle);
        let textures = std::mem::take(&mut self.textures);
        for texture in textures.into_iter().chain(self.depth_texture.take()) {
            let destroyed = texture.destroy(ctx);
            if result.is_ok() {
                result = destroyed;
            }
        }
        result
    }

    /// The driver name.
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The rectangle covering the whole framebuffer.
    pub fn rect(&self) -> RectI {
        RectI::from_size(self.width, self.height)
    }

    /// Colour texture `index`.
    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.textures.get(index)
    }

    /// All colour textures, in attachment order.
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// The depth texture, if any.
    pub fn depth_texture(&self) -> Option<&Texture> {
        self.depth_texture.as_ref()
    }
}

/// Rebinds the framebuffer that was current before construction. A name the cache does
/// not know belongs to foreign code: it is bound directly and the cache forgets both slots.
fn restore_binding<B: GraphicsBackend>(
    ctx: &mut RenderContext<B>,
    previous: Option<ResourceHandle>,
) -> RenderResult<()> {
    match previous {
        Some(handle) if !ctx.bindings().is_live(ResourceKind::Framebuffer, handle) => {
            ctx.backend_mut()
                .bind_framebuffer(FramebufferTarget::Both, Some(handle))?;
            ctx.forget_bindings(ResourceKind::Framebuffer);
        }
        _ => {
            ctx.bind_framebuffer(FramebufferTarget::Both, previous)?;
        }
    }
    Ok(())
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        if !self.destroyed {
            warn_leak(ResourceKind::Framebuffer, self.handle);
        }
    }
}
