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

//! The OpenGL backend, built on `glow`.
//!
//! Every primitive of [`GraphicsBackend`] maps to exactly one GL entry point (plus the
//! `glActiveTexture` a texture bind needs), so the call counts observed by the caches match
//! what the driver receives.

use std::fmt;
use std::num::NonZeroU32;

use anyhow::{bail, Result};
use glow::HasContext;

use ckgl_core::renderer::api::{
    BackendCapabilities, BackendLimits, BlendEquation, BlendFactor, BlitFilter, BufferTarget,
    BufferUsage, Capability, ClearFlags, Color, ColorMask, CompareFunction, DepthRange, Face,
    FramebufferAttachment, FramebufferTarget, FrontFace, GraphicsBackendType, IndexFormat,
    PolygonMode, PrimitiveTopology, RectI, ResourceHandle, ResourceKind, ShaderStage,
    TextureFormat, TextureParameter, TextureTarget, UniformLocation, UniformValue,
    VertexAttribute,
};
use ckgl_core::renderer::{
    GraphicsBackend, RenderError, RenderResult, ResourceError, ShaderError,
};

use super::conversions::{framebuffer_status_name, texture_format, IntoGl};

/// A [`GraphicsBackend`] over a native `glow` context.
///
/// The wrapped context must be current on the calling thread for every call. All `unsafe`
/// blocks below rely on that, and on handles only ever coming from this context.
pub struct GlowBackend {
    gl: glow::Context,
    capabilities: BackendCapabilities,
}

impl GlowBackend {
    /// Loads the GL entry points and wraps the resulting context.
    ///
    /// ## Arguments
    /// * `loader` - Resolves a GL function name to its address, e.g. from the windowing layer.
    ///
    /// ## Errors
    /// Fails if the driver is older than OpenGL 3.3 or OpenGL ES 3.0.
    ///
    /// # Safety
    /// `loader` must return valid function pointers for a context that is current on this
    /// thread.
    pub unsafe fn load<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        let version = gl.version();
        let (required_major, required_minor) = if version.is_embedded { (3, 0) } else { (3, 3) };
        if (version.major, version.minor) < (required_major, required_minor) {
            bail!(
                "OpenGL{} {}.{} is too old, {required_major}.{required_minor} is required",
                if version.is_embedded { " ES" } else { "" },
                version.major,
                version.minor
            );
        }
        Ok(Self::new(gl))
    }

    /// Wraps an already loaded context. The backend family is read from its version string.
    pub fn new(gl: glow::Context) -> Self {
        let backend = if gl.version().is_embedded {
            GraphicsBackendType::OpenGLES
        } else {
            GraphicsBackendType::OpenGL
        };
        Self::with_backend(gl, backend)
    }

    /// Wraps an already loaded context that is known to be of family `backend`.
    pub fn with_backend(gl: glow::Context, backend: GraphicsBackendType) -> Self {
        let limits = unsafe { query_limits(&gl, backend) };
        let capabilities = BackendCapabilities::for_backend(backend, limits);
        unsafe {
            log::info!(
                "OpenGL backend: {} / {} ({})",
                gl.get_parameter_string(glow::VENDOR),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VERSION)
            );
            // Texture rows are tightly packed.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }
        log::info!("Capabilities: {capabilities:?}");
        Self { gl, capabilities }
    }

    /// The wrapped context, for code outside the caches.
    ///
    /// State changed through it is invisible to the caches; invalidate the render context
    /// afterwards.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn check_error(&self, operation: &str) -> RenderResult<()> {
        let code = unsafe { self.gl.get_error() };
        if code == glow::NO_ERROR {
            Ok(())
        } else {
            Err(RenderError::Backend(format!(
                "{operation} raised GL error {code:#06x}"
            )))
        }
    }
}

impl fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowBackend")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

unsafe fn query_limits(gl: &glow::Context, backend: GraphicsBackendType) -> BackendLimits {
    let query = |parameter: u32| {
        let value = unsafe { gl.get_parameter_i32(parameter) };
        usize::try_from(value).unwrap_or(0).max(1)
    };
    // WebGL 1 has neither multiple render targets nor the queries for them.
    let (max_draw_buffers, max_color_attachments) = if backend == GraphicsBackendType::WebGL {
        (1, 1)
    } else {
        (
            query(glow::MAX_DRAW_BUFFERS),
            query(glow::MAX_COLOR_ATTACHMENTS),
        )
    };
    BackendLimits {
        max_texture_units: query(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
        max_draw_buffers,
        max_color_attachments,
        max_vertex_attributes: query(glow::MAX_VERTEX_ATTRIBS),
    }
}

fn creation_failed(kind: ResourceKind) -> impl FnOnce(String) -> RenderError {
    move |details| ResourceError::CreationFailed { kind, details }.into()
}

fn gl_i32<T>(value: T, what: &str) -> RenderResult<i32>
where
    T: TryInto<i32> + Copy + fmt::Display,
{
    value
        .try_into()
        .map_err(|_| RenderError::Backend(format!("{what} {value} exceeds the GL integer range")))
}

fn from_native(raw: NonZeroU32) -> ResourceHandle {
    ResourceHandle::from_non_zero(raw)
}

fn texture(handle: ResourceHandle) -> glow::NativeTexture {
    glow::NativeTexture(handle.non_zero())
}

fn program(handle: ResourceHandle) -> glow::NativeProgram {
    glow::NativeProgram(handle.non_zero())
}

fn framebuffer(handle: ResourceHandle) -> glow::NativeFramebuffer {
    glow::NativeFramebuffer(handle.non_zero())
}

fn vertex_array(handle: ResourceHandle) -> glow::NativeVertexArray {
    glow::NativeVertexArray(handle.non_zero())
}

fn buffer(handle: ResourceHandle) -> glow::NativeBuffer {
    glow::NativeBuffer(handle.non_zero())
}

impl GraphicsBackend for GlowBackend {
    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    // --- Textures ---

    fn create_texture(&mut self) -> RenderResult<ResourceHandle> {
        let native = unsafe { self.gl.create_texture() }
            .map_err(creation_failed(ResourceKind::Texture))?;
        Ok(from_native(native.0))
    }

    fn delete_texture(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        unsafe { self.gl.delete_texture(texture(handle)) };
        Ok(())
    }

    fn texture_image_2d(
        &mut self,
        target: TextureTarget,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> RenderResult<()> {
        let gl_format = texture_format(format, self.capabilities.backend);
        let width = gl_i32(width, "texture width")?;
        let height = gl_i32(height, "texture height")?;
        let internal = gl_i32(gl_format.internal, "internal format")?;
        let pixels = glow::PixelUnpackData::Slice(data);
        unsafe {
            if target.is_1d() {
                self.gl.tex_image_1d(
                    target.into_gl(),
                    0,
                    internal,
                    width,
                    0,
                    gl_format.format,
                    gl_format.ty,
                    pixels,
                );
            } else {
                self.gl.tex_image_2d(
                    target.into_gl(),
                    0,
                    internal,
                    width,
                    height,
                    0,
                    gl_format.format,
                    gl_format.ty,
                    pixels,
                );
            }
        }
        self.check_error("glTexImage")
    }

    fn texture_parameter(
        &mut self,
        target: TextureTarget,
        parameter: TextureParameter,
    ) -> RenderResult<()> {
        let (pname, value) = parameter.into_gl();
        unsafe { self.gl.tex_parameter_i32(target.into_gl(), pname, value) };
        Ok(())
    }

    // --- Programs ---

    fn create_program(&mut self, vertex: &str, fragment: &str) -> RenderResult<ResourceHandle> {
        let gl = &self.gl;
        unsafe {
            let native = gl
                .create_program()
                .map_err(creation_failed(ResourceKind::Shader))?;
            let mut shaders = Vec::with_capacity(2);
            for (stage, source) in [(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)] {
                let shader = match gl.create_shader(stage.into_gl()) {
                    Ok(shader) => shader,
                    Err(details) => {
                        delete_program_and_shaders(gl, native, &shaders);
                        return Err(creation_failed(ResourceKind::Shader)(details));
                    }
                };
                gl.shader_source(shader, source);
                gl.compile_shader(shader);
                gl.attach_shader(native, shader);
                shaders.push(shader);
                if !gl.get_shader_compile_status(shader) {
                    let log = gl.get_shader_info_log(shader);
                    delete_program_and_shaders(gl, native, &shaders);
                    return Err(ShaderError::CompilationFailed { stage, log }.into());
                }
            }

            gl.link_program(native);
            let linked = gl.get_program_link_status(native);
            if !linked {
                let log = gl.get_program_info_log(native);
                delete_program_and_shaders(gl, native, &shaders);
                return Err(ShaderError::LinkFailed { log }.into());
            }
            for shader in shaders {
                gl.detach_shader(native, shader);
                gl.delete_shader(shader);
            }
            Ok(from_native(native.0))
        }
    }

    fn delete_program(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        unsafe { self.gl.delete_program(program(handle)) };
        Ok(())
    }

    fn uniform_location(
        &mut self,
        handle: ResourceHandle,
        name: &str,
    ) -> RenderResult<Option<UniformLocation>> {
        let location = unsafe { self.gl.get_uniform_location(program(handle), name) };
        Ok(location.map(|l| UniformLocation(l.0)))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) -> RenderResult<()> {
        let native = glow::NativeUniformLocation(location.0);
        let loc = Some(&native);
        unsafe {
            match *value {
                UniformValue::Bool(v) => self.gl.uniform_1_i32(loc, i32::from(v)),
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, v),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(loc, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(loc, x, y, z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(loc, x, y, z, w),
                UniformValue::Mat4(ref m) => self.gl.uniform_matrix_4_f32_slice(loc, false, m),
            }
        }
        Ok(())
    }

    // --- Framebuffers ---

    fn create_framebuffer(&mut self) -> RenderResult<ResourceHandle> {
        let native = unsafe { self.gl.create_framebuffer() }
            .map_err(creation_failed(ResourceKind::Framebuffer))?;
        Ok(from_native(native.0))
    }

    fn delete_framebuffer(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        unsafe { self.gl.delete_framebuffer(framebuffer(handle)) };
        Ok(())
    }

    fn framebuffer_texture(
        &mut self,
        target: FramebufferTarget,
        attachment: FramebufferAttachment,
        texture_target: TextureTarget,
        handle: ResourceHandle,
    ) -> RenderResult<()> {
        unsafe {
            self.gl.framebuffer_texture_2d(
                target.into_gl(),
                attachment.into_gl(),
                texture_target.into_gl(),
                Some(texture(handle)),
                0,
            );
        }
        Ok(())
    }

    fn draw_buffers(&mut self, count: usize) -> RenderResult<()> {
        // WebGL 1 always draws to its single colour attachment.
        if self.capabilities.backend == GraphicsBackendType::WebGL {
            return Ok(());
        }
        let attachments = (0..count)
            .map(|i| u32::try_from(i).map(|i| FramebufferAttachment::Color(i).into_gl()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RenderError::Backend(format!("{count} draw buffers")))?;
        unsafe { self.gl.draw_buffers(&attachments) };
        Ok(())
    }

    fn read_buffer(&mut self, attachment: u32) -> RenderResult<()> {
        unsafe {
            self.gl
                .read_buffer(FramebufferAttachment::Color(attachment).into_gl())
        };
        Ok(())
    }

    fn framebuffer_status(&mut self, target: FramebufferTarget) -> RenderResult<()> {
        let status = unsafe { self.gl.check_framebuffer_status(target.into_gl()) };
        if status == glow::FRAMEBUFFER_COMPLETE {
            Ok(())
        } else {
            Err(ResourceError::IncompleteFramebuffer(framebuffer_status_name(status).into()).into())
        }
    }

    fn framebuffer_binding(
        &mut self,
        target: FramebufferTarget,
    ) -> RenderResult<Option<ResourceHandle>> {
        let parameter = match target {
            FramebufferTarget::Read => glow::READ_FRAMEBUFFER_BINDING,
            FramebufferTarget::Draw | FramebufferTarget::Both => glow::DRAW_FRAMEBUFFER_BINDING,
        };
        let native = unsafe { self.gl.get_parameter_framebuffer(parameter) };
        Ok(native.map(|f| from_native(f.0)))
    }

    // --- Vertex arrays and buffers ---

    fn create_vertex_array(&mut self) -> RenderResult<ResourceHandle> {
        let native = unsafe { self.gl.create_vertex_array() }
            .map_err(creation_failed(ResourceKind::VertexArray))?;
        Ok(from_native(native.0))
    }

    fn delete_vertex_array(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        unsafe { self.gl.delete_vertex_array(vertex_array(handle)) };
        Ok(())
    }

    fn create_buffer(&mut self) -> RenderResult<ResourceHandle> {
        let native = unsafe { self.gl.create_buffer() }
            .map_err(creation_failed(ResourceKind::Buffer))?;
        Ok(from_native(native.0))
    }

    fn delete_buffer(&mut self, handle: ResourceHandle) -> RenderResult<()> {
        unsafe { self.gl.delete_buffer(buffer(handle)) };
        Ok(())
    }

    fn buffer_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> RenderResult<()> {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target.into_gl(), data, usage.into_gl())
        };
        self.check_error("glBufferData")
    }

    fn enable_vertex_attribute(&mut self, location: u32) -> RenderResult<()> {
        unsafe { self.gl.enable_vertex_attrib_array(location) };
        self.check_error("glEnableVertexAttribArray")
    }

    fn vertex_attribute_pointer(
        &mut self,
        location: u32,
        attribute: &VertexAttribute,
        stride: u32,
    ) -> RenderResult<()> {
        let count = gl_i32(attribute.count, "attribute component count")?;
        let stride = gl_i32(stride, "vertex stride")?;
        let offset = gl_i32(attribute.offset, "attribute offset")?;
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                location,
                count,
                attribute.ty.into_gl(),
                attribute.normalized,
                stride,
                offset,
            );
        }
        self.check_error("glVertexAttribPointer")
    }

    fn vertex_attribute_divisor(&mut self, location: u32, divisor: u32) -> RenderResult<()> {
        if !self.capabilities.instancing {
            return Err(RenderError::unsupported(
                "Instanced vertex attributes",
                self.capabilities.backend,
            ));
        }
        unsafe { self.gl.vertex_attrib_divisor(location, divisor) };
        Ok(())
    }

    // --- Bindings ---

    fn active_texture(&mut self, unit: usize) -> RenderResult<()> {
        let unit = u32::try_from(unit)
            .map_err(|_| RenderError::Backend(format!("texture unit {unit}")))?;
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
        Ok(())
    }

    fn bind_texture(
        &mut self,
        unit: usize,
        target: TextureTarget,
        handle: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        let unit = u32::try_from(unit)
            .map_err(|_| RenderError::Backend(format!("texture unit {unit}")))?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(target.into_gl(), handle.map(texture));
        }
        Ok(())
    }

    fn use_program(&mut self, handle: Option<ResourceHandle>) -> RenderResult<()> {
        unsafe { self.gl.use_program(handle.map(program)) };
        Ok(())
    }

    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        handle: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        unsafe {
            self.gl
                .bind_framebuffer(target.into_gl(), handle.map(framebuffer))
        };
        Ok(())
    }

    fn bind_vertex_array(&mut self, handle: Option<ResourceHandle>) -> RenderResult<()> {
        unsafe { self.gl.bind_vertex_array(handle.map(vertex_array)) };
        Ok(())
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        handle: Option<ResourceHandle>,
    ) -> RenderResult<()> {
        unsafe { self.gl.bind_buffer(target.into_gl(), handle.map(buffer)) };
        Ok(())
    }

    // --- Pipeline state ---

    fn set_enabled(&mut self, capability: Capability, enabled: bool) -> RenderResult<()> {
        unsafe {
            if enabled {
                self.gl.enable(capability.into_gl());
            } else {
                self.gl.disable(capability.into_gl());
            }
        }
        Ok(())
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> RenderResult<()> {
        unsafe { self.gl.blend_func(src.into_gl(), dst.into_gl()) };
        Ok(())
    }

    fn blend_func_separate(
        &mut self,
        color_src: BlendFactor,
        color_dst: BlendFactor,
        alpha_src: BlendFactor,
        alpha_dst: BlendFactor,
    ) -> RenderResult<()> {
        unsafe {
            self.gl.blend_func_separate(
                color_src.into_gl(),
                color_dst.into_gl(),
                alpha_src.into_gl(),
                alpha_dst.into_gl(),
            );
        }
        Ok(())
    }

    fn blend_equation(&mut self, equation: BlendEquation) -> RenderResult<()> {
        unsafe { self.gl.blend_equation(equation.into_gl()) };
        Ok(())
    }

    fn blend_equation_separate(
        &mut self,
        color: BlendEquation,
        alpha: BlendEquation,
    ) -> RenderResult<()> {
        unsafe {
            self.gl
                .blend_equation_separate(color.into_gl(), alpha.into_gl())
        };
        Ok(())
    }

    fn depth_func(&mut self, function: CompareFunction) -> RenderResult<()> {
        unsafe { self.gl.depth_func(function.into_gl()) };
        Ok(())
    }

    fn depth_mask(&mut self, enabled: bool) -> RenderResult<()> {
        unsafe { self.gl.depth_mask(enabled) };
        Ok(())
    }

    fn color_mask(&mut self, mask: ColorMask) -> RenderResult<()> {
        let [r, g, b, a] = mask.channels();
        unsafe { self.gl.color_mask(r, g, b, a) };
        Ok(())
    }

    fn cull_face(&mut self, face: Face) -> RenderResult<()> {
        unsafe { self.gl.cull_face(face.into_gl()) };
        Ok(())
    }

    fn front_face(&mut self, winding: FrontFace) -> RenderResult<()> {
        unsafe { self.gl.front_face(winding.into_gl()) };
        Ok(())
    }

    fn polygon_mode(&mut self, mode: PolygonMode) -> RenderResult<()> {
        if !self.capabilities.polygon_mode {
            return Err(RenderError::unsupported(
                "glPolygonMode",
                self.capabilities.backend,
            ));
        }
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode.into_gl()) };
        Ok(())
    }

    fn clear_color(&mut self, color: Color) -> RenderResult<()> {
        unsafe { self.gl.clear_color(color.r, color.g, color.b, color.a) };
        Ok(())
    }

    fn clear_depth(&mut self, depth: f32) -> RenderResult<()> {
        unsafe { self.gl.clear_depth_f32(depth) };
        Ok(())
    }

    fn viewport(&mut self, rect: RectI) -> RenderResult<()> {
        unsafe { self.gl.viewport(rect.x, rect.y, rect.width, rect.height) };
        Ok(())
    }

    fn scissor(&mut self, rect: RectI) -> RenderResult<()> {
        unsafe { self.gl.scissor(rect.x, rect.y, rect.width, rect.height) };
        Ok(())
    }

    fn depth_range(&mut self, range: DepthRange) -> RenderResult<()> {
        unsafe { self.gl.depth_range_f32(range.near, range.far) };
        Ok(())
    }

    // --- Clears and draws ---

    fn clear(&mut self, flags: ClearFlags) -> RenderResult<()> {
        unsafe { self.gl.clear(flags.into_gl()) };
        Ok(())
    }

    fn draw_arrays(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> RenderResult<()> {
        let first = gl_i32(first, "first vertex")?;
        let count = gl_i32(count, "vertex count")?;
        unsafe { self.gl.draw_arrays(topology.into_gl(), first, count) };
        Ok(())
    }

    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        offset: usize,
    ) -> RenderResult<()> {
        let count = gl_i32(count, "index count")?;
        let offset = gl_i32(offset, "index offset")?;
        unsafe {
            self.gl
                .draw_elements(topology.into_gl(), count, format.into_gl(), offset)
        };
        Ok(())
    }

    fn draw_arrays_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        instances: u32,
    ) -> RenderResult<()> {
        let first = gl_i32(first, "first vertex")?;
        let count = gl_i32(count, "vertex count")?;
        let instances = gl_i32(instances, "instance count")?;
        unsafe {
            self.gl
                .draw_arrays_instanced(topology.into_gl(), first, count, instances)
        };
        Ok(())
    }

    fn draw_elements_instanced(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        offset: usize,
        instances: u32,
    ) -> RenderResult<()> {
        let count = gl_i32(count, "index count")?;
        let offset = gl_i32(offset, "index offset")?;
        let instances = gl_i32(instances, "instance count")?;
        unsafe {
            self.gl.draw_elements_instanced(
                topology.into_gl(),
                count,
                format.into_gl(),
                offset,
                instances,
            );
        }
        Ok(())
    }

    fn blit_framebuffer(
        &mut self,
        src: RectI,
        dst: RectI,
        mask: ClearFlags,
        filter: BlitFilter,
    ) -> RenderResult<()> {
        unsafe {
            self.gl.blit_framebuffer(
                src.x,
                src.y,
                src.right(),
                src.top(),
                dst.x,
                dst.y,
                dst.right(),
                dst.top(),
                mask.into_gl(),
                filter.into_gl(),
            );
        }
        self.check_error("glBlitFramebuffer")
    }
}

unsafe fn delete_program_and_shaders(
    gl: &glow::Context,
    native: glow::NativeProgram,
    shaders: &[glow::NativeShader],
) {
    unsafe {
        for &shader in shaders {
            gl.detach_shader(native, shader);
            gl.delete_shader(shader);
        }
        gl.delete_program(native);
    }
}
