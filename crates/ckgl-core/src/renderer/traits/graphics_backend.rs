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

use crate::renderer::api::*;
use crate::renderer::error::RenderResult;
use std::fmt::Debug;

/// The primitives of an OpenGL-family graphics API.
///
/// Every method maps onto one (occasionally two) driver calls. Implementations never cache:
/// deciding whether a primitive needs to be invoked at all is the job of the
/// [`BindingCache`](crate::renderer::cache::BindingCache) and the
/// [`StateTracker`](crate::renderer::cache::StateTracker). The trait is object-safe so the
/// caches can drive any backend through `&mut dyn GraphicsBackend`.
pub trait GraphicsBackend: Debug {
    /// Returns the capability set discovered when the backend was created.
    fn capabilities(&self) -> BackendCapabilities;

    // --- Textures ---

    /// Creates a texture object.
    /// ## Returns
    /// The driver name of the new texture.
    fn create_texture(&mut self) -> RenderResult<ResourceHandle>;

    /// Deletes a texture object.
    fn delete_texture(&mut self, handle: ResourceHandle) -> RenderResult<()>;

    /// Allocates and optionally fills level 0 of the texture bound to `target` on the active unit.
    /// ## Arguments
    /// * `target` - The bind target of the texture.
    /// * `width`, `height` - The extent in texels.
    /// * `format` - The storage format.
    /// * `data` - Tightly packed texels, or `None` to leave the storage uninitialized.
    fn texture_image_2d(
        &mut self,
        target: TextureTarget,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> RenderResult<()>;

    /// Sets a sampling parameter of the texture bound to `target` on the active unit.
    fn texture_parameter(
        &mut self,
        target: TextureTarget,
        parameter: TextureParameter,
    ) -> RenderResult<()>;

    // --- Programs ---

    /// Compiles and links a program from GLSL sources.
    /// ## Errors
    /// * `ShaderError::CompilationFailed` or `ShaderError::LinkFailed` with the driver's log.
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<ResourceHandle>;

    /// Deletes a program object.
    fn delete_program(&mut self, handle: ResourceHandle) -> RenderResult<()>;

    /// Looks up an active uniform of `program`. Returns `None` if the name is not active.
    fn uniform_location(
        &mut self,
        program: ResourceHandle,
        name: &str,
    ) -> RenderResult<Option<UniformLocation>>;

    /// Writes a uniform of the program currently in use.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) -> RenderResult<()>;

    // --- Framebuffers ---

    /// Creates a framebuffer object.
    fn create_framebuffer(&mut self) -> RenderResult<ResourceHandle>;

    /// Deletes a framebuffer object.
    fn delete_framebuffer(&mut self, handle: ResourceHandle) -> RenderResult<()>;

    /// Attaches level 0 of `texture` to the framebuffer bound to `target`.
    fn framebuffer_texture(
        &mut self,
        target: FramebufferTarget,
        attachment: FramebufferAttachment,
        texture_target: TextureTarget,
        texture: ResourceHandle,
    ) -> RenderResult<()>;

    /// Routes fragment outputs `0..count` to colour attachments `0..count`.
    fn draw_buffers(&mut self, count: usize) -> RenderResult<()>;

    /// Selects the colour attachment read by blits.
    fn read_buffer(&mut self, attachment: u32) -> RenderResult<()>;

    /// Queries the driver for the framebuffer bound to `target`. `None` is the default
    /// framebuffer. Only used when the binding cache has no knowledge of the slot.
    fn framebuffer_binding(&mut self, target: FramebufferTarget)
        -> RenderResult<Option<ResourceHandle>>;

    /// Checks completeness of the framebuffer bound to `target`.
    /// ## Errors
    /// * `ResourceError::IncompleteFramebuffer` naming the status reported by the driver.
    fn framebuffer_status(&mut self, target: FramebufferTarget) -> RenderResult<()>;

    // --- Vertex arrays and buffers ---

    /// Creates a vertex array object.
    fn create_vertex_array(&mut self) -> RenderResult<ResourceHandle>;

    /// Deletes a vertex array object.
    fn delete_vertex_array(&mut self, handle: ResourceHandle) -> RenderResult<()>;

    /// Creates a buffer object.
    fn create_buffer(&mut self) -> RenderResult<ResourceHandle>;

    /// Deletes a buffer object.
    fn delete_buffer(&mut self, handle: ResourceHandle) -> RenderResult<()>;

    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage)
        -> RenderResult<()>;

    /// Enables the generic vertex attribute array at `location` of the bound vertex array.
    fn enable_vertex_attribute(&mut self, location: u32) -> RenderResult<()>;

    /// Points attribute `location` of the bound vertex array at the bound vertex buffer.
    /// ## Arguments
    /// * `location` - The generic attribute index.
    /// * `attribute` - Component type, count, normalization and byte offset.
    /// * `stride` - Bytes between two consecutive vertices.
    fn vertex_attribute_pointer(
        &mut self,
        location: u32,
        attribute: &VertexAttribute,
        stride: u32,
    ) -> RenderResult<()>;

    /// Makes attribute `location` advance once every `divisor` instances.
    /// ## Errors
    /// * `RenderError::Unsupported` on backends without instancing.
    fn vertex_attribute_divisor(&mut self, location: u32, divisor: u32) -> RenderResult<()>;

    // --- Binds ---

    /// Makes `unit` the active texture unit, the one texture uploads and parameters apply to.
    fn active_texture(&mut self, unit: usize) -> RenderResult<()>;

    /// Selects texture unit `unit` and binds `texture` to `target` on it. `None` unbinds.
    /// The unit stays active afterwards.
    fn bind_texture(
        &mut self,
        unit: usize,
        target: TextureTarget,
        texture: Option<ResourceHandle>,
    ) -> RenderResult<()>;

    /// Makes `program` current. `None` selects no program.
    fn use_program(&mut self, program: Option<ResourceHandle>) -> RenderResult<()>;

    /// Binds `framebuffer` to `target`. `None` selects the default framebuffer.
    fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<ResourceHandle>,
    ) -> RenderResult<()>;

    /// Binds a vertex array object.
    fn bind_vertex_array(&mut self, vertex_array: Option<ResourceHandle>) -> RenderResult<()>;

    /// Binds a buffer object to `target`.
    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<ResourceHandle>,
    ) -> RenderResult<()>;

    // --- Fixed-function state ---

    /// Enables or disables a fixed-function capability.
    fn set_enabled(&mut self, capability: Capability, enabled: bool) -> RenderResult<()>;

    /// Sets one source and destination factor for all channels.
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> RenderResult<()>;

    /// Sets separate colour and alpha factors.
    fn blend_func_separate(
        &mut self,
        color_src: BlendFactor,
        color_dst: BlendFactor,
        alpha_src: BlendFactor,
        alpha_dst: BlendFactor,
    ) -> RenderResult<()>;

    /// Sets one equation for all channels.
    fn blend_equation(&mut self, equation: BlendEquation) -> RenderResult<()>;

    /// Sets separate colour and alpha equations.
    fn blend_equation_separate(
        &mut self,
        color: BlendEquation,
        alpha: BlendEquation,
    ) -> RenderResult<()>;

    /// Sets the depth comparison.
    fn depth_func(&mut self, function: CompareFunction) -> RenderResult<()>;

    /// Enables or disables depth writes.
    fn depth_mask(&mut self, enabled: bool) -> RenderResult<()>;

    /// Sets the colour write mask.
    fn color_mask(&mut self, mask: ColorMask) -> RenderResult<()>;

    /// Selects the culled face.
    fn cull_face(&mut self, face: Face) -> RenderResult<()>;

    /// Selects the front-facing winding.
    fn front_face(&mut self, winding: FrontFace) -> RenderResult<()>;

    /// Sets the polygon rasterization mode for both faces.
    fn polygon_mode(&mut self, mode: PolygonMode) -> RenderResult<()>;

    /// Sets the clear colour.
    fn clear_color(&mut self, color: Color) -> RenderResult<()>;

    /// Sets the clear depth.
    fn clear_depth(&mut self, depth: f32) -> RenderResult<()>;

    /// Sets the viewport.
    fn viewport(&mut self, rect: RectI) -> RenderResult<()>;

    /// Sets the scissor rectangle.
    fn scissor(&mut self, rect: RectI) -> RenderResult<()>;

    /// Sets the depth range. Both ends are already clamped into `[0, 1]`.
    fn depth_range(&mut self, range: DepthRange) -> RenderResult<()>;

    // --- Frame operations ---

    /// Clears the selected buffers of the draw framebuffer.
    fn clear(&mut self, flags: ClearFlags) -> RenderResult<()>;

    /// Draws `count` vertices starting at `first`.
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32)
        -> RenderResult<()>;

    /// Draws `count` indices starting at byte `offset` of the bound index buffer.
    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        offset: usize,
    ) -> RenderResult<()>;

    /// Instanced variant of [`draw_arrays`](Self::draw_arrays).
    fn draw_arrays_instanced(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        instances: u32,
    ) -> RenderResult<()>;

    /// Instanced variant of [`draw_elements`](Self::draw_elements).
    fn draw_elements_instanced(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        offset: usize,
        instances: u32,
    ) -> RenderResult<()>;

    /// Copies `src` of the read framebuffer onto `dst` of the draw framebuffer.
    fn blit_framebuffer(
        &mut self,
        src: RectI,
        dst: RectI,
        mask: ClearFlags,
        filter: BlitFilter,
    ) -> RenderResult<()>;
}
