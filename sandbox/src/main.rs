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

// CKGL Sandbox
// Renders a small scene into an offscreen target for a few frames on the headless backend and
// prints how many binds and state changes reached the driver each frame.

use std::mem;

use anyhow::{Context, Result};
use ckgl_core::renderer::api::*;
use ckgl_core::renderer::resources::{
    Buffer, Framebuffer, GeometryInput, Shader, Texture, TextureSampler, VertexStream,
};
use ckgl_core::renderer::ChangeEvent;
use ckgl_core::{RenderContext, RendererConfig};
use ckgl_infra::HeadlessBackend;

const FRAMES: u64 = 3;

const VERTEX_SHADER: &str = r#"#version 330 core
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
uniform mat4 u_mvp;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 330 core
in vec2 v_uv;
uniform sampler2D u_texture;
uniform vec4 u_tint;
out vec4 o_color;
void main() {
    o_color = texture(u_texture, v_uv) * u_tint;
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [-0.5, -0.5, 0.0],
        uv: [0.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        uv: [1.0, 0.0],
    },
    Vertex {
        position: [0.5, 0.5, 0.0],
        uv: [1.0, 1.0],
    },
    Vertex {
        position: [-0.5, 0.5, 0.0],
        uv: [0.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2, 2, 3, 0];

/// One drawable: a texture, a tint and a blend mode.
struct Sprite {
    texture: usize,
    tint: [f32; 4],
    blend: BlendState,
}

const SPRITES: &[Sprite] = &[
    Sprite {
        texture: 0,
        tint: [1.0, 1.0, 1.0, 1.0],
        blend: BlendState::OPAQUE,
    },
    Sprite {
        texture: 0,
        tint: [1.0, 1.0, 1.0, 1.0],
        blend: BlendState::OPAQUE,
    },
    Sprite {
        texture: 1,
        tint: [1.0, 0.5, 0.5, 0.8],
        blend: BlendState::ALPHA_BLEND,
    },
    Sprite {
        texture: 1,
        tint: [0.5, 1.0, 0.5, 0.8],
        blend: BlendState::ALPHA_BLEND,
    },
];

/// Everything the scene owns on the GPU.
struct Scene {
    shader: Shader,
    textures: Vec<Texture>,
    target: Framebuffer,
    geometry: GeometryInput,
    vertices: Buffer,
    indices: Buffer,
}

impl Scene {
    fn new(ctx: &mut RenderContext<HeadlessBackend>) -> Result<Self> {
        let shader = Shader::new(ctx, VERTEX_SHADER, FRAGMENT_SHADER)?;
        let sampler = TextureSampler::new(TextureFilter::Linear, TextureWrap::Clamp);
        let checker: Vec<u8> = (0..16u8)
            .flat_map(|i| if (i + i / 4) % 2 == 0 { [255; 4] } else { [0, 0, 0, 255] })
            .collect();
        let textures = vec![
            Texture::new_2d(ctx, 4, 4, TextureFormat::Rgba8, Some(&checker), sampler)?,
            Texture::new_2d(ctx, 1, 1, TextureFormat::Rgba8, Some(&[255; 4]), sampler)?,
        ];
        let (width, height) = ctx.window_size();
        let target = Framebuffer::new(
            ctx,
            (width / 2).max(1),
            (height / 2).max(1),
            1,
            TextureFormat::Rgba8,
            Some(TextureFormat::Depth24Stencil8),
        )?;

        let mut vertices = Buffer::new(ctx, BufferTarget::Vertex, BufferUsage::Static)?;
        vertices.set_data(ctx, bytemuck::cast_slice(VERTICES))?;
        let mut indices = Buffer::new(ctx, BufferTarget::Index, BufferUsage::Static)?;
        indices.set_data(ctx, bytemuck::cast_slice(INDICES))?;
        let format = VertexFormat::new(&[
            VertexAttribute::new(VertexType::Float, 3, false),
            VertexAttribute::new(VertexType::Float, 2, false),
        ])?;
        let geometry =
            GeometryInput::new(ctx, Some(&indices), &[VertexStream::new(&vertices, &format)])?;
        log::info!(
            "Scene uploaded: {} vertices ({} bytes each), {} indices",
            VERTICES.len(),
            mem::size_of::<Vertex>(),
            INDICES.len()
        );

        Ok(Self {
            shader,
            textures,
            target,
            geometry,
            vertices,
            indices,
        })
    }

    fn render(&mut self, ctx: &mut RenderContext<HeadlessBackend>) -> Result<()> {
        self.target.bind(ctx)?;
        ctx.set_depth(DepthState::LESS)?;
        ctx.clear_all(Color::CORNFLOWER_BLUE, 1.0)?;

        self.geometry.bind(ctx)?;
        self.shader.set_uniform(ctx, "u_mvp", UniformValue::identity())?;
        self.shader.set_uniform(ctx, "u_texture", 0)?;
        for sprite in SPRITES {
            ctx.set_blend(sprite.blend)?;
            self.textures[sprite.texture].bind(ctx, 0)?;
            self.shader.set_uniform(ctx, "u_tint", sprite.tint)?;
            ctx.draw_indexed(
                PrimitiveTopology::TriangleList,
                0,
                INDICES.len() as u32,
                IndexFormat::Uint16,
            )?;
        }

        Framebuffer::bind_default(ctx)?;
        if ctx.capabilities().framebuffer_blit {
            let window = ctx.window_rect();
            self.target.blit_to(ctx, None, 0, BlitFilter::Linear, window)?;
        }
        Ok(())
    }

    fn destroy(self, ctx: &mut RenderContext<HeadlessBackend>) -> Result<()> {
        self.geometry.destroy(ctx)?;
        self.indices.destroy(ctx)?;
        self.vertices.destroy(ctx)?;
        self.target.destroy(ctx)?;
        for texture in self.textures {
            texture.destroy(ctx)?;
        }
        self.shader.destroy(ctx)?;
        Ok(())
    }
}

fn load_config() -> Result<RendererConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading renderer config {path}"))?;
            RendererConfig::from_json_str(&json)
                .with_context(|| format!("parsing renderer config {path}"))
        }
        None => Ok(RendererConfig::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let backend = HeadlessBackend::new(config.backend);
    let mut ctx = RenderContext::new(backend, config).context("creating render context")?;
    ctx.hooks_mut().on_changed(|event| {
        if let ChangeEvent::Bind(kind) = event {
            log::debug!("{kind} binding changed");
        }
    });

    let mut scene = Scene::new(&mut ctx)?;
    for _ in 0..FRAMES {
        ctx.pre_draw();
        scene.render(&mut ctx)?;
        println!("{}", ctx.counters().snapshot());
    }
    scene.destroy(&mut ctx)?;

    let backend = ctx.into_backend();
    log::info!("{} primitive calls reached the backend", backend.total_calls());
    for (name, count) in backend.calls() {
        log::debug!("  {name}: {count}");
    }
    Ok(())
}
