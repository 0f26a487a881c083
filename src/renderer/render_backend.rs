//! The GPU side the renderer talks to. The shader program, its buffers and the full-screen draw
//! all live behind [`RenderBackend`], so the per-frame pipeline can run against a real graphics
//! API or the in-memory [`HeadlessBackend`](super::headless_backend::HeadlessBackend).

use super::shader_interfaces::uniforms::{FrameUniformBlock, UniformValue};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material {}", self.0)
    }
}

/// Names a shader program the backend may or may not know about
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderHandle {
    pub name: String,
}

impl ShaderHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for ShaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader '{}'", self.name)
    }
}

/// Rendering collaborator. Every call happens on the render thread within a single frame.
pub trait RenderBackend {
    /// Render target / texture type
    type Image;

    /// Instantiates a material for `shader`. `None` if the shader can't be used.
    fn create_material(&mut self, shader: &ShaderHandle) -> Option<MaterialId>;

    /// Frees a material from [`Self::create_material`] that is still alive. Materials the backend
    /// destroyed on its own must not be released again.
    fn release_material(&mut self, material: MaterialId);

    /// Allocates a structured buffer of exactly `count * stride` bytes. `count` may be 0.
    fn create_buffer(&mut self, count: usize, stride: usize) -> anyhow::Result<BufferId>;

    /// `data` must be exactly the size the buffer was created with
    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) -> anyhow::Result<()>;

    /// Frees a buffer from [`Self::create_buffer`]. Called exactly once per buffer.
    fn release_buffer(&mut self, buffer: BufferId);

    fn bind_buffer(
        &mut self,
        material: MaterialId,
        slot: &str,
        buffer: BufferId,
    ) -> anyhow::Result<()>;

    fn set_uniform(&mut self, material: MaterialId, name: &str, value: UniformValue);

    /// The same frame values as the named uniforms, packed for a single uniform buffer
    fn set_uniform_block(&mut self, material: MaterialId, block: &FrameUniformBlock);

    /// Full-screen draw of `material` with `source` bound to the main texture slot
    fn draw(
        &mut self,
        material: MaterialId,
        source: &Self::Image,
        destination: &mut Self::Image,
    ) -> anyhow::Result<()>;

    /// Plain copy of `source` into `destination`
    fn copy(&mut self, source: &Self::Image, destination: &mut Self::Image);
}
