use super::{
    config_renderer::MAIN_TEXTURE,
    render_backend::{BufferId, MaterialId, RenderBackend, ShaderHandle},
    shader_interfaces::uniforms::{FrameUniformBlock, UniformValue},
};
use ahash::{AHashMap, AHashSet};
use anyhow::{bail, ensure, Context};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

/// RGBA8 image kept in memory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl HeadlessImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0; 4])
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: rgba.repeat(pixel_count),
        }
    }

    /// Deterministic test pattern so copies can be checked byte for byte
    pub fn gradient(width: u32, height: u32) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    (x % 256) as u8,
                    (y % 256) as u8,
                    ((x ^ y) % 256) as u8,
                    255,
                ]);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub materials_created: usize,
    pub materials_released: usize,
    pub buffers_created: usize,
    pub buffers_released: usize,
    /// Releases of unknown or already released buffers and materials
    pub invalid_releases: usize,
    pub draws: usize,
    pub failed_draws: usize,
    pub copies: usize,
}

/// What the shader would have seen for the most recent draw
#[derive(Clone, Debug, Default)]
pub struct DrawCapture {
    pub material: Option<MaterialId>,
    pub uniforms: AHashMap<String, UniformValue>,
    pub uniform_block: Option<FrameUniformBlock>,
    /// Slot name -> buffer contents at draw time
    pub buffers: AHashMap<String, Vec<u8>>,
    pub texture_slot: &'static str,
}

#[derive(Debug, Default)]
struct HeadlessMaterial {
    uniforms: AHashMap<String, UniformValue>,
    /// Kept as raw bytes, the way it would sit in a uniform buffer
    uniform_block: Option<Vec<u8>>,
    bound_buffers: AHashMap<String, BufferId>,
}

/// [`RenderBackend`] without a GPU: buffers are byte vectors, a draw copies the source image and
/// captures the bound inputs. Used by the demo binary and the tests.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    shaders: AHashSet<String>,
    materials: AHashMap<MaterialId, HeadlessMaterial>,
    buffers: AHashMap<BufferId, Vec<u8>>,
    next_id: u32,
    stats: BackendStats,
    fail_draws: bool,
    last_draw: Option<DrawCapture>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `shader` available to [`RenderBackend::create_material`]
    pub fn register_shader(&mut self, shader: &ShaderHandle) {
        self.shaders.insert(shader.name.clone());
    }

    pub fn unregister_shader(&mut self, shader: &ShaderHandle) {
        self.shaders.remove(&shader.name);
    }

    /// Makes every following draw fail, e.g. to simulate a lost device
    pub fn set_fail_draws(&mut self, fail_draws: bool) {
        self.fail_draws = fail_draws;
    }

    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_material_count(&self) -> usize {
        self.materials.len()
    }

    /// Drops a material without the owner's involvement, like a host reloading its shaders
    pub fn destroy_material(&mut self, material: MaterialId) {
        self.materials.remove(&material);
    }

    pub fn last_draw(&self) -> Option<&DrawCapture> {
        self.last_draw.as_ref()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }
}

impl RenderBackend for HeadlessBackend {
    type Image = HeadlessImage;

    fn create_material(&mut self, shader: &ShaderHandle) -> Option<MaterialId> {
        if !self.shaders.contains(&shader.name) {
            return None;
        }
        let material_id = MaterialId(self.next_id());
        self.materials
            .insert(material_id, HeadlessMaterial::default());
        self.stats.materials_created += 1;
        Some(material_id)
    }

    fn release_material(&mut self, material: MaterialId) {
        if self.materials.remove(&material).is_some() {
            self.stats.materials_released += 1;
        } else {
            warn!("attempted to release unknown {}", material);
            self.stats.invalid_releases += 1;
        }
    }

    fn create_buffer(&mut self, count: usize, stride: usize) -> anyhow::Result<BufferId> {
        let byte_count = count
            .checked_mul(stride)
            .with_context(|| format!("buffer size overflow ({} x {} bytes)", count, stride))?;
        let buffer_id = BufferId(self.next_id());
        self.buffers.insert(buffer_id, vec![0; byte_count]);
        self.stats.buffers_created += 1;
        Ok(buffer_id)
    }

    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) -> anyhow::Result<()> {
        let Some(contents) = self.buffers.get_mut(&buffer) else {
            bail!("write to unknown {}", buffer);
        };
        ensure!(
            contents.len() == data.len(),
            "{} holds {} bytes but {} were written",
            buffer,
            contents.len(),
            data.len()
        );
        contents.copy_from_slice(data);
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() {
            self.stats.buffers_released += 1;
        } else {
            warn!("attempted to release unknown {}", buffer);
            self.stats.invalid_releases += 1;
        }
    }

    fn bind_buffer(
        &mut self,
        material: MaterialId,
        slot: &str,
        buffer: BufferId,
    ) -> anyhow::Result<()> {
        ensure!(self.buffers.contains_key(&buffer), "bind of unknown {}", buffer);
        let Some(headless_material) = self.materials.get_mut(&material) else {
            bail!("bind to unknown {}", material);
        };
        headless_material
            .bound_buffers
            .insert(slot.to_string(), buffer);
        Ok(())
    }

    fn set_uniform(&mut self, material: MaterialId, name: &str, value: UniformValue) {
        match self.materials.get_mut(&material) {
            Some(headless_material) => {
                headless_material.uniforms.insert(name.to_string(), value);
            }
            None => warn!("uniform {} set on unknown {}", name, material),
        }
    }

    fn set_uniform_block(&mut self, material: MaterialId, block: &FrameUniformBlock) {
        match self.materials.get_mut(&material) {
            Some(headless_material) => {
                headless_material.uniform_block = Some(bytemuck::bytes_of(block).to_vec());
            }
            None => warn!("uniform block set on unknown {}", material),
        }
    }

    fn draw(
        &mut self,
        material: MaterialId,
        source: &HeadlessImage,
        destination: &mut HeadlessImage,
    ) -> anyhow::Result<()> {
        if self.fail_draws {
            self.stats.failed_draws += 1;
            bail!("draw with {} failed", material);
        }
        let Some(headless_material) = self.materials.get(&material) else {
            bail!("draw with unknown {}", material);
        };

        let mut buffers = AHashMap::new();
        for (slot, buffer_id) in &headless_material.bound_buffers {
            let contents = self.buffers.get(buffer_id).with_context(|| {
                format!("{} bound to '{}' was released before the draw", buffer_id, slot)
            })?;
            buffers.insert(slot.clone(), contents.clone());
        }
        self.last_draw = Some(DrawCapture {
            material: Some(material),
            uniforms: headless_material.uniforms.clone(),
            uniform_block: headless_material
                .uniform_block
                .as_deref()
                .map(bytemuck::pod_read_unaligned),
            buffers,
            texture_slot: MAIN_TEXTURE,
        });

        destination.clone_from(source);
        self.stats.draws += 1;
        Ok(())
    }

    fn copy(&mut self, source: &HeadlessImage, destination: &mut HeadlessImage) {
        destination.clone_from(source);
        self.stats.copies += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_shader_has_no_material() {
        let mut backend = HeadlessBackend::new();
        let shader = ShaderHandle::new("missing");
        assert_eq!(backend.create_material(&shader), None);
        backend.register_shader(&shader);
        assert!(backend.create_material(&shader).is_some());
    }

    #[test]
    fn materials_released_once() {
        let mut backend = HeadlessBackend::new();
        let shader = ShaderHandle::new("test");
        backend.register_shader(&shader);
        let material = backend.create_material(&shader).unwrap();
        assert_eq!(backend.live_material_count(), 1);

        backend.release_material(material);
        backend.release_material(material);
        let stats = backend.stats();
        assert_eq!(stats.materials_released, 1);
        assert_eq!(stats.invalid_releases, 1);
        assert_eq!(backend.live_material_count(), 0);
    }

    #[test]
    fn buffers_tracked_until_released() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(3, 12).unwrap();
        assert!(backend.write_buffer(buffer, &[0; 35]).is_err());
        backend.write_buffer(buffer, &[1; 36]).unwrap();
        assert_eq!(backend.live_buffer_count(), 1);

        backend.release_buffer(buffer);
        backend.release_buffer(buffer);
        let stats = backend.stats();
        assert_eq!(stats.buffers_created, 1);
        assert_eq!(stats.buffers_released, 1);
        assert_eq!(stats.invalid_releases, 1);
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn zero_length_buffer() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(0, 72).unwrap();
        backend.write_buffer(buffer, &[]).unwrap();
        backend.release_buffer(buffer);
        assert_eq!(backend.stats().invalid_releases, 0);
    }
}
