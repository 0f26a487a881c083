use super::render_backend::{BufferId, MaterialId, RenderBackend};
use anyhow::{ensure, Context};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

/// Buffers that only live for one frame. Every buffer acquired through [`Self::upload`] is
/// released exactly once when the guard drops, whichever way the frame exits.
pub struct TransientBuffers<'a, B: RenderBackend> {
    backend: &'a mut B,
    buffers: Vec<BufferId>,
}

impl<'a, B: RenderBackend> TransientBuffers<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            buffers: Vec::with_capacity(2),
        }
    }

    /// Creates a buffer of exactly `count * stride` bytes, fills it with `data` and binds it to
    /// `slot` of `material`. Zero-length buffers go through the same path.
    pub fn upload(
        &mut self,
        material: MaterialId,
        slot: &str,
        data: &[u8],
        count: usize,
        stride: usize,
    ) -> anyhow::Result<BufferId> {
        ensure!(
            count.checked_mul(stride) == Some(data.len()),
            "'{}' data is {} bytes, expected {} records of {} bytes",
            slot,
            data.len(),
            count,
            stride
        );

        let buffer = self
            .backend
            .create_buffer(count, stride)
            .with_context(|| format!("failed to create '{}' buffer", slot))?;
        // tracked before anything else can fail so it's always released
        self.buffers.push(buffer);

        self.backend
            .write_buffer(buffer, data)
            .with_context(|| format!("failed to write '{}' buffer", slot))?;
        self.backend
            .bind_buffer(material, slot, buffer)
            .with_context(|| format!("failed to bind '{}' buffer", slot))?;
        Ok(buffer)
    }

    /// The backend, for the draw and uniform calls made while the buffers are alive
    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl<'a, B: RenderBackend> Drop for TransientBuffers<'a, B> {
    fn drop(&mut self) {
        if !self.buffers.is_empty() {
            trace!("releasing {} transient buffer(s)", self.buffers.len());
        }
        for buffer in self.buffers.drain(..) {
            self.backend.release_buffer(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{
        headless_backend::HeadlessBackend, render_backend::ShaderHandle,
    };
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn backend_with_material() -> (HeadlessBackend, MaterialId) {
        let mut backend = HeadlessBackend::new();
        let shader = ShaderHandle::new("test");
        backend.register_shader(&shader);
        let material = backend.create_material(&shader).unwrap();
        (backend, material)
    }

    #[test]
    fn released_on_drop() {
        let (mut backend, material) = backend_with_material();
        {
            let mut buffers = TransientBuffers::new(&mut backend);
            buffers.upload(material, "a", &[1; 24], 2, 12).unwrap();
            buffers.upload(material, "b", &[], 0, 72).unwrap();
            assert_eq!(buffers.len(), 2);
            assert_eq!(buffers.backend().live_buffer_count(), 2);
        }
        assert_eq!(backend.live_buffer_count(), 0);
        assert_eq!(backend.stats().buffers_released, 2);
        assert_eq!(backend.stats().invalid_releases, 0);
    }

    #[test]
    fn released_on_error_path() {
        let (mut backend, material) = backend_with_material();
        let result = (|| -> anyhow::Result<()> {
            let mut buffers = TransientBuffers::new(&mut backend);
            buffers.upload(material, "a", &[0; 12], 1, 12)?;
            // unknown material makes the bind fail after the buffer was created
            buffers.upload(MaterialId(9999), "b", &[0; 12], 1, 12)?;
            Ok(())
        })();
        assert!(result.is_err());
        assert_eq!(backend.stats().buffers_created, 2);
        assert_eq!(backend.stats().buffers_released, 2);
    }

    #[test]
    fn size_mismatch_allocates_nothing() {
        let (mut backend, material) = backend_with_material();
        {
            let mut buffers = TransientBuffers::new(&mut backend);
            assert!(buffers.upload(material, "a", &[0; 10], 1, 12).is_err());
            assert!(buffers.is_empty());
        }
        assert_eq!(backend.stats().buffers_created, 0);
    }

    #[test]
    fn released_when_unwinding() {
        let (mut backend, material) = backend_with_material();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut buffers = TransientBuffers::new(&mut backend);
            buffers.upload(material, "a", &[0; 8], 1, 8).unwrap();
            panic!("frame aborted");
        }));
        assert!(result.is_err());
        assert_eq!(backend.live_buffer_count(), 0);
    }
}
