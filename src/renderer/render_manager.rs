use super::{
    config_renderer::buffer_names,
    frame_parameters::FrameParameters,
    render_backend::{MaterialId, RenderBackend, ShaderHandle},
    render_settings::RenderSettings,
    scene_flattener::SceneFlattener,
    shader_interfaces::record_layout::RecordLayout,
    transient_buffers::TransientBuffers,
};
use crate::{
    camera::Camera,
    engine::scene_provider::{LightProvider, NodeId, SceneProvider},
    helper::cached_resource::CachedResource,
};
use anyhow::Context;
use glam::Vec3;
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

/// What a frame ended up doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No usable material: the source was copied to the destination and nothing was allocated
    PassThrough,
    Rendered(FrameStats),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub operation_count: usize,
    pub shape_count: usize,
    pub owned_shape_count: usize,
    pub operation_bytes: usize,
    pub shape_bytes: usize,
    pub buffers_uploaded: usize,
}

/// Runs the per-frame raymarch pipeline: frame parameters, scene flattening, transient buffer
/// upload, draw, release.
pub struct RenderManager {
    shader: Option<ShaderHandle>,
    record_layout: RecordLayout,
    settings: RenderSettings,
    material: CachedResource<MaterialId>,
    light: CachedResource<NodeId>,
    flattener: SceneFlattener,
    /// Set while frames are being passed through, so the fallback is only logged on transitions
    passing_through: bool,
}

// Public functions
impl RenderManager {
    pub fn new(
        shader: Option<ShaderHandle>,
        record_layout: RecordLayout,
        settings: RenderSettings,
    ) -> Self {
        log_record_layout(&record_layout);
        Self {
            shader,
            record_layout,
            settings,
            material: CachedResource::new(),
            light: CachedResource::new(),
            flattener: SceneFlattener::new(),
            passing_through: false,
        }
    }

    /// Swaps the shader (and the record layout it expects). The current material is released
    /// and a new one is created on the next frame.
    pub fn set_shader<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        shader: Option<ShaderHandle>,
        record_layout: RecordLayout,
    ) {
        self.release_material(backend);
        self.shader = shader;
        if self.record_layout != record_layout {
            log_record_layout(&record_layout);
            self.record_layout = record_layout;
        }
    }

    /// Call when the backend destroyed the material on its own. The handle is forgotten without
    /// releasing it.
    pub fn invalidate_material(&mut self) {
        if let Some(material) = self.material.invalidate() {
            debug!("{} invalidated", material);
        }
    }

    /// Releases the cached material, e.g. before the backend shuts down
    pub fn release_material<B: RenderBackend>(&mut self, backend: &mut B) {
        if let Some(material) = self.material.invalidate() {
            debug!("releasing {}", material);
            backend.release_material(material);
        }
    }

    /// Call when the scene's lights changed so the directional light is searched for again
    pub fn invalidate_light(&mut self) {
        if let Some(light) = self.light.invalidate() {
            debug!("cached light node {} invalidated", light);
        }
    }

    /// Renders one frame from `source` into `destination`. Transient buffers are released before
    /// this returns, including when it returns an error.
    pub fn render_frame<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        scene: &dyn SceneProvider,
        lights: &dyn LightProvider,
        camera: &Camera,
        source: &B::Image,
        destination: &mut B::Image,
    ) -> anyhow::Result<FrameOutcome> {
        let shader = self.shader.as_ref();
        let material = self
            .material
            .get_or_try_init(|| shader.and_then(|shader| backend.create_material(shader)))
            .copied();

        let Some(material) = material else {
            if !self.passing_through {
                match &self.shader {
                    Some(shader) => warn!("no material for {}. passing frames through", shader),
                    None => info!("no raymarch shader set. passing frames through"),
                }
                self.passing_through = true;
            }
            backend.copy(source, destination);
            return Ok(FrameOutcome::PassThrough);
        };
        if self.passing_through {
            info!("{} ready. raymarching resumed", material);
            self.passing_through = false;
        }

        let light_direction = self.light_direction(lights);
        let flattened = self.flattener.flatten(scene);

        // operation count always describes the arrays uploaded below
        let parameters = FrameParameters::build(
            camera,
            light_direction,
            &self.settings,
            flattened.operation_count(),
        );
        for (name, value) in parameters.uniforms() {
            backend.set_uniform(material, name, value);
        }
        backend.set_uniform_block(material, &parameters.uniform_block());

        let layout = self.record_layout;
        let operation_bytes = flattened.encode_operations(layout.operation);
        let shape_bytes = flattened.encode_shapes(layout.shape);

        let mut buffers = TransientBuffers::new(backend);
        buffers
            .upload(
                material,
                buffer_names::OPERATIONS,
                &operation_bytes,
                flattened.operation_count(),
                layout.operation.stride(),
            )
            .context("uploading operations")?;
        buffers
            .upload(
                material,
                buffer_names::SHAPES,
                &shape_bytes,
                flattened.shape_count(),
                layout.shape.stride(),
            )
            .context("uploading shapes")?;
        buffers
            .backend()
            .draw(material, source, destination)
            .context("raymarch draw")?;
        let buffers_uploaded = buffers.len();
        drop(buffers);

        let stats = FrameStats {
            operation_count: flattened.operation_count(),
            shape_count: flattened.shape_count(),
            owned_shape_count: flattened.owned_shape_count(),
            operation_bytes: operation_bytes.len(),
            shape_bytes: shape_bytes.len(),
            buffers_uploaded,
        };
        trace!("frame rendered: {:?}", stats);
        Ok(FrameOutcome::Rendered(stats))
    }

    // Getters

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Only change settings between frames
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }

    pub fn record_layout(&self) -> RecordLayout {
        self.record_layout
    }

    pub fn shader(&self) -> Option<&ShaderHandle> {
        self.shader.as_ref()
    }

    pub fn has_material(&self) -> bool {
        self.material.is_initialized()
    }
}

// Private functions
impl RenderManager {
    /// Forward vector of the cached directional light, searching again if it stopped answering
    fn light_direction(&mut self, lights: &dyn LightProvider) -> Option<Vec3> {
        if let Some(&light) = self.light.get() {
            if let Some(forward) = lights.light_forward(light) {
                return Some(forward);
            }
            debug!("light node {} is gone. searching for another", light);
            self.light.invalidate();
        }

        let light = *self
            .light
            .get_or_try_init(|| lights.find_directional_light())?;
        lights.light_forward(light)
    }
}

fn log_record_layout(record_layout: &RecordLayout) {
    let (kind_offset, index_offset) = record_layout.shape.kind_and_index_offsets();
    debug!(
        "record layout: {}. shape kind at byte {}, owner index at byte {}",
        record_layout, kind_offset, index_offset
    );
}
