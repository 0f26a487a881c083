use super::{
    frustum::FrustumCorners,
    render_settings::RenderSettings,
    shader_interfaces::{
        uniforms::{uniform_names, FrameUniformBlock, UniformValue},
        GpuInt,
    },
};
use crate::{camera::Camera, engine::config_engine::DEFAULT_LIGHT_DIRECTION};
use glam::{Mat4, Vec3};

/// Everything the shader reads per frame besides the two record arrays
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParameters {
    /// Corner rays as rows, see [`FrustumCorners::to_row_matrix`]
    pub frustum: Mat4,
    pub camera_to_world: Mat4,
    /// Direction the light shines in, world space
    pub light: Vec3,
    /// Number of records in this frame's operation array
    pub operation_count: GpuInt,
    pub settings: RenderSettings,
}

impl FrameParameters {
    /// `light_direction` is the forward vector of the scene's directional light. Without one the
    /// light points straight down.
    pub fn build(
        camera: &Camera,
        light_direction: Option<Vec3>,
        settings: &RenderSettings,
        operation_count: usize,
    ) -> Self {
        Self {
            frustum: FrustumCorners::new(camera.fov(), camera.aspect_ratio()).to_row_matrix(),
            camera_to_world: camera.camera_to_world(),
            light: light_direction.unwrap_or(DEFAULT_LIGHT_DIRECTION),
            operation_count: GpuInt::try_from(operation_count).unwrap_or(GpuInt::MAX),
            settings: *settings,
        }
    }

    /// Uniform values keyed by the names the shader declares
    pub fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        let settings = &self.settings;
        vec![
            // scene
            (uniform_names::FRUSTUM, UniformValue::Matrix(self.frustum)),
            (
                uniform_names::CAMERA_TO_WORLD,
                UniformValue::Matrix(self.camera_to_world),
            ),
            (uniform_names::LIGHT, UniformValue::Vector(self.light.extend(0.))),
            (
                uniform_names::OPERATION_COUNT,
                UniformValue::Int(self.operation_count),
            ),
            // filter
            (
                uniform_names::EMISSIVE_COLOR,
                UniformValue::Vector(settings.emissive_color),
            ),
            (
                uniform_names::USE_LIGHT,
                UniformValue::from_bool(settings.use_lighting),
            ),
            (
                uniform_names::DARK_MODE,
                UniformValue::from_bool(settings.dark_mode),
            ),
            (
                uniform_names::HIGHLIGHT_GRADIENT,
                UniformValue::Int(settings.highlight_gradient),
            ),
            (uniform_names::FILTER, UniformValue::Int(settings.filter.code())),
            (
                uniform_names::HIGHLIGHT,
                UniformValue::Int(settings.highlight_type.code()),
            ),
            (
                uniform_names::HIGHLIGHT_STRENGTH,
                UniformValue::Float(settings.highlight_strength),
            ),
            (
                uniform_names::NON_HIGHLIGHT_STRENGTH,
                UniformValue::Float(settings.non_highlight_strength),
            ),
            // lighting
            (
                uniform_names::LIGHT_MODE,
                UniformValue::Int(settings.light_mode.code()),
            ),
            (
                uniform_names::FLIP_ANGLE,
                UniformValue::Float(settings.flip_angle.degrees()),
            ),
            (
                uniform_names::LIT_MULTIPLIER,
                UniformValue::Float(settings.lit_multiplier),
            ),
            (
                uniform_names::UNLIT_MULTIPLIER,
                UniformValue::Float(settings.unlit_multiplier),
            ),
            (
                uniform_names::CUSTOM_ANGLE,
                UniformValue::from_bool(settings.custom_angle),
            ),
        ]
    }

    /// Same values packed for a single uniform buffer upload
    pub fn uniform_block(&self) -> FrameUniformBlock {
        let settings = &self.settings;
        FrameUniformBlock {
            frustum: self.frustum.to_cols_array(),
            camera_to_world: self.camera_to_world.to_cols_array(),
            light: self.light.extend(0.).to_array(),
            emissive_color: settings.emissive_color.to_array(),
            operation_count: self.operation_count,
            use_light: settings.use_lighting as GpuInt,
            dark_mode: settings.dark_mode as GpuInt,
            highlight_gradient: settings.highlight_gradient,
            filter: settings.filter.code(),
            highlight: settings.highlight_type.code(),
            light_mode: settings.light_mode.code(),
            custom_angle: settings.custom_angle as GpuInt,
            highlight_strength: settings.highlight_strength,
            non_highlight_strength: settings.non_highlight_strength,
            flip_angle: settings.flip_angle.degrees(),
            lit_multiplier: settings.lit_multiplier,
            unlit_multiplier: settings.unlit_multiplier,
            padding: [0.; 3],
        }
    }
}
