use super::shader_interfaces::GpuInt;
use crate::helper::angle::Angle;
use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Post filter applied after shading
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    #[default]
    Disabled,
    /// Brighten surfaces by their distance gradient, see [`RenderSettings::highlight_gradient`]
    Highlight,
}

impl Filter {
    pub fn code(&self) -> GpuInt {
        match *self {
            Self::Disabled => 0,
            Self::Highlight => 1,
        }
    }
}

/// Which colour the highlight filter tints with
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightType {
    #[default]
    ShapeColor,
    /// Use [`RenderSettings::emissive_color`] for every shape
    SingleColor,
}

impl HighlightType {
    pub fn code(&self) -> GpuInt {
        match *self {
            Self::ShapeColor => 0,
            Self::SingleColor => 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightMode {
    #[default]
    Lambertian,
    /// Two-band shading split at [`RenderSettings::flip_angle`]
    CelShaded,
}

impl LightMode {
    pub fn code(&self) -> GpuInt {
        match *self {
            Self::Lambertian => 0,
            Self::CelShaded => 1,
        }
    }
}

/// User-editable shading parameters. Read once per frame, only ever changed between frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub dark_mode: bool,
    pub use_lighting: bool,
    /// rgba
    pub emissive_color: Vec4,
    pub highlight_gradient: GpuInt,
    pub highlight_strength: f32,
    pub non_highlight_strength: f32,
    pub filter: Filter,
    pub highlight_type: HighlightType,
    pub light_mode: LightMode,
    pub unlit_multiplier: f32,
    pub lit_multiplier: f32,
    /// Cel shading threshold between the lit and unlit band
    pub flip_angle: Angle,
    /// Use `flip_angle` instead of the shader's built-in threshold
    pub custom_angle: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            use_lighting: true,
            emissive_color: Vec4::ONE,
            highlight_gradient: 20,
            highlight_strength: 3.,
            non_highlight_strength: 0.5,
            filter: Filter::default(),
            highlight_type: HighlightType::default(),
            light_mode: LightMode::default(),
            unlit_multiplier: 0.5,
            lit_multiplier: 1.,
            flip_angle: Angle::from_degrees(90.),
            custom_angle: false,
        }
    }
}
