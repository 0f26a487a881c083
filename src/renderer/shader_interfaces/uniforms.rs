use super::GpuInt;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Uniform names the raymarch shader declares. Passed verbatim to the render backend.
#[rustfmt::skip]
pub mod uniform_names {
    // scene
    pub const FRUSTUM:                &str = "_Frustum";
    pub const CAMERA_TO_WORLD:        &str = "_CamMatrix";
    pub const LIGHT:                  &str = "_Light";
    pub const OPERATION_COUNT:        &str = "_OperationCount";
    // filter
    pub const EMISSIVE_COLOR:         &str = "_EmissiveColor";
    pub const USE_LIGHT:              &str = "_UseLight";
    pub const DARK_MODE:              &str = "_DarkMode";
    pub const HIGHLIGHT_GRADIENT:     &str = "_HighlightGradient";
    pub const FILTER:                 &str = "_Filter";
    pub const HIGHLIGHT:              &str = "_Highlight";
    pub const HIGHLIGHT_STRENGTH:     &str = "_HighlightStrength";
    pub const NON_HIGHLIGHT_STRENGTH: &str = "_NonHighlightStrength";
    // lighting
    pub const LIGHT_MODE:             &str = "_LightMode";
    pub const FLIP_ANGLE:             &str = "_FlipAngle";
    pub const LIT_MULTIPLIER:         &str = "_LitMultiplier";
    pub const UNLIT_MULTIPLIER:       &str = "_UnlitMultiplier";
    pub const CUSTOM_ANGLE:           &str = "_CustomAngle";
}

/// A single uniform value. Booleans are sent as `Int` 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(GpuInt),
    Float(f32),
    Vector(Vec4),
    Matrix(Mat4),
}

impl UniformValue {
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        Self::Int(value as GpuInt)
    }
}

/// The per-frame uniforms packed into one block, for backends that upload a single uniform
/// buffer instead of setting values by name. Size is a multiple of 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniformBlock {
    /// Rows 0..3 are the top-left, top-right, bottom-right, bottom-left corner rays
    pub frustum: [f32; 16],
    pub camera_to_world: [f32; 16],
    /// w component unused
    pub light: [f32; 4],
    pub emissive_color: [f32; 4],
    pub operation_count: GpuInt,
    pub use_light: GpuInt,
    pub dark_mode: GpuInt,
    pub highlight_gradient: GpuInt,
    pub filter: GpuInt,
    pub highlight: GpuInt,
    pub light_mode: GpuInt,
    pub custom_angle: GpuInt,
    pub highlight_strength: f32,
    pub non_highlight_strength: f32,
    pub flip_angle: f32,
    pub lit_multiplier: f32,
    pub unlit_multiplier: f32,
    pub padding: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<FrameUniformBlock>() % 16 == 0);
