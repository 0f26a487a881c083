use super::shader_interfaces::{
    operation_buffer::OperationLayout, record_layout::RecordLayout, shape_buffer::ShapeLayout,
};

/// Structured buffer slot names the raymarch shader declares
pub mod buffer_names {
    pub const OPERATIONS: &str = "operations";
    pub const SHAPES: &str = "shapes";
}

/// Texture slot the source image is bound to for the draw
pub const MAIN_TEXTURE: &str = "_MainTex";

/// Name of the shader the demo binary registers and renders with
pub const RAYMARCH_SHADER_NAME: &str = "Hidden/RaymarchCSG";

pub const DEFAULT_RECORD_LAYOUT: RecordLayout =
    RecordLayout::new(OperationLayout::Blend, ShapeLayout::Plain);
