//! Structs and constants matching the interfaces of the raymarch shader

pub mod operation_buffer;
pub mod record_layout;
pub mod shape_buffer;
pub mod uniforms;

/// Integer type of the gpu records (`int` in shader code)
pub type GpuInt = i32;
