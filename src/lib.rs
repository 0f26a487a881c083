//! CPU side of a sphere-traced CSG renderer: scene flattening into fixed-stride GPU records,
//! frustum corner math, per-frame uniforms and transient buffer lifetimes.

pub mod camera;
pub mod config;
pub mod engine;
pub mod helper;
pub mod renderer;
