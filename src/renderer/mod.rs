pub mod config_renderer;
pub mod frame_parameters;
pub mod frustum;
pub mod headless_backend;
pub mod render_backend;
pub mod render_manager;
pub mod render_settings;
pub mod scene_flattener;
pub mod shader_interfaces;
pub mod transient_buffers;
