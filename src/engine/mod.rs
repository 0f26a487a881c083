pub mod config_engine;
pub mod operation;
pub mod save_states;
pub mod scene_graph;
pub mod scene_provider;
pub mod shape;
