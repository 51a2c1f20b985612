pub mod camera;
pub mod config;
pub mod demo;
pub mod engine;
pub mod math;
pub mod rendering;
pub mod scene_graph;
pub mod window;
