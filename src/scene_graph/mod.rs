pub mod animated;
pub mod pyramid;
pub mod scene;
pub mod scene_node;
