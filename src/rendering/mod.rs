pub mod depth_texture;
pub mod draw_list;
pub mod renderer;
pub mod shader_loader;
pub mod vertex;
