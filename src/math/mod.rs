mod matrix3;
mod matrix4;

pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
