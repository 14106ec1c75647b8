pub mod color;
pub mod constants;
pub mod frame;
pub mod mask;
pub mod video_metadata;
