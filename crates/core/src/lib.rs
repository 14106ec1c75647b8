//! Real-time color-blob tracking: HSV segmentation, connected-component
//! analysis and marker annotation over video, camera and image sources.

pub mod annotation;
pub mod detection;
pub mod pipeline;
pub mod reporting;
pub mod shared;
pub mod video;
