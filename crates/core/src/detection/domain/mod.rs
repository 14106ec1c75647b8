pub mod color_segmenter;
pub mod detection_config;
pub mod detection_result;
pub mod hsv_range;
pub mod region;
pub mod region_extractor;
pub mod region_selector;
