pub mod frame_pipeline;
pub mod pipeline_logger;
pub mod track_colors_use_case;
pub mod track_image_use_case;
pub mod tracking_summary;
