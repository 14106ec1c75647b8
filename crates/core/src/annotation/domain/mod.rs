pub mod frame_annotator;
pub mod marker_geometry;
