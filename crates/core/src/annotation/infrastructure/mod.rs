pub mod bitmap_font;
pub mod marker_annotator;
