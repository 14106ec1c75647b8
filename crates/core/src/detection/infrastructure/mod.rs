pub mod config_file;
pub mod connected_component_extractor;
