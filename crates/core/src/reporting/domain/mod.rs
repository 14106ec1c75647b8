pub mod detection_writer;
