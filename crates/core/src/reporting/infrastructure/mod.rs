pub mod json_lines_writer;
