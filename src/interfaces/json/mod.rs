pub mod projection_writer;
