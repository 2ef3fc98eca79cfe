pub mod command_reader;
pub mod command_script;
