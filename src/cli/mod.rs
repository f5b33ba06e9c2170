pub mod commands;
pub mod display;
pub mod doctor;
pub mod migrate;
pub mod prompt;

pub use commands::CliArgs;
