//! Reference collaborators for running the pipeline from the command line

pub mod console;
pub mod json_source;
pub mod status;

pub use console::ConsolePresenter;
pub use json_source::JsonFileSource;
pub use status::{format_eval, StatusLine};
