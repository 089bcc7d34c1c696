//! Command-line driver: load a JSON project, run the convert-to-async
//! action on one method, print the result.

pub mod args;
pub mod driver;
pub mod tracing_config;
