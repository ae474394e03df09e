pub mod config;
mod error;
pub mod fetch;
pub mod log;
pub mod probe;
mod progress;
pub mod report;
pub mod resolve;
pub mod run;

pub use error::ConfigError;
