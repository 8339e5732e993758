//! Shared utilities

pub mod config;
pub mod diagnostic;

pub use config::{Config, OutputFormat};
pub use diagnostic::Diagnostic;
