//! Core types for the propmedia subsystem: domain models, the unified
//! `AppError`, and environment-driven configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
