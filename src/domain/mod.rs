// Domain module - Configuration and error types shared by every harness
pub mod config;
pub mod error;
