//! Command-line layer of `runtime-env`.
//!
//! Parses flags into a validated [`runtime_env_core::PipelineConfig`], sets up
//! logging, and hands control to the core pipeline (or its watch controller).
//!
//! The `watch` feature enables `--watch`. Without it the flag is still parsed
//! but rejected at runtime.

pub mod app;
pub mod cli;

pub use app::{execute, run};
pub use cli::Cli;
