//! Runtime configuration generation for single-page applications.
//!
//! This crate turns environment variables into files a browser application
//! loads at startup:
//! - [`environment`] snapshots the ambient environment, merges a dotenv file
//!   and applies prefix filtering.
//! - [`render`] produces the `window.<key> = {...}` script and the matching
//!   TypeScript declaration.
//! - [`sink`] writes artifacts, creating parent directories.
//! - [`pipeline`] chains the three for one run.
//! - `watch` re-runs the pipeline whenever the env file changes (enabled by
//!   the `watch` feature).
//!
//! # Examples
//!
//! ```
//! use runtime_env_core::{BaseEnvironment, CollectSource, FilterSpec, Pipeline, PipelineConfig};
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let config = PipelineConfig {
//!     source: CollectSource {
//!         filter: FilterSpec::prefixed("APP_").with_remove_prefix(true),
//!         ..Default::default()
//!     },
//!     output: dir.path().join("env.js"),
//!     ..Default::default()
//! };
//! let base: BaseEnvironment = [("APP_API_URL", "https://api.example.com")].into_iter().collect();
//!
//! let report = Pipeline::new(config, base).run().unwrap();
//! assert_eq!(report.keys, vec!["API_URL"]);
//! ```

#![deny(unsafe_code)]

mod dotenv;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod sink;
#[cfg(feature = "watch")]
pub mod watch;

pub use environment::{collect, load, BaseEnvironment, CollectSource, EnvironmentMap, FilterSpec};
pub use error::{Error, FileLoadCause, Result, SinkAction};
pub use pipeline::{Pipeline, PipelineConfig, RunReport, DEFAULT_OUTPUT};
pub use render::{
    render_runtime_script, render_type_declaration, render_type_declaration_for,
    RenderedArtifact, DEFAULT_GLOBAL_KEY,
};
#[cfg(feature = "watch")]
pub use watch::{Tick, WatchController, WatchState};
