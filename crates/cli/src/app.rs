//! Entry point wiring: logging, configuration and mode selection.

use crate::cli::Cli;
use anyhow::Result;
use clap::Parser;
use runtime_env_core::{BaseEnvironment, Pipeline, PipelineConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// The main entry point for the `runtime-env` application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.disable_logs);
    execute(cli.to_config()?)
}

/// Runs the pipeline once, or hands it to the watch controller.
///
/// The process environment is captured here, once; every later run works on
/// that snapshot.
pub fn execute(config: PipelineConfig) -> Result<()> {
    let mut pipeline = Pipeline::new(config, BaseEnvironment::capture());
    debug!(
        ambient = pipeline.environment().len(),
        "captured process environment"
    );
    if pipeline.config().watch {
        return watch(pipeline);
    }
    pipeline.run()?;
    Ok(())
}

#[cfg(feature = "watch")]
fn watch(pipeline: Pipeline) -> Result<()> {
    runtime_env_core::WatchController::new(pipeline)?.run()?;
    Ok(())
}

/// Placeholder for watch mode when the `watch` feature is disabled.
///
/// It returns an error if called.
#[cfg(not(feature = "watch"))]
fn watch(_pipeline: Pipeline) -> Result<()> {
    Err(anyhow::anyhow!(
        "watch feature is disabled; rebuild with --features watch"
    ))
}

/// Initialize tracing; `--disable-logs` keeps warnings and errors only.
fn init_tracing(disable_logs: bool) {
    let filter = if disable_logs {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_env_core::{CollectSource, Error};
    use runtime_env_test_utils::EnvFixture;

    #[test]
    fn execute_writes_output_once() {
        let fixture = EnvFixture::new().unwrap();
        let env_file = fixture.write_env_file(".env", "ONLY=1\n").unwrap();
        let config = PipelineConfig {
            source: CollectSource {
                inline_file: Some(env_file),
                clear_ambient: true,
                ..Default::default()
            },
            output: fixture.path("env.js"),
            ..Default::default()
        };

        execute(config).unwrap();

        assert_eq!(
            fixture.read("env.js").unwrap(),
            r#"window.__RUNTIME_CONFIG__ = {"ONLY":"1"}"#
        );
    }

    #[test]
    fn execute_surfaces_load_errors() {
        let fixture = EnvFixture::new().unwrap();
        let config = PipelineConfig {
            source: CollectSource {
                inline_file: Some(fixture.path("missing.env")),
                ..Default::default()
            },
            output: fixture.path("env.js"),
            ..Default::default()
        };

        let err = execute(config).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::FileLoad { .. })
        ));
        assert!(!fixture.path("env.js").exists());
    }

    #[test]
    fn execute_rejects_watch_without_env_file() {
        let config = PipelineConfig {
            watch: true,
            ..Default::default()
        };
        let err = execute(config).unwrap_err();
        #[cfg(feature = "watch")]
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidConfig(_))
        ));
        #[cfg(not(feature = "watch"))]
        assert!(err.to_string().contains("watch feature is disabled"));
    }
}
