//! Collector → renderer → sink pipeline.

use crate::environment::{load, BaseEnvironment, CollectSource, EnvironmentMap};
use crate::error::{Error, Result};
use crate::render::{
    render_runtime_script, render_type_declaration_for, RenderedArtifact, DEFAULT_GLOBAL_KEY,
};
use crate::sink;
use std::path::PathBuf;
use tracing::info;

/// Default location of the runtime script.
pub const DEFAULT_OUTPUT: &str = "./env.js";

/// Validated settings for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Where variables come from and how they are filtered.
    pub source: CollectSource,
    /// Path of the runtime script.
    pub output: PathBuf,
    /// Path of the TypeScript declaration; skipped when `None`.
    pub type_declarations_file: Option<PathBuf>,
    /// Property assigned on `window`.
    pub global_key: String,
    /// Regenerate whenever the env file changes.
    pub watch: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: CollectSource::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            type_declarations_file: None,
            global_key: DEFAULT_GLOBAL_KEY.to_string(),
            watch: false,
        }
    }
}

impl PipelineConfig {
    /// Rejects combinations that can never produce a usable run.
    pub fn validate(&self) -> Result<()> {
        if self.watch && self.source.inline_file.is_none() {
            return Err(Error::InvalidConfig(
                "the watch flag can only be used with an env file".into(),
            ));
        }
        if self.global_key.trim().is_empty() {
            return Err(Error::InvalidConfig("the global key must not be empty".into()));
        }
        Ok(())
    }
}

/// Outcome of one successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Emitted variable names, sorted.
    pub keys: Vec<String>,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

/// Runs the generation pipeline against an environment snapshot.
///
/// Without `clear_ambient`, the environment produced by a run (snapshot plus
/// file entries) becomes the starting point of the next one, so keys removed
/// from the env file keep their last loaded value until the process restarts.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    environment: BaseEnvironment,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, environment: BaseEnvironment) -> Self {
        Self {
            config,
            environment,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The environment the next run starts from.
    pub fn environment(&self) -> &BaseEnvironment {
        &self.environment
    }

    /// Renders every configured artifact for `env` without touching disk.
    pub fn render(&self, env: &EnvironmentMap) -> Result<Vec<RenderedArtifact>> {
        let mut artifacts = vec![RenderedArtifact::new(
            &self.config.output,
            render_runtime_script(env, &self.config.global_key)?,
        )];
        if let Some(path) = &self.config.type_declarations_file {
            artifacts.push(RenderedArtifact::new(
                path,
                render_type_declaration_for(env, &self.config.global_key),
            ));
        }
        Ok(artifacts)
    }

    /// Collects, renders and writes. All artifacts are rendered before the
    /// first write, so a collection or rendering failure leaves disk untouched.
    pub fn run(&mut self) -> Result<RunReport> {
        let merged = load(&self.environment, &self.config.source)?;
        let env = self.config.source.filter.filter(&merged);
        if !self.config.source.clear_ambient {
            self.environment = merged;
        }

        let keys: Vec<String> = env.sorted_keys().into_iter().map(String::from).collect();
        info!("Following envs have been loaded: {}", keys.join(", "));

        let artifacts = self.render(&env)?;
        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            sink::write_artifact(artifact)?;
            info!("Config has been written to {}", artifact.path.display());
            written.push(artifact.path.clone());
        }

        Ok(RunReport { keys, written })
    }
}
