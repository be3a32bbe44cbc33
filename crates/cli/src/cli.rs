use clap::Parser;
use runtime_env_core::{
    CollectSource, FilterSpec, PipelineConfig, Result, DEFAULT_GLOBAL_KEY, DEFAULT_OUTPUT,
};
use std::path::PathBuf;

/// Command-line interface for the `runtime-env` application.
#[derive(Debug, Parser)]
#[command(
    name = "runtime-env",
    version,
    about = "Runtime environment variables for single-page applications",
    override_usage = "runtime-env [OPTIONS]"
)]
pub struct Cli {
    /// The .env file to be parsed.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Only keep env vars starting with this prefix.
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output file path.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Output file path for the TypeScript declaration file.
    #[arg(long, visible_alias = "dts", value_name = "FILE")]
    pub type_declarations_file: Option<PathBuf>,

    /// Key on the window object the envs are assigned to.
    #[arg(long, visible_alias = "key", default_value = DEFAULT_GLOBAL_KEY)]
    pub global_key: String,

    /// Remove the prefix from the env names.
    #[arg(long, default_value_t = false)]
    pub remove_prefix: bool,

    /// Only read envs from the file, not from the process environment.
    #[arg(long, default_value_t = false)]
    pub no_envs: bool,

    /// Disable progress output.
    #[arg(long, visible_alias = "no-logs", default_value_t = false)]
    pub disable_logs: bool,

    /// Regenerate whenever the .env file changes (requires --env-file).
    #[arg(short, long, default_value_t = false)]
    pub watch: bool,
}

impl Cli {
    /// Builds the pipeline configuration, rejecting unusable flag combinations.
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            source: CollectSource {
                inline_file: self.env_file.clone(),
                filter: FilterSpec {
                    prefix: self.prefix.clone(),
                    remove_prefix: self.remove_prefix,
                },
                clear_ambient: self.no_envs,
            },
            output: self.output.clone(),
            type_declarations_file: self.type_declarations_file.clone(),
            global_key: self.global_key.clone(),
            watch: self.watch,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_env_core::Error;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("runtime-env").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn defaults_match_documented_values() {
        let cli = parse(&[]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.output, PathBuf::from("./env.js"));
        assert_eq!(config.global_key, "__RUNTIME_CONFIG__");
        assert!(config.type_declarations_file.is_none());
        assert!(config.source.inline_file.is_none());
        assert!(!config.source.clear_ambient);
        assert!(!config.watch);
        assert!(!cli.disable_logs);
    }

    #[test]
    fn short_flags_and_aliases_are_recognized() {
        let cli = parse(&[
            "-f",
            ".env.local",
            "-p",
            "VITE_",
            "-o",
            "public/env.js",
            "--dts",
            "src/env.d.ts",
            "--key",
            "__ENV__",
            "--no-logs",
            "-w",
        ]);
        assert_eq!(cli.env_file, Some(PathBuf::from(".env.local")));
        assert_eq!(cli.prefix.as_deref(), Some("VITE_"));
        assert_eq!(cli.output, PathBuf::from("public/env.js"));
        assert_eq!(cli.type_declarations_file, Some(PathBuf::from("src/env.d.ts")));
        assert_eq!(cli.global_key, "__ENV__");
        assert!(cli.disable_logs);
        assert!(cli.watch);
    }

    #[test]
    fn long_flags_map_onto_config() {
        let cli = parse(&[
            "--env-file",
            ".env",
            "--prefix",
            "APP_",
            "--remove-prefix",
            "--no-envs",
            "--type-declarations-file",
            "types/env.d.ts",
            "--global-key",
            "CFG",
            "--disable-logs",
        ]);
        let config = cli.to_config().unwrap();
        assert_eq!(
            config.source.filter,
            FilterSpec::prefixed("APP_").with_remove_prefix(true)
        );
        assert!(config.source.clear_ambient);
        assert_eq!(
            config.type_declarations_file,
            Some(PathBuf::from("types/env.d.ts"))
        );
        assert_eq!(config.global_key, "CFG");
    }

    #[test]
    fn watch_without_env_file_is_rejected() {
        let err = parse(&["--watch"]).to_config().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn short_options_can_be_grouped() {
        let cli = parse(&["-wf", ".env"]);
        assert!(cli.watch);
        assert_eq!(cli.env_file, Some(PathBuf::from(".env")));
    }

    #[test]
    fn unknown_flag_is_a_parse_error() {
        assert!(Cli::try_parse_from(["runtime-env", "--bogus"]).is_err());
    }
}
