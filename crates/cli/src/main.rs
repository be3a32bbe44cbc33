//! Command-line entry point for `runtime-env`.
//!
//! All work is delegated to [`runtime_env::run`].

fn main() -> anyhow::Result<()> {
    runtime_env::run()
}
