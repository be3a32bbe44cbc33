//! Shared test utilities for runtime-env crates.
//!
//! Helpers for tests that touch process-global environment state, plus a
//! temp-dir fixture for dotenv files and generated artifacts.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = runtime_env_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value" until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Temp directory holding a project's `.env` file and generated output.
///
/// The directory is removed when the fixture drops.
pub struct EnvFixture {
    pub tempdir: tempfile::TempDir,
}

impl EnvFixture {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            tempdir: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.tempdir.path()
    }

    /// Absolute path of `rel` inside the fixture.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.tempdir.path().join(rel)
    }

    /// Writes a dotenv file at `rel`, creating parent directories.
    pub fn write_env_file(&self, rel: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Reads a generated file at `rel`.
    pub fn read(&self, rel: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.path(rel))
    }
}

/// Extracts the JSON object from a `window.<key> = {...}` script.
///
/// Returns `None` when the script does not assign `key`.
pub fn script_json<'a>(script: &'a str, key: &str) -> Option<&'a str> {
    script.strip_prefix("window.")?.strip_prefix(key)?.strip_prefix(" = ")
}
