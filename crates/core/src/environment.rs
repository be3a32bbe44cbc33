//! Environment collection: ambient snapshot, dotenv merge and prefix filtering.
//!
//! The process environment is read once into a [`BaseEnvironment`] and never
//! written to. Every run works on its own copy, so concurrent or repeated runs
//! cannot observe each other's file loads unless the caller threads the merged
//! environment forward explicitly.

use crate::dotenv;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Immutable snapshot of the variables visible to a run before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseEnvironment {
    vars: HashMap<String, String>,
}

impl BaseEnvironment {
    /// Captures the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 cannot be emitted as
    /// JSON strings and are skipped.
    pub fn capture() -> Self {
        let mut vars = HashMap::new();
        for (key, value) in std::env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    vars.insert(key, value);
                }
                (key, _) => debug!(?key, "skipping non UTF-8 environment entry"),
            }
        }
        Self { vars }
    }

    /// An environment with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true when no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges the entries of a dotenv file, overwriting existing names.
    ///
    /// `$NAME` references resolve against this environment as built so far,
    /// never against the process environment.
    pub fn merge_dotenv(&mut self, path: &Path) -> Result<usize> {
        let file_error = |cause| Error::FileLoad {
            path: path.to_path_buf(),
            cause,
        };
        let text = fs::read_to_string(path)
            .map_err(|e| Error::from_dotenv(path.to_path_buf(), dotenvy::Error::Io(e)))?;
        let masked = dotenv::mask_references(text.trim_start_matches('\u{feff}'))
            .map_err(file_error)?;

        let mut loaded = 0;
        for entry in dotenvy::from_read_iter(masked.as_bytes()) {
            let (key, raw) = entry.map_err(|e| Error::from_dotenv(path.to_path_buf(), e))?;
            let value = dotenv::expand_references(&key, &raw, &self.vars).map_err(file_error)?;
            self.vars.insert(key, value);
            loaded += 1;
        }
        debug!(path = %path.display(), loaded, "merged dotenv file");
        Ok(loaded)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BaseEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Filtered name → value mapping handed to the renderers.
///
/// Iteration order is unspecified; use [`EnvironmentMap::sorted_keys`] where
/// output has to be stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentMap(HashMap<String, String>);

impl EnvironmentMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Variable names in ascending lexicographic order.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl From<HashMap<String, String>> for EnvironmentMap {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvironmentMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a EnvironmentMap {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Prefix filter applied to every collected name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Only names starting with this prefix are kept. `None` or an empty
    /// string disables filtering.
    pub prefix: Option<String>,
    /// Strip the prefix from retained names.
    pub remove_prefix: bool,
}

impl FilterSpec {
    /// Keeps names starting with `prefix`.
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            remove_prefix: false,
        }
    }

    /// Sets whether the prefix is stripped from retained names.
    pub fn with_remove_prefix(mut self, remove_prefix: bool) -> Self {
        self.remove_prefix = remove_prefix;
        self
    }

    fn active_prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// Maps a variable name to its output name, or `None` when filtered out.
    pub fn apply(&self, key: &str) -> Option<String> {
        let Some(prefix) = self.active_prefix() else {
            return Some(key.to_string());
        };
        let rest = key.strip_prefix(prefix)?;
        if self.remove_prefix {
            Some(rest.to_string())
        } else {
            Some(key.to_string())
        }
    }

    /// Filters a whole environment.
    ///
    /// Two names that reduce to the same stripped name collide; the surviving
    /// value depends on enumeration order and is therefore unspecified.
    pub fn filter(&self, env: &BaseEnvironment) -> EnvironmentMap {
        env.iter()
            .filter_map(|(key, value)| self.apply(key).map(|k| (k, value.to_string())))
            .collect()
    }
}

/// Where a run reads its variables from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSource {
    /// Dotenv file merged over the ambient environment.
    pub inline_file: Option<PathBuf>,
    /// Prefix filter.
    pub filter: FilterSpec,
    /// Treat the ambient environment as empty.
    pub clear_ambient: bool,
}

/// Builds the unfiltered environment for a run: the ambient snapshot (or
/// nothing when `clear_ambient` is set) with the dotenv file merged on top.
pub fn load(base: &BaseEnvironment, source: &CollectSource) -> Result<BaseEnvironment> {
    let mut env = if source.clear_ambient {
        BaseEnvironment::empty()
    } else {
        base.clone()
    };
    if let Some(path) = &source.inline_file {
        env.merge_dotenv(path)?;
    }
    Ok(env)
}

/// Collects the filtered variables for a run.
pub fn collect(base: &BaseEnvironment, source: &CollectSource) -> Result<EnvironmentMap> {
    let env = load(base, source)?;
    Ok(source.filter.filter(&env))
}
