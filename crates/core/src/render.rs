//! Renders the runtime script and the TypeScript declaration.
//!
//! Both renderers are pure: same map in, same text out.

use crate::environment::EnvironmentMap;
use crate::error::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Property assigned on `window` when none is configured.
pub const DEFAULT_GLOBAL_KEY: &str = "__RUNTIME_CONFIG__";

const DECLARATION_HEADER: &str = "/* eslint-disable */
/* ignore jslint start */
// tslint:disable
// jscs:disable
// jshint ignore: start

// prettier-ignore
export {};

// prettier-ignore
declare global {
\tinterface Window {
";

const FIELD_INDENT: &str = "\t\t\t";

/// A rendered file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub content: String,
}

impl RenderedArtifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Renders `window.<global_key> = <json>`.
///
/// Keys are emitted sorted so repeated runs produce identical bytes; callers
/// should still compare the parsed object rather than the key order.
pub fn render_runtime_script(env: &EnvironmentMap, global_key: &str) -> Result<String> {
    let ordered: BTreeMap<&str, &str> = env
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let json = serde_json::to_string(&ordered)?;
    Ok(format!("window.{global_key} = {json}"))
}

/// Renders the declaration for the default global key.
pub fn render_type_declaration(env: &EnvironmentMap) -> String {
    render_type_declaration_for(env, DEFAULT_GLOBAL_KEY)
}

/// Renders an ambient `Window` augmentation with one `string` field per key,
/// sorted ascending.
pub fn render_type_declaration_for(env: &EnvironmentMap, global_key: &str) -> String {
    let fields = env
        .sorted_keys()
        .into_iter()
        .map(|key| format!("{FIELD_INDENT}{key}: string;\n"))
        .collect::<String>();

    format!("{DECLARATION_HEADER}\t\t{global_key}: {{\n{fields}\t\t}};\n\t}}\n}}")
}
