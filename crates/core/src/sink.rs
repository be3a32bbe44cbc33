//! Writes rendered artifacts to disk.

use crate::error::{Error, Result, SinkAction};
use crate::render::RenderedArtifact;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes `content` to `path`, creating missing parent directories.
///
/// The file is truncated before writing. There is no rename-swap, so a crash
/// mid-write can leave a partial file behind.
pub fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::sink(parent, SinkAction::CreateDir, e))?;
            info!(
                "Non existent folders on path '{}' have been created",
                parent.display()
            );
        }
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::sink(path, SinkAction::Open, e))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| Error::sink(path, SinkAction::Write, e))
}

/// Writes a rendered artifact.
pub fn write_artifact(artifact: &RenderedArtifact) -> Result<()> {
    write(&artifact.path, &artifact.content)
}
