//! The rendered configuration on disk.
//!
//! The activation tool reads the configuration from a fixed, well-known path
//! derived from the interface name. [`ArtifactSlot`] owns that path for the
//! duration of a sweep: each combination overwrites it and the file is
//! removed once the slot goes away.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::SweepError;
use crate::runner::SweepPlan;

#[derive(Debug)]
pub struct ArtifactSlot {
    path: PathBuf,
    written: bool,
}

impl ArtifactSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the artifact contents. The file is synced before returning so
    /// the activation tool never sees a partial configuration.
    pub fn write(&mut self, contents: &str) -> Result<(), SweepError> {
        write_private(&self.path, contents).map_err(|source| SweepError::Artifact {
            path: self.path.clone(),
            source,
        })?;
        self.written = true;
        debug!(path = %self.path.display(), "configuration artifact written");
        Ok(())
    }

    /// Remove the artifact if this slot wrote it.
    pub fn remove(&mut self) {
        if !self.written {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "configuration artifact removed"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(path = %self.path.display(), %error, "failed to remove configuration artifact"),
        }
        self.written = false;
    }
}

impl Drop for ArtifactSlot {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Write `contents` to `path` readable by the owner only (0600), creating
/// parent directories as needed.
pub fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

/// Render every combination of `plan` into `dir` without touching the
/// network. Files are named `<template>_<combination id>_<short name>.conf`.
pub fn generate_variations(plan: &SweepPlan, dir: &Path) -> Result<Vec<PathBuf>, SweepError> {
    let mut written = Vec::with_capacity(plan.total());

    for (template, sets) in plan.entries() {
        for set in sets {
            let path = dir.join(format!(
                "{}_{}_{}.conf",
                template.name(),
                set.combination_id,
                set.params.short_name()
            ));
            write_private(&path, &template.render(&set.params)).map_err(|source| {
                SweepError::Output {
                    path: path.clone(),
                    source,
                }
            })?;
            written.push(path);
        }
    }

    info!(count = written.len(), dir = %dir.display(), "generated configuration variations");
    Ok(written)
}
