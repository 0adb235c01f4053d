//! Target root resolution and per-resource paths.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::{validate_relative, ManifestError};

/// Directory name created next to the executable when no override is given.
pub const MODELS_DIR_NAME: &str = "models";

/// Resolve the target root: the override if given (made absolute against the
/// current directory), else `models/` next to the running executable.
pub fn resolve_target_root(override_dir: Option<&Path>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) if dir.is_absolute() => Ok(dir.to_path_buf()),
        Some(dir) => Ok(std::env::current_dir()
            .context("cannot determine current directory")?
            .join(dir)),
        None => {
            let exe = std::env::current_exe().context("cannot locate the running executable")?;
            let program_dir = exe
                .parent()
                .context("executable path has no parent directory")?;
            Ok(program_dir.join(MODELS_DIR_NAME))
        }
    }
}

/// Create the target root and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}

/// `root/<name>` for a validated logical name.
pub fn resource_path(root: &Path, name: &str) -> Result<PathBuf, ManifestError> {
    Ok(root.join(validate_relative(name)?))
}
