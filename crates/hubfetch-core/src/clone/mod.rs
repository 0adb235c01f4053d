//! Repository fetcher: shallow clones through an external version-control tool.
//!
//! The driver only sees [`RepoCloner`]; [`GitCloner`] is the real implementation
//! and tests substitute their own.

mod error;

pub use error::CloneError;

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::CloneConfig;

/// Produce a checkout of `source` at `dest`.
pub trait RepoCloner {
    fn clone_repo(&self, source: &str, dest: &Path) -> Result<(), CloneError>;
}

impl<T: RepoCloner + ?Sized> RepoCloner for &T {
    fn clone_repo(&self, source: &str, dest: &Path) -> Result<(), CloneError> {
        (**self).clone_repo(source, dest)
    }
}

/// Runs `<program> clone --depth <depth> <source> <dest>` and waits for it.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
    depth: u32,
}

impl GitCloner {
    pub fn new(program: impl Into<String>, depth: u32) -> Self {
        Self {
            program: program.into(),
            depth: depth.max(1),
        }
    }

    pub fn from_config(cfg: &CloneConfig) -> Self {
        Self::new(cfg.program.clone(), cfg.depth)
    }

    fn command(&self, source: &str, dest: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("clone")
            .arg("--depth")
            .arg(self.depth.to_string())
            .arg(source)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::from_config(&CloneConfig::default())
    }
}

impl RepoCloner for GitCloner {
    fn clone_repo(&self, source: &str, dest: &Path) -> Result<(), CloneError> {
        tracing::debug!(
            program = %self.program,
            depth = self.depth,
            source,
            dest = %dest.display(),
            "spawning clone"
        );
        let output = self
            .command(source, dest)
            .output()
            .map_err(|source| CloneError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Child output goes to the console as-is.
        let _ = io::stdout().write_all(&output.stdout);
        let _ = io::stderr().write_all(&output.stderr);

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(CloneError::Exit {
            code: output.status.code(),
            stderr,
        })
    }
}
