//! The resource mapping: which repositories and which auxiliary asset to fetch.
//!
//! The list is compiled in. Only the mirror base URL varies, so tests can point
//! the same mapping at a local server.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default model hub mirror.
pub const DEFAULT_MIRROR: &str = "https://hf-mirror.com";

/// Model repositories cloned into the target root, in fetch order.
pub const MODEL_REPOS: &[&str] = &[
    "Xenova/whisper-tiny",
    "Xenova/LaMini-Flan-T5-77M",
    "Xenova/speecht5_tts",
];

const SPEAKER_EMBEDDINGS_PATH: &str =
    "datasets/Xenova/transformers.js-docs/resolve/main/speaker_embeddings.bin";
const SPEAKER_EMBEDDINGS_DIR: &str = "Xenova/speecht5_tts";
const SPEAKER_EMBEDDINGS_FILE: &str = "speaker_embeddings.bin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("resource name {0:?} is not a relative path of plain components")]
    InvalidName(String),
    #[error("file name {0:?} must be a single plain path component")]
    InvalidFileName(String),
    #[error("resource name {0:?} appears more than once")]
    Duplicate(String),
    #[error("resource {inner:?} would be cloned inside resource {outer:?}")]
    Nested { outer: String, inner: String },
    #[error("invalid source URL for {name:?}: {url}")]
    InvalidUrl { name: String, url: String },
}

/// One repository: logical name (also its relative target path) and clone URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoResource {
    pub name: String,
    pub url: String,
}

/// The single non-repository file fetched over plain HTTP(S).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResource {
    pub url: String,
    /// Relative directory under the target root.
    pub dir: String,
    pub file_name: String,
}

impl AssetResource {
    /// Logical name used in logs and reports: `dir/file_name`.
    pub fn name(&self) -> String {
        format!("{}/{}", self.dir, self.file_name)
    }
}

/// Ordered resource mapping handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub repos: Vec<RepoResource>,
    pub asset: AssetResource,
}

impl Manifest {
    /// The built-in mapping with every URL rooted at `mirror`.
    pub fn builtin(mirror: &str) -> Self {
        let base = mirror.trim_end_matches('/');
        let repos = MODEL_REPOS
            .iter()
            .map(|name| RepoResource {
                name: (*name).to_string(),
                url: format!("{}/{}", base, name),
            })
            .collect();
        Manifest {
            repos,
            asset: AssetResource {
                url: format!("{}/{}", base, SPEAKER_EMBEDDINGS_PATH),
                dir: SPEAKER_EMBEDDINGS_DIR.to_string(),
                file_name: SPEAKER_EMBEDDINGS_FILE.to_string(),
            },
        }
    }

    /// Check names are safe relative paths that don't collide, and URLs parse.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for repo in &self.repos {
            validate_relative(&repo.name)?;
            if !seen.insert(repo.name.as_str()) {
                return Err(ManifestError::Duplicate(repo.name.clone()));
            }
            if url::Url::parse(&repo.url).is_err() {
                return Err(ManifestError::InvalidUrl {
                    name: repo.name.clone(),
                    url: repo.url.clone(),
                });
            }
        }

        for outer in &self.repos {
            for inner in &self.repos {
                if outer.name != inner.name
                    && Path::new(&inner.name).starts_with(Path::new(&outer.name))
                {
                    return Err(ManifestError::Nested {
                        outer: outer.name.clone(),
                        inner: inner.name.clone(),
                    });
                }
            }
        }

        validate_relative(&self.asset.dir)?;
        let file = Path::new(&self.asset.file_name);
        let mut components = file.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(ManifestError::InvalidFileName(self.asset.file_name.clone())),
        }
        if url::Url::parse(&self.asset.url).is_err() {
            return Err(ManifestError::InvalidUrl {
                name: self.asset.name(),
                url: self.asset.url.clone(),
            });
        }
        Ok(())
    }
}

/// A logical name must be non-empty and consist only of normal components
/// (no root, no `.` or `..`), so it always lands under the target root.
pub fn validate_relative(name: &str) -> Result<PathBuf, ManifestError> {
    let path = Path::new(name);
    if name.is_empty() || path.components().next().is_none() {
        return Err(ManifestError::InvalidName(name.to_string()));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(ManifestError::InvalidName(name.to_string()));
    }
    Ok(path.to_path_buf())
}
