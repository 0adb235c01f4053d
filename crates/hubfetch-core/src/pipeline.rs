//! Sequential provisioning driver.
//!
//! Creates the target root, clones every repository in manifest order, then
//! downloads the asset. A failed resource is recorded and the run moves on;
//! only setup problems (bad manifest, unusable target root) end the run early.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::clone::RepoCloner;
use crate::download::AssetDownloader;
use crate::layout;
use crate::manifest::{Manifest, ManifestError};
use crate::report::{Outcome, ResourceKind, ResourceReport, RunReport};

/// One resource as it will be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedResource {
    pub name: String,
    pub kind: ResourceKind,
    pub source: String,
    pub target: PathBuf,
}

/// Start/completion notifications, in fetch order.
#[derive(Debug, Clone, Copy)]
pub enum FetchEvent<'a> {
    Started(&'a PlannedResource),
    Finished(&'a ResourceReport),
}

pub struct Provisioner<C, D> {
    root: PathBuf,
    manifest: Manifest,
    cloner: C,
    downloader: D,
}

impl<C: RepoCloner, D: AssetDownloader> Provisioner<C, D> {
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest, cloner: C, downloader: D) -> Self {
        Self {
            root: root.into(),
            manifest,
            cloner,
            downloader,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validated fetch order with absolute targets: repositories, then the asset.
    pub fn plan(&self) -> Result<Vec<PlannedResource>, ManifestError> {
        self.manifest.validate()?;
        let mut plan = Vec::with_capacity(self.manifest.repos.len() + 1);
        for repo in &self.manifest.repos {
            plan.push(PlannedResource {
                name: repo.name.clone(),
                kind: ResourceKind::Repository,
                source: repo.url.clone(),
                target: layout::resource_path(&self.root, &repo.name)?,
            });
        }
        let asset = &self.manifest.asset;
        plan.push(PlannedResource {
            name: asset.name(),
            kind: ResourceKind::Asset,
            source: asset.url.clone(),
            target: layout::resource_path(&self.root, &asset.dir)?.join(&asset.file_name),
        });
        Ok(plan)
    }

    /// Fetch everything once. Per-resource failures end up in the report.
    pub fn run<F>(&self, mut on_event: F) -> Result<RunReport>
    where
        F: FnMut(FetchEvent<'_>),
    {
        let plan = self.plan().context("invalid resource mapping")?;
        layout::ensure_dir(&self.root).context("cannot prepare target root")?;
        tracing::info!(root = %self.root.display(), resources = plan.len(), "starting provisioning run");

        let mut report = RunReport::default();
        for item in &plan {
            on_event(FetchEvent::Started(item));
            let outcome = match item.kind {
                ResourceKind::Repository => self.clone_one(item),
                ResourceKind::Asset => self.download_one(item),
            };
            let entry = ResourceReport {
                name: item.name.clone(),
                kind: item.kind,
                source: item.source.clone(),
                target: item.target.clone(),
                outcome,
            };
            on_event(FetchEvent::Finished(&entry));
            report.push(entry);
        }

        tracing::info!(
            total = report.resources.len(),
            failed = report.failure_count(),
            "provisioning run finished"
        );
        Ok(report)
    }

    fn clone_one(&self, item: &PlannedResource) -> Outcome {
        match self.cloner.clone_repo(&item.source, &item.target) {
            Ok(()) => {
                tracing::info!(resource = %item.name, "cloned");
                Outcome::Cloned
            }
            Err(e) => {
                tracing::error!(resource = %item.name, url = %item.source, error = %e, "clone failed");
                Outcome::Failed {
                    cause: e.to_string(),
                }
            }
        }
    }

    fn download_one(&self, item: &PlannedResource) -> Outcome {
        if let Some(dir) = item.target.parent() {
            if let Err(e) = layout::ensure_dir(dir) {
                let cause = format!("{:#}", e);
                tracing::error!(resource = %item.name, error = %cause, "cannot prepare asset directory");
                return Outcome::Failed { cause };
            }
        }
        match self.downloader.download(&item.source, &item.target) {
            Ok(t) => {
                tracing::info!(
                    resource = %item.name,
                    bytes = t.bytes,
                    redirects = t.redirects,
                    final_url = %t.final_url,
                    "downloaded"
                );
                Outcome::Downloaded {
                    bytes: t.bytes,
                    redirects: t.redirects,
                }
            }
            Err(e) => {
                tracing::error!(resource = %item.name, url = %item.source, error = %e, "download failed");
                Outcome::Failed {
                    cause: e.to_string(),
                }
            }
        }
    }
}
