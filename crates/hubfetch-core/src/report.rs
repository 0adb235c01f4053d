//! Per-resource outcomes of one provisioning run. Kept in memory only.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Repository,
    Asset,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ResourceKind::Repository => "repository",
            ResourceKind::Asset => "asset",
        })
    }
}

/// Terminal result for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cloned,
    Downloaded { bytes: u64, redirects: u32 },
    /// Rendered cause; the typed error is logged where it happens.
    Failed { cause: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub name: String,
    pub kind: ResourceKind,
    pub source: String,
    pub target: PathBuf,
    pub outcome: Outcome,
}

/// Ordered reports, one per attempted resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub resources: Vec<ResourceReport>,
}

impl RunReport {
    pub fn push(&mut self, report: ResourceReport) {
        self.resources.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}
