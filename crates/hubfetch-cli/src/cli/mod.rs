//! CLI for hubfetch. With no flags it fetches the built-in model set into
//! `models/` next to the executable.

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use hubfetch_core::clone::GitCloner;
use hubfetch_core::config::{self, HubfetchConfig};
use hubfetch_core::download::CurlDownloader;
use hubfetch_core::layout;
use hubfetch_core::manifest::Manifest;
use hubfetch_core::pipeline::Provisioner;
use std::path::PathBuf;

/// Top-level CLI for hubfetch.
#[derive(Debug, Parser)]
#[command(name = "hubfetch")]
#[command(about = "Fetch the model repositories and speaker embeddings used by the app", long_about = None)]
pub struct Cli {
    /// Directory to place models in (default: `models/` next to the executable).
    #[arg(long, value_name = "PATH")]
    pub models_dir: Option<PathBuf>,

    /// Model hub mirror base URL, e.g. https://huggingface.co.
    #[arg(long, value_name = "URL")]
    pub mirror: Option<String>,

    /// Config file (default: ~/.config/hubfetch/config.toml when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Exit with an error if any resource failed.
    #[arg(long)]
    pub strict: bool,

    /// Print what would be fetched and where, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        Cli::parse().run().await
    }

    /// Apply flag overrides on top of the loaded config.
    fn effective_config(&self, mut cfg: HubfetchConfig) -> HubfetchConfig {
        if let Some(mirror) = &self.mirror {
            cfg.mirror = mirror.clone();
        }
        if let Some(dir) = &self.models_dir {
            cfg.models_dir = Some(dir.clone());
        }
        cfg
    }

    pub async fn run(self) -> Result<()> {
        let cfg = self.effective_config(config::load(self.config.as_deref())?);
        tracing::debug!("effective config: {:?}", cfg);

        let root = layout::resolve_target_root(cfg.models_dir.as_deref())?;
        let provisioner = Provisioner::new(
            root,
            Manifest::builtin(&cfg.mirror),
            GitCloner::from_config(&cfg.clone),
            CurlDownloader::new(cfg.download.clone()),
        );

        if self.dry_run {
            let plan = provisioner.plan().context("invalid resource mapping")?;
            console::print_plan(&plan);
            return Ok(());
        }

        // Blocking child processes and libcurl transfers, strictly one after another.
        let report = tokio::task::spawn_blocking(move || {
            console::print_banner(provisioner.root());
            provisioner.run(console::print_event)
        })
        .await
        .context("fetch task panicked")??;

        console::print_summary(&report);
        if self.strict && !report.is_success() {
            anyhow::bail!(
                "{} of {} resources failed",
                report.failure_count(),
                report.resources.len()
            );
        }
        Ok(())
    }
}
