//! Orchestrator - one batch run over the input directory
//!
//! Each file found at the start of the run goes through:
//!
//! ```text
//! Pending ─parse─→ Parsed ─lookup─→ Resolved ─write─→ Written (input deleted)
//!    │                │
//!    │                └─→ Skipped (VM missing or lookup failed, input kept)
//!    └─→ Quarantined (input moved to the error directory)
//! ```
//!
//! Files are handled strictly one after another and a failure only ever
//! affects the file being processed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, error, info, instrument, warn};

use crate::account::resolve_account_name;
use crate::alert::{parse_alert, quarantine};
use crate::cloud::{CloudProvider, CloudResult};
use crate::compute::lookup_vm;
use crate::config::{Directories, ProfileConfig};
use crate::network::resolve_network;
use crate::{AlertTarget, OutputProfile};

/// Suffix appended to the alert file name to name its profile.
pub const PROFILE_SUFFIX: &str = "_vm_profile.json";

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Profile written to the given path, input deleted
    Written(PathBuf),

    /// Input could not be parsed and was moved to the given path
    Quarantined(PathBuf),

    /// No VM with the alert's name exists in the subscription
    SkippedNoVm,

    /// A lookup failed; the input was left in place
    SkippedLookupFailure(String),

    /// The input could not be parsed and could not be moved aside either
    QuarantineFailed(String),

    /// The profile could not be written or the input could not be removed;
    /// no profile is left behind and the input stays in place
    WriteFailed(String),
}

/// Counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub quarantined: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Written(_) => self.written += 1,
            FileOutcome::Quarantined(_) => self.quarantined += 1,
            FileOutcome::SkippedNoVm
            | FileOutcome::SkippedLookupFailure(_)
            | FileOutcome::QuarantineFailed(_)
            | FileOutcome::WriteFailed(_) => self.skipped += 1,
        }
    }
}

pub struct Orchestrator {
    provider: Arc<dyn CloudProvider>,
    directories: Directories,
    profile: ProfileConfig,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        directories: Directories,
        profile: ProfileConfig,
    ) -> Self {
        Self {
            provider,
            directories,
            profile,
        }
    }

    /// Path the profile for `file_name` is written to.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.directories
            .output
            .join(format!("{file_name}{PROFILE_SUFFIX}"))
    }

    /// Process every file present in the input directory right now.
    ///
    /// Only failing to prepare the directories or to list the input directory
    /// aborts the run.
    #[instrument(skip(self), fields(input = %self.directories.input.display()))]
    pub async fn run(&self) -> Result<RunSummary> {
        self.prepare_directories().await?;

        let files = self.snapshot_inputs().await?;
        debug!("found {} alert files", files.len());

        let mut summary = RunSummary::default();
        for path in files {
            let outcome = self.process_file(&path).await;
            summary.record(&outcome);
        }

        info!(
            "run finished: {} written, {} quarantined, {} skipped",
            summary.written, summary.quarantined, summary.skipped
        );
        Ok(summary)
    }

    async fn prepare_directories(&self) -> Result<()> {
        for dir in [&self.directories.output, &self.directories.error] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    /// Regular files in the input directory, in listing order.
    async fn snapshot_inputs(&self) -> Result<Vec<PathBuf>> {
        let input = &self.directories.input;
        let mut entries = tokio::fs::read_dir(input)
            .await
            .with_context(|| format!("failed to read input directory {}", input.display()))?;

        let mut files = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to read input directory {}", input.display()))?
        {
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => files.push(entry.path()),
                Ok(_) => debug!("ignoring non-file entry {}", entry.path().display()),
                Err(e) => warn!("cannot stat {}: {e}", entry.path().display()),
            }
        }

        Ok(files)
    }

    /// Run a single file through parse, lookup and write.
    #[instrument(skip(self))]
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        info!("processing file: {}", path.display());

        let target = match parse_alert(path).await {
            Ok(target) => target,
            Err(e) => {
                error!("error processing file {}: {e}", path.display());
                return match quarantine(path, &self.directories.error).await {
                    Ok(destination) => FileOutcome::Quarantined(destination),
                    Err(move_err) => {
                        error!("failed to quarantine {}: {move_err}", path.display());
                        FileOutcome::QuarantineFailed(move_err.to_string())
                    }
                };
            }
        };

        let profile = match self.resolve_profile(&target).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                info!(
                    "skipping {}: VM {} not found in subscription {}",
                    path.display(),
                    target.vm_name,
                    target.subscription_id
                );
                return FileOutcome::SkippedNoVm;
            }
            Err(e) => {
                error!("skipping {}: unable to fetch VM details: {e}", path.display());
                return FileOutcome::SkippedLookupFailure(e.to_string());
            }
        };

        match self.write_profile(path, &profile).await {
            Ok(output) => {
                info!("processed and saved: {}", output.display());
                FileOutcome::Written(output)
            }
            Err(e) => {
                error!("skipping {}: {e:#}", path.display());
                FileOutcome::WriteFailed(format!("{e:#}"))
            }
        }
    }

    async fn resolve_profile(&self, target: &AlertTarget) -> CloudResult<Option<OutputProfile>> {
        let provider = self.provider.as_ref();

        let Some(record) = lookup_vm(provider, &target.vm_name, &target.subscription_id).await?
        else {
            return Ok(None);
        };

        let network = resolve_network(provider, &record).await?;
        let account_name = resolve_account_name(provider, &target.subscription_id).await;

        Ok(Some(OutputProfile::assemble(
            &self.profile,
            target,
            network,
            account_name,
        )))
    }

    /// Write the profile next to the other outputs, then remove the input.
    ///
    /// If the input cannot be removed the profile is removed again, so an
    /// alert never sits in the input and output directories at once.
    async fn write_profile(&self, input: &Path, profile: &OutputProfile) -> Result<PathBuf> {
        let file_name = input
            .file_name()
            .with_context(|| format!("{} has no file name", input.display()))?
            .to_string_lossy();
        let output = self.output_path(&file_name);

        let content = to_pretty_json(profile)?;
        tokio::fs::write(&output, content)
            .await
            .with_context(|| format!("failed to write {}", output.display()))?;

        if let Err(e) = tokio::fs::remove_file(input).await {
            if let Err(cleanup) = tokio::fs::remove_file(&output).await {
                warn!("failed to remove {} again: {cleanup}", output.display());
            }
            return Err(e).with_context(|| format!("failed to delete {}", input.display()));
        }

        Ok(output)
    }
}

/// Serialize with four-space indentation.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .context("failed to serialize profile")?;
    Ok(buffer)
}
