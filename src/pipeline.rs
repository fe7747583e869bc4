use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::Catalog;
use crate::config::{Config, IconSetConfig};
use crate::error::{IconError, IoContext, Result};
use crate::icns::{build_icns, Iconutil, Packager};
use crate::ico::{build_ico, IcoOutcome};
use crate::resolve::Resample;
use crate::source::{DiskDir, SourceDir};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    Ok,
    /// Written, but with fewer images than requested.
    Degraded(String),
    /// Not written; does not fail the run.
    Warning(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub label: String,
    pub target: PathBuf,
    pub status: TargetStatus,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|o| matches!(o.status, TargetStatus::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TargetStatus::Failed(_)))
    }

    fn record(&mut self, set: &IconSetConfig, target: &Path, status: TargetStatus) {
        self.outcomes.push(TargetOutcome {
            label: set.label.clone(),
            target: target.to_path_buf(),
            status,
        });
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for o in &self.outcomes {
            let status = match &o.status {
                TargetStatus::Ok => "ok".to_string(),
                TargetStatus::Degraded(m) => format!("degraded: {}", m),
                TargetStatus::Warning(m) => format!("skipped: {}", m),
                TargetStatus::Failed(m) => format!("FAILED: {}", m),
            };
            writeln!(f, "[{}] {} -> {}", o.label, o.target.display(), status)?;
        }
        Ok(())
    }
}

pub fn run(config: &Config) -> RunReport {
    let packager = Iconutil::new(Duration::from_secs(config.packaging_timeout_secs));
    run_with(config, &packager)
}

/// Processes every icon set; a failing target never stops the others.
pub fn run_with(config: &Config, packager: &dyn Packager) -> RunReport {
    let mut report = RunReport::default();
    for set in &config.icon_sets {
        process_set(set, config.resample, packager, &mut report);
    }
    report
}

fn process_set(
    set: &IconSetConfig,
    resample: Resample,
    packager: &dyn Packager,
    report: &mut RunReport,
) {
    tracing::info!("Processing {} icons from {}", set.label, set.source_dir.display());

    if !set.source_dir.is_dir() {
        let err = IconError::SourceDirectoryMissing(set.source_dir.clone());
        for target in &set.windows {
            tracing::error!("{} ({}): {}", set.base, target.display(), err);
            report.record(set, target, TargetStatus::Failed(err.to_string()));
        }
        for target in &set.macos {
            tracing::warn!("{} ({}): {}", set.base, target.display(), err);
            report.record(set, target, TargetStatus::Warning(err.to_string()));
        }
        return;
    }
    let source = DiskDir::new(&set.source_dir);

    for target in &set.windows {
        let status = match write_ico(&source, &set.base, target, resample) {
            Ok(IcoOutcome::Complete { .. }) => TargetStatus::Ok,
            Ok(IcoOutcome::Degraded { size, reason }) => {
                TargetStatus::Degraded(format!("only {}x{} written: {}", size, size, reason))
            }
            Err(err) => {
                tracing::error!("{} ({}): {}", set.base, target.display(), err);
                if matches!(err, IconError::EmptyCatalog { .. }) {
                    log_directory_contents(&source);
                }
                TargetStatus::Failed(err.to_string())
            }
        };
        report.record(set, target, status);
    }

    // .icns targets are optional: any failure is reported but never fails the run
    for target in &set.macos {
        let status = match write_icns(&source, &set.base, target, packager) {
            Ok(()) => TargetStatus::Ok,
            Err(err @ IconError::PackagingToolUnavailable { .. }) => {
                tracing::warn!("{} ({}): {}", set.base, target.display(), err);
                TargetStatus::Warning(err.to_string())
            }
            Err(err) => {
                tracing::error!("{} ({}): {}", set.base, target.display(), err);
                TargetStatus::Warning(err.to_string())
            }
        };
        report.record(set, target, status);
    }
}

fn write_ico(source: &DiskDir, base: &str, target: &Path, resample: Resample) -> Result<IcoOutcome> {
    create_parent(target)?;

    let catalog = Catalog::build(source, base)?;
    if catalog.is_empty() {
        return Err(catalog.empty_error());
    }
    tracing::info!(
        "Found {} PNG source(s) for {}: {:?}",
        catalog.len(),
        base,
        catalog.sizes()
    );

    let outcome = build_ico(&catalog, target, resample)?;
    verify_written(target)?;
    Ok(outcome)
}

fn write_icns(source: &DiskDir, base: &str, target: &Path, packager: &dyn Packager) -> Result<()> {
    create_parent(target)?;
    build_icns(source, base, target, packager)?;
    verify_written(target)
}

fn create_parent(target: &Path) -> Result<()> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .io_context(|| format!("creating {}", parent.display())),
        _ => Ok(()),
    }
}

fn verify_written(target: &Path) -> Result<()> {
    let meta = std::fs::metadata(target)
        .io_context(|| format!("icon file was not created: {}", target.display()))?;
    tracing::info!("Verified: {} exists ({} bytes)", target.display(), meta.len());
    Ok(())
}

fn log_directory_contents(source: &DiskDir) {
    match source.file_names() {
        Ok(names) if names.is_empty() => {
            tracing::info!("  {} is empty", source.root().display())
        }
        Ok(names) => {
            tracing::info!("  Contents of {}:", source.root().display());
            for name in names {
                tracing::info!("    - {}", name);
            }
        }
        Err(e) => tracing::warn!("  Cannot list {}: {}", source.root().display(), e),
    }
}
