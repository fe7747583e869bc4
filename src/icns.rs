//! macOS `.icns` assembly through an `.iconset` staging directory.
//!
//! Unlike the `.ico` path nothing is resized here: an iconset entry is only
//! written when a source PNG with exactly that tag exists on disk.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{IconError, IoContext, Result};
use crate::platform::{self, PackagingSupport};
use crate::source::SourceDir;

pub const ICNS_SIZES: [u32; 7] = [16, 32, 64, 128, 256, 512, 1024];

const MAX_ICNS_SIZE: u32 = 1024;

/// Standard and `@2x` iconset file names. 1024 only appears as the `@2x`
/// companion of 512.
const ICONSET_NAMES: [(u32, &str, &str); 6] = [
    (16, "icon_16x16.png", "icon_16x16@2x.png"),
    (32, "icon_32x32.png", "icon_32x32@2x.png"),
    (64, "icon_64x64.png", "icon_64x64@2x.png"),
    (128, "icon_128x128.png", "icon_128x128@2x.png"),
    (256, "icon_256x256.png", "icon_256x256@2x.png"),
    (512, "icon_512x512.png", "icon_512x512@2x.png"),
];

pub fn iconset_names(size: u32) -> Option<(&'static str, &'static str)> {
    ICONSET_NAMES
        .iter()
        .find(|(s, _, _)| *s == size)
        .map(|&(_, standard, high_density)| (standard, high_density))
}

fn source_name(base: &str, size: u32) -> String {
    format!("{}_{}x{}.png", base, size, size)
}

/// Copies every available `<base>_NxN.png` (and its `2N` companion) into
/// `iconset_dir` under iconset names. Returns the staged file names in
/// write order.
pub fn stage_iconset(source: &dyn SourceDir, base: &str, iconset_dir: &Path) -> Result<Vec<String>> {
    let mut staged = Vec::new();

    for size in ICNS_SIZES {
        let Some((standard, high_density)) = iconset_names(size) else {
            continue;
        };
        let primary = source_name(base, size);
        if !source.exists(&primary) {
            continue;
        }
        copy_into(source, &primary, iconset_dir, standard)?;
        staged.push(standard.to_string());

        let double = size * 2;
        if double <= MAX_ICNS_SIZE {
            let companion = source_name(base, double);
            if source.exists(&companion) {
                copy_into(source, &companion, iconset_dir, high_density)?;
                staged.push(high_density.to_string());
            }
        }
    }

    Ok(staged)
}

fn copy_into(source: &dyn SourceDir, from: &str, dir: &Path, to: &str) -> Result<()> {
    let target = dir.join(to);
    std::fs::write(&target, source.read(from)?)
        .io_context(|| format!("writing {}", target.display()))?;
    tracing::debug!("Staged {} as {}", from, to);
    Ok(())
}

/// Turns a staged `.iconset` directory into an `.icns` file.
pub trait Packager {
    fn support(&self) -> PackagingSupport;

    fn package(&self, tool: &Path, iconset: &Path, output: &Path) -> Result<()>;
}

/// macOS `iconutil`, bounded by a wall-clock timeout.
pub struct Iconutil {
    timeout: Duration,
}

impl Iconutil {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for Iconutil {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl Packager for Iconutil {
    fn support(&self) -> PackagingSupport {
        platform::packaging_support()
    }

    fn package(&self, tool: &Path, iconset: &Path, output: &Path) -> Result<()> {
        let failed = |diagnostic: String| IconError::PackagingToolFailed {
            output: output.to_path_buf(),
            diagnostic,
        };

        let mut child = Command::new(tool)
            .args(["-c", "icns"])
            .arg(iconset)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("failed to start {}: {}", tool.display(), e)))?;

        // drained concurrently so a chatty tool cannot stall on a full pipe
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(failed(format!(
                            "timed out after {}s",
                            self.timeout.as_secs_f32()
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(e) => return Err(failed(format!("failed to wait for tool: {}", e))),
            }
        };

        if !status.success() {
            let stderr = stderr_reader
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            let stderr = stderr.trim();
            let diagnostic = if stderr.is_empty() {
                format!("exited with {}", status)
            } else {
                stderr.to_string()
            };
            return Err(failed(diagnostic));
        }
        Ok(())
    }
}

/// Stages `base`'s PNGs from `source` and packages them into `output`.
///
/// The staging directory is removed on every path except when the packaging
/// tool is unavailable; then it is kept so packaging can be finished by hand,
/// and its path is part of the returned error.
pub fn build_icns(
    source: &dyn SourceDir,
    base: &str,
    output: &Path,
    packager: &dyn Packager,
) -> Result<Vec<String>> {
    let staging = tempfile::Builder::new()
        .prefix("iconforge-")
        .tempdir()
        .io_context(|| "creating staging directory".to_string())?;
    let iconset = staging.path().join(format!("{}.iconset", base));
    std::fs::create_dir(&iconset).io_context(|| format!("creating {}", iconset.display()))?;

    let staged = stage_iconset(source, base, &iconset)?;
    if staged.is_empty() {
        return Err(IconError::NoSourcesStaged {
            base: base.to_string(),
            dir: source.describe(),
        });
    }
    tracing::info!("Staged {} iconset entries for {}", staged.len(), base);

    let tool = match packager.support() {
        PackagingSupport::Available(tool) => tool,
        unavailable => {
            let kept: PathBuf = staging.keep();
            return Err(IconError::PackagingToolUnavailable {
                reason: unavailable.describe(),
                iconset: kept.join(format!("{}.iconset", base)),
                output: output.to_path_buf(),
            });
        }
    };

    packager.package(&tool, &iconset, output)?;
    tracing::info!("Created {}", output.display());
    Ok(staged)
}
