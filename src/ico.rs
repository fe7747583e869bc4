//! Windows `.ico` assembly.
//!
//! Every size in [`ICO_SIZES`] is resolved from the catalog, then the frames
//! are written largest first as PNG-compressed entries. Consumers that only
//! read the first directory entry get the 256px image.

use std::io::Write;
use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::{ExtendedColorType, ImageResult};

use crate::catalog::{Catalog, ColorMode};
use crate::error::{IconError, IoContext, Result};
use crate::resolve::{resolve, Resample, ResolvedImage};

pub const ICO_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

/// Turns an ordered frame set into the bytes of one `.ico` file.
pub trait IcoEncode {
    fn encode(&self, frames: &[ResolvedImage]) -> ImageResult<Vec<u8>>;
}

/// PNG-in-ICO encoder backed by the `image` crate.
pub struct PngIcoEncoder;

impl IcoEncode for PngIcoEncoder {
    fn encode(&self, frames: &[ResolvedImage]) -> ImageResult<Vec<u8>> {
        let mut ico_frames = Vec::with_capacity(frames.len());
        for frame in frames {
            let color = match frame.image.mode {
                ColorMode::Rgb => ExtendedColorType::Rgb8,
                ColorMode::Rgba => ExtendedColorType::Rgba8,
            };
            ico_frames.push(IcoFrame::as_png(
                frame.image.image.as_bytes(),
                frame.size,
                frame.size,
                color,
            )?);
        }

        let mut out = Vec::new();
        IcoEncoder::new(&mut out).encode_images(&ico_frames)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcoOutcome {
    /// All sizes written, largest first.
    Complete { sizes: Vec<u32> },
    /// The full set failed to encode; only the largest size was written.
    Degraded { size: u32, reason: String },
}

pub fn build_ico(catalog: &Catalog, output: &Path, filter: Resample) -> Result<IcoOutcome> {
    build_ico_with(&PngIcoEncoder, catalog, output, filter)
}

pub fn build_ico_with(
    encoder: &dyn IcoEncode,
    catalog: &Catalog,
    output: &Path,
    filter: Resample,
) -> Result<IcoOutcome> {
    if catalog.is_empty() {
        return Err(catalog.empty_error());
    }

    let mut frames = ICO_SIZES
        .iter()
        .map(|&size| resolve(catalog, size, filter))
        .collect::<Result<Vec<_>>>()?;
    frames.sort_by(|a, b| b.size.cmp(&a.size));

    match encoder.encode(&frames) {
        Ok(bytes) => {
            write_atomic(output, &bytes)?;
            let sizes: Vec<u32> = frames.iter().map(|f| f.size).collect();
            tracing::info!(
                "Created {} with {} sizes: {:?}",
                output.display(),
                sizes.len(),
                sizes
            );
            Ok(IcoOutcome::Complete { sizes })
        }
        Err(full_err) => {
            tracing::warn!(
                "Encoding {} with {} sizes failed ({}), retrying with largest only",
                output.display(),
                frames.len(),
                full_err
            );
            frames.truncate(1);
            let bytes = encoder
                .encode(&frames)
                .map_err(|retry_err| IconError::EncodingFailed {
                    path: output.to_path_buf(),
                    message: format!("{}; single-size retry: {}", full_err, retry_err),
                })?;
            write_atomic(output, &bytes)?;
            tracing::warn!(
                "Created {} with only {}x{} due to encoding error",
                output.display(),
                frames[0].size,
                frames[0].size
            );
            Ok(IcoOutcome::Degraded {
                size: frames[0].size,
                reason: full_err.to_string(),
            })
        }
    }
}

/// Writes to a sibling temp file and renames it over `output`.
pub(crate) fn write_atomic(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&parent)
        .io_context(|| format!("creating temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .io_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.persist(output)
        .map_err(|e| e.error)
        .io_context(|| format!("writing {}", output.display()))?;
    Ok(())
}
