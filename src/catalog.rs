use std::collections::BTreeMap;

use image::{DynamicImage, ImageFormat};

use crate::error::{IconError, Result};
use crate::source::SourceDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,
    Rgba,
}

/// A decoded source PNG, normalized to 8-bit RGB or RGBA.
#[derive(Clone)]
pub struct SourceImage {
    pub mode: ColorMode,
    pub image: DynamicImage,
    /// File the pixels were decoded from.
    pub origin: String,
}

impl SourceImage {
    pub fn decode(origin: &str, bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(
            |source| IconError::Decode {
                file: origin.to_string(),
                source,
            },
        )?;
        let mode = match png_color_type(bytes) {
            Some(PNG_INDEXED | PNG_GRAY_ALPHA | PNG_RGBA) => ColorMode::Rgba,
            Some(_) => ColorMode::Rgb,
            None => mode_of(&decoded),
        };
        Ok(Self::convert(origin, decoded, mode))
    }

    /// Alpha-carrying images become RGBA; everything else becomes RGB.
    pub fn normalize(origin: &str, decoded: DynamicImage) -> Self {
        let mode = mode_of(&decoded);
        Self::convert(origin, decoded, mode)
    }

    fn convert(origin: &str, decoded: DynamicImage, mode: ColorMode) -> Self {
        let image = match mode {
            ColorMode::Rgba => DynamicImage::ImageRgba8(decoded.to_rgba8()),
            ColorMode::Rgb => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        };
        Self {
            mode,
            image,
            origin: origin.to_string(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_exactly(&self, size: u32) -> bool {
        self.width() == size && self.height() == size
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const PNG_INDEXED: u8 = 3;
const PNG_GRAY_ALPHA: u8 = 4;
const PNG_RGBA: u8 = 6;

/// Color type byte of the IHDR chunk, as stored before any decoder
/// expansion. Palette sources are only recognizable here.
fn png_color_type(bytes: &[u8]) -> Option<u8> {
    if bytes.len() < 26 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    Some(bytes[25])
}

fn mode_of(image: &DynamicImage) -> ColorMode {
    if image.color().has_alpha() {
        ColorMode::Rgba
    } else {
        ColorMode::Rgb
    }
}

/// Resolution (edge length in pixels) to source image.
#[derive(Clone, Default)]
pub struct Catalog {
    base: String,
    dir: String,
    entries: BTreeMap<u32, SourceImage>,
}

impl Catalog {
    pub fn new(base: &str, dir: &str) -> Self {
        Self {
            base: base.to_string(),
            dir: dir.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn empty_error(&self) -> IconError {
        IconError::EmptyCatalog {
            base: self.base.clone(),
            dir: self.dir.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, size: u32) -> Option<&SourceImage> {
        self.entries.get(&size)
    }

    /// Ascending.
    pub fn sizes(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Inserts unless `size` is already taken; returns whether it was inserted.
    pub fn insert_if_absent(&mut self, size: u32, image: SourceImage) -> bool {
        match self.entries.entry(size) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(image);
                true
            }
        }
    }

    /// Scans `dir` for `<base>_<N>x<N>.png` plus an optional bare `<base>.png`.
    ///
    /// Tagged files are inserted first, so a fallback whose edge length
    /// collides with a tagged entry is dropped. Non-square tags are skipped.
    /// No matches yields an empty catalog, not an error.
    pub fn build(dir: &dyn SourceDir, base: &str) -> Result<Self> {
        let mut catalog = Catalog::new(base, &dir.describe());

        for name in dir.file_names()? {
            let Some((width, height)) = parse_size_tag(base, &name) else {
                continue;
            };
            if width != height {
                tracing::debug!("Skipping non-square source {}", name);
                continue;
            }
            let image = SourceImage::decode(&name, &dir.read(&name)?)?;
            catalog.insert_if_absent(width, image);
        }

        let fallback = format!("{}.png", base);
        if dir.exists(&fallback) {
            let image = SourceImage::decode(&fallback, &dir.read(&fallback)?)?;
            let key = image.width().max(image.height());
            if !catalog.insert_if_absent(key, image) {
                tracing::debug!(
                    "{} ignored: {}x{} already provided by a tagged source",
                    fallback,
                    key,
                    key
                );
            }
        }

        Ok(catalog)
    }
}

/// Parses `<base>_<W>x<H>.png` into `(W, H)`.
pub fn parse_size_tag(base: &str, file_name: &str) -> Option<(u32, u32)> {
    let stem = file_name.strip_suffix(".png")?;
    let tag = stem.strip_prefix(base)?.strip_prefix('_')?;
    let (w, h) = tag.split_once('x')?;
    if w.is_empty() || h.is_empty() || !w.bytes().chain(h.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let w: u32 = w.parse().ok()?;
    let h: u32 = h.parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}
