use image::imageops::FilterType;
use serde::Deserialize;

use crate::catalog::{Catalog, SourceImage};
use crate::error::Result;

/// Resampling filter used whenever a size has to be synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resample {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<Resample> for FilterType {
    fn from(value: Resample) -> Self {
        match value {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Gaussian => FilterType::Gaussian,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// An image guaranteed to be exactly `size`x`size`.
#[derive(Clone)]
pub struct ResolvedImage {
    pub size: u32,
    /// Catalog key the pixels came from.
    pub source_key: u32,
    pub resized: bool,
    pub image: SourceImage,
}

/// Picks the catalog key to derive `size` from.
///
/// Order of preference: the exact key, then the smallest key above `size`,
/// then the largest key overall. `None` only for an empty catalog.
pub fn select_source(catalog: &Catalog, size: u32) -> Option<u32> {
    if catalog.get(size).is_some() {
        return Some(size);
    }
    catalog
        .keys()
        .find(|&key| key > size)
        .or_else(|| catalog.keys().next_back())
}

pub fn resolve(catalog: &Catalog, size: u32, filter: Resample) -> Result<ResolvedImage> {
    let source_key = select_source(catalog, size).ok_or_else(|| catalog.empty_error())?;
    let Some(source) = catalog.get(source_key) else {
        return Err(catalog.empty_error());
    };

    // stored dimensions are re-checked even for an exact key match
    if source.is_exactly(size) {
        return Ok(ResolvedImage {
            size,
            source_key,
            resized: false,
            image: source.clone(),
        });
    }

    if source_key == size {
        tracing::warn!(
            "{} is tagged {}x{} but is {}x{}, resizing",
            source.origin,
            size,
            size,
            source.width(),
            source.height()
        );
    } else {
        tracing::info!(
            "{} lacks {}x{}, resized from {}x{}",
            catalog.base(),
            size,
            size,
            source_key,
            source_key
        );
    }

    let image = source.image.resize_exact(size, size, filter.into());
    Ok(ResolvedImage {
        size,
        source_key,
        resized: true,
        image: SourceImage {
            mode: source.mode,
            image,
            origin: source.origin.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColorMode;
    use crate::error::IconError;
    use image::{DynamicImage, Rgba, RgbaImage};
    use proptest::prelude::*;

    fn solid(width: u32, height: u32, shade: u8) -> SourceImage {
        SourceImage::normalize(
            &format!("img_{}x{}.png", width, height),
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255]))),
        )
    }

    fn catalog_of(entries: &[(u32, SourceImage)]) -> Catalog {
        let mut catalog = Catalog::new("img", "<test>");
        for (key, image) in entries {
            catalog.insert_if_absent(*key, image.clone());
        }
        catalog
    }

    #[test]
    fn exact_match_is_not_resized() {
        let img = solid(256, 256, 7);
        let catalog = catalog_of(&[(256, img.clone())]);

        let resolved = resolve(&catalog, 256, Resample::Lanczos3).unwrap();
        assert!(!resolved.resized);
        assert_eq!(resolved.source_key, 256);
        assert_eq!(resolved.image.image.as_bytes(), img.image.as_bytes());
    }

    #[test]
    fn prefers_next_larger_source() {
        let catalog = catalog_of(&[(64, solid(64, 64, 1)), (256, solid(256, 256, 2))]);

        assert_eq!(select_source(&catalog, 128), Some(256));
        let resolved = resolve(&catalog, 128, Resample::Lanczos3).unwrap();
        assert_eq!(resolved.source_key, 256);
        assert!(resolved.resized);
        assert!(resolved.image.is_exactly(128));
    }

    #[test]
    fn upsizes_from_largest_when_nothing_bigger() {
        let catalog = catalog_of(&[(8, solid(8, 8, 1)), (16, solid(16, 16, 2))]);

        let resolved = resolve(&catalog, 256, Resample::Lanczos3).unwrap();
        assert_eq!(resolved.source_key, 16);
        assert!(resolved.image.is_exactly(256));
    }

    #[test]
    fn mislabeled_exact_entry_is_still_resized() {
        let catalog = catalog_of(&[(32, solid(40, 40, 3))]);

        let resolved = resolve(&catalog, 32, Resample::Lanczos3).unwrap();
        assert_eq!(resolved.source_key, 32);
        assert!(resolved.resized);
        assert!(resolved.image.is_exactly(32));
    }

    #[test]
    fn keeps_color_mode_through_resize() {
        let rgb = SourceImage::normalize(
            "rgb.png",
            DynamicImage::ImageRgb8(image::RgbImage::new(64, 64)),
        );
        let catalog = catalog_of(&[(64, rgb)]);

        let resolved = resolve(&catalog, 16, Resample::Triangle).unwrap();
        assert_eq!(resolved.image.mode, ColorMode::Rgb);
        assert!(matches!(resolved.image.image, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn empty_catalog_fails() {
        let catalog = Catalog::new("img", "<test>");
        assert_eq!(select_source(&catalog, 16), None);
        let err = resolve(&catalog, 16, Resample::Lanczos3).err().unwrap();
        assert!(matches!(err, IconError::EmptyCatalog { ref base, .. } if base == "img"));
    }

    #[test]
    fn resample_names_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            filter: Resample,
        }
        let parsed: Wrapper = toml::from_str("filter = \"catmull-rom\"").unwrap();
        assert_eq!(parsed.filter, Resample::CatmullRom);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn any_size_resolves_to_exact_square(
            keys in proptest::collection::btree_set(1u32..48, 1..4),
            target in 1u32..64,
        ) {
            let entries: Vec<(u32, SourceImage)> =
                keys.iter().map(|&k| (k, solid(k, k, k as u8))).collect();
            let catalog = catalog_of(&entries);

            let resolved = resolve(&catalog, target, Resample::Nearest).unwrap();
            prop_assert_eq!(resolved.image.width(), target);
            prop_assert_eq!(resolved.image.height(), target);

            let expected = if keys.contains(&target) {
                target
            } else {
                keys.iter().copied().find(|&k| k > target)
                    .unwrap_or_else(|| *keys.iter().next_back().unwrap())
            };
            prop_assert_eq!(resolved.source_key, expected);
        }
    }
}
