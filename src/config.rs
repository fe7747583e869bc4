use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::resolve::Resample;

pub const CONFIG_FILE: &str = "iconforge.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resample: Resample,
    pub packaging_timeout_secs: u64,
    #[serde(rename = "icon_set")]
    pub icon_sets: Vec<IconSetConfig>,
}

/// One product icon: where its PNGs live and which containers to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct IconSetConfig {
    pub label: String,
    /// File name prefix of the source PNGs (`<base>_32x32.png`).
    pub base: String,
    pub source_dir: PathBuf,
    #[serde(default)]
    pub windows: Vec<PathBuf>,
    #[serde(default)]
    pub macos: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resample: Resample::default(),
            packaging_timeout_secs: 60,
            icon_sets: Vec::new(),
        }
    }
}

impl Config {
    /// Built-in layout: the compiler and language-server icon sets,
    /// relative to `root`.
    pub fn builtin(root: &Path) -> Self {
        let compiler = root.join("pain-compiler").join("resources").join("icons");
        let lsp = root.join("pain-lsp").join("resources").join("icons");

        Self {
            icon_sets: vec![
                IconSetConfig {
                    label: "pain (compiler)".into(),
                    base: "pain".into(),
                    source_dir: compiler.join("linux"),
                    windows: vec![compiler.join("windows").join("pain.ico")],
                    macos: vec![compiler.join("macOS").join("pain.icns")],
                },
                IconSetConfig {
                    label: "lsp".into(),
                    base: "lsp".into(),
                    source_dir: lsp.join("linux"),
                    windows: vec![
                        lsp.join("windows").join("lsp.ico"),
                        compiler.join("windows").join("lsp.ico"),
                    ],
                    macos: vec![lsp.join("macOS").join("lsp.icns")],
                },
            ],
            ..Self::default()
        }
    }

    /// Loads `explicit` if given, else `iconforge.toml` from the working
    /// directory, else the built-in layout rooted at the working directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;

        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let candidate = cwd.join(CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::info!("No {} found, using built-in icon sets", CONFIG_FILE);
                    return Ok(Self::builtin(&cwd));
                }
                candidate
            }
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&contents, path.parent().unwrap_or(cwd.as_path()))
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses TOML; relative paths are taken relative to `base_dir`.
    pub fn parse(contents: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;

        for set in &mut config.icon_sets {
            if set.base.trim().is_empty() {
                bail!("icon set '{}' has an empty base name", set.label);
            }
            set.source_dir = base_dir.join(&set.source_dir);
            for target in set.windows.iter_mut().chain(set.macos.iter_mut()) {
                *target = base_dir.join(&*target);
            }
        }
        Ok(config)
    }
}
