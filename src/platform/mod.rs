use std::path::PathBuf;

/// Whether `.icns` packaging can run on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingSupport {
    Available(PathBuf),
    /// The tool only ships with macOS.
    Unsupported { platform: &'static str },
    /// Right platform, but the tool is not on PATH.
    Missing,
}

impl PackagingSupport {
    pub fn describe(&self) -> String {
        match self {
            PackagingSupport::Available(path) => format!("iconutil at {}", path.display()),
            PackagingSupport::Unsupported { platform } => {
                format!("ICNS creation requires macOS iconutil (running on {})", platform)
            }
            PackagingSupport::Missing => "iconutil not found on PATH".to_string(),
        }
    }
}

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use self::macos::packaging_support;

#[cfg(not(target_os = "macos"))]
pub fn packaging_support() -> PackagingSupport {
    PackagingSupport::Unsupported {
        platform: std::env::consts::OS,
    }
}
