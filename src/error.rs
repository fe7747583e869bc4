use std::path::PathBuf;

/// Every way building a single icon container can fail.
///
/// Each variant names the icon base so a failure line in the log can be
/// traced back to its icon set without extra context.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("source directory not found: {}", .0.display())]
    SourceDirectoryMissing(PathBuf),

    #[error("no PNG sources for '{base}' in {dir} (expected {base}_*x*.png or {base}.png)")]
    EmptyCatalog { base: String, dir: String },

    #[error("no iconset entries staged for '{base}' from {dir}")]
    NoSourcesStaged { base: String, dir: String },

    #[error("failed to encode {}: {message}", .path.display())]
    EncodingFailed { path: PathBuf, message: String },

    #[error("cannot package {}: {reason}; iconset left at {} (run: iconutil -c icns {} -o {})",
        .output.display(), .iconset.display(), .iconset.display(), .output.display())]
    PackagingToolUnavailable {
        reason: String,
        iconset: PathBuf,
        output: PathBuf,
    },

    #[error("iconutil failed for {}: {diagnostic}", .output.display())]
    PackagingToolFailed { output: PathBuf, diagnostic: String },

    #[error("failed to decode {file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IconError>;

pub(crate) trait IoContext<T> {
    fn io_context(self, context: impl FnOnce() -> String) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, context: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|source| IconError::Io {
            context: context(),
            source,
        })
    }
}
