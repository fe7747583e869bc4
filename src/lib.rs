//! Builds Windows `.ico` and macOS `.icns` containers from a directory of
//! size-tagged PNGs (`<base>_32x32.png`, ...).

pub mod catalog;
pub mod config;
pub mod error;
pub mod icns;
pub mod ico;
pub mod pipeline;
pub mod platform;
pub mod resolve;
pub mod source;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, ColorMode, SourceImage};
pub use error::{IconError, Result};
pub use resolve::{resolve, Resample, ResolvedImage};
