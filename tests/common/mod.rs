#![allow(dead_code)]

use std::path::Path;

// Shared with the unit tests rather than duplicated.
#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::{ico_entry_sizes, png_bytes};

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height, true)).unwrap();
}
