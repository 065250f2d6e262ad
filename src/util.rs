// src/util.rs
//! Small utility functions used across the crate
//!
//! OS randomness and path helpers. Keep this light.

use std::io;
use std::path::Path;

use rand::rngs::OsRng;
use rand::TryRngCore;

/// Fill `buf` from the operating system CSPRNG
///
/// Never falls back to a userspace generator: if the OS source fails the
/// caller gets the error.
pub fn fill_random(buf: &mut [u8]) -> io::Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| io::Error::other(format!("OS random source failed: {e}")))
}

/// Directory that holds `path`, with `.` standing in for a bare file name
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
