//! Architectural Enforcement Integration Tests
//!
//! Source-level checks that keep the workspace honest:
//! - Pacing waits go through the reveal timer, never ad-hoc sleeps
//! - No blocking `std::thread::sleep` in async code
//!
//! The checks live in `tests/`; this library only locates the workspace.

use std::path::PathBuf;

/// Root of the workspace this crate is built in
#[must_use]
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}
