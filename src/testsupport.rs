//! Shared test fixtures: temp directories and fake CLI scripts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("genvm-assist-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Write a `sh` script standing in for an external CLI.
///
/// Run it as `sh <path>` rather than executing it directly: exec'ing a file
/// that was just written races with concurrent forks in other test threads.
pub fn write_script(dir: &TestTempDir, name: &str, body: &str) -> PathBuf {
    dir.write_text(name, &format!("#!/bin/sh\n{body}\n"))
}

/// A contract file with the dependency header the deploy CLI expects.
pub fn write_contract(dir: &TestTempDir, name: &str) -> PathBuf {
    dir.write_text(
        name,
        "# { \"Depends\": \"py-genlayer:test\" }\nfrom genlayer import *\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.child("nested").starts_with(fixture.path()));
    }

    #[test]
    fn script_fixture_has_a_shebang() {
        let fixture = TestTempDir::new("script");
        let script = write_script(&fixture, "cli", "echo hi");
        assert_eq!(fs::read_to_string(script).unwrap(), "#!/bin/sh\necho hi\n");
    }
}
