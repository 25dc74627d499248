use std::path::{Path, PathBuf};

use mockito::ServerGuard;
use snapbox::cmd::{cargo_bin, Command};
use tempfile::TempDir;

use crate::helpers::{assert, copy_dir_contents};

/// A directory under `tests/` holding an `in` directory (copied into a fresh working directory)
/// and an optional `expected.md`.
pub struct TestCase {
    name: &'static str,
}

impl TestCase {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn data_path(&self) -> PathBuf {
        Path::new("tests").join(self.name)
    }

    /// Set up a new temporary directory with the contents of the `in` directory.
    pub fn arrange(&self) -> TempDir {
        let working_dir = tempfile::tempdir().unwrap();
        let in_dir = self.data_path().join("in");
        if in_dir.exists() {
            copy_dir_contents(&in_dir, working_dir.path());
        }
        working_dir
    }

    /// The binary, run in `working_dir`, pointed at `server` for both Azure DevOps and GitHub.
    ///
    /// Stdin is never a terminal, so a missing token is an error rather than a prompt.
    pub fn command(&self, working_dir: &TempDir, server: &ServerGuard) -> Command {
        Command::new(cargo_bin!("commit-report"))
            .current_dir(working_dir.path())
            .env("AZURE_DEVOPS_URL", server.url())
            .env("GITHUB_API_URL", server.url())
            .env("AZURE_DEVOPS_PAT", "pat")
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG")
            .stdin("")
            .with_assert(assert())
    }

    pub fn expected_report(&self) -> PathBuf {
        self.data_path().join("expected.md")
    }

    /// Compare the report written to `path` in `working_dir` against `expected.md`.
    pub fn assert_report(&self, working_dir: &TempDir, path: &str) {
        let report = std::fs::read_to_string(working_dir.path().join(path)).unwrap();
        assert().matches_path(self.expected_report(), report);
    }
}
