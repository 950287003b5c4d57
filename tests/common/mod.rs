//! Common test utilities for icerank integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read or
//! write the user's `~/.config/icerank/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with an isolated config directory.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: Working directory holding input files
/// - `config_dir`: Holds config.kdl (via `ICE_CONFIG_DIR` env var)
///
/// The `ice()` method returns a `Command` that sets `ICE_CONFIG_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the ice binary with isolated config directory.
    pub fn ice(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ice"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("ICE_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("ICE_LOG");
        cmd
    }

    /// Write an input file into the working directory and return its path.
    pub fn write_input(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Write config.kdl into the isolated config directory.
    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), contents).unwrap();
    }

    /// Get the path to the config directory.
    pub fn config_path(&self) -> &Path {
        self.config_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout should be valid JSON")
}
