//! Isolated environment for running the `deploytrace` binary.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so the host cannot leak in.
const SCRUBBED_ENV: &[&str] = &[
    "DEPLOYTRACE_ACCESS_TOKEN",
    "DEPLOYTRACE_ARM_ENDPOINT",
    "RUST_LOG",
];

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use deploytrace_testing::TestWorld;
///
/// let world = TestWorld::new().with_env("DEPLOYTRACE_ACCESS_TOKEN", "token");
/// let result = world.run(&["--help"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            env_vars: HashMap::new(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path for an output file inside the temp dir.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        cmd.current_dir(self.temp_dir.path());
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("deploytrace")
            .map_err(|e| anyhow::anyhow!("Failed to find deploytrace binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
