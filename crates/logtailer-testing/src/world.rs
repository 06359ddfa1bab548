//! TestWorld pattern for declarative integration test setup.
//!
//! Every world owns a temporary data directory; CLI runs are pointed at it
//! with `--data-dir`, so tests never touch the user's real store.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use logtailer_testing::TestWorld;
///
/// let world = TestWorld::new().initialized().with_sample_logs();
/// let result = world.run(&["tabs"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".logtailer");

        Self {
            temp_dir,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Run `logtailer init` and fail loudly if it does not succeed.
    pub fn initialized(self) -> Self {
        let result = self.run(&["init"]).expect("Failed to run init");
        assert!(result.success(), "init failed: {}", result.stderr());
        self
    }

    /// Seed the store with the fixture tabs (7: Checkout, 12: API docs).
    pub fn with_sample_logs(self) -> Self {
        fixtures::seed_store(&self.data_dir).expect("Failed to seed store");
        self
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(self.data_dir());
        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the `logtailer` binary with `args` and capture its output.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("logtailer")
            .map_err(|e| anyhow::anyhow!("Failed to find logtailer binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);
        run_command(&mut cmd)
    }

    /// Like [`TestWorld::run`] with `--format json` appended.
    pub fn run_json(&self, args: &[&str]) -> Result<CliResult> {
        let mut args = args.to_vec();
        args.extend(["--format", "json"]);
        self.run(&args)
    }

    /// Execute with `stdin` piped into the process.
    #[allow(deprecated)]
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("logtailer")
            .map_err(|e| anyhow::anyhow!("Failed to find logtailer binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args).write_stdin(stdin.to_string());
        run_command(&mut cmd)
    }
}

fn run_command(cmd: &mut Command) -> Result<CliResult> {
    let output = cmd.output()?;
    Ok(CliResult {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
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

    /// Parse stdout as JSON.
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
