//! Common test utilities for formpilot integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated test environment: a throwaway HOME with no config and no
/// credential environment leaking in from the host.
pub struct TestEnv {
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            temp_dir: tempdir()?,
        })
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_formpilot"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("OPENAI_API_KEY");
        cmd.env_remove("GOOGLE_FORMS_MCP_PATH");
        cmd
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir
            .path()
            .join(".formpilot")
            .join("config.json")
    }
}
