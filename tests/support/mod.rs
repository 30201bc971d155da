use std::fs;
use std::path::{Path, PathBuf};

use acts::activity::Activity;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub const MELBOURNE: chrono_tz::Tz = chrono_tz::Australia::Melbourne;

/// Scratch directory holding an isolated log and config.
pub struct TestLog {
    dir: TempDir,
}

impl TestLog {
    pub fn new() -> Result<Self, std::io::Error> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("logfile.txt")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `acts` bound to this directory's log and config.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("acts").expect("binary");
        cmd.current_dir(self.dir.path())
            .env("ACTS_LOGFILE", self.log_path())
            .env("ACTS_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn read_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    pub fn write_log(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.log_path(), contents)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.config_path(), contents)
    }

    /// Add an activity through the CLI and return its full id.
    pub fn add(&self, entry: &str) -> Result<String, Box<dyn std::error::Error>> {
        let mut args = vec!["--json", "new"];
        args.extend(entry.split(' '));
        let output = self.cmd().args(&args).assert().success().get_output().stdout.clone();
        let value: Value = serde_json::from_slice(&output)?;
        let id = value["data"]["id"]
            .as_str()
            .ok_or("missing id in output")?
            .to_string();
        Ok(id)
    }
}

/// Two entries at the same time whose ids share a 3-character prefix.
pub fn colliding_entries() -> (String, String) {
    let mut seen: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    for n in 0.. {
        let entry = format!("2020-01-01 09:00 chore {n}");
        let activity = Activity::parse(&entry, MELBOURNE).expect("valid entry");
        let short = activity.digest()[..3].to_string();
        if let Some(previous) = seen.insert(short, entry.clone()) {
            return (previous, entry);
        }
    }
    unreachable!()
}
