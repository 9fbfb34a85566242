//! Shared helpers for CLI specs

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Hand-written ASCII log: sender 0 and 1, events 0 and 1
pub const SAMPLE_LOG: &str = "\
#evboard ascii v2
0\t0\t100\t0\tcompleted\tempty\t-\t1\t
0\t1\t150\t20\tcontinued\ttuple\t-\t0.5\t1 2
1\t0\t200\t0\tcompleted\tstring\t3\t0.25\t\"laughter\"
1\t1\t900\t40\tcompleted\tmap\t-\t1\t0=0.75 1=0.25
";

/// Names for SAMPLE_LOG ids
pub const SAMPLE_NAMES: &str = "audio\nvad\n";

/// A scratch directory to run the CLI in
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write a file relative to the project root
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(relative)).unwrap()
    }

    pub fn evboard(&self) -> Cli {
        let mut cmd = Command::cargo_bin("evboard").unwrap();
        cmd.current_dir(self.dir.path());
        cmd.env("RUST_LOG", "warn");
        // Keep a user's broker.toml out of the way
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join(".config"));
        cmd.env("HOME", self.dir.path());
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct RunAssert {
    assert: assert_cmd::assert::Assert,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicates::str::contains(expected)),
        }
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Self {
            assert: self
                .assert
                .stdout(predicates::str::contains(unexpected).not()),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicates::str::contains(expected)),
        }
    }
}
