#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// A small people export mixing mapped columns, extra columns and bad rows.
pub const PEOPLE_CSV: &str = "\
name.firstName,name.lastName,age,address.line1,address.city,gender,hobby
Ann,Lee,30,1 Main St,Pune,female,chess
Raj,Kumar,15,,Delhi,male,
Mia,,41,\"4, Park Lane\",Leeds,female,running
Tom,Hardy,sixty,,,male,
Old,Timer,75,,Paris,,
short,row
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the workspace, which may not exist yet.
    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
