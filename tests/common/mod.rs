#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ppts_import::rows::REQUIRED_COLUMNS;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Renders an export CSV with the full required header plus `extra_columns`.
/// Each row supplies `(column, value)` pairs; unnamed cells stay empty.
pub fn export_csv(extra_columns: &[&str], rows: &[&[(&str, &str)]]) -> String {
    let headers: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(extra_columns.iter().copied())
        .collect();
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&headers).expect("write header");
    for row in rows {
        let fields: Vec<&str> = headers
            .iter()
            .map(|header| {
                row.iter()
                    .find(|(name, _)| name == header)
                    .map(|(_, value)| *value)
                    .unwrap_or("")
            })
            .collect();
        writer.write_record(&fields).expect("write row");
    }
    String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf-8 csv")
}
