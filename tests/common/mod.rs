#![allow(dead_code)]

use shardio::RecordWriter;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
  // The TempDir guard must be kept alive to prevent premature deletion of the directory.
  pub _dir: TempDir,
  pub root: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    Self { _dir: dir, root }
  }

  /// Absolute path of `name` inside the test directory, as a string.
  pub fn path(&self, name: &str) -> String {
    self.root.join(name).to_str().unwrap().to_string()
  }

  /// Writes `records` to a new record file and returns its path.
  pub fn write_file(&self, name: &str, records: &[&[u8]]) -> String {
    let path = self.path(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = RecordWriter::new(file);
    for record in records {
      writer.write_record(record).unwrap();
    }
    writer.close().unwrap();
    path
  }
}
