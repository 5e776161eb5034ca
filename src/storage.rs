//! Storage backends.
//!
//! Record files are only ever read front-to-back and written front-to-back,
//! so a backend needs nothing more than a byte stream, a byte sink with an
//! explicit close, and a pre-flight check that it can address a path.

use memmap2::Mmap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ReadStrategy;
use crate::error::{Error, Result};
use crate::util::split_scheme;

/// A byte sink that must be explicitly released.
pub trait Sink: Write + Send {
  /// Flushes anything pending and releases the underlying resource.
  fn close(self) -> io::Result<()>
  where
    Self: Sized;
}

impl Sink for File {
  fn close(mut self) -> io::Result<()> {
    self.flush()?;
    self.sync_all()
  }
}

/// Opens paths for sequential reading and writing.
pub trait Storage: Send + Sync {
  type Reader: Read + Send;
  type Writer: Sink;

  /// Fails with `UnsupportedScheme` if this backend cannot address `path`.
  fn validate_scheme(&self, path: &str) -> Result<()>;

  fn open_read(&self, path: &str) -> Result<Self::Reader>;

  /// Opens `path` for writing, replacing any previous contents.
  fn open_write(&self, path: &str) -> Result<Self::Writer>;

  fn exists(&self, path: &str) -> Result<bool>;
}

impl<S: Storage + ?Sized> Storage for &S {
  type Reader = S::Reader;
  type Writer = S::Writer;

  fn validate_scheme(&self, path: &str) -> Result<()> {
    (**self).validate_scheme(path)
  }

  fn open_read(&self, path: &str) -> Result<Self::Reader> {
    (**self).open_read(path)
  }

  fn open_write(&self, path: &str) -> Result<Self::Writer> {
    (**self).open_write(path)
  }

  fn exists(&self, path: &str) -> Result<bool> {
    (**self).exists(path)
  }
}

// --- Local filesystem ---

/// Local filesystem backend. Accepts plain paths and `file://` URLs.
#[derive(Debug, Clone, Copy)]
pub struct LocalStorage {
  read_strategy: ReadStrategy,
}

impl Default for LocalStorage {
  fn default() -> Self {
    Self::new(ReadStrategy::StandardIo)
  }
}

impl LocalStorage {
  pub fn new(read_strategy: ReadStrategy) -> Self {
    Self { read_strategy }
  }

  pub fn read_strategy(&self) -> ReadStrategy {
    self.read_strategy
  }

  fn resolve(&self, path: &str) -> Result<PathBuf> {
    match split_scheme(path) {
      (None, p) | (Some("file"), p) => Ok(PathBuf::from(p)),
      (Some(scheme), _) => Err(Error::UnsupportedScheme(format!(
        "local storage cannot open '{}' (scheme '{}')",
        path, scheme
      ))),
    }
  }
}

/// A local file opened for reading.
pub enum LocalReader {
  Io(File),
  Mmap(Cursor<Mmap>),
}

impl Read for LocalReader {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    match self {
      Self::Io(file) => file.read(buf),
      Self::Mmap(cursor) => cursor.read(buf),
    }
  }
}

impl Storage for LocalStorage {
  type Reader = LocalReader;
  type Writer = File;

  fn validate_scheme(&self, path: &str) -> Result<()> {
    self.resolve(path).map(|_| ())
  }

  fn open_read(&self, path: &str) -> Result<LocalReader> {
    let path = self.resolve(path)?;
    let file = File::open(&path)?;

    if self.read_strategy == ReadStrategy::Mmap && file.metadata()?.len() > 0 {
      // Safety: Caller must ensure file is not modified externally.
      let mmap = unsafe { Mmap::map(&file)? };
      return Ok(LocalReader::Mmap(Cursor::new(mmap)));
    }

    Ok(LocalReader::Io(file))
  }

  fn open_write(&self, path: &str) -> Result<File> {
    let path = self.resolve(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    Ok(File::create(&path)?)
  }

  fn exists(&self, path: &str) -> Result<bool> {
    let path = self.resolve(path)?;
    Ok(path.try_exists()?)
  }
}

// --- In-memory ---

type FileMap = BTreeMap<String, Arc<[u8]>>;

/// In-memory backend addressed with `mem://` paths.
///
/// Clones share the same files. A written file becomes visible only when its
/// sink is closed, so a failed write never leaves a partial file behind.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  files: Arc<Mutex<FileMap>>,
}

impl MemoryStorage {
  pub const SCHEME: &'static str = "mem";

  pub fn new() -> Self {
    Self::default()
  }

  fn key<'a>(&self, path: &'a str) -> Result<&'a str> {
    match split_scheme(path) {
      (Some(Self::SCHEME), key) => Ok(key),
      _ => Err(Error::UnsupportedScheme(format!(
        "memory storage only addresses {}:// paths, got '{}'",
        Self::SCHEME,
        path
      ))),
    }
  }

  /// Contents of a closed file.
  pub fn get(&self, path: &str) -> Option<Vec<u8>> {
    let key = self.key(path).ok()?;
    self.files.lock().get(key).map(|bytes| bytes.to_vec())
  }

  /// Replaces a file's contents directly.
  pub fn insert(&self, path: &str, bytes: impl Into<Vec<u8>>) -> Result<()> {
    let key = self.key(path)?.to_string();
    let bytes: Vec<u8> = bytes.into();
    self.files.lock().insert(key, Arc::from(bytes));
    Ok(())
  }

  pub fn remove(&self, path: &str) -> bool {
    match self.key(path) {
      Ok(key) => self.files.lock().remove(key).is_some(),
      Err(_) => false,
    }
  }

  /// All stored paths, sorted.
  pub fn paths(&self) -> Vec<String> {
    self
      .files
      .lock()
      .keys()
      .map(|key| format!("{}://{}", Self::SCHEME, key))
      .collect()
  }
}

/// Write handle for a [`MemoryStorage`] file.
pub struct MemorySink {
  key: String,
  buffer: Vec<u8>,
  files: Arc<Mutex<FileMap>>,
}

impl Write for MemorySink {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buffer.write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Sink for MemorySink {
  fn close(self) -> io::Result<()> {
    self.files.lock().insert(self.key, Arc::from(self.buffer));
    Ok(())
  }
}

impl Storage for MemoryStorage {
  type Reader = Cursor<Arc<[u8]>>;
  type Writer = MemorySink;

  fn validate_scheme(&self, path: &str) -> Result<()> {
    self.key(path).map(|_| ())
  }

  fn open_read(&self, path: &str) -> Result<Self::Reader> {
    let key = self.key(path)?;
    match self.files.lock().get(key) {
      Some(bytes) => Ok(Cursor::new(bytes.clone())),
      None => Err(Error::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path),
      ))),
    }
  }

  fn open_write(&self, path: &str) -> Result<MemorySink> {
    let key = self.key(path)?.to_string();
    Ok(MemorySink {
      key,
      buffer: Vec::new(),
      files: self.files.clone(),
    })
  }

  fn exists(&self, path: &str) -> Result<bool> {
    let key = self.key(path)?;
    Ok(self.files.lock().contains_key(key))
  }
}
