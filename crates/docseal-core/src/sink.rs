//! Named destinations for persisted signatures

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A place signature bytes can be written to and read back from by name.
///
/// Writes overwrite whatever the name previously held. Implementations
/// must not keep handles open between calls.
pub trait SignatureSink {
    /// Replace the content stored under `name`
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Read back the full content stored under `name`
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Human-readable location of `name`, for messages and logs
    fn locate(&self, name: &str) -> String {
        name.to_string()
    }
}

/// Signatures stored as files below a root directory
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Sink rooted at the process working directory
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute names pass through unchanged
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::current_dir()
    }
}

impl SignatureSink for FileSink {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.resolve(name), bytes)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(name))
    }

    fn locate(&self, name: &str) -> String {
        self.resolve(name).display().to_string()
    }
}

/// In-process sink, handy for tests and for hosts that ship signatures
/// elsewhere themselves
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(name))
            .unwrap_or(false)
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory sink lock poisoned")
}

impl SignatureSink for MemorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        entries.get(name).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no signature stored under {}", name),
            )
        })
    }

    fn locate(&self, name: &str) -> String {
        format!("memory:{}", name)
    }
}
