//! File distribution.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Opaque token the serving node uses to fetch a distributed file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives files that are shipped to serving nodes next to the config.
///
/// Compilation tasks of one wavefront register concurrently.
pub trait FileRegistry: Send + Sync {
    fn add_blob(&self, name: &str, bytes: &[u8]) -> FileReference;

    fn lookup(&self, name: &str) -> Option<FileReference>;
}

#[derive(Debug)]
struct Entry {
    reference: FileReference,
    bytes: Vec<u8>,
    registrations: usize,
}

/// [`FileRegistry`] keeping every blob in memory.
///
/// References are content checksums, so re-registering identical bytes
/// yields the same reference.
#[derive(Debug, Default)]
pub struct InMemoryFileRegistry {
    entries: Mutex<IndexMap<String, Entry>>,
}

impl InMemoryFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `name` was registered.
    pub fn registrations(&self, name: &str) -> usize {
        self.entries.lock().get(name).map_or(0, |e| e.registrations)
    }

    pub fn blob(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(name).map(|e| e.bytes.clone())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl FileRegistry for InMemoryFileRegistry {
    fn add_blob(&self, name: &str, bytes: &[u8]) -> FileReference {
        let reference = FileReference(format!("{:08x}", crc32fast::hash(bytes)));
        let mut entries = self.entries.lock();
        let entry = entries.entry(name.to_string()).or_insert_with(|| Entry {
            reference: reference.clone(),
            bytes: Vec::new(),
            registrations: 0,
        });
        entry.reference = reference.clone();
        entry.bytes = bytes.to_vec();
        entry.registrations += 1;
        reference
    }

    fn lookup(&self, name: &str) -> Option<FileReference> {
        self.entries.lock().get(name).map(|e| e.reference.clone())
    }
}
