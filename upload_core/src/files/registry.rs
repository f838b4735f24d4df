//! In-memory registry of file metadata records

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use super::models::FileRecord;

struct Entry {
    record: FileRecord,
    seq: u64,
}

#[derive(Default)]
struct RegistryInner {
    records: HashMap<Uuid, Entry>,
    next_seq: u64,
}

/// Mapping from identifier to [`FileRecord`], guarded by a single lock.
/// State lives only for the lifetime of the process.
#[derive(Clone, Default)]
pub struct FileRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier uniqueness is guaranteed by the store's UUID generation.
    pub fn insert(&self, record: FileRecord) {
        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(record.id, Entry { record, seq });
    }

    pub fn get(&self, id: &Uuid) -> Option<FileRecord> {
        self.inner.read().records.get(id).map(|e| e.record.clone())
    }

    /// Records ordered by upload time descending, ties broken by
    /// insertion order, then windowed by `skip`/`limit`. A `skip` past
    /// the end yields an empty list.
    pub fn list(&self, skip: usize, limit: usize) -> Vec<FileRecord> {
        let inner = self.inner.read();

        let mut entries: Vec<&Entry> = inner.records.values().collect();
        entries.sort_by(|a, b| {
            b.record
                .upload_time
                .cmp(&a.record.upload_time)
                .then(a.seq.cmp(&b.seq))
        });

        entries
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|e| e.record.clone())
            .collect()
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.inner.write().records.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}
