use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Metadata for one stored file. The storage path is server-internal
/// and never serialized to clients; the id is the only handle they see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub upload_time: DateTime<Utc>,
    #[serde(skip)]
    pub storage_path: PathBuf,
}

/// A decoded upload on its way into the service.
#[derive(Debug)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}
