//! Orchestration of upload validation, physical storage, and the registry

use chrono::Utc;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::Result;

use super::models::{FileRecord, FileUpload};
use super::registry::FileRegistry;
use super::store::FileStore;
use super::validation::UploadValidator;

/// The file bookkeeping service. Owns the registry, the store, and the
/// validator; constructed once at startup and handed to the HTTP layer.
#[derive(Clone)]
pub struct FileService {
    store: FileStore,
    registry: FileRegistry,
    validator: UploadValidator,
}

impl FileService {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            store: FileStore::new(config.upload_dir),
            registry: FileRegistry::new(),
            validator: UploadValidator::new(config.max_file_size),
        }
    }

    pub async fn initialize(&self) -> Result<()> {
        self.store.initialize().await
    }

    pub fn max_file_size(&self) -> u64 {
        self.validator.max_file_size()
    }

    /// Upload sequence: validate size, persist bytes, then record the
    /// metadata. Ordering guarantees the registry never references a
    /// file that failed to persist, and a rejected upload leaves no
    /// bytes behind.
    pub async fn store_file(&self, upload: FileUpload) -> Result<FileRecord> {
        self.validator.check_size(upload.data.len() as u64)?;

        let stored = self.store.persist(&upload.data, &upload.filename).await?;

        let record = FileRecord {
            id: stored.id,
            filename: upload.filename,
            content_type: upload
                .content_type
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
            size: stored.size,
            upload_time: Utc::now(),
            storage_path: stored.path,
        };

        self.registry.insert(record.clone());

        tracing::info!(
            id = %record.id,
            filename = %record.filename,
            size = record.size,
            "stored uploaded file"
        );

        Ok(record)
    }

    pub fn get_file(&self, id: &Uuid) -> Option<FileRecord> {
        self.registry.get(id)
    }

    pub async fn get_file_data(&self, id: &Uuid) -> Result<Option<(FileRecord, Vec<u8>)>> {
        match self.registry.get(id) {
            Some(record) => {
                let data = self.store.read(&record.storage_path).await?;
                Ok(Some((record, data)))
            }
            None => Ok(None),
        }
    }

    pub fn list_files(&self, skip: usize, limit: usize) -> Vec<FileRecord> {
        self.registry.list(skip, limit)
    }

    pub fn count_files(&self) -> usize {
        self.registry.len()
    }

    /// Logical deletion succeeds whenever the record exists; physical
    /// cleanup is advisory and its failure is only logged.
    pub async fn delete_file(&self, id: &Uuid) -> bool {
        let record = match self.registry.get(id) {
            Some(record) => record,
            None => return false,
        };

        self.store.remove(&record.storage_path).await;

        self.registry.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::validation::DEFAULT_MAX_FILE_SIZE;
    use tempfile::TempDir;

    fn make_service(max_file_size: u64) -> (FileService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = FileService::new(StorageConfig {
            upload_dir: temp_dir.path().to_path_buf(),
            max_file_size,
        });
        (service, temp_dir)
    }

    fn make_upload(filename: &str, data: &[u8]) -> FileUpload {
        FileUpload {
            filename: filename.to_string(),
            content_type: Some("text/plain".to_string()),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_store_and_retrieve_file() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let record = service
            .store_file(make_upload("hello.txt", b"Hello, World!"))
            .await
            .unwrap();
        assert_eq!(record.filename, "hello.txt");
        assert_eq!(record.size, 13);

        let found = service.get_file(&record.id).unwrap();
        assert_eq!(found.id, record.id);

        let (_, data) = service.get_file_data(&record.id).await.unwrap().unwrap();
        assert_eq!(data, b"Hello, World!");
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_with_no_side_effects() {
        let (service, _temp_dir) = make_service(10);
        service.initialize().await.unwrap();

        let result = service
            .store_file(make_upload("big.bin", &[0u8; 11]))
            .await;
        assert!(result.is_err());
        assert_eq!(service.count_files(), 0);
        assert!(service.list_files(0, 100).is_empty());
    }

    #[tokio::test]
    async fn test_upload_at_exact_limit_succeeds() {
        let (service, _temp_dir) = make_service(10);
        service.initialize().await.unwrap();

        let record = service
            .store_file(make_upload("fits.bin", &[0u8; 10]))
            .await
            .unwrap();
        assert_eq!(record.size, 10);
    }

    #[tokio::test]
    async fn test_successive_uploads_get_distinct_ids() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let first = service.store_file(make_upload("a.txt", b"a")).await.unwrap();
        let second = service.store_file(make_upload("a.txt", b"a")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_ne!(first.storage_path, second.storage_path);
    }

    #[tokio::test]
    async fn test_content_type_defaults_to_octet_stream() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let record = service
            .store_file(FileUpload {
                filename: "blob".to_string(),
                content_type: None,
                data: b"raw".to_vec(),
            })
            .await
            .unwrap();
        assert_eq!(record.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let record = service
            .store_file(make_upload("gone.txt", b"bye"))
            .await
            .unwrap();

        assert!(service.delete_file(&record.id).await);
        assert!(service.get_file(&record.id).is_none());
        assert!(service.get_file_data(&record.id).await.unwrap().is_none());

        assert!(!service.delete_file(&record.id).await);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_reports_not_found() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        assert!(!service.delete_file(&Uuid::new_v4()).await);
        assert_eq!(service.count_files(), 0);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_physical_file_is_already_gone() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let record = service
            .store_file(make_upload("lost.txt", b"bytes"))
            .await
            .unwrap();
        std::fs::remove_file(&record.storage_path).unwrap();

        assert!(service.delete_file(&record.id).await);
        assert!(service.get_file(&record.id).is_none());
    }

    #[tokio::test]
    async fn test_list_is_reverse_chronological() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let a = service.store_file(make_upload("a.txt", b"a")).await.unwrap();
        let b = service.store_file(make_upload("b.txt", b"b")).await.unwrap();
        let c = service.store_file(make_upload("c.txt", b"c")).await.unwrap();

        let listed = service.list_files(0, 10);
        let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let last_page = service.list_files(2, 10);
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].id, a.id);
    }

    #[tokio::test]
    async fn test_storage_path_stays_internal() {
        let (service, _temp_dir) = make_service(DEFAULT_MAX_FILE_SIZE);
        service.initialize().await.unwrap();

        let record = service
            .store_file(make_upload("secret.txt", b"s"))
            .await
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("storage_path").is_none());
        assert!(record.storage_path.starts_with(_temp_dir.path()));
    }
}
