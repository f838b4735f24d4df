pub mod models;
pub mod registry;
pub mod service;
pub mod store;
pub mod validation;

pub use models::{FileRecord, FileUpload};
pub use registry::FileRegistry;
pub use service::FileService;
pub use store::{FileStore, StoredFile};
pub use validation::{UploadValidator, ValidationError};
