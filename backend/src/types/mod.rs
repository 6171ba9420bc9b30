mod environment;
mod error;
mod extractors;
mod storage_config;
mod upload;

pub use environment::Environment;
pub use error::{AppError, STORAGE_NOT_CONFIGURED};
pub use extractors::{FileForm, FILE_FIELD};
pub use storage_config::{StorageConfig, UrlMode};
pub use upload::{FileUpload, UploadRejection, MAX_UPLOAD_SIZE_BYTES};
