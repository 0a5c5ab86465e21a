use std::sync::Arc;

use async_trait::async_trait;
use mifile_common::SelectedFile;
use serde_json::Value;
use url::Url;

mod errors;
pub use errors::ClientError;

mod http;
pub use http::{ClientConfig, FileClient, disposition_filename};

mod types;
pub use types::{ApiResponse, FileRecord, Reply, UploadProgress, UploadedFile};

pub mod upload;

/// Receives upload progress while the body is being transferred.
pub type ProgressFn = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// The REST surface of the file service.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// `GET /api/files/health`, only the status matters.
    async fn health(&self) -> Result<Value, ClientError>;

    /// `GET /api/files`, records in server order.
    async fn list_files(&self) -> Result<Vec<FileRecord>, ClientError>;

    /// `POST /api/files/upload` as multipart field `file`.
    async fn upload(
        &self,
        file: &SelectedFile,
        progress: ProgressFn,
    ) -> Result<Reply<UploadedFile>, ClientError>;

    /// `DELETE /api/files/{file_name}`.
    async fn delete(&self, file_name: &str) -> Result<Reply<()>, ClientError>;

    /// Location of `GET /api/files/download/{file_name}`.
    fn download_url(&self, file_name: &str) -> Result<Url, ClientError>;
}
