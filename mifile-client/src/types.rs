use faststr::FastStr;
use serde::{Deserialize, Serialize};

/// Envelope shared by every JSON endpoint of the file service.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// server side identifier
    pub file_name: FastStr,
    pub original_file_name: FastStr,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: FastStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<FastStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Outcome of a call that reached the server and got a 2xx answer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Reply<T> {
    Accepted { message: String, data: Option<T> },
    Rejected { message: String },
}

impl<T> Reply<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Reply::Accepted { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Reply::Accepted { message, .. } | Reply::Rejected { message } => message,
        }
    }
}

impl<T> From<ApiResponse<T>> for Reply<T> {
    fn from(response: ApiResponse<T>) -> Self {
        if response.success {
            Reply::Accepted {
                message: response.message,
                data: response.data,
            }
        } else {
            Reply::Rejected {
                message: response.message,
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Rounded percentage, `None` while the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let percent = (self.loaded as f64 / self.total as f64 * 100.0).round();
        Some(percent.clamp(0.0, 100.0) as u8)
    }
}
