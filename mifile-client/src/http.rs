use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use mifile_common::{SelectedFile, file::file_name};
use percent_encoding::percent_decode_str;
use reqwest::{Response, header::CONTENT_DISPOSITION};
use serde::{Deserialize, de::IgnoredAny};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    ApiResponse, ClientError, FileApi, FileRecord, ProgressFn, Reply, UploadedFile,
    upload::upload_form,
};

const API_SEGMENTS: [&str; 2] = ["api", "files"];
const HEALTH: &str = "health";
const UPLOAD: &str = "upload";
const DOWNLOAD: &str = "download";
// numbered siblings tried before giving up on a taken name
const MAX_COPIES: usize = 1000;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: Url,
    /// applies to health, list and delete, transfers are unbounded
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(server: Url) -> Self {
        Self {
            server,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

pub struct FileClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl FileClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.server.cannot_be_a_base() {
            return Err(ClientError::InvalidServer(config.server.to_string()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .http2_keep_alive_timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn server(&self) -> &Url {
        &self.config.server
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.config.server.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidServer(self.config.server.to_string()))?
            .pop_if_empty()
            .extend(API_SEGMENTS.iter().chain(segments));
        Ok(url)
    }

    /// Streams a download to `dir`, named after the server's `Content-Disposition` if any.
    ///
    /// Bytes land in a temporary file first, an existing file is never replaced.
    pub async fn save(&self, url: Url, dir: &Path) -> Result<PathBuf, ClientError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .or_else(|| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .map(percent_decode)
            })
            .and_then(file_name)
            .map(|name| name.replace(char::is_control, "_"))
            .unwrap_or_else(|| DOWNLOAD.to_string());

        let temp = NamedTempFile::new_in(dir)?;
        let mut file = File::from_std(temp.reopen()?);
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        let path = persist_unique(temp, dir, &name)?;
        info!("downloaded {url} to {}, {written} bytes", path.display());
        Ok(path)
    }
}

/// Moves a finished download to `dir/name`, or `name (n)` when that is taken.
fn persist_unique(mut temp: NamedTempFile, dir: &Path, name: &str) -> Result<PathBuf, ClientError> {
    for copy in 0..MAX_COPIES {
        let path = dir.join(numbered(name, copy));
        match temp.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => temp = err.file,
            Err(err) => return Err(err.error.into()),
        }
    }
    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("{name} and its numbered copies already exist"),
    )
    .into())
}

fn numbered(name: &str, copy: usize) -> String {
    if copy == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({copy}).{ext}"),
        _ => format!("{name} ({copy})"),
    }
}

async fn read_envelope<T>(response: Response) -> Result<ApiResponse<T>, ClientError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status(status));
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl FileApi for FileClient {
    async fn health(&self) -> Result<Value, ClientError> {
        let url = self.endpoint(&[HEALTH])?;
        let response = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ServerNotResponding(status));
        }
        // only the status matters, the body is kept for logging
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, ClientError> {
        let url = self.endpoint(&[])?;
        let response = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?;
        let envelope: ApiResponse<Vec<FileRecord>> = read_envelope(response).await?;
        let records = envelope.data.unwrap_or_default();
        debug!("listed {} files", records.len());
        Ok(records)
    }

    async fn upload(
        &self,
        file: &SelectedFile,
        progress: ProgressFn,
    ) -> Result<Reply<UploadedFile>, ClientError> {
        let url = self.endpoint(&[UPLOAD])?;
        let form = upload_form(file, progress).await?;

        info!("uploading {}, {} bytes to {url}", file.name, file.size);
        let response = self.http.post(url).multipart(form).send().await?;
        let reply = Reply::from(read_envelope::<UploadedFile>(response).await?);
        if let Reply::Rejected { message } = &reply {
            warn!("upload {} rejected: {message}", file.name);
        }
        Ok(reply)
    }

    async fn delete(&self, file_name: &str) -> Result<Reply<()>, ClientError> {
        let url = self.endpoint(&[file_name])?;
        let response = self
            .http
            .delete(url)
            .timeout(self.config.timeout)
            .send()
            .await?;
        let reply = match Reply::from(read_envelope::<IgnoredAny>(response).await?) {
            Reply::Accepted { message, .. } => Reply::Accepted {
                message,
                data: None,
            },
            Reply::Rejected { message } => {
                warn!("delete {file_name} rejected: {message}");
                Reply::Rejected { message }
            }
        };
        Ok(reply)
    }

    fn download_url(&self, file_name: &str) -> Result<Url, ClientError> {
        self.endpoint(&[DOWNLOAD, file_name])
    }
}

/// Picks the file name out of a `Content-Disposition` value, `filename*` wins.
pub fn disposition_filename(value: &str) -> Option<String> {
    let params = disposition_params(value);
    let param = |key: &str| -> Option<String> {
        params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    };

    let extended = param("filename*").map(|encoded| {
        let encoded = encoded
            .split_once("''")
            .map(|(_, name)| name)
            .unwrap_or(&encoded);
        percent_decode(encoded)
    });
    extended
        .filter(|name| !name.is_empty())
        .or_else(|| param("filename"))
        .filter(|name| !name.is_empty())
}

/// Splits the parameters after the disposition type, keys lowercased, quoted strings unescaped.
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let mut params = vec![];
    let Some((_, mut rest)) = value.split_once(';') else {
        return params;
    };

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        let key_end = rest.find(['=', ';']).unwrap_or(rest.len());
        let key = rest[..key_end].trim().to_ascii_lowercase();
        rest = &rest[key_end..];
        let Some(after) = rest.strip_prefix('=') else {
            continue;
        };

        let after = after.trim_start();
        let (param, remaining) = match after.strip_prefix('"') {
            Some(quoted) => unquote(quoted),
            None => {
                let end = after.find(';').unwrap_or(after.len());
                (after[..end].trim_end().to_string(), &after[end..])
            }
        };
        params.push((key, param));
        rest = remaining;
    }
    params
}

/// Reads a quoted string body up to its closing quote, returns it with the remaining input.
fn unquote(quoted: &str) -> (String, &str) {
    let mut unquoted = String::with_capacity(quoted.len());
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    unquoted.push(escaped);
                }
            }
            '"' => return (unquoted, &quoted[i + 1..]),
            _ => unquoted.push(c),
        }
    }
    (unquoted, "")
}

fn percent_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
