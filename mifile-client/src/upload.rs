use std::io;

use async_stream::stream;
use bytes::Bytes;
use futures::Stream;
use mifile_common::SelectedFile;
use reqwest::{
    Body,
    multipart::{Form, Part},
};
use tokio::{fs::File, io::AsyncReadExt};

use crate::{ClientError, ProgressFn, UploadProgress};

/// Multipart field the server reads the file from.
pub const UPLOAD_FIELD: &str = "file";

const CHUNK_SIZE: usize = 64 * 1024;

pub async fn upload_form(file: &SelectedFile, progress: ProgressFn) -> Result<Form, ClientError> {
    let handle = File::open(&file.path).await?;
    let total = handle.metadata().await?.len();

    let mime = mime_guess::from_path(&file.path).first_or_octet_stream();
    let body = Body::wrap_stream(progress_stream(handle, total, progress));
    let part = Part::stream_with_length(body, total)
        .file_name(file.name.clone())
        .mime_str(mime.essence_str())?;

    Ok(Form::new().part(UPLOAD_FIELD, part))
}

/// Reads the file in chunks, reporting the running byte count as each chunk is handed over.
fn progress_stream(
    mut file: File,
    total: u64,
    progress: ProgressFn,
) -> impl Stream<Item = Result<Bytes, io::Error>> {
    stream! {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut loaded = 0u64;
        loop {
            match file.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    loaded += n as u64;
                    progress(UploadProgress { loaded, total });
                    yield Ok::<Bytes, io::Error>(Bytes::copy_from_slice(&buf[..n]));
                }
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
    }
}
