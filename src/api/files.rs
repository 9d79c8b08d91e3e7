//! File upload, metadata and download endpoints.

use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use reqwest::Response;
use reqwest::header::CONTENT_DISPOSITION;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use crate::error::ApiError;
use crate::filename::resolve_output_path;
use crate::http::{ApiRequest, HttpTransport, UploadPayload};
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::types::{FileInfo, FileUploaded};
use crate::validation::validate_file_id;

/// Name reported for uploads that do not come from a path.
pub const DEFAULT_UPLOAD_NAME: &str = "file";

/// Multipart field carrying the upload.
const UPLOAD_FIELD: &str = "file";

/// Read size for upload sources.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Result file content as a stream of chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// Where upload content comes from.
pub enum UploadSource {
    /// A regular file on disk; its basename is the reported name.
    Path(PathBuf),
    /// An in-memory buffer.
    Bytes {
        /// Content.
        data: Bytes,
        /// Reported name, `file` when absent.
        file_name: Option<String>,
    },
    /// Any async reader. Its size is not known up front.
    Reader {
        /// Content source.
        reader: Box<dyn AsyncRead + Send + Unpin>,
        /// Reported name, `file` when absent.
        file_name: Option<String>,
    },
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes { data, file_name } => f
                .debug_struct("Bytes")
                .field("len", &data.len())
                .field("file_name", file_name)
                .finish(),
            Self::Reader { file_name, .. } => f
                .debug_struct("Reader")
                .field("file_name", file_name)
                .finish_non_exhaustive(),
        }
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Bytes> for UploadSource {
    fn from(data: Bytes) -> Self {
        Self::Bytes {
            data,
            file_name: None,
        }
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(data: Vec<u8>) -> Self {
        Bytes::from(data).into()
    }
}

/// Operations on `/files`.
#[derive(Debug, Clone)]
pub struct Files {
    transport: HttpTransport,
}

impl Files {
    pub(crate) fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Uploads a file and returns its id.
    ///
    /// Progress fires once per chunk read from the source, with the total
    /// size when it is known (paths and buffers).
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] if a path is missing or not a regular file,
    /// or the server reports an upload error; [`ApiError::Io`] if reading
    /// fails; any transport error otherwise.
    #[instrument(skip(self, source, on_progress))]
    pub async fn upload(
        &self,
        source: UploadSource,
        on_progress: Option<ProgressCallback>,
    ) -> Result<String, ApiError> {
        let payload = read_upload(source, on_progress.as_ref()).await?;
        let file_name = payload.file_name.clone();
        let size = payload.data.len();

        let request = ApiRequest::post_multipart("/files", payload).allow_error_field();
        let uploaded: FileUploaded = self.transport.json(&request, None).await?;

        if let Some(message) = uploaded.error {
            return Err(ApiError::validation(message));
        }
        let file_id = uploaded
            .file_id
            .ok_or_else(|| ApiError::validation("upload response did not include a file id"))?;

        info!(%file_id, %file_name, size, "file uploaded");
        Ok(file_id)
    }

    /// Fetches file metadata.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed id; any transport error otherwise.
    #[instrument(skip(self))]
    pub async fn info(&self, file_id: &str) -> Result<FileInfo, ApiError> {
        validate_file_id(file_id)?;
        let request = ApiRequest::get(format!("/files/{file_id}/info"));
        self.transport.json(&request, None).await
    }

    /// Streams a file's content.
    ///
    /// The client timeout bounds the wait for headers, not the body.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed id; any transport error for
    /// the request itself. Body read failures surface as stream items.
    pub async fn download_stream(&self, file_id: &str) -> Result<ByteStream, ApiError> {
        let response = self.fetch(file_id).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ApiError::network))
            .boxed())
    }

    /// Downloads a file into memory.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed id; any transport error otherwise.
    pub async fn download_bytes(&self, file_id: &str) -> Result<Bytes, ApiError> {
        let response = self.fetch(file_id).await?;
        response.bytes().await.map_err(ApiError::network)
    }

    /// Downloads a file to disk and returns the written path.
    ///
    /// The path is `output` when given, else the sanitized name from
    /// `Content-Disposition`, else `result`. Parent directories are created.
    /// A partially written file is removed if the body stream fails.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed id; [`ApiError::Io`] for
    /// local write failures; any transport error otherwise.
    #[instrument(skip(self, on_progress), fields(output = ?output))]
    pub async fn download_to(
        &self,
        file_id: &str,
        output: Option<&Path>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, ApiError> {
        let response = self.fetch(file_id).await?;

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok());
        let path = resolve_output_path(output, content_disposition);
        debug!(path = %path.display(), "resolved output path");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::io(parent, e))?;
        }

        let mut file = File::create(&path)
            .await
            .map_err(|e| ApiError::io(&path, e))?;

        let stream_result = stream_to_file(&mut file, response, &path, on_progress.as_ref()).await;
        if stream_result.is_err() {
            debug!(path = %path.display(), "removing partial file after error");
            let _ = tokio::fs::remove_file(&path).await;
        }
        let written = stream_result?;

        info!(%file_id, path = %path.display(), bytes = written, "file downloaded");
        Ok(path)
    }

    async fn fetch(&self, file_id: &str) -> Result<Response, ApiError> {
        validate_file_id(file_id)?;
        let request = ApiRequest::get(format!("/files/{file_id}"));
        self.transport.send(&request, None).await
    }
}

/// Reads an upload source fully, reporting progress per chunk.
async fn read_upload(
    source: UploadSource,
    on_progress: Option<&ProgressCallback>,
) -> Result<UploadPayload, ApiError> {
    let (data, file_name) = match source {
        UploadSource::Path(path) => {
            let metadata = tokio::fs::metadata(&path).await.map_err(|_| {
                ApiError::validation(format!("file not found: {}", path.display()))
            })?;
            if !metadata.is_file() {
                return Err(ApiError::validation(format!(
                    "not a regular file: {}",
                    path.display()
                )));
            }
            let file_name = path.file_name().map_or_else(
                || DEFAULT_UPLOAD_NAME.to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            let file = File::open(&path)
                .await
                .map_err(|e| ApiError::io(&path, e))?;
            let data = read_chunked(file, Some(metadata.len()), &path, on_progress).await?;
            (data, file_name)
        }
        UploadSource::Bytes { data, file_name } => {
            let total = data.len() as u64;
            let mut loaded = 0u64;
            for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
                loaded += chunk.len() as u64;
                report(on_progress, loaded, Some(total));
            }
            (
                data,
                file_name.unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string()),
            )
        }
        UploadSource::Reader { reader, file_name } => {
            let file_name = file_name.unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
            let data = read_chunked(reader, None, Path::new(&file_name), on_progress).await?;
            (data, file_name)
        }
    };

    Ok(UploadPayload {
        field: UPLOAD_FIELD,
        file_name,
        data,
    })
}

async fn read_chunked<R: AsyncRead + Unpin>(
    mut reader: R,
    total: Option<u64>,
    label: &Path,
    on_progress: Option<&ProgressCallback>,
) -> Result<Bytes, ApiError> {
    let capacity = total
        .and_then(|t| usize::try_from(t).ok())
        .unwrap_or(UPLOAD_CHUNK_SIZE);
    let mut buffer = BytesMut::with_capacity(capacity);
    let mut loaded = 0u64;

    loop {
        buffer.reserve(UPLOAD_CHUNK_SIZE);
        let read = reader
            .read_buf(&mut buffer)
            .await
            .map_err(|e| ApiError::io(label, e))?;
        if read == 0 {
            break;
        }
        loaded += read as u64;
        report(on_progress, loaded, total);
    }

    Ok(buffer.freeze())
}

/// Streams a response body to disk, returning the bytes written.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    path: &Path,
    on_progress: Option<&ProgressCallback>,
) -> Result<u64, ApiError> {
    let total = response.content_length();
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::network)?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| ApiError::io(path, e))?;
        written += chunk.len() as u64;
        report(on_progress, written, total);
    }

    writer.flush().await.map_err(|e| ApiError::io(path, e))?;
    Ok(written)
}

fn report(on_progress: Option<&ProgressCallback>, loaded: u64, total: Option<u64>) {
    if let Some(callback) = on_progress {
        callback(ProgressEvent::new(loaded, total));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use super::*;

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |event| sink.lock().unwrap().push(event));
        (callback, events)
    }

    #[tokio::test]
    async fn test_read_upload_path_uses_basename_and_reports_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.xml");
        std::fs::write(&path, b"<root/>").unwrap();
        let (callback, events) = recorder();

        let payload = read_upload(UploadSource::Path(path), Some(&callback))
            .await
            .unwrap();

        assert_eq!(payload.file_name, "data.xml");
        assert_eq!(payload.field, "file");
        assert_eq!(&payload.data[..], b"<root/>");
        let events = events.lock().unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.loaded, 7);
        assert_eq!(last.total, Some(7));
        assert_eq!(last.percent, Some(100));
    }

    #[tokio::test]
    async fn test_read_upload_missing_path_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let result = read_upload(UploadSource::Path(dir.path().join("missing.xml")), None).await;
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_read_upload_directory_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let result = read_upload(UploadSource::Path(dir.path().to_path_buf()), None).await;
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_read_upload_bytes_defaults_name() {
        let (callback, events) = recorder();
        let data = Bytes::from(vec![b'x'; UPLOAD_CHUNK_SIZE + 10]);

        let payload = read_upload(data.into(), Some(&callback)).await.unwrap();

        assert_eq!(payload.file_name, DEFAULT_UPLOAD_NAME);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].loaded, UPLOAD_CHUNK_SIZE as u64);
        assert_eq!(events[1].percent, Some(100));
    }

    #[tokio::test]
    async fn test_read_upload_reader_has_unknown_total() {
        let (callback, events) = recorder();
        let source = UploadSource::Reader {
            reader: Box::new(&b"a,b\n1,2\n"[..]),
            file_name: Some("table.csv".into()),
        };

        let payload = read_upload(source, Some(&callback)).await.unwrap();

        assert_eq!(payload.file_name, "table.csv");
        assert_eq!(&payload.data[..], b"a,b\n1,2\n");
        let events = events.lock().unwrap();
        assert!(events.iter().all(|e| e.total.is_none() && e.percent.is_none()));
        assert_eq!(events.last().unwrap().loaded, 8);
    }
}
