//! Conversion inputs accepted by [`ConversionClient::convert`](crate::ConversionClient::convert).

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::api::UploadSource;
use crate::error::ApiError;
use crate::validation::{validate_file_id, validate_url};

/// What to convert.
pub enum ConversionInput {
    /// A local file, uploaded before the task is created.
    Path(PathBuf),
    /// A web page or remote file, passed to the server as `options.url`.
    Url(String),
    /// An async reader, uploaded before the task is created.
    Reader {
        /// Content source.
        reader: Box<dyn AsyncRead + Send + Unpin>,
        /// Reported name, `file` when absent.
        file_name: Option<String>,
    },
    /// An in-memory buffer, uploaded before the task is created.
    Bytes {
        /// Content.
        data: Bytes,
        /// Reported name, `file` when absent.
        file_name: Option<String>,
    },
    /// A previously uploaded file; no upload happens.
    FileId(String),
}

impl fmt::Debug for ConversionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Reader { file_name, .. } => f
                .debug_struct("Reader")
                .field("file_name", file_name)
                .finish_non_exhaustive(),
            Self::Bytes { data, file_name } => f
                .debug_struct("Bytes")
                .field("len", &data.len())
                .field("file_name", file_name)
                .finish(),
            Self::FileId(id) => f.debug_tuple("FileId").field(id).finish(),
        }
    }
}

impl ConversionInput {
    /// A URL input.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// An already uploaded file.
    pub fn file_id(file_id: impl Into<String>) -> Self {
        Self::FileId(file_id.into())
    }

    /// Validates the input and splits it into what the client must do with it.
    pub(crate) fn resolve(self) -> Result<ResolvedInput, ApiError> {
        match self {
            Self::Url(url) => {
                validate_url(&url)?;
                Ok(ResolvedInput::Url(url))
            }
            Self::FileId(file_id) => {
                validate_file_id(&file_id)?;
                Ok(ResolvedInput::FileId(file_id))
            }
            Self::Path(path) => Ok(ResolvedInput::Upload(UploadSource::Path(path))),
            Self::Reader { reader, file_name } => {
                Ok(ResolvedInput::Upload(UploadSource::Reader { reader, file_name }))
            }
            Self::Bytes { data, file_name } => {
                Ok(ResolvedInput::Upload(UploadSource::Bytes { data, file_name }))
            }
        }
    }
}

/// A plain string is a file path.
impl From<&str> for ConversionInput {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for ConversionInput {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for ConversionInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ConversionInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Bytes> for ConversionInput {
    fn from(data: Bytes) -> Self {
        Self::Bytes {
            data,
            file_name: None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ResolvedInput {
    Upload(UploadSource),
    Url(String),
    FileId(String),
}
