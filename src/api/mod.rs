//! Endpoint collaborators sharing one [`HttpTransport`](crate::http::HttpTransport).

mod config;
mod files;
mod tasks;

pub use config::Account;
pub use files::{ByteStream, DEFAULT_UPLOAD_NAME, Files, UploadSource};
pub use tasks::Tasks;
