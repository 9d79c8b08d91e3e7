//! Conversion Tools client library
//!
//! An async client for the Conversion Tools file conversion API: upload a
//! file (or point at a URL), create a conversion task, poll until it
//! finishes, and download the result.
//!
//! # Architecture
//!
//! - [`http`] - Authenticated transport with retries and quota tracking
//! - [`api`] - Files, tasks and account endpoints
//! - [`task`] - Task entity with polling and result download
//! - [`client`] - [`ConversionClient`] and the one-call [`convert`](ConversionClient::convert) workflow
//! - [`conversions`] - Catalog of known conversion types and their options
//! - [`legacy`] - v1 compatible `run` API
//!
//! # Example
//!
//! ```no_run
//! use conversiontools::{ConversionClient, ConvertOutcome, ConvertRequest};
//!
//! # async fn example() -> Result<(), conversiontools::ApiError> {
//! let client = ConversionClient::new("your-api-token")?;
//! let request = ConvertRequest::new("convert.xml_to_csv", "data.xml")
//!     .output("result.csv")
//!     .option("delimiter", "comma");
//!
//! if let ConvertOutcome::Completed(path) = client.convert(request).await? {
//!     println!("written to {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod client;
pub mod config;
pub mod conversions;
pub mod error;
pub mod filename;
pub mod http;
pub mod input;
pub mod legacy;
pub mod polling;
pub mod progress;
pub mod task;
pub mod types;
pub mod validation;

mod user_agent;

// Re-export commonly used types
pub use api::{ByteStream, Files, Tasks, UploadSource};
pub use client::{ConversionClient, ConvertOutcome, ConvertRequest};
pub use config::{ClientBuilder, ClientConfig};
pub use conversions::{ConversionKind, OptionBag};
pub use error::ApiError;
pub use http::{Quota, RateLimits};
pub use input::ConversionInput;
pub use legacy::{LegacyClient, LegacyRunOptions};
pub use polling::PollOptions;
pub use progress::{
    ConversionProgressCallback, ConversionProgressEvent, ProgressCallback, ProgressEvent,
};
pub use task::{Task, TaskSnapshot, WaitOptions};
pub use types::{CreateTaskRequest, FileInfo, TaskDetail, TaskStatus, TaskStatusResponse};
