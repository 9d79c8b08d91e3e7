//! CLI command handlers.

mod account;
mod convert;
mod files;
mod progress;
mod tasks;

pub use account::{run_remote_types_command, run_types_command, run_user_command};
pub use convert::{run_convert_command, run_legacy_run_command};
pub use files::{run_download_command, run_info_command, run_upload_command};
pub use progress::ProgressUi;
pub use tasks::{run_list_command, run_status_command};
