//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use conversiontools::TaskStatus;
use conversiontools::config::{API_TOKEN_ENV, BASE_URL_ENV};
use serde_json::Value;

/// Convert files with the Conversion Tools API.
///
/// Uploads a file (or passes a URL), creates a conversion task, waits for it
/// and downloads the result.
#[derive(Parser, Debug)]
#[command(name = "conversiontools")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API token
    #[arg(long, env = API_TOKEN_ENV, hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// API root URL
    #[arg(long, env = BASE_URL_ENV, global = true)]
    pub base_url: Option<String>,

    /// Retry attempts for transient failures (0-10)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub retries: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a file or URL and download the result
    Convert(ConvertArgs),

    /// Upload a file and print its id
    Upload {
        /// File to upload
        path: PathBuf,
    },

    /// Show metadata of an uploaded file
    Info {
        /// File id
        file_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the status of a task
    Status {
        /// Task id
        task_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tasks
    List {
        /// Only tasks with this status (pending, running, success, error)
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a file by id
    Download {
        /// File id
        file_id: String,

        /// Output path (defaults to the server-provided name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the account the token belongs to
    User,

    /// List conversion types and their options
    Types {
        /// Show the options of a single conversion type
        conversion_type: Option<String>,

        /// Ask the API instead of the built-in catalog
        #[arg(long)]
        remote: bool,
    },

    /// Run a conversion through the v1 compatible API
    LegacyRun(LegacyRunArgs),
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Conversion type, e.g. convert.xml_to_csv
    pub conversion_type: String,

    /// Input file path (or URL with --url, file id with --file-id)
    pub input: String,

    /// Treat the input as a URL
    #[arg(long, conflicts_with = "file_id")]
    pub url: bool,

    /// Treat the input as an uploaded file id
    #[arg(long)]
    pub file_id: bool,

    /// Output path (defaults to the server-provided name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Conversion option as key=value (repeatable); JSON values are parsed
    #[arg(short = 'O', long = "option", value_parser = parse_option)]
    pub options: Vec<(String, Value)>,

    /// Return after creating the task instead of waiting
    #[arg(long)]
    pub no_wait: bool,

    /// Webhook notified when the task finishes
    #[arg(long)]
    pub callback_url: Option<String>,

    /// Initial polling interval in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Give up waiting after this many seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct LegacyRunArgs {
    /// Conversion type, e.g. convert.xml_to_csv
    pub conversion_type: String,

    /// Input file path
    #[arg(long)]
    pub filename: Option<PathBuf>,

    /// Input URL
    #[arg(long)]
    pub url: Option<String>,

    /// Output path
    #[arg(long)]
    pub output_filename: Option<PathBuf>,

    /// Polling interval in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Conversion option in v1 spelling as key=value (repeatable)
    #[arg(short = 'O', long = "option", value_parser = parse_option)]
    pub options: Vec<(String, Value)>,
}

/// Parses `key=value`; the value is JSON when it parses as JSON, else a string.
fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("option key is empty in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    raw.parse().map_err(|e: conversiontools::ApiError| e.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_convert_parses_options() {
        let args = Args::try_parse_from([
            "conversiontools",
            "--token",
            "abc",
            "convert",
            "convert.xml_to_csv",
            "data.xml",
            "-O",
            "delimiter=comma",
            "-O",
            "quote=true",
            "-o",
            "out.csv",
        ])
        .unwrap();

        let Command::Convert(convert) = args.command else {
            panic!("expected convert");
        };
        assert_eq!(convert.conversion_type, "convert.xml_to_csv");
        assert_eq!(convert.output, Some(PathBuf::from("out.csv")));
        assert_eq!(
            convert.options,
            vec![
                ("delimiter".to_string(), json!("comma")),
                ("quote".to_string(), json!(true)),
            ]
        );
        assert!(!convert.no_wait);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["conversiontools", "-vv", "user"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["conversiontools", "user", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 1);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["conversiontools", "-q", "types"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_list_status_filter() {
        let args =
            Args::try_parse_from(["conversiontools", "list", "--status", "running"]).unwrap();
        let Command::List { status, .. } = args.command else {
            panic!("expected list");
        };
        assert_eq!(status, Some(TaskStatus::Running));

        let result = Args::try_parse_from(["conversiontools", "list", "--status", "done"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_url_conflicts_with_file_id() {
        let result = Args::try_parse_from([
            "conversiontools",
            "convert",
            "convert.website_to_pdf",
            "https://example.com",
            "--url",
            "--file-id",
        ]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_cli_retries_range() {
        let result = Args::try_parse_from(["conversiontools", "--retries", "11", "user"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_subcommand_required() {
        let result = Args::try_parse_from(["conversiontools"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_option_rejects_missing_equals() {
        assert!(parse_option("delimiter").is_err());
        assert!(parse_option("=comma").is_err());
        assert_eq!(
            parse_option("title=Q1 report").unwrap(),
            ("title".to_string(), json!("Q1 report"))
        );
        assert_eq!(
            parse_option("jpeg_quality=90").unwrap(),
            ("jpeg_quality".to_string(), json!(90))
        );
    }
}
