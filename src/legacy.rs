//! Compatibility layer for the v1 `run`-style API.
//!
//! [`LegacyClient`] accepts v1 option spellings and forwards to
//! [`ConversionClient::convert`]. Constructing one logs a deprecation notice
//! once per process.

use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::client::{ConversionClient, ConvertOutcome, ConvertRequest};
use crate::conversions::OptionBag;
use crate::error::ApiError;
use crate::input::ConversionInput;
use crate::task::WaitOptions;

static DEPRECATION_NOTICE: Once = Once::new();

/// Option keys whose v1 values were `"yes"` / `"no"` strings.
const YES_NO_KEYS: [&str; 3] = ["images", "javascript", "background"];

/// Interval used by [`LegacyClient::check_status`] when none is given.
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Arguments of [`LegacyClient::run`].
#[derive(Debug, Clone, Default)]
pub struct LegacyRunOptions {
    /// Input file path.
    pub filename: Option<PathBuf>,
    /// Input URL, used when `filename` is unset.
    pub url: Option<String>,
    /// Output path.
    pub output_filename: Option<PathBuf>,
    /// Polling interval (named `timeout` in v1).
    pub timeout: Option<Duration>,
    /// Conversion options in v1 spelling.
    pub options: OptionBag,
}

/// v1-compatible client.
#[derive(Debug, Clone)]
pub struct LegacyClient {
    client: ConversionClient,
}

impl LegacyClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty token.
    pub fn new(api_token: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self::from_client(ConversionClient::new(api_token)?))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: ConversionClient) -> Self {
        DEPRECATION_NOTICE.call_once(|| {
            warn!(
                "the v1 run API is deprecated; use ConversionClient::convert instead \
                 (migration guide: https://conversiontools.io/api-documentation#upgrade-v1-to-v2)"
            );
        });
        Self { client }
    }

    /// Runs a conversion and returns the output path.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when neither `filename` nor `url` is given;
    /// any error from [`ConversionClient::convert`] otherwise.
    pub async fn run(
        &self,
        conversion_type: &str,
        options: LegacyRunOptions,
    ) -> Result<PathBuf, ApiError> {
        let input = match (options.filename, options.url) {
            (Some(filename), _) => ConversionInput::Path(filename),
            (None, Some(url)) => ConversionInput::Url(url),
            (None, None) => {
                return Err(ApiError::validation(
                    "Either filename or url must be provided",
                ));
            }
        };

        let mut request = ConvertRequest::new(conversion_type, input)
            .options(translate_options(&options.options));
        request.output = options.output_filename;
        request.polling_interval = options.timeout;

        match self.client.convert(request).await? {
            ConvertOutcome::Completed(path) => Ok(path),
            ConvertOutcome::Submitted(task_id) => Err(ApiError::conversion(
                "task was submitted but not awaited",
                task_id,
                None,
            )),
        }
    }

    /// Waits for an existing task if needed and downloads its result.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conversion`] if the task failed; any request error otherwise.
    pub async fn check_status(
        &self,
        task_id: &str,
        output: Option<&Path>,
        interval: Option<Duration>,
    ) -> Result<PathBuf, ApiError> {
        let mut task = self.client.task(task_id).await?;

        if task.is_running() {
            task.wait(WaitOptions {
                interval: Some(interval.unwrap_or(DEFAULT_CHECK_INTERVAL)),
                ..WaitOptions::default()
            })
            .await?;
        }

        if task.is_error() {
            let task_error = task.error().map(str::to_string);
            return Err(ApiError::conversion(
                task_error.clone().unwrap_or_else(|| "Conversion failed".to_string()),
                task_id,
                task_error,
            ));
        }

        task.download_to(output, None).await
    }
}

/// Rewrites v1 option values to their current spelling.
///
/// `delimiter`: `tab` → `tabulation`, `pipe` → `vertical_bar`; other values
/// are kept. `images`, `javascript` and `background`: `"yes"` / `"no"` become
/// booleans. Every other key passes through untouched.
#[must_use]
pub fn translate_options(options: &OptionBag) -> OptionBag {
    let mut translated = options.clone();

    if let Some(Value::String(delimiter)) = translated.get_mut("delimiter") {
        match delimiter.as_str() {
            "tab" => *delimiter = "tabulation".to_string(),
            "pipe" => *delimiter = "vertical_bar".to_string(),
            _ => {}
        }
    }

    for key in YES_NO_KEYS {
        let flag = match translated.get(key).and_then(Value::as_str) {
            Some("yes") => true,
            Some("no") => false,
            _ => continue,
        };
        translated.insert(key.to_string(), Value::Bool(flag));
    }

    translated
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bag(value: Value) -> OptionBag {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_translate_delimiters() {
        for (v1, current) in [
            ("tab", "tabulation"),
            ("pipe", "vertical_bar"),
            ("comma", "comma"),
            ("semicolon", "semicolon"),
            ("vertical_bar", "vertical_bar"),
            ("unknown", "unknown"),
        ] {
            let translated = translate_options(&bag(json!({ "delimiter": v1 })));
            assert_eq!(translated["delimiter"], current, "{v1}");
        }
    }

    #[test]
    fn test_translate_yes_no_flags() {
        let translated = translate_options(&bag(json!({
            "images": "yes",
            "javascript": "no",
            "background": "maybe",
            "orientation": "Landscape"
        })));
        assert_eq!(translated["images"], json!(true));
        assert_eq!(translated["javascript"], json!(false));
        assert_eq!(translated["background"], json!("maybe"));
        assert_eq!(translated["orientation"], json!("Landscape"));
    }

    #[test]
    fn test_translate_keeps_booleans() {
        let translated = translate_options(&bag(json!({ "images": true })));
        assert_eq!(translated["images"], json!(true));
    }

    #[tokio::test]
    async fn test_run_requires_input() {
        let client = LegacyClient::new("token").unwrap();
        let error = client
            .run("convert.xml_to_csv", LegacyRunOptions::default())
            .await
            .unwrap_err();
        assert_eq!(error.message(), "Either filename or url must be provided");
    }
}
