//! Convert command handler: upload, create, wait and download in one call.

use std::time::Duration;

use anyhow::Result;
use conversiontools::conversions::{self, ConversionKind};
use conversiontools::{
    ClientBuilder, ConversionInput, ConvertOutcome, ConvertRequest, LegacyClient,
    LegacyRunOptions, OptionBag,
};
use serde_json::Value;
use tracing::{debug, warn};

use super::progress::ProgressUi;
use crate::cli::{ConvertArgs, LegacyRunArgs};

pub async fn run_convert_command(
    builder: ClientBuilder,
    args: ConvertArgs,
    ui: &ProgressUi,
) -> Result<()> {
    let options = option_bag(args.options);
    warn_on_unexpected_options(&args.conversion_type, &options);

    let (upload_bar, on_upload) = ui.transfer("Upload");
    let (spinner, on_conversion) = ui.conversion();
    let (download_bar, on_download) = ui.transfer("Download");
    let client = builder
        .on_upload_progress(on_upload)
        .on_conversion_progress(on_conversion)
        .on_download_progress(on_download)
        .build()?;

    let input = if args.url {
        ConversionInput::url(args.input)
    } else if args.file_id {
        ConversionInput::file_id(args.input)
    } else {
        ConversionInput::from(args.input)
    };

    let mut request = ConvertRequest::new(args.conversion_type, input).options(options);
    request.output = args.output;
    request.callback_url = args.callback_url;
    request.polling_interval = args.interval.map(Duration::from_secs);
    request.timeout = args.timeout.map(Duration::from_secs);
    if args.no_wait {
        request = request.no_wait();
    }
    debug!(?request, "submitting conversion");

    let outcome = client.convert(request).await;
    upload_bar.finish_and_clear();
    spinner.finish_and_clear();
    download_bar.finish_and_clear();

    match outcome? {
        ConvertOutcome::Submitted(task_id) => println!("{task_id}"),
        ConvertOutcome::Completed(path) => println!("{}", path.display()),
    }
    Ok(())
}

pub async fn run_legacy_run_command(builder: ClientBuilder, args: LegacyRunArgs) -> Result<()> {
    let client = LegacyClient::from_client(builder.build()?);
    let options = LegacyRunOptions {
        filename: args.filename,
        url: args.url,
        output_filename: args.output_filename,
        timeout: args.timeout.map(Duration::from_secs),
        options: option_bag(args.options),
    };
    let path = client.run(&args.conversion_type, options).await?;
    println!("{}", path.display());
    Ok(())
}

fn option_bag(pairs: Vec<(String, Value)>) -> OptionBag {
    pairs.into_iter().collect()
}

/// Warns about keys the catalog does not list or values of the wrong kind.
fn warn_on_unexpected_options(conversion_type: &str, options: &OptionBag) {
    let kind = conversions::lookup(conversion_type);
    if let ConversionKind::Unknown(_) = kind {
        debug!(conversion_type, "conversion type not in catalog");
        return;
    }
    for key in options.keys().filter(|key| !kind.accepts(key)) {
        warn!(conversion_type, option = %key, "option is not documented for this conversion");
    }
    for key in kind.mismatched_keys(options) {
        warn!(conversion_type, option = %key, "option value has an unexpected type");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn option_bag_keeps_last_value_for_repeated_key() {
        let bag = option_bag(vec![
            ("delimiter".into(), json!("comma")),
            ("delimiter".into(), json!("semicolon")),
        ]);
        assert_eq!(bag.len(), 1);
        assert_eq!(bag["delimiter"], "semicolon");
    }
}
