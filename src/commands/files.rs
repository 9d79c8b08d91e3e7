//! File command handlers: upload, info and download.

use std::path::PathBuf;

use anyhow::Result;
use conversiontools::{ClientBuilder, UploadSource};

use super::progress::ProgressUi;

pub async fn run_upload_command(
    builder: ClientBuilder,
    path: PathBuf,
    ui: &ProgressUi,
) -> Result<()> {
    let client = builder.build()?;
    let (bar, on_progress) = ui.transfer("Upload");
    let result = client
        .files()
        .upload(UploadSource::Path(path), Some(on_progress))
        .await;
    bar.finish_and_clear();
    println!("{}", result?);
    Ok(())
}

pub async fn run_info_command(builder: ClientBuilder, file_id: &str, json: bool) -> Result<()> {
    let client = builder.build()?;
    let info = client.files().info(file_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("name = {}", info.name);
    println!("size = {}", info.size);
    println!("preview = {}", info.preview);
    for line in info.preview_data.unwrap_or_default() {
        println!("  {line}");
    }
    Ok(())
}

pub async fn run_download_command(
    builder: ClientBuilder,
    file_id: &str,
    output: Option<PathBuf>,
    ui: &ProgressUi,
) -> Result<()> {
    let client = builder.build()?;
    let (bar, on_progress) = ui.transfer("Download");
    let result = client
        .files()
        .download_to(file_id, output.as_deref(), Some(on_progress))
        .await;
    bar.finish_and_clear();
    println!("{}", result?.display());
    Ok(())
}
