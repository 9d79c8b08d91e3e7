//! Task command handlers: status and list.

use anyhow::Result;
use conversiontools::{ClientBuilder, TaskDetail, TaskStatus};

pub async fn run_status_command(builder: ClientBuilder, task_id: &str, json: bool) -> Result<()> {
    let client = builder.build()?;
    let task = client.task(task_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task.snapshot())?);
        return Ok(());
    }

    println!("task = {}", task.id());
    println!("status = {}", task.status());
    println!("progress = {}%", task.conversion_progress());
    if let Some(file_id) = task.file_id() {
        println!("file_id = {file_id}");
    }
    if let Some(error) = task.error() {
        println!("error = {error}");
    }
    Ok(())
}

pub async fn run_list_command(
    builder: ClientBuilder,
    status: Option<TaskStatus>,
    json: bool,
) -> Result<()> {
    let client = builder.build()?;
    let tasks = client.tasks().list(status).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    for task in &tasks {
        println!("{}", render_task_row(task));
    }
    Ok(())
}

fn render_task_row(task: &TaskDetail) -> String {
    let mut row = format!(
        "{}  {:<8} {:>3}%  {}  {}",
        task.id, task.status, task.conversion_progress, task.date_created, task.conversion_type
    );
    if let Some(error) = &task.error {
        row.push_str(&format!("  ({error})"));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_task_row_includes_error() {
        let task = TaskDetail {
            id: "0123456789abcdef0123456789abcdef".into(),
            conversion_type: "convert.xml_to_csv".into(),
            status: TaskStatus::Error,
            error: Some("Invalid XML".into()),
            url: None,
            date_created: "2024-01-01T00:00:00Z".into(),
            date_finished: None,
            conversion_progress: 0,
            file_source: None,
            file_result: None,
        };
        let row = render_task_row(&task);
        assert!(row.starts_with("0123456789abcdef0123456789abcdef  ERROR"));
        assert!(row.ends_with("(Invalid XML)"));
    }
}
