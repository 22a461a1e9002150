//! Job status and result commands.

use console::style;

use crate::api::ContractApi;
use crate::config::Settings;
use crate::models::JobStatus;
use crate::pipeline::Stage;

use super::helpers::print_report;

/// Show the current status of an analysis job.
pub async fn cmd_status(settings: &Settings, task_id: &str) -> anyhow::Result<()> {
    let client = settings.make_client()?;
    let status = client.job_status(task_id).await?;

    let glyph = match &status {
        JobStatus::Completed => style("✓").green(),
        JobStatus::Failed => style("✗").red(),
        _ => style("→").cyan(),
    };
    println!("{} {}: {}", glyph, task_id, status);
    if status.is_in_progress() {
        println!("  {} {}", style("→").dim(), Stage::for_status(&status).label());
    }
    Ok(())
}

/// Fetch and render the finished report for a job.
pub async fn cmd_result(settings: &Settings, task_id: &str, json: bool) -> anyhow::Result<()> {
    let client = settings.make_client()?;
    let report = client.analysis_report(task_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_report(&report);
    Ok(())
}
