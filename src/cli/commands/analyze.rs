//! Contract analysis commands.

use std::path::Path;
use std::sync::Arc;

use console::style;
use tokio::sync::mpsc;

use crate::api::ContractApi;
use crate::cli::progress::AnalysisProgress;
use crate::config::Settings;
use crate::pipeline::{AnalysisEvent, AnalysisSession, Stage};
use crate::segmenter;

use super::helpers::print_report;

/// Upload a contract and follow the analysis job to completion.
pub async fn cmd_analyze(
    settings: &Settings,
    file: &Path,
    json: bool,
    show_progress: bool,
) -> anyhow::Result<()> {
    let client = settings.make_client()?;
    let api: Arc<dyn ContractApi> = Arc::new(client);
    let mut session = AnalysisSession::new(api, settings.poll_policy());

    // Ctrl-C flips the cancel flag; the poll loop notices and stops.
    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document");
    let progress_display = if show_progress && !json {
        Some(Arc::new(AnalysisProgress::new(file_name)))
    } else {
        None
    };

    // Event channel for progress updates
    let (event_tx, mut event_rx) = mpsc::channel::<AnalysisEvent>(100);

    // Spawn event handler task (UI layer)
    let progress_clone = progress_display.clone();
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AnalysisEvent::Submitted { job_id, .. } => {
                    let line = format!("{} Submitted as task {}", style("→").cyan(), job_id);
                    match progress_clone.as_ref() {
                        Some(progress) => progress.println(line),
                        None => println!("{}", line),
                    }
                }
                AnalysisEvent::SegmentationDegraded { sentences } => {
                    let line = format!(
                        "{} No article structure found, treating the document as one block ({} sentences)",
                        style("!").yellow(),
                        sentences
                    );
                    match progress_clone.as_ref() {
                        Some(progress) => progress.println(line),
                        None => println!("{}", line),
                    }
                }
                AnalysisEvent::Progress { percent, stage } => {
                    if let Some(ref progress) = progress_clone {
                        progress.update(percent, stage);
                    }
                }
                AnalysisEvent::Completed { .. } => {
                    if let Some(ref progress) = progress_clone {
                        progress.update(100, Stage::Completed);
                    }
                }
                AnalysisEvent::Failed { error } => {
                    if let Some(ref progress) = progress_clone {
                        progress.println(format!("{} {}", style("✗").red(), error));
                    }
                }
            }
        }
    });

    let result = session.analyze_file(file, event_tx).await;

    // Wait for event handler to finish
    let _ = event_handler.await;
    if let Some(ref progress) = progress_display {
        progress.finish();
    }

    let outcome = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    println!(
        "{} Analyzed {} ({} polls)",
        style("✓").green(),
        outcome.job.file_name,
        outcome.job.attempts
    );
    print_report(&outcome.report);
    Ok(())
}

/// Segment a text file locally and analyze the articles in one request.
pub async fn cmd_analyze_sync(settings: &Settings, file: &Path, json: bool) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    let segmentation = segmenter::segment(&text);
    if segmentation.degraded {
        println!(
            "{} No article structure found, analyzing as one block",
            style("!").yellow()
        );
    }

    let client = settings.make_client()?;
    let report = client
        .analyze_articles(&segmentation.contract.articles)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_report(&report);
    Ok(())
}
