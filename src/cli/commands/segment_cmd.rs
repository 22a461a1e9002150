//! Local segmentation command.

use std::path::Path;

use console::style;

use crate::segmenter;

/// Split a text file into articles and sentences without touching the backend.
pub async fn cmd_segment(file: &Path, json: bool) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    let segmentation = segmenter::segment(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&segmentation.contract)?);
        return Ok(());
    }

    if segmentation.degraded {
        println!(
            "{} No article structure found, treating the text as one block",
            style("!").yellow()
        );
    }

    let contract = &segmentation.contract;
    println!(
        "{} {} articles, {} sentences",
        style("✓").green(),
        contract.articles.len(),
        contract.sentence_count()
    );

    for article in &contract.articles {
        let heading = if article.title.is_empty() {
            "(untitled)"
        } else {
            article.title.as_str()
        };
        println!("\n{} ({} sentences)", style(heading).bold(), article.sentences.len());
        for sentence in &article.sentences {
            println!("  {} {}", style(format!("{:<8}", sentence.id)).dim(), sentence.text);
        }
    }

    Ok(())
}
