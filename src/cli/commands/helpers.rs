//! Shared rendering for analysis reports.

use console::{style, StyledObject};

use crate::models::{AnalysisReport, RiskLevel};

pub fn risk_glyph(risk: RiskLevel) -> StyledObject<&'static str> {
    match risk {
        RiskLevel::Danger => style("✗").red(),
        RiskLevel::Warning => style("!").yellow(),
        RiskLevel::Safe => style("✓").green(),
    }
}

/// Render a report with per-sentence verdicts and the overall tally.
pub fn print_report(report: &AnalysisReport) {
    if let Some(ref title) = report.title {
        println!("\n{}", style(title).bold());
    }

    for article in &report.articles {
        let heading = if article.title.is_empty() {
            "(untitled)"
        } else {
            article.title.as_str()
        };
        println!("\n{}", style(heading).bold());
        println!("{}", "-".repeat(60));
        for sentence in &article.sentences {
            println!("{} {}", risk_glyph(sentence.risk), sentence.text);
            if let Some(ref why) = sentence.why {
                println!("    {} {}", style("why:").dim(), why);
            }
            if let Some(ref fix) = sentence.fix {
                println!("    {} {}", style("fix:").dim(), fix);
            }
        }
    }

    println!("\n{}", style("Summary").bold());
    println!("{}", "-".repeat(60));
    println!(
        "  {} danger, {} warning, {} safe ({} sentences)",
        style(report.counts.danger).red(),
        style(report.counts.warning).yellow(),
        style(report.counts.safe).green(),
        report.counts.total
    );
    println!("  Safety score: {}%", report.safety_percent);
}
