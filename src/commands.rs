use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Config;
use crate::processor::DocumentProcessor;
use crate::report::save_report;

fn progress_bar() -> ProgressBar {
    if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        )
    } else {
        ProgressBar::hidden()
    }
}

/// Generate the report for a document in the documents directory and index its text
#[inline]
pub async fn generate_report_command(config: Config, file_name: &str) -> Result<()> {
    let mut processor = DocumentProcessor::from_config(config)
        .await
        .context("Failed to initialize document processor")?;

    if processor.document_path(file_name).is_none() {
        bail!("Provide a valid file name in documents/.");
    }

    info!("Generating report for {}", file_name);
    let bar = progress_bar();
    let processed = processor
        .generate_report_with_progress(file_name, &bar)
        .await
        .with_context(|| format!("Failed to generate report for {}", file_name))?;
    bar.finish_and_clear();

    let saved = save_report(
        &processor.config().reports_dir(),
        file_name,
        &processed.report,
    )
    .await?;

    println!(
        "{} {} report generated: {}",
        style("✓").green(),
        processed.report.kind(),
        saved.html_path.display()
    );
    println!("  JSON: {}", saved.json_path.display());
    println!(
        "  Indexed {}/{} chunks ({} vectors total)",
        processed.ingest.stored,
        processed.ingest.total_chunks,
        processor.context().len()
    );
    if !processed.ingest.failed.is_empty() {
        println!(
            "  {} Failed to embed chunks: {:?}",
            style("⚠").yellow(),
            processed.ingest.failed
        );
    }

    Ok(())
}

/// Answer a question from the indexed documents
#[inline]
pub async fn query_command(config: Config, words: &[String]) -> Result<()> {
    let query = words.join(" ");
    if query.trim().is_empty() {
        bail!("Provide a query string.");
    }

    let mut processor = DocumentProcessor::from_config(config)
        .await
        .context("Failed to initialize document processor")?;

    let answer = processor
        .query(&query)
        .await
        .context("Failed to answer query")?;

    println!("{} {}", style("Response:").bold(), answer);
    Ok(())
}
