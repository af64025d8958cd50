use super::print_json;
use crate::batch::{run_manifest, write_results};
use crate::cli::OutputFormat;
use crate::config::Config;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct BatchSummary<'a> {
    output: &'a Path,
    rows: usize,
    #[serde(rename = "skippedRows")]
    skipped_rows: usize,
    #[serde(rename = "failedPatches")]
    failed_patches: usize,
}

pub fn run(
    config: &Config,
    manifest: &Path,
    source_root: &Path,
    patches_root: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<(), String> {
    let outcome = run_manifest(manifest, source_root, patches_root, config)?;

    if outcome.rows.is_empty() {
        log::warn!("[batch] No results; {} not written", output.display());
    } else {
        write_results(output, &outcome.rows)?;
    }

    let summary = BatchSummary {
        output,
        rows: outcome.rows.len(),
        skipped_rows: outcome.skipped_rows,
        failed_patches: outcome.failed_patches,
    };

    if format == OutputFormat::Json {
        return print_json(&summary);
    }

    if summary.rows > 0 {
        println!(
            "{} {} row(s) saved to {}",
            "Analysis complete.".green(),
            summary.rows,
            output.display()
        );
    } else {
        println!("{}", "Analysis complete. No results.".yellow());
    }
    if summary.skipped_rows > 0 || summary.failed_patches > 0 {
        println!(
            "  {} manifest row(s) skipped, {} patch(es) failed",
            summary.skipped_rows, summary.failed_patches
        );
    }

    Ok(())
}
