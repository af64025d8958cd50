use super::print_json;
use crate::analyze::record::{MetricRecord, PatchType, NOT_APPLICABLE};
use crate::analyze::PatchAnalyzer;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::extent::ExtentBuilder;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// The function a patch is analysed against.
pub struct Target<'a> {
    pub source: &'a Path,
    pub function: &'a str,
    pub include: &'a [PathBuf],
}

pub fn run(
    config: &Config,
    target: &Target<'_>,
    patch: &Path,
    tool: &str,
    format: OutputFormat,
) -> Result<(), String> {
    let analyzer = PatchAnalyzer::new(config)?;
    // Resolve the tool before paying for a parse
    analyzer.tool_kind(tool)?;

    let proxy = ExtentBuilder::c(config.system_include_dirs.clone()).build(
        target.source,
        target.function,
        target.include,
    )?;
    let record = analyzer.analyze_file(&proxy, patch, tool)?;

    if format == OutputFormat::Json {
        return print_json(&record);
    }

    print_record(&record, patch);
    Ok(())
}

fn print_record(record: &MetricRecord, patch: &Path) {
    let patch_type = match record.patch_type {
        PatchType::Replace => record.patch_type.as_str().yellow(),
        PatchType::EarlyExit => record.patch_type.as_str().red(),
        PatchType::GuardedBlock => record.patch_type.as_str().green(),
    };
    println!("{} {}", patch.display().to_string().bold(), patch_type);

    for (name, value) in record.columns() {
        if name == "patch_type" {
            continue;
        }
        let value = if value == NOT_APPLICABLE {
            value.dimmed()
        } else {
            value.normal()
        };
        println!("  {name:<26} {value}");
    }
}
