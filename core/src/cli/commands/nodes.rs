use super::print_json;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::extent::ExtentBuilder;
use colored::Colorize;
use std::path::{Path, PathBuf};

pub fn run(
    config: &Config,
    source: &Path,
    function: &str,
    include: &[PathBuf],
    format: OutputFormat,
) -> Result<(), String> {
    let builder = ExtentBuilder::c(config.system_include_dirs.clone());
    let proxy = builder.build(source, function, include)?;

    if format == OutputFormat::Json {
        return print_json(&proxy);
    }

    println!(
        "{} ({}): {} proxy nodes",
        proxy.function.bold(),
        proxy.source_file.display(),
        proxy.total_nodes()
    );
    for node in &proxy.nodes {
        let category = format!("{:?}", node.category).to_lowercase();
        println!("  {} {}", format!("L{:<5}", node.line).dimmed(), category);
    }

    Ok(())
}
