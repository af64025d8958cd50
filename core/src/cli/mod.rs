pub mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "patchcost")]
#[command(author, version, about = "Rank C patches by how much function structure they touch", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $PATCHCOST_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log parse and classification details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the proxy nodes of a function
    Nodes {
        /// C source file
        source: PathBuf,

        /// Function to walk
        function: String,

        /// Additional include directory (repeatable)
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
    },

    /// Compute the cost metrics of one patch
    Analyze {
        /// C source file
        source: PathBuf,

        /// Function the patch targets
        function: String,

        /// Patch file (repair plan JSON or unified diff)
        patch: PathBuf,

        /// Tool that produced the patch (e.g., monobrow, efffix, footpatch)
        #[arg(short, long)]
        tool: String,

        /// Additional include directory (repeatable)
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
    },

    /// Analyse every patch listed in a manifest and write a results table
    Batch {
        /// CSV manifest (bug_id, source_file, function_name, patch_folder, tool_name)
        manifest: PathBuf,

        /// Root directory of the sources
        source_root: PathBuf,

        /// Root directory of the patches
        patches_root: PathBuf,

        /// Results table to write
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<(), String> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Nodes {
            source,
            function,
            include,
        } => commands::nodes::run(&config, &source, &function, &include, cli.format),
        Commands::Analyze {
            source,
            function,
            patch,
            tool,
            include,
        } => commands::analyze::run(
            &config,
            &commands::analyze::Target {
                source: &source,
                function: &function,
                include: &include,
            },
            &patch,
            &tool,
            cli.format,
        ),
        Commands::Batch {
            manifest,
            source_root,
            patches_root,
            output,
        } => commands::batch::run(
            &config,
            &manifest,
            &source_root,
            &patches_root,
            &output,
            cli.format,
        ),
    }
}
