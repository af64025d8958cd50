//! Startup configuration.
//!
//! Loaded once and passed explicitly into the builder, analyzer and batch
//! driver. Resolution order: an explicit path, then `$PATCHCOST_CONFIG`,
//! then the built-in defaults.

use crate::analyze::ToolKind;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PATCHCOST_CONFIG";

/// Where a family of bugs keeps its sources, matched on the bug id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRule {
    /// Matches any bug id containing this text
    pub bug_prefix: String,
    /// Directory under the source root holding this project's sources
    pub source_subdir: PathBuf,
    /// Include directories, relative to `source_subdir`
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Always searched before any per-project include directory
    pub system_include_dirs: Vec<PathBuf>,
    /// Tool name to the artifact shape it emits
    pub tools: BTreeMap<String, ToolKind>,
    /// Calls that make an added line an allocation
    pub allocation_calls: Vec<String>,
    /// Source subdirectory for bugs no project rule matches
    pub default_source_subdir: Option<PathBuf>,
    pub projects: Vec<ProjectRule>,
}

impl Default for Config {
    fn default() -> Self {
        let tools = [
            ("monobrow", ToolKind::Plan),
            ("efffix", ToolKind::Diff),
            ("footpatch", ToolKind::Diff),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_owned(), kind))
        .collect();

        Self {
            system_include_dirs: vec![PathBuf::from("/usr/include")],
            tools,
            allocation_calls: ["malloc", "calloc", "realloc"]
                .map(str::to_owned)
                .to_vec(),
            default_source_subdir: Some(PathBuf::from("generated_tests")),
            projects: vec![ProjectRule {
                bug_prefix: "openssl".to_owned(),
                source_subdir: PathBuf::from("openssl-1"),
                include_dirs: vec![
                    PathBuf::from("."),
                    PathBuf::from("include"),
                    PathBuf::from("crypto"),
                ],
            }],
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(json).map_err(|e| AnalysisError::config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let json = fs::read_to_string(path)
            .map_err(|e| AnalysisError::config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Load from `explicit`, else from `$PATCHCOST_CONFIG`, else use defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, AnalysisError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => {
                log::debug!("[config] loading from ${CONFIG_ENV}");
                Self::load(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// The first project rule whose prefix occurs in `bug_id`.
    pub fn project_for(&self, bug_id: &str) -> Option<&ProjectRule> {
        self.projects
            .iter()
            .find(|rule| bug_id.contains(rule.bug_prefix.as_str()))
    }
}
