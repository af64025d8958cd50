use crate::syntax::Diagnostic;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;

/// Unified error type for building proxies and analysing patches.
///
/// Every variant except `Config` is confined to a single
/// (function, patch) unit, so a batch run can log it and move on.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AnalysisError {
    #[error("Error parsing translation unit {path}:{}", format_diagnostics(.diagnostics))]
    Parse {
        path: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("Function '{function}' not found in {path}")]
    NotFound { function: String, path: String },

    #[error("Malformed plan: {message}")]
    MalformedPlan { message: String },

    #[error("No valid plan found. Plan type was '{}'", .plan_type.as_deref().unwrap_or("None"))]
    InvalidPlan { plan_type: Option<String> },

    #[error("Unknown tool: {tool}")]
    UnsupportedTool { tool: String },

    #[error("IO error for {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid plan document {path}: {message}")]
    Document { path: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diag in diagnostics {
        let _ = write!(out, "\n  L{}: {}", diag.line, diag.message);
    }
    out
}

impl AnalysisError {
    /// Create a Parse error from the offending diagnostics
    pub fn parse(path: &Path, diagnostics: Vec<Diagnostic>) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            diagnostics,
        }
    }

    /// Create a Not Found error for a function missing from `path`
    pub fn not_found(function: impl Into<String>, path: &Path) -> Self {
        Self::NotFound {
            function: function.into(),
            path: path.display().to_string(),
        }
    }

    /// Create a Malformed Plan error
    pub fn malformed_plan(message: impl Into<String>) -> Self {
        Self::MalformedPlan {
            message: message.into(),
        }
    }

    /// Create an Invalid Plan error
    pub fn invalid_plan(plan_type: Option<&str>) -> Self {
        Self::InvalidPlan {
            plan_type: plan_type.map(str::to_owned),
        }
    }

    /// Create an Unsupported Tool error
    pub fn unsupported_tool(tool: impl Into<String>) -> Self {
        Self::UnsupportedTool { tool: tool.into() }
    }

    /// Create an IO error
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Create a Document error
    pub fn document(path: &Path, message: impl Into<String>) -> Self {
        Self::Document {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error only affects the (function, patch) unit that raised it
    pub fn is_unit_local(&self) -> bool {
        match self {
            Self::Parse { .. }
            | Self::NotFound { .. }
            | Self::MalformedPlan { .. }
            | Self::InvalidPlan { .. }
            | Self::UnsupportedTool { .. }
            | Self::Io { .. }
            | Self::Document { .. } => true,
            // A bad configuration poisons every unit of the run
            Self::Config { .. } => false,
        }
    }
}

// Convert to String for CLI command errors
impl From<AnalysisError> for String {
    fn from(err: AnalysisError) -> Self {
        err.to_string()
    }
}
