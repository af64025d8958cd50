//! Minimal capability interface over a compiler frontend.
//!
//! The extent builder only needs to parse a file, list its top-level
//! declarations, walk children, and ask a node for its category, line and
//! originating file. Any frontend offering those primitives can back it.

pub mod c;

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity of a frontend diagnostic. Ordered so `>= Severity::Error` works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

/// A single diagnostic reported while parsing a translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based source line
    pub line: u32,
    pub severity: Severity,
    pub message: String,
}

/// Coarse node classification, all the extent builder cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// A function declaration with a body
    Function,
    /// A brace-delimited statement block
    Block,
    Statement,
    Declaration,
    Other,
}

impl NodeCategory {
    /// Whether nodes of this category count as statement-or-declaration positions.
    pub fn is_statement_or_declaration(self) -> bool {
        matches!(self, Self::Block | Self::Statement | Self::Declaration)
    }
}

/// What to parse and with which include search path.
#[derive(Debug, Clone)]
pub struct ParseRequest<'a> {
    pub path: &'a Path,
    pub include_dirs: &'a [PathBuf],
}

/// A node handle in a parsed translation unit.
pub trait SyntaxNode: Sized {
    fn category(&self) -> NodeCategory;
    /// Declared name, for nodes that have one
    fn spelling(&self) -> Option<String>;
    /// 1-based start line
    fn line(&self) -> u32;
    /// File the node originates from; `None` for synthesized nodes
    fn file(&self) -> Option<&Path>;
    fn children(&self) -> Vec<Self>;
    /// The body block of a function node
    fn body(&self) -> Option<Self>;
}

/// The parsed syntax tree of one source file.
pub trait TranslationUnit {
    type Node<'a>: SyntaxNode
    where
        Self: 'a;

    fn path(&self) -> &Path;
    fn diagnostics(&self) -> &[Diagnostic];
    /// Declarations directly under the translation unit's top-level scope
    fn top_level(&self) -> Vec<Self::Node<'_>>;
}

/// A compiler frontend able to turn a source file into a [`TranslationUnit`].
pub trait SyntaxFrontend {
    type Unit: TranslationUnit;

    fn parse(&self, request: &ParseRequest<'_>) -> Result<Self::Unit, AnalysisError>;
}
