//! Syntax extent builder.
//!
//! Parses one source file, locates a named function definition at file
//! scope, and records one proxy node per statement or declaration inside its
//! body. The result is a coarse density proxy for control points, not a CFG.

pub mod cache;

use crate::error::AnalysisError;
use crate::syntax::c::CFrontend;
use crate::syntax::{
    NodeCategory, ParseRequest, Severity, SyntaxFrontend, SyntaxNode, TranslationUnit,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One statement-or-declaration position inside a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProxyNode {
    /// 1-based source line
    pub line: u32,
    pub category: NodeCategory,
}

/// The proxy nodes of one function, in pre-order (not sorted by line).
#[derive(Debug, Clone, Serialize)]
pub struct FunctionProxy {
    #[serde(rename = "sourceFile")]
    pub source_file: PathBuf,
    pub function: String,
    pub nodes: Vec<ProxyNode>,
}

impl FunctionProxy {
    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Builds [`FunctionProxy`] values using a [`SyntaxFrontend`].
#[derive(Debug, Clone)]
pub struct ExtentBuilder<F = CFrontend> {
    frontend: F,
    system_include_dirs: Vec<PathBuf>,
}

impl ExtentBuilder<CFrontend> {
    /// A builder over the tree-sitter C frontend.
    pub fn c(system_include_dirs: Vec<PathBuf>) -> Self {
        Self::new(CFrontend, system_include_dirs)
    }
}

impl<F: SyntaxFrontend> ExtentBuilder<F> {
    pub fn new(frontend: F, system_include_dirs: Vec<PathBuf>) -> Self {
        Self {
            frontend,
            system_include_dirs,
        }
    }

    /// Parse `source_file` and collect the proxy nodes of `function_name`.
    ///
    /// Fails with `Parse` if the unit has any error-severity diagnostic and
    /// with `NotFound` if no top-level definition of that name originates
    /// from `source_file` itself.
    pub fn build(
        &self,
        source_file: &Path,
        function_name: &str,
        include_dirs: &[PathBuf],
    ) -> Result<FunctionProxy, AnalysisError> {
        let mut search_path = self.system_include_dirs.clone();
        search_path.extend(include_dirs.iter().cloned());

        let unit = self.frontend.parse(&ParseRequest {
            path: source_file,
            include_dirs: &search_path,
        })?;
        let errors: Vec<_> = unit
            .diagnostics()
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .cloned()
            .collect();
        if !errors.is_empty() {
            return Err(AnalysisError::parse(unit.path(), errors));
        }

        let function_name = function_name.trim();
        let nodes = proxy_nodes(&unit, source_file, function_name)
            .ok_or_else(|| AnalysisError::not_found(function_name, source_file))?;

        log::debug!(
            "[extent] {}: {} proxy nodes for '{}'",
            source_file.display(),
            nodes.len(),
            function_name
        );

        Ok(FunctionProxy {
            source_file: source_file.to_path_buf(),
            function: function_name.to_owned(),
            nodes,
        })
    }
}

/// Find the function and walk its body. `None` if the function is absent.
fn proxy_nodes<U: TranslationUnit>(
    unit: &U,
    source_file: &Path,
    function_name: &str,
) -> Option<Vec<ProxyNode>> {
    let function = unit.top_level().into_iter().find(|node| {
        node.category() == NodeCategory::Function
            && node.file() == Some(source_file)
            && node.spelling().as_deref() == Some(function_name)
    })?;

    let mut nodes = Vec::new();
    // The body block itself is not a proxy node, only what it contains
    if let Some(body) = function.body() {
        for child in body.children() {
            collect(&child, source_file, &mut nodes);
        }
    }
    Some(nodes)
}

/// Pre-order walk: a node is recorded before any of its descendants.
fn collect<N: SyntaxNode>(node: &N, source_file: &Path, out: &mut Vec<ProxyNode>) {
    let category = node.category();
    if category.is_statement_or_declaration() && node.file() == Some(source_file) {
        out.push(ProxyNode {
            line: node.line(),
            category,
        });
    }
    for child in node.children() {
        collect(&child, source_file, out);
    }
}
