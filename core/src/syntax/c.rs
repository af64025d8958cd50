//! Tree-sitter backed C frontend.

use super::{
    Diagnostic, NodeCategory, ParseRequest, Severity, SyntaxFrontend, SyntaxNode, TranslationUnit,
};
use crate::error::AnalysisError;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

/// Statement kinds that count as positions. An `expression_statement` is an
/// expression, not a position, unless it is the empty statement `;`.
const STATEMENT_KINDS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "do_statement",
    "return_statement",
    "break_statement",
    "continue_statement",
    "goto_statement",
    "labeled_statement",
    "switch_statement",
    "case_statement",
    "attributed_statement",
    "seh_try_statement",
    "seh_leave_statement",
];

/// Declaration statements. Each counts once, and so does every declarator
/// it introduces: `int a = 1, b;` is three positions.
const DECLARATION_KINDS: &[&str] = &["declaration", "type_definition"];

/// Preprocessor conditionals are textual, not scopes, so their contents
/// count as top-level.
const PREPROC_CONDITIONALS: &[&str] = &[
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
];

/// Maximum length of the source excerpt quoted in an "unexpected" diagnostic.
const SNIPPET_LEN: usize = 40;

/// C frontend over `tree-sitter-c`.
///
/// Does not run the preprocessor: include directories are logged but never
/// searched.
#[derive(Debug, Default, Clone, Copy)]
pub struct CFrontend;

impl SyntaxFrontend for CFrontend {
    type Unit = CUnit;

    fn parse(&self, request: &ParseRequest<'_>) -> Result<CUnit, AnalysisError> {
        let bytes = fs::read(request.path).map_err(|e| AnalysisError::io(request.path, &e))?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        log::debug!(
            "[syntax] parsing {} with include dirs {:?}",
            request.path.display(),
            request.include_dirs
        );
        parse_source(request.path, source)
    }
}

/// Parse C source text that claims to originate from `path`.
pub fn parse_source(path: &Path, source: String) -> Result<CUnit, AnalysisError> {
    let language: Language = tree_sitter_c::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| AnalysisError::parse(path, vec![fatal(e.to_string())]))?;

    let Some(tree) = parser.parse(&source, None) else {
        return Err(AnalysisError::parse(
            path,
            vec![fatal("parser produced no syntax tree".to_owned())],
        ));
    };

    let mut diagnostics = Vec::new();
    collect_diagnostics(tree.root_node(), &source, &mut diagnostics);

    Ok(CUnit {
        path: path.to_path_buf(),
        source,
        tree,
        diagnostics,
    })
}

fn fatal(message: String) -> Diagnostic {
    Diagnostic {
        line: 0,
        severity: Severity::Fatal,
        message,
    }
}

/// Report every ERROR and missing node below `node`.
fn collect_diagnostics(node: Node, source: &str, out: &mut Vec<Diagnostic>) {
    if node.is_missing() {
        out.push(Diagnostic {
            line: line_of(node),
            severity: Severity::Error,
            message: format!("missing `{}`", node.kind()),
        });
        return;
    }
    if node.is_error() {
        out.push(Diagnostic {
            line: line_of(node),
            severity: Severity::Error,
            message: format!("unexpected `{}`", snippet(node, source)),
        });
        return;
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_diagnostics(child, source, out);
    }
}

/// A parsed C file.
pub struct CUnit {
    path: PathBuf,
    source: String,
    tree: Tree,
    diagnostics: Vec<Diagnostic>,
}

impl TranslationUnit for CUnit {
    type Node<'a>
        = CNode<'a>
    where
        Self: 'a;

    fn path(&self) -> &Path {
        &self.path
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn top_level(&self) -> Vec<CNode<'_>> {
        let mut nodes = Vec::new();
        flatten_top_level(self.tree.root_node(), self, &mut nodes);
        nodes
    }
}

fn flatten_top_level<'a>(node: Node<'a>, unit: &'a CUnit, out: &mut Vec<CNode<'a>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if PREPROC_CONDITIONALS.contains(&child.kind()) {
            flatten_top_level(child, unit, out);
        } else {
            out.push(CNode { node: child, unit });
        }
    }
}

/// A node of a [`CUnit`].
#[derive(Clone, Copy)]
pub struct CNode<'a> {
    node: Node<'a>,
    unit: &'a CUnit,
}

impl SyntaxNode for CNode<'_> {
    fn category(&self) -> NodeCategory {
        match self.node.kind() {
            "function_definition" => NodeCategory::Function,
            "compound_statement" => NodeCategory::Block,
            "expression_statement" if self.node.named_child_count() == 0 => {
                NodeCategory::Statement
            }
            kind if STATEMENT_KINDS.contains(&kind) => NodeCategory::Statement,
            kind if DECLARATION_KINDS.contains(&kind) => NodeCategory::Declaration,
            _ if self.is_declarator() => NodeCategory::Declaration,
            _ => NodeCategory::Other,
        }
    }

    fn spelling(&self) -> Option<String> {
        if self.node.kind() != "function_definition" {
            return None;
        }
        let declarator = self.node.child_by_field_name("declarator")?;
        declarator_name(declarator, &self.unit.source)
    }

    fn line(&self) -> u32 {
        line_of(self.node)
    }

    fn file(&self) -> Option<&Path> {
        // Without preprocessing every node comes from the parsed file
        Some(&self.unit.path)
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|node| CNode {
                node,
                unit: self.unit,
            })
            .collect()
    }

    fn body(&self) -> Option<Self> {
        self.node.child_by_field_name("body").map(|node| CNode {
            node,
            unit: self.unit,
        })
    }
}

impl CNode<'_> {
    /// Whether this node is one of the declarators of a declaration statement.
    fn is_declarator(&self) -> bool {
        let Some(parent) = self.node.parent() else {
            return false;
        };
        if !DECLARATION_KINDS.contains(&parent.kind()) {
            return false;
        }
        let mut cursor = parent.walk();
        let mut declarators = parent.children_by_field_name("declarator", &mut cursor);
        declarators.any(|child| child == self.node)
    }
}

/// Extract the declared name from a (possibly nested) C declarator.
fn declarator_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_owned()),
        "function_declarator"
        | "pointer_declarator"
        | "parenthesized_declarator"
        | "attributed_declarator" => {
            let inner = node
                .child_by_field_name("declarator")
                .or_else(|| node.named_child(0))?;
            declarator_name(inner, source)
        }
        _ => None,
    }
}

// --- Helpers ---

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Get the text content of a node.
fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// First line of a node's text, shortened for diagnostics.
fn snippet(node: Node, source: &str) -> String {
    let first_line = node_text(node, source).lines().next().unwrap_or("").trim();
    first_line.chars().take(SNIPPET_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CUnit {
        parse_source(Path::new("test.c"), source.to_owned()).unwrap()
    }

    #[test]
    fn test_clean_source_has_no_diagnostics() {
        let unit = parse("int f(int x) {\n    return x + 1;\n}\n");
        assert!(unit.diagnostics().is_empty());
    }

    #[test]
    fn test_unterminated_block_reports_error() {
        let unit = parse("int f(int x) {\n    if (x) {\n        return 1;\n");
        assert!(!unit.diagnostics().is_empty());
        assert!(unit
            .diagnostics()
            .iter()
            .all(|d| d.severity >= Severity::Error));
    }

    #[test]
    fn test_top_level_functions_spelled() {
        let unit = parse(
            "static int helper(void) { return 0; }\n\
             char *dup(const char *s) { return 0; }\n\
             int (*pick(int n))(int) { return 0; }\n",
        );
        let names: Vec<String> = unit
            .top_level()
            .iter()
            .filter(|n| n.category() == NodeCategory::Function)
            .filter_map(SyntaxNode::spelling)
            .collect();
        assert_eq!(names, vec!["helper", "dup", "pick"]);
    }

    #[test]
    fn test_top_level_sees_through_ifdef() {
        let unit = parse("#ifdef FEATURE\nint guarded(void) { return 1; }\n#endif\n");
        let found = unit
            .top_level()
            .into_iter()
            .any(|n| n.spelling().as_deref() == Some("guarded"));
        assert!(found);
    }

    #[test]
    fn test_prototype_is_not_a_function_definition() {
        let unit = parse("int f(int x);\n");
        assert!(unit
            .top_level()
            .iter()
            .all(|n| n.category() != NodeCategory::Function));
    }

    #[test]
    fn test_node_categories() {
        let unit = parse("int f(int x) {\n    int y = x;\n    if (y) { y++; }\n    return y;\n}\n");
        let func = unit.top_level().into_iter().next().unwrap();
        let body = func.body().unwrap();
        assert_eq!(body.category(), NodeCategory::Block);
        let kinds: Vec<NodeCategory> = body
            .children()
            .iter()
            .map(SyntaxNode::category)
            .filter(|c| *c != NodeCategory::Other)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeCategory::Declaration,
                NodeCategory::Statement,
                NodeCategory::Statement
            ]
        );
    }

    #[test]
    fn test_each_declarator_is_a_declaration() {
        let unit = parse("int f(void) {\n    int a = 1, *b, c[2];\n    return a;\n}\n");
        let func = unit.top_level().into_iter().next().unwrap();
        let body = func.body().unwrap();
        let decl = body
            .children()
            .into_iter()
            .find(|n| n.category() == NodeCategory::Declaration)
            .unwrap();
        let declarators = decl
            .children()
            .iter()
            .filter(|n| n.category() == NodeCategory::Declaration)
            .count();
        assert_eq!(declarators, 3);
    }

    #[test]
    fn test_expression_statements_are_not_positions() {
        let unit = parse("int f(int *p) {\n    g(p);\n    *p = 1;\n    ;\n    return 0;\n}\n");
        let func = unit.top_level().into_iter().next().unwrap();
        let body = func.body().unwrap();
        let lines: Vec<u32> = body
            .children()
            .iter()
            .filter(|n| n.category() == NodeCategory::Statement)
            .map(SyntaxNode::line)
            .collect();
        assert_eq!(lines, vec![4, 5]);
    }
}
