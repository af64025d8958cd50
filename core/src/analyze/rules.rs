//! Rule-based classification of a diff patch from its first added line.
//!
//! Rules run in priority order and the first match wins; anything no rule
//! claims is a guarded block. These are textual heuristics: the assignment
//! rule is a loose "identifier followed by `=`" match and also fires on
//! comparisons such as `x == y`.

use crate::error::AnalysisError;
use regex::Regex;
use std::sync::LazyLock;

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\s*=").unwrap());
static CONDITIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:if|else|switch)\b").unwrap());
static RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\breturn\b").unwrap());

/// How a diff patch was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffClass {
    /// Data-flow correction; `allocates` when it introduces an allocation call
    Replace { allocates: bool },
    EarlyExit,
    GuardedBlock,
}

/// The ordered rule list, parameterised by the configured allocation calls.
#[derive(Debug, Clone)]
pub struct DiffRules {
    allocation: Option<Regex>,
}

impl DiffRules {
    pub fn new(allocation_calls: &[String]) -> Result<Self, AnalysisError> {
        let names: Vec<String> = allocation_calls
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(regex::escape)
            .collect();
        if names.is_empty() {
            return Ok(Self { allocation: None });
        }
        // No leading word boundary: wrappers like `OPENSSL_malloc(` count too
        let pattern = format!(r"(?:{})\s*\(", names.join("|"));
        let allocation = Regex::new(&pattern)
            .map_err(|e| AnalysisError::config(format!("allocation call pattern: {e}")))?;
        Ok(Self {
            allocation: Some(allocation),
        })
    }

    pub fn classify(&self, added_line: &str) -> DiffClass {
        // Priority order: a data-flow fix beats an exit, an exit beats a guard
        self.classify_replace(added_line)
            .or_else(|| classify_early_exit(added_line))
            .unwrap_or(DiffClass::GuardedBlock)
    }

    pub fn references_allocation(&self, line: &str) -> bool {
        self.allocation
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(line))
    }

    // --- Rule 1: assignment or allocation outside a conditional ---

    fn classify_replace(&self, line: &str) -> Option<DiffClass> {
        let allocates = self.references_allocation(line);
        if (ASSIGNMENT.is_match(line) || allocates) && !CONDITIONAL.is_match(line) {
            Some(DiffClass::Replace { allocates })
        } else {
            None
        }
    }
}

// --- Rule 2: early return ---

fn classify_early_exit(line: &str) -> Option<DiffClass> {
    RETURN.is_match(line).then_some(DiffClass::EarlyExit)
}
