//! Cost-model arithmetic over a function's proxy nodes.

use crate::extent::ProxyNode;

/// Nodes whose line falls in `[start, end]` inclusive.
pub fn nodes_in_range(nodes: &[ProxyNode], start: u32, end: u32) -> usize {
    nodes
        .iter()
        .filter(|node| (start..=end).contains(&node.line))
        .count()
}

pub fn nodes_on_line(nodes: &[ProxyNode], line: u32) -> usize {
    nodes_in_range(nodes, line, line)
}

/// Nodes strictly below `line`: the structure an early exit there bypasses.
pub fn nodes_after(nodes: &[ProxyNode], line: u32) -> usize {
    nodes.iter().filter(|node| node.line > line).count()
}

/// One node in scope is the guarded statement itself; every other node
/// sharing the guard's scope is imprecision.
pub fn local_imprecision(nodes_in_scope: usize) -> usize {
    nodes_in_scope.saturating_sub(1)
}

/// Imprecision as a fraction of the function's nodes, 0 for an empty function.
pub fn normalized(imprecision: usize, total_nodes: usize) -> f64 {
    if total_nodes == 0 {
        0.0
    } else {
        imprecision as f64 / total_nodes as f64
    }
}
