//! Patch cost analysis.
//!
//! Classifies a patch artifact against a function's proxy nodes and derives
//! its [`MetricRecord`]. Stateless per call: the proxy nodes are only read.

pub mod cost;
pub mod record;
pub mod rules;

use crate::config::Config;
use crate::diff::DiffPatch;
use crate::error::AnalysisError;
use crate::extent::{FunctionProxy, ProxyNode};
use crate::plan::{RepairPlan, PLAN_REPLACE, PLAN_SKIP};
use record::{Metric, MetricRecord};
use rules::{DiffClass, DiffRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The artifact shape a repair tool emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Structured repair-plan JSON
    Plan,
    /// Unified diff text
    Diff,
}

/// A patch in one of the two supported input shapes.
#[derive(Debug, Clone)]
pub enum PatchArtifact {
    Plan(RepairPlan),
    Diff(DiffPatch),
}

impl PatchArtifact {
    /// Read a patch file in the shape `kind` expects.
    pub fn load(path: &Path, kind: ToolKind) -> Result<Self, AnalysisError> {
        match kind {
            ToolKind::Plan => RepairPlan::load(path).map(Self::Plan),
            ToolKind::Diff => {
                let text = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, &e))?;
                Ok(Self::Diff(DiffPatch::from_text(&text)))
            }
        }
    }
}

pub struct PatchAnalyzer {
    tools: BTreeMap<String, ToolKind>,
    rules: DiffRules,
}

impl PatchAnalyzer {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        Ok(Self {
            tools: config.tools.clone(),
            rules: DiffRules::new(&config.allocation_calls)?,
        })
    }

    /// Resolve a tool name to the artifact shape it produces.
    pub fn tool_kind(&self, tool: &str) -> Result<ToolKind, AnalysisError> {
        let tool = tool.trim();
        self.tools
            .get(tool)
            .copied()
            .ok_or_else(|| AnalysisError::unsupported_tool(tool))
    }

    /// Load the patch at `patch_path` as produced by `tool` and analyse it.
    pub fn analyze_file(
        &self,
        proxy: &FunctionProxy,
        patch_path: &Path,
        tool: &str,
    ) -> Result<MetricRecord, AnalysisError> {
        let kind = self.tool_kind(tool)?;
        let patch = PatchArtifact::load(patch_path, kind)?;
        self.analyze(&proxy.nodes, proxy.total_nodes(), &patch)
    }

    pub fn analyze(
        &self,
        nodes: &[ProxyNode],
        total_nodes: usize,
        patch: &PatchArtifact,
    ) -> Result<MetricRecord, AnalysisError> {
        match patch {
            PatchArtifact::Plan(plan) => analyze_plan(nodes, total_nodes, plan),
            PatchArtifact::Diff(diff) => Ok(self.analyze_diff(nodes, total_nodes, diff)),
        }
    }

    fn analyze_diff(&self, nodes: &[ProxyNode], total_nodes: usize, patch: &DiffPatch) -> MetricRecord {
        let class = self.rules.classify(&patch.added_line);
        log::debug!(
            "[analyze] diff at line {} classified {:?}: {:?}",
            patch.target_line,
            class,
            patch.added_line
        );

        match class {
            DiffClass::Replace { allocates } => MetricRecord::replace(
                total_nodes,
                Metric::NotApplicable,
                Metric::count(1 + usize::from(allocates)),
            ),
            DiffClass::EarlyExit => MetricRecord::early_exit(
                total_nodes,
                cost::nodes_after(nodes, patch.target_line),
            ),
            DiffClass::GuardedBlock => MetricRecord::guarded_block(
                total_nodes,
                Metric::NotApplicable,
                Metric::count(1),
                cost::local_imprecision(cost::nodes_on_line(nodes, patch.target_line)),
            ),
        }
    }
}

fn analyze_plan(
    nodes: &[ProxyNode],
    total_nodes: usize,
    plan: &RepairPlan,
) -> Result<MetricRecord, AnalysisError> {
    let details = &plan.details;
    let metrics = &details.metrics;
    let total_aliases = metrics
        .total_aliases
        .clone()
        .unwrap_or(Metric::NotApplicable);

    match plan.plan_type.as_deref() {
        Some(PLAN_SKIP) => {
            let start = details
                .start_line
                .ok_or_else(|| AnalysisError::malformed_plan("'Skip' plan missing 'start_line'"))?;
            let end = details.end_line.unwrap_or(start);
            let in_scope = cost::nodes_in_range(nodes, start, end);
            log::debug!("[analyze] skip plan over lines {start}..={end}: {in_scope} nodes in scope");

            Ok(MetricRecord::guarded_block(
                total_nodes,
                total_aliases,
                metrics
                    .cost_g_overhead_final
                    .clone()
                    .unwrap_or_else(|| Metric::count(1)),
                cost::local_imprecision(in_scope),
            ))
        }
        Some(PLAN_REPLACE) => Ok(MetricRecord::replace(
            total_nodes,
            total_aliases,
            metrics
                .cost_rep_modification
                .clone()
                .unwrap_or_else(|| Metric::count(1)),
        )),
        other => Err(AnalysisError::invalid_plan(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::record::PatchType;
    use crate::plan::{PlanDetails, PlanMetrics};
    use crate::syntax::NodeCategory;

    fn analyzer() -> PatchAnalyzer {
        PatchAnalyzer::new(&Config::default()).unwrap()
    }

    fn nodes(lines: &[u32]) -> Vec<ProxyNode> {
        lines
            .iter()
            .map(|&line| ProxyNode {
                line,
                category: NodeCategory::Statement,
            })
            .collect()
    }

    fn skip_plan(start: Option<u32>, end: Option<u32>) -> PatchArtifact {
        PatchArtifact::Plan(RepairPlan {
            plan_type: Some(PLAN_SKIP.to_owned()),
            details: PlanDetails {
                start_line: start,
                end_line: end,
                metrics: PlanMetrics::default(),
            },
        })
    }

    fn diff(text: &str) -> PatchArtifact {
        PatchArtifact::Diff(DiffPatch::from_text(text))
    }

    #[test]
    fn test_skip_plan_single_node_in_scope() {
        let nodes = nodes(&[2, 3, 4]);
        let record = analyzer()
            .analyze(&nodes, 3, &skip_plan(Some(2), Some(2)))
            .unwrap();
        assert_eq!(record.patch_type, PatchType::GuardedBlock);
        assert_eq!(record.cost_l_local_imprecision, Metric::count(0));
        assert_eq!(record.cost_g_overhead, Metric::count(1));
        assert_eq!(record.cost_rep_modification, Metric::NotApplicable);
        assert_eq!(record.total_aliases, Metric::NotApplicable);
    }

    #[test]
    fn test_skip_plan_counts_excess_nodes() {
        let nodes = nodes(&[2, 3, 3, 4, 8]);
        let record = analyzer()
            .analyze(&nodes, 5, &skip_plan(Some(3), Some(4)))
            .unwrap();
        assert_eq!(record.cost_l_local_imprecision, Metric::count(2));
        assert!((record.l_local_norm - 0.4).abs() < 1e-9);
        assert_eq!(record.structural_impact, 0);
    }

    #[test]
    fn test_skip_plan_without_end_line_scopes_start_line() {
        let nodes = nodes(&[3, 3, 4]);
        let record = analyzer()
            .analyze(&nodes, 3, &skip_plan(Some(3), None))
            .unwrap();
        assert_eq!(record.cost_l_local_imprecision, Metric::count(1));
    }

    #[test]
    fn test_skip_plan_on_empty_function() {
        let record = analyzer()
            .analyze(&[], 0, &skip_plan(Some(1), Some(10)))
            .unwrap();
        assert_eq!(record.l_local_norm, 0.0);
        assert_eq!(record.cost_l_local_imprecision, Metric::count(0));
    }

    #[test]
    fn test_skip_plan_requires_start_line() {
        let err = analyzer()
            .analyze(&nodes(&[1]), 1, &skip_plan(None, Some(4)))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedPlan { .. }));
    }

    #[test]
    fn test_skip_plan_passes_metrics_through() {
        let plan = RepairPlan::from_json(
            Path::new("p.json"),
            r#"[{"plan_type": "Skip", "details": {"start_line": 1, "end_line": 1,
                "metrics": {"cost_g_overhead_final": 2.5, "total_aliases": 4}}}]"#,
        )
        .unwrap();
        let record = analyzer()
            .analyze(&nodes(&[1]), 1, &PatchArtifact::Plan(plan))
            .unwrap();
        assert_eq!(record.cost_g_overhead.to_string(), "2.5");
        assert_eq!(record.total_aliases, Metric::count(4));
    }

    #[test]
    fn test_replace_plan() {
        let plan = RepairPlan::from_json(
            Path::new("p.json"),
            r#"[{"plan_type": "Replace", "details": {"metrics": {"total_aliases": 2}}}]"#,
        )
        .unwrap();
        let record = analyzer()
            .analyze(&nodes(&[1, 2]), 2, &PatchArtifact::Plan(plan))
            .unwrap();
        assert_eq!(record.patch_type, PatchType::Replace);
        assert_eq!(record.cost_rep_modification, Metric::count(1));
        assert_eq!(record.cost_g_overhead, Metric::NotApplicable);
        assert_eq!(record.cost_l_local_imprecision, Metric::NotApplicable);
        assert_eq!(record.l_local_norm, 0.0);
        assert_eq!(record.total_aliases, Metric::count(2));
    }

    #[test]
    fn test_unknown_or_missing_plan_type() {
        for plan_type in [Some("Wrap".to_owned()), None] {
            let plan = PatchArtifact::Plan(RepairPlan {
                plan_type,
                details: PlanDetails::default(),
            });
            let err = analyzer().analyze(&[], 0, &plan).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidPlan { .. }));
        }
    }

    #[test]
    fn test_diff_allocation_replace() {
        let record = analyzer()
            .analyze(
                &nodes(&[1, 2, 3]),
                3,
                &diff("@@ -2,1 +2,2 @@\n+    ptr = malloc(size);\n     use(ptr);\n"),
            )
            .unwrap();
        assert_eq!(record.patch_type, PatchType::Replace);
        assert_eq!(record.cost_rep_modification, Metric::count(2));
        assert_eq!(record.cost_g_overhead, Metric::NotApplicable);
        assert_eq!(record.total_aliases, Metric::NotApplicable);
    }

    #[test]
    fn test_diff_plain_assignment_replace() {
        let record = analyzer()
            .analyze(&nodes(&[1]), 1, &diff("@@ -2,1 +2,2 @@\n+    len = 0;\n"))
            .unwrap();
        assert_eq!(record.cost_rep_modification, Metric::count(1));
    }

    #[test]
    fn test_diff_early_exit_structural_impact() {
        let nodes = nodes(&[2, 3, 5, 6, 7]);
        let record = analyzer()
            .analyze(&nodes, 5, &diff("@@ -5,1 +5,2 @@\n+    return -1;\n"))
            .unwrap();
        assert_eq!(record.patch_type, PatchType::EarlyExit);
        assert_eq!(record.structural_impact, 2);
        assert_eq!(record.cost_l_local_imprecision, Metric::count(0));
        assert_eq!(record.cost_g_overhead, Metric::count(1));
    }

    #[test]
    fn test_diff_early_exit_at_last_statement() {
        let nodes = nodes(&[2, 3, 7]);
        let record = analyzer()
            .analyze(&nodes, 3, &diff("@@ -7,1 +7,2 @@\n+    return -1;\n"))
            .unwrap();
        assert_eq!(record.structural_impact, 0);
    }

    #[test]
    fn test_diff_guarded_block_imprecision() {
        let nodes = nodes(&[4, 4, 4, 9]);
        let record = analyzer()
            .analyze(&nodes, 4, &diff("@@ -4,1 +4,2 @@\n+    if (p != NULL) {\n"))
            .unwrap();
        assert_eq!(record.patch_type, PatchType::GuardedBlock);
        assert_eq!(record.cost_l_local_imprecision, Metric::count(2));
        assert!((record.l_local_norm - 0.5).abs() < 1e-9);
        assert_eq!(record.cost_rep_modification, Metric::NotApplicable);
    }

    #[test]
    fn test_diff_without_header_or_added_line() {
        let record = analyzer()
            .analyze(&nodes(&[1, 2]), 2, &diff("-    removed();\n"))
            .unwrap();
        assert_eq!(record.patch_type, PatchType::GuardedBlock);
        assert_eq!(record.cost_l_local_imprecision, Metric::count(0));
    }

    #[test]
    fn test_unknown_tool_is_unsupported() {
        let err = analyzer().tool_kind("patchbot").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedTool { .. }));
        assert_eq!(analyzer().tool_kind(" monobrow ").unwrap(), ToolKind::Plan);
        assert_eq!(analyzer().tool_kind("efffix").unwrap(), ToolKind::Diff);
    }
}
