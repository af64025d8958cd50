//! Structured repair-plan documents.
//!
//! A plan file is a JSON list of plans; only the first one is analysed.
//!
//! ```json
//! [{ "plan_type": "Skip",
//!    "details": { "start_line": 42, "end_line": 44,
//!                 "metrics": { "cost_g_overhead_final": 2, "total_aliases": 3 } } }]
//! ```

use crate::analyze::record::Metric;
use crate::error::AnalysisError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const PLAN_SKIP: &str = "Skip";
pub const PLAN_REPLACE: &str = "Replace";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepairPlan {
    /// `Skip` or `Replace`; anything else is rejected at analysis time
    pub plan_type: Option<String>,
    #[serde(default)]
    pub details: PlanDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanDetails {
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    #[serde(default)]
    pub metrics: PlanMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanMetrics {
    pub cost_g_overhead_final: Option<Metric>,
    pub cost_rep_modification: Option<Metric>,
    pub total_aliases: Option<Metric>,
}

impl RepairPlan {
    /// Parse a plan document and return its first plan.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, AnalysisError> {
        let plans: Vec<RepairPlan> =
            serde_json::from_str(json).map_err(|e| AnalysisError::document(path, e.to_string()))?;
        plans
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::document(path, "plan list is empty"))
    }

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let json = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, &e))?;
        Self::from_json(path, &json)
    }
}
