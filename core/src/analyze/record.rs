//! The metric record produced for every analysed patch.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;
use std::str::FromStr;

/// Cell marker for a cost dimension that does not apply to the patch type.
pub const NOT_APPLICABLE: &str = "N/A";

/// A numeric metric or the not-applicable marker.
///
/// Serializes as a bare number or the string `"N/A"`, and parses back from
/// either, so it survives a trip through a CSV cell unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Value(Number),
    NotApplicable,
}

impl Metric {
    pub fn count(n: usize) -> Self {
        Self::Value(Number::from(n))
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(n) => write!(f, "{n}"),
            Self::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl FromStr for Metric {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == NOT_APPLICABLE {
            return Ok(Self::NotApplicable);
        }
        serde_json::from_str::<Number>(s).map(Self::Value)
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(n) => n.serialize(serializer),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(Number),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::Value(n)),
            Raw::Text(text) => text.parse().map_err(|_| {
                serde::de::Error::custom(format!(
                    "expected a number or \"{NOT_APPLICABLE}\", found \"{text}\""
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchType {
    #[serde(rename = "Guarded Block")]
    GuardedBlock,
    #[serde(rename = "Early Exit")]
    EarlyExit,
    Replace,
}

impl PatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GuardedBlock => "Guarded Block",
            Self::EarlyExit => "Early Exit",
            Self::Replace => "Replace",
        }
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cost metrics for one patch against one function.
///
/// Built only through the per-type constructors, so the guard/exit costs
/// and the replacement cost are never both applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub total_function_nodes: usize,
    pub total_aliases: Metric,
    pub patch_type: PatchType,
    pub cost_g_overhead: Metric,
    pub cost_l_local_imprecision: Metric,
    #[serde(rename = "L_local_norm")]
    pub l_local_norm: f64,
    pub structural_impact: usize,
    pub cost_rep_modification: Metric,
}

impl MetricRecord {
    pub fn guarded_block(
        total_function_nodes: usize,
        total_aliases: Metric,
        cost_g_overhead: Metric,
        local_imprecision: usize,
    ) -> Self {
        Self {
            total_function_nodes,
            total_aliases,
            patch_type: PatchType::GuardedBlock,
            cost_g_overhead,
            cost_l_local_imprecision: Metric::count(local_imprecision),
            l_local_norm: super::cost::normalized(local_imprecision, total_function_nodes),
            structural_impact: 0,
            cost_rep_modification: Metric::NotApplicable,
        }
    }

    pub fn early_exit(total_function_nodes: usize, structural_impact: usize) -> Self {
        Self {
            total_function_nodes,
            total_aliases: Metric::NotApplicable,
            patch_type: PatchType::EarlyExit,
            cost_g_overhead: Metric::count(1),
            cost_l_local_imprecision: Metric::count(0),
            l_local_norm: 0.0,
            structural_impact,
            cost_rep_modification: Metric::NotApplicable,
        }
    }

    pub fn replace(
        total_function_nodes: usize,
        total_aliases: Metric,
        cost_rep_modification: Metric,
    ) -> Self {
        Self {
            total_function_nodes,
            total_aliases,
            patch_type: PatchType::Replace,
            cost_g_overhead: Metric::NotApplicable,
            cost_l_local_imprecision: Metric::NotApplicable,
            l_local_norm: 0.0,
            structural_impact: 0,
            cost_rep_modification,
        }
    }

    /// Column name and cell text for each field, in declaration order.
    pub fn columns(&self) -> Vec<(&'static str, String)> {
        vec![
            ("total_function_nodes", self.total_function_nodes.to_string()),
            ("total_aliases", self.total_aliases.to_string()),
            ("patch_type", self.patch_type.to_string()),
            ("cost_g_overhead", self.cost_g_overhead.to_string()),
            (
                "cost_l_local_imprecision",
                self.cost_l_local_imprecision.to_string(),
            ),
            ("L_local_norm", self.l_local_norm.to_string()),
            ("structural_impact", self.structural_impact.to_string()),
            (
                "cost_rep_modification",
                self.cost_rep_modification.to_string(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_text_round_trip() {
        for text in ["N/A", "3", "0.25"] {
            let metric: Metric = text.parse().unwrap();
            assert_eq!(metric.to_string(), text);
        }
        assert!("many".parse::<Metric>().is_err());
    }

    #[test]
    fn test_metric_json_forms() {
        assert_eq!(serde_json::to_string(&Metric::count(2)).unwrap(), "2");
        assert_eq!(
            serde_json::to_string(&Metric::NotApplicable).unwrap(),
            "\"N/A\""
        );
        let parsed: Metric = serde_json::from_str("\"N/A\"").unwrap();
        assert_eq!(parsed, Metric::NotApplicable);
        let parsed: Metric = serde_json::from_str("1.5").unwrap();
        assert_eq!(parsed.to_string(), "1.5");
    }

    #[test]
    fn test_record_field_names() {
        let record = MetricRecord::early_exit(4, 2);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["patch_type"], "Early Exit");
        assert_eq!(json["L_local_norm"], 0.0);
        assert_eq!(json["cost_rep_modification"], "N/A");
        assert_eq!(json["total_aliases"], "N/A");
        assert_eq!(json["structural_impact"], 2);
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = MetricRecord::guarded_block(8, Metric::count(3), Metric::count(2), 2);
        let json = serde_json::to_string(&record).unwrap();
        let back: MetricRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!((back.l_local_norm - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_replace_and_guard_costs_exclusive() {
        let records = [
            MetricRecord::guarded_block(5, Metric::NotApplicable, Metric::count(1), 0),
            MetricRecord::early_exit(5, 1),
            MetricRecord::replace(5, Metric::NotApplicable, Metric::count(2)),
        ];
        for record in &records {
            assert!(
                !(record.cost_g_overhead.is_applicable()
                    && record.cost_rep_modification.is_applicable())
            );
        }
    }

    #[test]
    fn test_columns_use_na_marker() {
        let record = MetricRecord::replace(3, Metric::NotApplicable, Metric::count(1));
        let columns = record.columns();
        assert!(columns.contains(&("cost_g_overhead", "N/A".to_owned())));
        assert!(columns.contains(&("patch_type", "Replace".to_owned())));
        assert!(columns.contains(&("cost_rep_modification", "1".to_owned())));
    }
}
