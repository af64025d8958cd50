//! Patch cost metrics for automatically generated C repairs.
//!
//! [`extent`] turns a function into an ordered list of statement positions;
//! [`analyze`] classifies a patch against that list and computes its costs.

pub mod analyze;
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod extent;
pub mod plan;
pub mod syntax;

pub use analyze::record::{Metric, MetricRecord, PatchType};
pub use analyze::{PatchAnalyzer, PatchArtifact, ToolKind};
pub use config::Config;
pub use error::AnalysisError;
pub use extent::{ExtentBuilder, FunctionProxy, ProxyNode};
