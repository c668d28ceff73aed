//! Retirement Diagnosis - projection engine for household retirement readiness
//!
//! This library provides:
//! - Aggregation of raw household records into a financial position
//! - National, occupational (DB/DC) and personal pension projections
//! - Retirement-date balance sheet, coverage gap and asset depletion age
//! - Readiness verdict and early/normal/late retirement comparison
//!
//! Aggregation, projection and diagnosis are pure and deterministic: they take
//! an explicit as-of date or a position built from one. Only the `household`
//! loaders touch the filesystem.

pub mod assumptions;
pub mod diagnosis;
pub mod error;
pub mod household;
pub mod position;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{AssumptionOverrides, Assumptions, HeuristicRates};
pub use diagnosis::{diagnose, DiagnosisEngine, DiagnosisMetrics, Verdict};
pub use error::{DiagnosisError, Result};
pub use household::Household;
pub use position::{aggregate, FinancialPosition, PositionAggregator};
pub use scenario::{ScenarioRow, ScenarioRunner, ScenarioTable};
