//! Retirement readiness diagnosis

mod calculator;
mod metrics;
mod ratios;

pub use calculator::{
    breakdowns, depletion, diagnose, horizon, present_state, project_horizon, verdict,
    DiagnosisEngine, HorizonProjection, NO_SHORTFALL_YEARS,
};
pub use metrics::{
    AssetClass, Breakdowns, DebtClass, DemandSupply, Depletion, DiagnosisMetrics, DiagnosisSummary,
    Horizon, IncomeCoverage, PresentState, RetirementBalance, Verdict,
};
pub use ratios::{ratio_breakdown, CategoryShare};
