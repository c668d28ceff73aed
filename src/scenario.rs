//! Retirement-age comparison and assumption sensitivity runs
//!
//! Every scenario row goes through [`project_horizon`], the same routine the
//! main diagnosis uses, so the "normal" row always matches the diagnosis.

use crate::assumptions::Assumptions;
use crate::diagnosis::{project_horizon, DiagnosisEngine, DiagnosisMetrics, PresentState};
use crate::error::Result;
use crate::position::FinancialPosition;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of retiring at one age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub retire_age: u32,
    pub projected_liquid_asset: f64,
    pub depletion_age: u32,
    pub sustainable: bool,
}

/// Early, normal and late retirement side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub early: ScenarioRow,
    pub normal: ScenarioRow,
    pub late: ScenarioRow,
}

impl ScenarioTable {
    pub fn rows(&self) -> [&ScenarioRow; 3] {
        [&self.early, &self.normal, &self.late]
    }
}

fn scenario_row(
    position: &FinancialPosition,
    assumptions: &Assumptions,
    present: &PresentState,
    retirement_shift: i32,
) -> ScenarioRow {
    let projection = project_horizon(position, assumptions, present, retirement_shift);
    ScenarioRow {
        retire_age: projection.horizon.effective_retirement_age,
        projected_liquid_asset: projection.at_retirement.liquid_asset,
        depletion_age: projection.depletion.depletion_age,
        sustainable: projection.depletion.sustainable,
    }
}

/// Compare retiring one step earlier, as planned, and one step later
///
/// The early shift is limited so the early age stays strictly below the
/// planned one and never goes negative. Callers validate the assumptions
/// first, which keeps the planned age at 1 or above.
pub fn compare_retirement_ages(
    position: &FinancialPosition,
    assumptions: &Assumptions,
    present: &PresentState,
) -> ScenarioTable {
    let step = assumptions.heuristics.scenario_age_step.max(1) as i32;
    let planned = assumptions.effective_retirement_age(position.primary.retirement_age) as i32;
    let early_step = step.min(planned).max(1);

    ScenarioTable {
        early: scenario_row(position, assumptions, present, -early_step),
        normal: scenario_row(position, assumptions, present, 0),
        late: scenario_row(position, assumptions, present, step),
    }
}

/// Runs diagnoses for one household under many assumption sets
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    /// Base assumptions used by [`ScenarioRunner::run`]
    base_assumptions: Assumptions,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            base_assumptions: assumptions,
        }
    }

    /// Diagnose with the base assumptions, scenario table included
    pub fn run(&self, position: &FinancialPosition) -> Result<DiagnosisMetrics> {
        DiagnosisEngine::new(self.base_assumptions.clone()).diagnose_with_scenarios(position)
    }

    /// Retirement-age comparison under the base assumptions
    pub fn compare_retirement_ages(&self, position: &FinancialPosition) -> Result<ScenarioTable> {
        DiagnosisEngine::new(self.base_assumptions.clone()).compare_retirement_ages(position)
    }

    /// Diagnose the same household once per assumption set
    pub fn run_sensitivities(
        &self,
        position: &FinancialPosition,
        assumption_sets: &[Assumptions],
    ) -> Vec<Result<DiagnosisMetrics>> {
        assumption_sets
            .par_iter()
            .map(|assumptions| DiagnosisEngine::new(assumptions.clone()).diagnose(position))
            .collect()
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.base_assumptions
    }

    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.base_assumptions
    }
}
