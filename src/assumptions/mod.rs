//! Macroeconomic assumptions and heuristic rates for a diagnosis run

mod heuristics;

pub use heuristics::HeuristicRates;

use crate::error::{DiagnosisError, Result};
use crate::position::PersonProfile;
use serde::{Deserialize, Serialize};

/// Lowest accepted annual rate
const MIN_RATE: f64 = -0.5;
/// Highest accepted annual rate
const MAX_RATE: f64 = 1.0;
/// Highest accepted living-expense ratio
const MAX_LIVING_EXPENSE_RATIO: f64 = 2.0;

/// Container for all assumptions used by one diagnosis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Years added to (or subtracted from) the target retirement age
    pub retirement_age_offset: i32,

    /// Share of today's spending still needed in retirement
    pub living_expense_ratio: f64,

    pub inflation_rate: f64,
    pub income_growth_rate: f64,
    pub investment_return_rate: f64,

    /// Supersedes the household's own life expectancy when present
    pub life_expectancy: Option<u32>,

    pub heuristics: HeuristicRates,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            retirement_age_offset: 0,
            living_expense_ratio: 0.7,
            inflation_rate: 0.02,
            income_growth_rate: 0.02,
            investment_return_rate: 0.05,
            life_expectancy: None,
            heuristics: HeuristicRates::default(),
        }
    }
}

/// Partial assumptions accepted at the library boundary
///
/// Unset fields fall back to [`Assumptions::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssumptionOverrides {
    pub retirement_age_offset: Option<i32>,
    pub living_expense_ratio: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub income_growth_rate: Option<f64>,
    pub investment_return_rate: Option<f64>,
    pub life_expectancy: Option<u32>,
    pub heuristics: Option<HeuristicRates>,
}

impl Assumptions {
    /// Apply a partial override on top of the defaults
    pub fn from_overrides(overrides: &AssumptionOverrides) -> Self {
        Self::default().with_overrides(overrides)
    }

    /// Apply a partial override on top of these assumptions
    pub fn with_overrides(mut self, overrides: &AssumptionOverrides) -> Self {
        if let Some(offset) = overrides.retirement_age_offset {
            self.retirement_age_offset = offset;
        }
        if let Some(ratio) = overrides.living_expense_ratio {
            self.living_expense_ratio = ratio;
        }
        if let Some(rate) = overrides.inflation_rate {
            self.inflation_rate = rate;
        }
        if let Some(rate) = overrides.income_growth_rate {
            self.income_growth_rate = rate;
        }
        if let Some(rate) = overrides.investment_return_rate {
            self.investment_return_rate = rate;
        }
        if overrides.life_expectancy.is_some() {
            self.life_expectancy = overrides.life_expectancy;
        }
        if let Some(ref heuristics) = overrides.heuristics {
            self.heuristics = heuristics.clone();
        }
        self
    }

    /// Retirement age after applying the offset, floored at zero
    pub fn effective_retirement_age(&self, target_retirement_age: u32) -> u32 {
        (target_retirement_age as i64 + self.retirement_age_offset as i64).max(0) as u32
    }

    /// Life expectancy override if set, otherwise the household default
    pub fn effective_life_expectancy(&self, position_default: u32) -> u32 {
        self.life_expectancy.unwrap_or(position_default)
    }

    /// Reject assumptions outside their valid range for the household's
    /// primary person
    pub fn validate(&self, primary: &PersonProfile) -> Result<()> {
        check_rate("inflation_rate", self.inflation_rate)?;
        check_rate("income_growth_rate", self.income_growth_rate)?;
        check_rate("investment_return_rate", self.investment_return_rate)?;

        let h = &self.heuristics;
        check_rate("heuristics.real_estate_growth", h.real_estate_growth)?;
        check_rate("heuristics.deposit_growth", h.deposit_growth)?;
        check_rate("heuristics.pension_asset_growth", h.pension_asset_growth)?;
        check_fraction("heuristics.debt_survival_ratio", h.debt_survival_ratio, 1.0)?;
        check_fraction("heuristics.dc_contribution_rate", h.dc_contribution_rate, 1.0)?;

        check_fraction(
            "living_expense_ratio",
            self.living_expense_ratio,
            MAX_LIVING_EXPENSE_RATIO,
        )?;

        let retirement_age = self.effective_retirement_age(primary.retirement_age);
        if retirement_age < 1 {
            return Err(DiagnosisError::InvalidAssumption {
                field: "retirement_age_offset",
                value: self.retirement_age_offset as f64,
                reason: "leaves no retirement age above zero",
            });
        }

        let life_expectancy = self.effective_life_expectancy(primary.life_expectancy);
        if life_expectancy <= primary.current_age {
            return Err(DiagnosisError::InvalidAssumption {
                field: "life_expectancy",
                value: life_expectancy as f64,
                reason: "must exceed the current age",
            });
        }

        Ok(())
    }
}

fn check_rate(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DiagnosisError::InvalidAssumption {
            field,
            value,
            reason: "must be a finite number",
        });
    }
    if !(MIN_RATE..=MAX_RATE).contains(&value) {
        return Err(DiagnosisError::InvalidAssumption {
            field,
            value,
            reason: "must be between -50% and 100%",
        });
    }
    Ok(())
}

fn check_fraction(field: &'static str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(DiagnosisError::InvalidAssumption {
            field,
            value,
            reason: "out of range",
        });
    }
    Ok(())
}
