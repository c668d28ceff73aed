//! Rule-of-thumb rates applied by the projections, tunable independently
//! of the macroeconomic assumptions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicRates {
    /// Annual growth of owned real estate
    pub real_estate_growth: f64,

    /// Annual growth of refundable housing deposits
    pub deposit_growth: f64,

    /// Annual growth of the tracked pension asset balance
    pub pension_asset_growth: f64,

    /// Share of today's debt still outstanding at retirement
    pub debt_survival_ratio: f64,

    /// Share of monthly pay contributed to a DC plan each month
    /// (0.0833 is roughly one month's pay per year)
    pub dc_contribution_rate: f64,

    /// Earliest age any pension may start paying out
    pub min_pension_start_age: u32,

    /// Years between the scenario retirement ages
    pub scenario_age_step: u32,

    /// Representative rate for an empty mortgage category
    pub fallback_mortgage_rate: f64,

    /// Representative rate for an empty credit category
    pub fallback_credit_rate: f64,

    /// Representative rate for an empty other-debt category
    pub fallback_other_debt_rate: f64,
}

impl Default for HeuristicRates {
    fn default() -> Self {
        Self {
            real_estate_growth: 0.02,
            deposit_growth: 0.0,
            pension_asset_growth: 0.04,
            debt_survival_ratio: 0.5,
            dc_contribution_rate: 0.0833,
            min_pension_start_age: 56,
            scenario_age_step: 5,
            fallback_mortgage_rate: 0.045,
            fallback_credit_rate: 0.068,
            fallback_other_debt_rate: 0.050,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let rates: HeuristicRates = serde_json::from_str(r#"{ "debt_survival_ratio": 0.3 }"#).unwrap();
        assert_eq!(rates.debt_survival_ratio, 0.3);
        assert_eq!(rates.min_pension_start_age, 56);
        assert_eq!(rates.dc_contribution_rate, 0.0833);
    }
}
