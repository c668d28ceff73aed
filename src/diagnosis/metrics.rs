//! Diagnosis output structures

use super::ratios::CategoryShare;
use crate::household::{ExpenseCategory, IncomeCategory};
use crate::projection::PensionProjection;
use crate::scenario::ScenarioTable;
use serde::{Deserialize, Serialize};

/// Retirement readiness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Pension income alone covers projected expenses
    Possible,
    /// Liquid assets cover the shortfall for the whole retirement
    Conditional,
    Difficult,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Possible => "possible",
            Verdict::Conditional => "conditional",
            Verdict::Difficult => "difficult",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    RealEstate,
    Cash,
    Deposit,
    Investment,
    Pension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtClass {
    Mortgage,
    Credit,
    Other,
}

/// Today's aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentState {
    pub total_asset: f64,
    pub total_debt: f64,
    pub net_worth: f64,
    pub monthly_income: f64,
    pub monthly_interest: f64,
    /// Fixed + living expense + debt interest
    pub current_monthly_expense: f64,
    /// Income minus current monthly expense
    pub monthly_gap: f64,
    /// Share of income left after expenses (0 without income)
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdowns {
    pub income: Vec<CategoryShare<IncomeCategory>>,
    pub expense: Vec<CategoryShare<ExpenseCategory>>,
    pub asset: Vec<CategoryShare<AssetClass>>,
    pub debt: Vec<CategoryShare<DebtClass>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub current_age: u32,
    pub effective_retirement_age: u32,
    pub effective_life_expectancy: u32,
    pub years_to_retirement: u32,
    pub retirement_years: u32,
}

/// Monthly income and expense once retired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeCoverage {
    pub pension: PensionProjection,
    pub monthly_pension_income: f64,
    pub monthly_expense: f64,
    /// Pension income minus expense
    pub coverage_gap: f64,
    /// Pension income over expense (0 without expense)
    pub coverage_rate: f64,
}

/// Balance sheet at the retirement date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementBalance {
    pub real_estate: f64,
    pub deposit: f64,
    pub pension_asset: f64,
    /// Cash and investments plus the accumulated savings stream
    pub financial: f64,
    pub debt: f64,
    /// Financial + deposit + pension asset
    pub liquid_asset: f64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depletion {
    /// Yearly shortfall of pension income against expense (0 if none)
    pub annual_shortfall: f64,
    /// Liquid assets needed to fund the shortfall for every retirement year
    pub required_asset: f64,
    pub years_of_withdrawal: f64,
    /// Age liquid assets run out, at most life expectancy + 1
    pub depletion_age: u32,
    pub sustainable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSupply {
    pub total_demand: f64,
    pub total_supply: f64,
    /// Supply over demand in percent (0 without demand)
    pub supply_ratio: f64,
}

/// Complete result of one diagnosis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisMetrics {
    pub present: PresentState,
    pub breakdowns: Breakdowns,
    pub horizon: Horizon,
    pub coverage: IncomeCoverage,
    pub at_retirement: RetirementBalance,
    pub depletion: Depletion,
    pub verdict: Verdict,
    pub demand_supply: DemandSupply,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<ScenarioTable>,
}

/// Flat per-household summary row for tabular output
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisSummary {
    /// Household label, empty unless set with [`DiagnosisSummary::for_household`]
    pub household: String,
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub net_worth: f64,
    pub savings_rate: f64,
    pub monthly_pension_income: f64,
    pub monthly_expense: f64,
    pub coverage_gap: f64,
    pub liquid_asset_at_retirement: f64,
    pub depletion_age: u32,
    pub sustainable: bool,
    pub verdict: &'static str,
}

impl DiagnosisSummary {
    pub fn for_household(mut self, household: impl Into<String>) -> Self {
        self.household = household.into();
        self
    }
}

impl DiagnosisMetrics {
    pub fn summary(&self) -> DiagnosisSummary {
        DiagnosisSummary {
            household: String::new(),
            current_age: self.horizon.current_age,
            retirement_age: self.horizon.effective_retirement_age,
            life_expectancy: self.horizon.effective_life_expectancy,
            net_worth: self.present.net_worth,
            savings_rate: self.present.savings_rate,
            monthly_pension_income: self.coverage.monthly_pension_income,
            monthly_expense: self.coverage.monthly_expense,
            coverage_gap: self.coverage.coverage_gap,
            liquid_asset_at_retirement: self.at_retirement.liquid_asset,
            depletion_age: self.depletion.depletion_age,
            sustainable: self.depletion.sustainable,
            verdict: self.verdict.as_str(),
        }
    }
}
