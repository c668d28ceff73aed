//! Diagnosis calculator: present state, retirement projection, verdict

use super::metrics::{
    AssetClass, Breakdowns, DebtClass, DemandSupply, Depletion, DiagnosisMetrics, Horizon,
    IncomeCoverage, PresentState, RetirementBalance, Verdict,
};
use super::ratios::ratio_breakdown;
use crate::assumptions::{AssumptionOverrides, Assumptions};
use crate::error::Result;
use crate::position::FinancialPosition;
use crate::projection::{
    compound_future_value, growing_contribution_future_value, safe_ratio, shift_age,
    PensionProjector,
};
use crate::scenario::{self, ScenarioTable};
use log::debug;
use rayon::prelude::*;

/// Years of withdrawal reported when there is no shortfall to fund
pub const NO_SHORTFALL_YEARS: f64 = 999.0;

/// Diagnose with the default assumptions plus an optional partial override
pub fn diagnose(
    position: &FinancialPosition,
    overrides: Option<&AssumptionOverrides>,
) -> Result<DiagnosisMetrics> {
    let assumptions = overrides.map_or_else(Assumptions::default, Assumptions::from_overrides);
    DiagnosisEngine::new(assumptions).diagnose(position)
}

/// Horizon-dependent part of a diagnosis
///
/// This is everything that changes with the retirement age. The main
/// diagnosis and every scenario row are produced by [`project_horizon`].
#[derive(Debug, Clone)]
pub struct HorizonProjection {
    pub horizon: Horizon,
    pub coverage: IncomeCoverage,
    pub at_retirement: RetirementBalance,
    pub depletion: Depletion,
}

/// Today's aggregates from the position
pub fn present_state(position: &FinancialPosition) -> PresentState {
    let total_asset = position.assets.total();
    let total_debt = position.debts.total();
    let monthly_interest = position.debts.monthly_interest();
    let current_monthly_expense = position.fixed_expense + position.living_expense + monthly_interest;
    let monthly_gap = position.monthly_income - current_monthly_expense;

    PresentState {
        total_asset,
        total_debt,
        net_worth: total_asset - total_debt,
        monthly_income: position.monthly_income,
        monthly_interest,
        current_monthly_expense,
        monthly_gap,
        savings_rate: safe_ratio(monthly_gap, position.monthly_income),
    }
}

pub fn breakdowns(position: &FinancialPosition) -> Breakdowns {
    let a = &position.assets;
    let d = &position.debts;

    Breakdowns {
        income: ratio_breakdown(&position.income_by_category),
        expense: ratio_breakdown(&position.expense_by_category),
        asset: ratio_breakdown(&[
            (AssetClass::RealEstate, a.real_estate),
            (AssetClass::Cash, a.cash),
            (AssetClass::Deposit, a.deposit),
            (AssetClass::Investment, a.investment),
            (AssetClass::Pension, a.pension),
        ]),
        debt: ratio_breakdown(&[
            (DebtClass::Mortgage, d.mortgage.amount),
            (DebtClass::Credit, d.credit.amount),
            (DebtClass::Other, d.other.amount),
        ]),
    }
}

/// Retirement horizon of the primary person, with the retirement age moved
/// by `retirement_shift` years
pub fn horizon(position: &FinancialPosition, assumptions: &Assumptions, retirement_shift: i32) -> Horizon {
    let primary = &position.primary;
    let base_age = assumptions.effective_retirement_age(primary.retirement_age);
    let effective_retirement_age = shift_age(base_age, retirement_shift);
    let effective_life_expectancy = assumptions.effective_life_expectancy(primary.life_expectancy);

    Horizon {
        current_age: primary.current_age,
        effective_retirement_age,
        effective_life_expectancy,
        years_to_retirement: effective_retirement_age.saturating_sub(primary.current_age),
        retirement_years: effective_life_expectancy.saturating_sub(effective_retirement_age),
    }
}

/// Project pension income, expenses, the retirement balance sheet and
/// asset depletion for one retirement age
pub fn project_horizon(
    position: &FinancialPosition,
    assumptions: &Assumptions,
    present: &PresentState,
    retirement_shift: i32,
) -> HorizonProjection {
    let horizon = horizon(position, assumptions, retirement_shift);
    let coverage = income_coverage(position, assumptions, present, &horizon, retirement_shift);
    let at_retirement = retirement_balance(position, assumptions, present, &horizon);
    let depletion = depletion(at_retirement.liquid_asset, coverage.coverage_gap, &horizon);

    HorizonProjection {
        horizon,
        coverage,
        at_retirement,
        depletion,
    }
}

fn income_coverage(
    position: &FinancialPosition,
    assumptions: &Assumptions,
    present: &PresentState,
    horizon: &Horizon,
    retirement_shift: i32,
) -> IncomeCoverage {
    let pension = PensionProjector::new(assumptions).project(position, retirement_shift);
    let monthly_pension_income = pension.total_monthly();

    let monthly_expense = compound_future_value(
        present.current_monthly_expense,
        assumptions.inflation_rate,
        horizon.years_to_retirement,
    ) * assumptions.living_expense_ratio;

    let coverage_gap = monthly_pension_income - monthly_expense;

    IncomeCoverage {
        pension,
        monthly_pension_income,
        monthly_expense,
        coverage_gap,
        coverage_rate: safe_ratio(monthly_pension_income, monthly_expense),
    }
}

fn retirement_balance(
    position: &FinancialPosition,
    assumptions: &Assumptions,
    present: &PresentState,
    horizon: &Horizon,
) -> RetirementBalance {
    let h = &assumptions.heuristics;
    let years = horizon.years_to_retirement;
    let assets = &position.assets;

    let real_estate = compound_future_value(assets.real_estate, h.real_estate_growth, years);
    let deposit = compound_future_value(assets.deposit, h.deposit_growth, years);
    let pension_asset = compound_future_value(assets.pension, h.pension_asset_growth, years);

    // Today's monthly surplus is saved every year, growing with income
    let annual_savings = present.monthly_gap.max(0.0) * 12.0;
    let financial = compound_future_value(assets.financial(), assumptions.investment_return_rate, years)
        + growing_contribution_future_value(
            annual_savings,
            years,
            assumptions.investment_return_rate,
            assumptions.income_growth_rate,
        );

    let debt = present.total_debt * h.debt_survival_ratio;
    let liquid_asset = financial + deposit + pension_asset;

    RetirementBalance {
        real_estate,
        deposit,
        pension_asset,
        financial,
        debt,
        liquid_asset,
        net_worth: liquid_asset + real_estate - debt,
    }
}

/// How long liquid assets fund the retirement shortfall
///
/// The same shortfall test drives `sustainable` here and the
/// conditional verdict: liquid assets must cover the annual shortfall
/// for every retirement year.
pub fn depletion(liquid_asset: f64, coverage_gap: f64, horizon: &Horizon) -> Depletion {
    let retirement_age = horizon.effective_retirement_age;
    let age_cap = horizon.effective_life_expectancy + 1;

    if coverage_gap >= 0.0 {
        return Depletion {
            annual_shortfall: 0.0,
            required_asset: 0.0,
            years_of_withdrawal: NO_SHORTFALL_YEARS,
            depletion_age: (retirement_age as f64 + NO_SHORTFALL_YEARS).min(age_cap as f64) as u32,
            sustainable: true,
        };
    }

    let annual_shortfall = coverage_gap.abs() * 12.0;
    let required_asset = annual_shortfall * horizon.retirement_years as f64;
    let years_of_withdrawal = if liquid_asset <= 0.0 {
        0.0
    } else {
        safe_ratio(liquid_asset, annual_shortfall)
    };

    let unclamped = retirement_age as f64 + years_of_withdrawal.floor();

    Depletion {
        annual_shortfall,
        required_asset,
        years_of_withdrawal,
        depletion_age: unclamped.min(age_cap as f64) as u32,
        sustainable: liquid_asset >= required_asset,
    }
}

/// First match wins: possible, conditional, difficult
pub fn verdict(coverage_gap: f64, depletion: &Depletion) -> Verdict {
    if coverage_gap >= 0.0 {
        Verdict::Possible
    } else if depletion.sustainable {
        Verdict::Conditional
    } else {
        Verdict::Difficult
    }
}

fn demand_supply(horizon: &Horizon, coverage: &IncomeCoverage, at_retirement: &RetirementBalance) -> DemandSupply {
    let years = horizon.retirement_years as f64;
    let total_demand = years * coverage.monthly_expense * 12.0;
    let total_supply = years * coverage.monthly_pension_income * 12.0 + at_retirement.liquid_asset.max(0.0);

    DemandSupply {
        total_demand,
        total_supply,
        supply_ratio: safe_ratio(total_supply, total_demand) * 100.0,
    }
}

/// Diagnosis engine bound to one set of assumptions
#[derive(Debug, Clone, Default)]
pub struct DiagnosisEngine {
    assumptions: Assumptions,
}

impl DiagnosisEngine {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Run the full diagnosis for one household
    pub fn diagnose(&self, position: &FinancialPosition) -> Result<DiagnosisMetrics> {
        self.assumptions.validate(&position.primary)?;

        let present = present_state(position);
        let projection = project_horizon(position, &self.assumptions, &present, 0);
        let verdict = verdict(projection.coverage.coverage_gap, &projection.depletion);
        let demand_supply = demand_supply(&projection.horizon, &projection.coverage, &projection.at_retirement);

        debug!(
            "diagnosis: age={} retire={} life={} pension={:.2} expense={:.2} gap={:.2} liquid={:.2} depletion={} verdict={}",
            projection.horizon.current_age,
            projection.horizon.effective_retirement_age,
            projection.horizon.effective_life_expectancy,
            projection.coverage.monthly_pension_income,
            projection.coverage.monthly_expense,
            projection.coverage.coverage_gap,
            projection.at_retirement.liquid_asset,
            projection.depletion.depletion_age,
            verdict.as_str(),
        );

        Ok(DiagnosisMetrics {
            breakdowns: breakdowns(position),
            present,
            horizon: projection.horizon,
            coverage: projection.coverage,
            at_retirement: projection.at_retirement,
            depletion: projection.depletion,
            verdict,
            demand_supply,
            scenarios: None,
        })
    }

    /// Diagnosis with the retirement-age comparison table attached
    pub fn diagnose_with_scenarios(&self, position: &FinancialPosition) -> Result<DiagnosisMetrics> {
        let mut metrics = self.diagnose(position)?;
        metrics.scenarios = Some(scenario::compare_retirement_ages(
            position,
            &self.assumptions,
            &metrics.present,
        ));
        Ok(metrics)
    }

    /// Early / normal / late retirement comparison
    pub fn compare_retirement_ages(&self, position: &FinancialPosition) -> Result<ScenarioTable> {
        self.assumptions.validate(&position.primary)?;
        let present = present_state(position);
        Ok(scenario::compare_retirement_ages(position, &self.assumptions, &present))
    }

    /// Diagnose many households in parallel, preserving input order
    pub fn diagnose_batch(&self, positions: &[FinancialPosition]) -> Vec<Result<DiagnosisMetrics>> {
        positions.par_iter().map(|p| self.diagnose(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::{NationalPension, Owner};
    use crate::position::{AssetTotals, DebtCategory, DebtTotals, PensionEntitlements, PersonProfile};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn person(owner: Owner) -> PersonProfile {
        PersonProfile {
            owner,
            current_age: 40,
            retirement_age: 60,
            life_expectancy: 90,
            monthly_labor_income: 0.0,
        }
    }

    /// Age 40 retiring at 60, life expectancy 90, income 500, expense 300,
    /// no debt, 100/month national pension between the two adults
    fn fixture() -> FinancialPosition {
        FinancialPosition {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            primary: person(Owner::Primary),
            spouse: Some(person(Owner::Spouse)),
            monthly_income: 500.0,
            income_by_category: Vec::new(),
            fixed_expense: 100.0,
            living_expense: 200.0,
            expense_by_category: Vec::new(),
            assets: AssetTotals {
                real_estate: 5.0,
                cash: 1.0,
                deposit: 0.0,
                investment: 0.0,
                pension: 0.3,
            },
            debts: DebtTotals::default(),
            pensions: PensionEntitlements {
                national: vec![
                    NationalPension { owner: Owner::Primary, expected_monthly: 60.0, start_age: 65 },
                    NationalPension { owner: Owner::Spouse, expected_monthly: 40.0, start_age: 65 },
                ],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_golden_fixture() {
        let metrics = diagnose(&fixture(), None).unwrap();

        assert_eq!(metrics.horizon.years_to_retirement, 20);
        assert_eq!(metrics.horizon.retirement_years, 30);
        assert_eq!(metrics.present.monthly_gap, 200.0);
        assert_relative_eq!(metrics.present.savings_rate, 0.4, epsilon = 1e-12);
        assert_relative_eq!(metrics.present.net_worth, 6.3, epsilon = 1e-12);

        assert_relative_eq!(metrics.coverage.monthly_pension_income, 164.060_599_446_473, max_relative = 1e-9);
        assert_relative_eq!(metrics.coverage.monthly_expense, 312.048_953_155_454, max_relative = 1e-9);
        assert_relative_eq!(metrics.coverage.coverage_gap, -147.988_353_708_981, max_relative = 1e-9);

        assert_relative_eq!(metrics.at_retirement.real_estate, 7.429_736_979_891, max_relative = 1e-9);
        assert_relative_eq!(metrics.at_retirement.pension_asset, 0.657_336_942_910, max_relative = 1e-9);
        assert_relative_eq!(metrics.at_retirement.financial, 93_390.678_030_990, max_relative = 1e-9);
        assert_relative_eq!(metrics.at_retirement.liquid_asset, 93_391.335_367_933, max_relative = 1e-9);
        assert_eq!(metrics.at_retirement.debt, 0.0);

        assert_relative_eq!(metrics.depletion.required_asset, 53_275.807_335_233, max_relative = 1e-9);
        // 60 + floor(52.59) = 112, clamped to 91
        assert_eq!(metrics.depletion.depletion_age, 91);
        assert!(metrics.depletion.sustainable);
        assert_eq!(metrics.verdict, Verdict::Conditional);

        assert_relative_eq!(metrics.demand_supply.supply_ratio, 135.709_788_860_449, max_relative = 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let position = fixture();
        let engine = DiagnosisEngine::default();
        assert_eq!(engine.diagnose(&position).unwrap(), engine.diagnose(&position).unwrap());
    }

    #[test]
    fn test_zero_years_to_retirement_keeps_present_values() {
        let mut position = fixture();
        position.primary.current_age = 60;
        position.debts.other = DebtCategory { amount: 10.0, rate: 0.0 };

        let metrics = diagnose(&position, None).unwrap();
        assert_eq!(metrics.horizon.years_to_retirement, 0);
        assert_eq!(metrics.at_retirement.real_estate, 5.0);
        assert_eq!(metrics.at_retirement.pension_asset, 0.3);
        assert_eq!(metrics.at_retirement.financial, 1.0);
        assert_eq!(metrics.at_retirement.debt, 5.0);
        assert_relative_eq!(metrics.coverage.monthly_expense, 300.0 * 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_return_rate_is_monotonic_for_financial_assets() {
        let position = fixture();
        let mut previous = f64::MIN;
        for rate in [0.0, 0.01, 0.019_999_999_999, 0.02, 0.03, 0.05, 0.08] {
            let overrides = AssumptionOverrides { investment_return_rate: Some(rate), ..Default::default() };
            let financial = diagnose(&position, Some(&overrides)).unwrap().at_retirement.financial;
            assert!(financial >= previous, "financial fell at rate {}", rate);
            previous = financial;
        }
    }

    #[test]
    fn test_possible_when_pension_covers_expense() {
        let mut position = fixture();
        position.pensions.national[0].expected_monthly = 500.0;

        let metrics = diagnose(&position, None).unwrap();
        assert!(metrics.coverage.coverage_gap >= 0.0);
        assert_eq!(metrics.verdict, Verdict::Possible);
        assert_eq!(metrics.depletion.depletion_age, 91);
        assert_eq!(metrics.depletion.years_of_withdrawal, NO_SHORTFALL_YEARS);
    }

    #[test]
    fn test_difficult_without_savings() {
        let mut position = fixture();
        position.monthly_income = 300.0;
        position.assets = AssetTotals::default();

        let metrics = diagnose(&position, None).unwrap();
        assert_eq!(metrics.present.monthly_gap, 0.0);
        assert_eq!(metrics.at_retirement.liquid_asset, 0.0);
        assert_eq!(metrics.depletion.years_of_withdrawal, 0.0);
        assert_eq!(metrics.depletion.depletion_age, 60);
        assert!(!metrics.depletion.sustainable);
        assert_eq!(metrics.verdict, Verdict::Difficult);
    }

    #[test]
    fn test_depletion_never_exceeds_life_expectancy_plus_one() {
        let horizon = Horizon {
            current_age: 50,
            effective_retirement_age: 60,
            effective_life_expectancy: 85,
            years_to_retirement: 10,
            retirement_years: 25,
        };
        for liquid in [0.0, 1.0, 1e3, 1e6, 1e12] {
            for gap in [-1e-6, -10.0, -1e4, 0.0, 5.0] {
                assert!(depletion(liquid, gap, &horizon).depletion_age <= 86);
            }
        }
        // 1200 / 120 = 10 years
        assert_eq!(depletion(1_200.0, -10.0, &horizon).depletion_age, 70);
    }

    #[test]
    fn test_zero_denominators_short_circuit() {
        let mut position = fixture();
        position.monthly_income = 0.0;
        position.fixed_expense = 0.0;
        position.living_expense = 0.0;
        position.pensions = PensionEntitlements::default();

        let metrics = diagnose(&position, None).unwrap();
        assert_eq!(metrics.present.savings_rate, 0.0);
        assert_eq!(metrics.coverage.coverage_rate, 0.0);
        assert_eq!(metrics.demand_supply.supply_ratio, 0.0);
        assert!(metrics.breakdowns.debt.iter().all(|s| s.percent == 0));
        assert_eq!(metrics.breakdowns.asset.iter().map(|s| s.percent).sum::<i32>(), 100);
    }

    #[test]
    fn test_life_expectancy_override_applies_everywhere() {
        let overrides = AssumptionOverrides { life_expectancy: Some(80), ..Default::default() };
        let metrics = diagnose(&fixture(), Some(&overrides)).unwrap();
        assert_eq!(metrics.horizon.effective_life_expectancy, 80);
        assert_eq!(metrics.horizon.retirement_years, 20);
        assert!(metrics.depletion.depletion_age <= 81);
    }

    #[test]
    fn test_invalid_assumption_rejected() {
        let overrides = AssumptionOverrides { life_expectancy: Some(35), ..Default::default() };
        assert!(diagnose(&fixture(), Some(&overrides)).is_err());
    }

    #[test]
    fn test_retirement_beyond_life_expectancy() {
        let overrides = AssumptionOverrides { retirement_age_offset: Some(40), ..Default::default() };
        let metrics = diagnose(&fixture(), Some(&overrides)).unwrap();
        assert_eq!(metrics.horizon.effective_retirement_age, 100);
        assert_eq!(metrics.horizon.retirement_years, 0);
        assert!(metrics.depletion.depletion_age <= 91);
        assert_eq!(metrics.demand_supply.total_demand, 0.0);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = DiagnosisEngine::default();
        let mut other = fixture();
        other.monthly_income = 350.0;
        let positions = vec![fixture(), other];

        let batch = engine.diagnose_batch(&positions);
        for (position, result) in positions.iter().zip(batch) {
            assert_eq!(result.unwrap(), engine.diagnose(position).unwrap());
        }
    }

    #[test]
    fn test_summary_carries_household_label() {
        let metrics = diagnose(&fixture(), None).unwrap();
        let summary = metrics.summary().for_household("smith");

        assert_eq!(summary.household, "smith");
        assert_eq!(summary.retirement_age, metrics.horizon.effective_retirement_age);
        assert_eq!(summary.depletion_age, metrics.depletion.depletion_age);
        assert_eq!(summary.verdict, metrics.verdict.as_str());
        assert!(metrics.summary().household.is_empty());
    }
}
