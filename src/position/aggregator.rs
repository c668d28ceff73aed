//! Normalize raw household records into one [`FinancialPosition`]

use super::types::{AssetTotals, DebtCategory, DebtTotals, FinancialPosition, PensionEntitlements, PersonProfile};
use crate::assumptions::HeuristicRates;
use crate::error::{DiagnosisError, Result};
use crate::household::{
    DebtKind, ExpenseCategory, Frequency, Household, IncomeCategory, Owner, Person, Tenure,
};
use chrono::NaiveDate;
use log::debug;

/// Convert an amount to its monthly equivalent
///
/// Yearly amounts are divided by twelve and rounded to a whole unit.
pub fn to_monthly(amount: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Monthly => amount,
        Frequency::Yearly => (amount / 12.0).round(),
    }
}

/// Aggregate with the default heuristic rates
pub fn aggregate(household: &Household, as_of: NaiveDate) -> Result<FinancialPosition> {
    PositionAggregator::default().aggregate(household, as_of)
}

/// Builds financial positions using a given set of heuristic rates
#[derive(Debug, Clone, Default)]
pub struct PositionAggregator {
    heuristics: HeuristicRates,
}

impl PositionAggregator {
    pub fn new(heuristics: HeuristicRates) -> Self {
        Self { heuristics }
    }

    pub fn aggregate(&self, household: &Household, as_of: NaiveDate) -> Result<FinancialPosition> {
        let primary_person = household.person(Owner::Primary).ok_or(DiagnosisError::MissingPrimary)?;
        let primary = self.profile(household, primary_person, as_of)?;
        let spouse = household
            .person(Owner::Spouse)
            .map(|p| self.profile(household, p, as_of))
            .transpose()?;

        let income_by_category = Self::income_by_category(household);
        let monthly_income: f64 = income_by_category.iter().map(|(_, v)| v).sum();

        let expense_by_category = Self::expense_by_category(household);
        let (fixed_expense, living_expense) =
            expense_by_category
                .iter()
                .fold((0.0, 0.0), |(fixed, living), (category, amount)| {
                    if category.is_fixed() {
                        (fixed + amount, living)
                    } else {
                        (fixed, living + amount)
                    }
                });

        let position = FinancialPosition {
            as_of,
            primary,
            spouse,
            monthly_income,
            income_by_category,
            fixed_expense,
            living_expense,
            expense_by_category,
            assets: Self::assets(household),
            debts: self.debts(household),
            pensions: self.pensions(household),
        };

        debug!(
            "aggregated position as of {}: income={:.2} fixed={:.2} living={:.2} assets={:.2} debts={:.2}",
            as_of,
            position.monthly_income,
            position.fixed_expense,
            position.living_expense,
            position.assets.total(),
            position.debts.total()
        );

        Ok(position)
    }

    fn profile(&self, household: &Household, person: &Person, as_of: NaiveDate) -> Result<PersonProfile> {
        let current_age = person.age_as_of(as_of).ok_or_else(|| {
            DiagnosisError::InvalidRecord(format!(
                "{} person has neither a birth date nor an age",
                person.role.as_str()
            ))
        })?;

        let monthly_labor_income: f64 = household
            .incomes
            .iter()
            .filter(|i| i.owner == person.role && i.category == IncomeCategory::Labor)
            .map(|i| to_monthly(i.amount, i.frequency))
            .sum();

        Ok(PersonProfile {
            owner: person.role,
            current_age,
            retirement_age: person.retirement_age,
            life_expectancy: person.life_expectancy,
            monthly_labor_income,
        })
    }

    fn income_by_category(household: &Household) -> Vec<(IncomeCategory, f64)> {
        IncomeCategory::ALL
            .iter()
            .map(|&category| {
                let amount: f64 = household
                    .incomes
                    .iter()
                    .filter(|i| i.category == category)
                    .map(|i| to_monthly(i.amount, i.frequency))
                    .sum();
                (category, amount)
            })
            .collect()
    }

    fn expense_by_category(household: &Household) -> Vec<(ExpenseCategory, f64)> {
        // Rent and maintenance recorded on the housing section count as housing expense
        let housing_costs = household.housing.as_ref().map_or(0.0, |h| {
            let rent = if h.tenure == Tenure::MonthlyRent { h.monthly_rent } else { 0.0 };
            rent + h.maintenance_fee
        });

        ExpenseCategory::ALL
            .iter()
            .map(|&category| {
                let mut amount: f64 = household
                    .expenses
                    .iter()
                    .filter(|e| e.category == category)
                    .map(|e| to_monthly(e.amount, e.frequency))
                    .sum();
                if category == ExpenseCategory::Housing {
                    amount += housing_costs;
                }
                (category, amount)
            })
            .collect()
    }

    fn assets(household: &Household) -> AssetTotals {
        let mut assets = AssetTotals::default();

        if let Some(housing) = &household.housing {
            match housing.tenure {
                Tenure::Owned => assets.real_estate = housing.market_value,
                Tenure::Jeonse | Tenure::MonthlyRent => assets.deposit = housing.deposit,
                Tenure::Free => {}
            }
        }

        for account in &household.accounts {
            if account.kind.is_cash_like() {
                assets.cash += account.balance;
            } else {
                assets.investment += account.balance;
            }
        }

        let occupational: f64 = household.occupational_pensions.iter().map(|p| p.current_balance).sum();
        let personal: f64 = household.personal_pensions.iter().map(|p| p.balance).sum();
        assets.pension = occupational + personal;

        assets
    }

    fn debts(&self, household: &Household) -> DebtTotals {
        let mut mortgage: Vec<(f64, f64)> = Vec::new();
        let mut credit: Vec<(f64, f64)> = Vec::new();
        let mut other: Vec<(f64, f64)> = Vec::new();

        for debt in &household.debts {
            let entry = (debt.current_balance, debt.rate);
            match debt.kind {
                DebtKind::Mortgage => mortgage.push(entry),
                DebtKind::Credit | DebtKind::CreditLine => credit.push(entry),
                DebtKind::Other => other.push(entry),
            }
        }

        if let Some(loan) = household.housing.as_ref().and_then(|h| h.loan.as_ref()) {
            mortgage.push((loan.amount, loan.rate));
        }

        let h = &self.heuristics;
        DebtTotals {
            mortgage: debt_category(&mortgage, h.fallback_mortgage_rate),
            credit: debt_category(&credit, h.fallback_credit_rate),
            other: debt_category(&other, h.fallback_other_debt_rate),
        }
    }

    fn pensions(&self, household: &Household) -> PensionEntitlements {
        let min_age = self.heuristics.min_pension_start_age;

        let national = household
            .national_pensions
            .iter()
            .cloned()
            .map(|mut p| {
                p.start_age = floor_start_age(p.start_age, min_age, "national");
                p
            })
            .collect();

        let occupational = household
            .occupational_pensions
            .iter()
            .cloned()
            .map(|mut p| {
                p.start_age = floor_start_age(p.start_age, min_age, "occupational");
                p.payout_years = p.payout_years.max(1);
                p
            })
            .collect();

        let personal = household
            .personal_pensions
            .iter()
            .cloned()
            .map(|mut p| {
                p.start_age = floor_start_age(p.start_age, min_age, p.product.as_str());
                p.payout_years = p.payout_years.max(1);
                p
            })
            .collect();

        PensionEntitlements { national, occupational, personal }
    }
}

/// Sum the category; the first item's rate represents it
fn debt_category(items: &[(f64, f64)], fallback_rate: f64) -> DebtCategory {
    DebtCategory {
        amount: items.iter().map(|(amount, _)| amount).sum(),
        rate: items.first().map_or(fallback_rate, |&(_, rate)| rate),
    }
}

fn floor_start_age(start_age: u32, min_age: u32, label: &str) -> u32 {
    if start_age < min_age {
        debug!("{} pension start age {} floored to {}", label, start_age, min_age);
        min_age
    } else {
        start_age
    }
}
