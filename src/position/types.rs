//! Canonical financial position consumed by the calculators

use crate::household::{
    ExpenseCategory, IncomeCategory, NationalPension, OccupationalPension, Owner, PersonalPension,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Horizon inputs for one adult of the household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub owner: Owner,
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    /// Monthly labor income, the salary base for occupational pensions
    pub monthly_labor_income: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetTotals {
    pub real_estate: f64,
    pub cash: f64,
    /// Refundable housing deposits (jeonse / monthly-rent key money)
    pub deposit: f64,
    pub investment: f64,
    pub pension: f64,
}

impl AssetTotals {
    pub fn total(&self) -> f64 {
        self.real_estate + self.cash + self.investment + self.deposit + self.pension
    }

    /// Cash plus investment holdings
    pub fn financial(&self) -> f64 {
        self.cash + self.investment
    }
}

/// Outstanding amount of one debt category with its representative rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtCategory {
    pub amount: f64,
    pub rate: f64,
}

impl DebtCategory {
    pub fn monthly_interest(&self) -> f64 {
        self.amount * self.rate / 12.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtTotals {
    pub mortgage: DebtCategory,
    pub credit: DebtCategory,
    pub other: DebtCategory,
}

impl DebtTotals {
    pub fn total(&self) -> f64 {
        self.mortgage.amount + self.credit.amount + self.other.amount
    }

    pub fn monthly_interest(&self) -> f64 {
        self.mortgage.monthly_interest() + self.credit.monthly_interest() + self.other.monthly_interest()
    }
}

/// All pension entitlements of the household, normalized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PensionEntitlements {
    pub national: Vec<NationalPension>,
    pub occupational: Vec<OccupationalPension>,
    pub personal: Vec<PersonalPension>,
}

/// Financial position of a household as of one date
///
/// Derived fresh for every diagnosis call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialPosition {
    pub as_of: NaiveDate,

    pub primary: PersonProfile,
    pub spouse: Option<PersonProfile>,

    /// Total monthly income
    pub monthly_income: f64,
    /// Monthly income per category, in [`IncomeCategory::ALL`] order
    pub income_by_category: Vec<(IncomeCategory, f64)>,

    /// Fixed monthly expense (housing, education, insurance, loan, other)
    pub fixed_expense: f64,
    /// Variable monthly living expense
    pub living_expense: f64,
    /// Monthly expense per category, in [`ExpenseCategory::ALL`] order
    pub expense_by_category: Vec<(ExpenseCategory, f64)>,

    pub assets: AssetTotals,
    pub debts: DebtTotals,
    pub pensions: PensionEntitlements,
}

impl FinancialPosition {
    /// Profiles of every adult, primary first
    pub fn people(&self) -> impl Iterator<Item = &PersonProfile> {
        std::iter::once(&self.primary).chain(self.spouse.iter())
    }
}
