//! Raw household records as produced by the data-entry layer
//!
//! Every category tag is a closed enum. Sections a household has not
//! filled in deserialize as empty lists (or `None` for housing) and
//! contribute zero downstream.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default national pension payout start age
pub const DEFAULT_NATIONAL_START_AGE: u32 = 65;

fn default_national_start_age() -> u32 {
    DEFAULT_NATIONAL_START_AGE
}

/// Who an income, account or pension belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    #[serde(rename = "self")]
    Primary,
    #[serde(rename = "spouse")]
    Spouse,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Primary => "self",
            Owner::Spouse => "spouse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Yearly,
}

/// An adult whose horizon the engine projects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub role: Owner,

    /// Birth date; takes precedence over `age` when both are present
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    /// Age in whole years, used when no birth date is recorded
    #[serde(default)]
    pub age: Option<u32>,

    /// Target retirement age
    pub retirement_age: u32,

    /// Planning life expectancy
    pub life_expectancy: u32,
}

impl Person {
    /// Age in full years as of the given date
    ///
    /// Returns `None` when neither a birth date nor an age is recorded.
    pub fn age_as_of(&self, as_of: NaiveDate) -> Option<u32> {
        match self.birth_date {
            Some(birth) => Some(full_years_between(birth, as_of)),
            None => self.age,
        }
    }
}

/// Whole years elapsed from `from` to `to`, floored at zero
pub fn full_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    Child,
    Parent,
    Sibling,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Household member kept for context only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub relationship: Relationship,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCategory {
    Labor,
    Business,
    Pension,
    Rental,
    Financial,
    Other,
}

impl IncomeCategory {
    /// Breakdown order; the last entry absorbs the rounding residual
    pub const ALL: [IncomeCategory; 6] = [
        IncomeCategory::Labor,
        IncomeCategory::Business,
        IncomeCategory::Pension,
        IncomeCategory::Rental,
        IncomeCategory::Financial,
        IncomeCategory::Other,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStream {
    pub owner: Owner,
    pub category: IncomeCategory,
    pub amount: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    // Fixed
    Housing,
    Education,
    Insurance,
    Loan,
    OtherFixed,
    // Variable
    Food,
    Transport,
    Shopping,
    Leisure,
    OtherVariable,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 10] = [
        ExpenseCategory::Housing,
        ExpenseCategory::Education,
        ExpenseCategory::Insurance,
        ExpenseCategory::Loan,
        ExpenseCategory::OtherFixed,
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Shopping,
        ExpenseCategory::Leisure,
        ExpenseCategory::OtherVariable,
    ];

    pub fn is_fixed(&self) -> bool {
        matches!(
            self,
            ExpenseCategory::Housing
                | ExpenseCategory::Education
                | ExpenseCategory::Insurance
                | ExpenseCategory::Loan
                | ExpenseCategory::OtherFixed
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub frequency: Frequency,
}

/// How the household occupies its home
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Owned,
    /// Lump-sum lease deposit refunded at lease end
    Jeonse,
    MonthlyRent,
    Free,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousingLoan {
    pub amount: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousingPosition {
    pub tenure: Tenure,
    #[serde(default)]
    pub market_value: f64,
    #[serde(default)]
    pub deposit: f64,
    #[serde(default)]
    pub monthly_rent: f64,
    #[serde(default)]
    pub maintenance_fee: f64,
    #[serde(default)]
    pub loan: Option<HousingLoan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    TimeDeposit,
    MoneyMarket,
    Stock,
    Fund,
    Bond,
    Etf,
    Crypto,
    OtherInvestment,
}

impl AccountKind {
    pub fn is_cash_like(&self) -> bool {
        matches!(
            self,
            AccountKind::Checking
                | AccountKind::Savings
                | AccountKind::TimeDeposit
                | AccountKind::MoneyMarket
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub owner: Owner,
    pub kind: AccountKind,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    Mortgage,
    Credit,
    CreditLine,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtItem {
    pub kind: DebtKind,
    #[serde(default)]
    pub principal: f64,
    pub current_balance: f64,
    pub rate: f64,
}

/// First-tier public pension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalPension {
    pub owner: Owner,
    /// Expected monthly amount in today's money
    pub expected_monthly: f64,
    #[serde(default = "default_national_start_age")]
    pub start_age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupationalScheme {
    /// Defined benefit: final salary times years of service
    Db,
    /// Defined contribution: invested account balance
    Dc,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMode {
    LumpSum,
    Annuity,
}

/// Second-tier employer pension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationalPension {
    pub owner: Owner,
    pub scheme: OccupationalScheme,
    /// Years of service accrued so far (DB)
    #[serde(default)]
    pub years_of_service: f64,
    /// Accumulated balance (DC)
    #[serde(default)]
    pub current_balance: f64,
    pub payout_mode: PayoutMode,
    pub start_age: u32,
    pub payout_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalProduct {
    PensionSavings,
    Irp,
    Isa,
}

impl PersonalProduct {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalProduct::PensionSavings => "pension_savings",
            PersonalProduct::Irp => "irp",
            PersonalProduct::Isa => "isa",
        }
    }
}

/// Third-tier personal pension product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalPension {
    pub owner: Owner,
    pub product: PersonalProduct,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    pub start_age: u32,
    pub payout_years: u32,
    /// Calendar year the ISA matures (ISA only)
    #[serde(default)]
    pub maturity_year: Option<i32>,
    /// Product the matured ISA rolls into (ISA only)
    #[serde(default)]
    pub rollover_target: Option<PersonalProduct>,
}

/// The full set of raw household records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Household {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub family: Vec<FamilyMember>,
    #[serde(default)]
    pub incomes: Vec<IncomeStream>,
    #[serde(default)]
    pub expenses: Vec<ExpenseItem>,
    #[serde(default)]
    pub housing: Option<HousingPosition>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub debts: Vec<DebtItem>,
    #[serde(default)]
    pub national_pensions: Vec<NationalPension>,
    #[serde(default)]
    pub occupational_pensions: Vec<OccupationalPension>,
    #[serde(default)]
    pub personal_pensions: Vec<PersonalPension>,
}

impl Household {
    pub fn person(&self, role: Owner) -> Option<&Person> {
        self.people.iter().find(|p| p.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_years_between() {
        assert_eq!(full_years_between(date(1985, 3, 15), date(2025, 3, 14)), 39);
        assert_eq!(full_years_between(date(1985, 3, 15), date(2025, 3, 15)), 40);
        assert_eq!(full_years_between(date(2030, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn test_person_age_prefers_birth_date() {
        let person = Person {
            role: Owner::Primary,
            birth_date: Some(date(1980, 6, 1)),
            age: Some(99),
            retirement_age: 60,
            life_expectancy: 90,
        };
        assert_eq!(person.age_as_of(date(2025, 1, 1)), Some(44));

        let undated = Person { birth_date: None, age: None, ..person };
        assert_eq!(undated.age_as_of(date(2025, 1, 1)), None);
    }

    #[test]
    fn test_category_partitions() {
        assert_eq!(ExpenseCategory::ALL.iter().filter(|c| c.is_fixed()).count(), 5);
        assert!(AccountKind::TimeDeposit.is_cash_like());
        assert!(!AccountKind::Etf.is_cash_like());
    }

    #[test]
    fn test_missing_sections_deserialize_empty() {
        let json = r#"{ "people": [{ "role": "self", "age": 40, "retirement_age": 60, "life_expectancy": 90 }] }"#;
        let household: Household = serde_json::from_str(json).unwrap();
        assert!(household.housing.is_none());
        assert!(household.debts.is_empty());
        assert_eq!(household.person(Owner::Primary).and_then(|p| p.age), Some(40));
    }
}
