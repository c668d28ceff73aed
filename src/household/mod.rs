//! Raw household records and ledger loading

mod data;
pub mod loader;

pub use data::{
    full_years_between, Account, AccountKind, DebtItem, DebtKind, ExpenseCategory, ExpenseItem,
    FamilyMember, Frequency, Gender, Household, HousingLoan, HousingPosition, IncomeCategory,
    IncomeStream, NationalPension, OccupationalPension, OccupationalScheme, Owner, PayoutMode,
    Person, PersonalPension, PersonalProduct, Relationship, Tenure, DEFAULT_NATIONAL_START_AGE,
};
pub use loader::{load_household, load_household_from_reader, load_ledger, load_ledger_from_reader, Ledger};
