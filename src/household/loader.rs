//! Load household records from JSON files and income/expense ledger CSVs

use super::{ExpenseCategory, ExpenseItem, Frequency, Household, IncomeCategory, IncomeStream, Owner};
use crate::error::{DiagnosisError, Result};
use csv::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Load a household from a JSON file
pub fn load_household<P: AsRef<Path>>(path: P) -> Result<Household> {
    let file = File::open(path)?;
    load_household_from_reader(BufReader::new(file))
}

/// Load a household from any JSON reader
pub fn load_household_from_reader<R: Read>(reader: R) -> Result<Household> {
    Ok(serde_json::from_reader(reader)?)
}

/// Raw ledger row: `kind,owner,category,amount,frequency`
///
/// `kind` is `income` or `expense`; `owner` is ignored for expenses.
#[derive(Debug, serde::Deserialize)]
struct LedgerRow {
    kind: String,
    #[serde(default)]
    owner: String,
    category: String,
    amount: f64,
    frequency: String,
}

/// Parsed ledger entries
#[derive(Debug, Default)]
pub struct Ledger {
    pub incomes: Vec<IncomeStream>,
    pub expenses: Vec<ExpenseItem>,
}

impl Ledger {
    /// Replace the household's income and expense sections with this ledger
    pub fn apply_to(self, household: &mut Household) {
        household.incomes = self.incomes;
        household.expenses = self.expenses;
    }
}

fn unknown(field: &'static str, value: &str) -> DiagnosisError {
    DiagnosisError::UnknownTag {
        field,
        value: value.to_string(),
    }
}

fn parse_owner(value: &str) -> Result<Owner> {
    match value {
        "self" | "" => Ok(Owner::Primary),
        "spouse" => Ok(Owner::Spouse),
        other => Err(unknown("owner", other)),
    }
}

fn parse_frequency(value: &str) -> Result<Frequency> {
    match value {
        "monthly" => Ok(Frequency::Monthly),
        "yearly" => Ok(Frequency::Yearly),
        other => Err(unknown("frequency", other)),
    }
}

fn parse_income_category(value: &str) -> Result<IncomeCategory> {
    match value {
        "labor" => Ok(IncomeCategory::Labor),
        "business" => Ok(IncomeCategory::Business),
        "pension" => Ok(IncomeCategory::Pension),
        "rental" => Ok(IncomeCategory::Rental),
        "financial" => Ok(IncomeCategory::Financial),
        "other" => Ok(IncomeCategory::Other),
        other => Err(unknown("income category", other)),
    }
}

fn parse_expense_category(value: &str) -> Result<ExpenseCategory> {
    match value {
        "housing" => Ok(ExpenseCategory::Housing),
        "education" => Ok(ExpenseCategory::Education),
        "insurance" => Ok(ExpenseCategory::Insurance),
        "loan" => Ok(ExpenseCategory::Loan),
        "other_fixed" => Ok(ExpenseCategory::OtherFixed),
        "food" => Ok(ExpenseCategory::Food),
        "transport" => Ok(ExpenseCategory::Transport),
        "shopping" => Ok(ExpenseCategory::Shopping),
        "leisure" => Ok(ExpenseCategory::Leisure),
        "other_variable" => Ok(ExpenseCategory::OtherVariable),
        other => Err(unknown("expense category", other)),
    }
}

impl LedgerRow {
    fn push_into(self, ledger: &mut Ledger) -> Result<()> {
        let frequency = parse_frequency(self.frequency.trim())?;
        match self.kind.trim() {
            "income" => ledger.incomes.push(IncomeStream {
                owner: parse_owner(self.owner.trim())?,
                category: parse_income_category(self.category.trim())?,
                amount: self.amount,
                frequency,
            }),
            "expense" => ledger.expenses.push(ExpenseItem {
                category: parse_expense_category(self.category.trim())?,
                amount: self.amount,
                frequency,
            }),
            other => return Err(unknown("ledger kind", other)),
        }
        Ok(())
    }
}

/// Load an income/expense ledger from a CSV file
pub fn load_ledger<P: AsRef<Path>>(path: P) -> Result<Ledger> {
    let mut reader = Reader::from_path(path)?;
    read_ledger(&mut reader)
}

/// Load an income/expense ledger from any CSV reader
pub fn load_ledger_from_reader<R: Read>(reader: R) -> Result<Ledger> {
    let mut csv_reader = Reader::from_reader(reader);
    read_ledger(&mut csv_reader)
}

fn read_ledger<R: Read>(reader: &mut Reader<R>) -> Result<Ledger> {
    let mut ledger = Ledger::default();
    for result in reader.deserialize() {
        let row: LedgerRow = result?;
        row.push_into(&mut ledger)?;
    }
    Ok(ledger)
}
