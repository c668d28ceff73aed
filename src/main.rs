//! Retirement Diagnosis CLI
//!
//! Diagnoses one household JSON file and prints the readiness summary

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use retirement_diagnosis::household::{load_household, load_ledger};
use retirement_diagnosis::{AssumptionOverrides, Assumptions, DiagnosisEngine, PositionAggregator};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "retirement_diagnosis", version, about = "Household retirement readiness diagnosis")]
struct Args {
    /// Household JSON file
    household: PathBuf,

    /// Income/expense ledger CSV replacing the household's own entries
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Years added to the target retirement age
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<i32>,

    /// Share of today's spending needed in retirement
    #[arg(long)]
    living_ratio: Option<f64>,

    #[arg(long)]
    inflation: Option<f64>,

    #[arg(long)]
    income_growth: Option<f64>,

    /// Annual investment return
    #[arg(long = "return")]
    investment_return: Option<f64>,

    #[arg(long)]
    life_expectancy: Option<u32>,

    /// Include the early/normal/late retirement comparison
    #[arg(long)]
    scenarios: bool,

    /// Print the full metrics as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> AssumptionOverrides {
        AssumptionOverrides {
            retirement_age_offset: self.offset,
            living_expense_ratio: self.living_ratio,
            inflation_rate: self.inflation,
            income_growth_rate: self.income_growth,
            investment_return_rate: self.investment_return,
            life_expectancy: self.life_expectancy,
            heuristics: None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut household = load_household(&args.household)
        .with_context(|| format!("loading household {}", args.household.display()))?;
    if let Some(path) = &args.ledger {
        load_ledger(path)
            .with_context(|| format!("loading ledger {}", path.display()))?
            .apply_to(&mut household);
    }

    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let assumptions = Assumptions::from_overrides(&args.overrides());

    let position = PositionAggregator::new(assumptions.heuristics.clone()).aggregate(&household, as_of)?;
    let engine = DiagnosisEngine::new(assumptions);
    let metrics = if args.scenarios {
        engine.diagnose_with_scenarios(&position)?
    } else {
        engine.diagnose(&position)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("Retirement Diagnosis v0.1.0");
    println!("===========================\n");

    let h = &metrics.horizon;
    println!("As of: {}", as_of);
    println!("  Current Age: {}", h.current_age);
    println!("  Retirement Age: {} ({} years away)", h.effective_retirement_age, h.years_to_retirement);
    println!("  Life Expectancy: {} ({} retirement years)", h.effective_life_expectancy, h.retirement_years);
    println!();

    let p = &metrics.present;
    println!("Today:");
    println!("  Total Assets: {:.0}", p.total_asset);
    println!("  Total Debt: {:.0}", p.total_debt);
    println!("  Net Worth: {:.0}", p.net_worth);
    println!("  Monthly Income: {:.0}", p.monthly_income);
    println!("  Monthly Expense: {:.0} (interest {:.1})", p.current_monthly_expense, p.monthly_interest);
    println!("  Savings Rate: {:.1}%", p.savings_rate * 100.0);
    println!();

    println!("Asset Mix:");
    for share in &metrics.breakdowns.asset {
        println!("  {:<12} {:>12.0} {:>4}%", format!("{:?}", share.category), share.amount, share.percent);
    }
    println!();

    let c = &metrics.coverage;
    println!("At Retirement (monthly):");
    for stream in &c.pension.streams {
        println!(
            "  {:<7} {:<28} from {:>3}: {:>10.1}",
            stream.owner.as_str(),
            format!("{:?}", stream.kind),
            stream.start_age,
            stream.monthly_payout
        );
    }
    println!("  Pension Income: {:.1}", c.monthly_pension_income);
    println!("  Expense: {:.1}", c.monthly_expense);
    println!("  Coverage Gap: {:.1} ({:.0}% covered)", c.coverage_gap, c.coverage_rate * 100.0);
    println!();

    let r = &metrics.at_retirement;
    println!("Balance Sheet at Retirement:");
    println!("  Real Estate: {:.0}", r.real_estate);
    println!("  Financial: {:.0}", r.financial);
    println!("  Deposit: {:.0}", r.deposit);
    println!("  Pension Asset: {:.0}", r.pension_asset);
    println!("  Debt: {:.0}", r.debt);
    println!("  Liquid Assets: {:.0}", r.liquid_asset);
    println!();

    let d = &metrics.depletion;
    println!("Depletion Age: {} (sustainable: {})", d.depletion_age, d.sustainable);
    println!("Supply / Demand: {:.1}%", metrics.demand_supply.supply_ratio);
    println!("Verdict: {}", metrics.verdict.as_str());

    if let Some(table) = &metrics.scenarios {
        println!("\nRetirement Age Comparison:");
        println!("{:>6} {:>16} {:>10} {:>12}", "Age", "Liquid Assets", "Depletion", "Sustainable");
        println!("{}", "-".repeat(48));
        for row in table.rows() {
            println!(
                "{:>6} {:>16.0} {:>10} {:>12}",
                row.retire_age, row.projected_liquid_asset, row.depletion_age, row.sustainable
            );
        }
    }

    Ok(())
}
