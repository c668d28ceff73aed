//! Pension accumulation and payout projection per product and owner
//!
//! Each adult is projected through the same per-person routine and the
//! resulting payout streams are summed. Tiers:
//! - **National**: today's expected amount grown by inflation to its start age
//! - **Occupational**: DB (final salary times service) or DC (invested balance),
//!   paid as an annuity from its own start age or taken as a lump sum
//! - **Personal**: pension savings and IRP accumulate to their start age and
//!   annuitize; an ISA accumulates to maturity and rolls into a target product

use super::tvm::{
    annuity_payment, compound_future_value, future_value_with_contribution, years_between,
};
use crate::assumptions::Assumptions;
use crate::household::{
    OccupationalPension, OccupationalScheme, Owner, PayoutMode, PersonalPension, PersonalProduct,
};
use crate::position::{FinancialPosition, PensionEntitlements, PersonProfile};
use chrono::Datelike;
use log::warn;
use serde::{Deserialize, Serialize};

/// Source of a projected payout stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    National,
    Occupational(OccupationalScheme),
    Personal(PersonalProduct),
}

/// One projected pension payout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PensionStream {
    pub owner: Owner,
    pub kind: StreamKind,

    /// Value available when the payout phase begins (0 for national)
    pub accumulation: f64,

    pub start_age: u32,
    pub payout_years: u32,

    /// Monthly payout in nominal terms
    pub monthly_payout: f64,

    /// Amount taken at once instead of an annuity
    pub lump_sum: f64,

    /// Product a matured ISA was rolled into
    pub rollover_into: Option<PersonalProduct>,
}

/// All projected pension streams of a household
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PensionProjection {
    pub streams: Vec<PensionStream>,
}

impl PensionProjection {
    pub fn national_monthly(&self) -> f64 {
        self.streams
            .iter()
            .filter(|s| s.kind == StreamKind::National)
            .map(|s| s.monthly_payout)
            .sum()
    }

    /// Occupational and personal payouts
    pub fn private_monthly(&self) -> f64 {
        self.streams
            .iter()
            .filter(|s| s.kind != StreamKind::National)
            .map(|s| s.monthly_payout)
            .sum()
    }

    pub fn total_monthly(&self) -> f64 {
        self.streams.iter().map(|s| s.monthly_payout).sum()
    }

    pub fn for_owner(&self, owner: Owner) -> impl Iterator<Item = &PensionStream> {
        self.streams.iter().filter(move |s| s.owner == owner)
    }
}

/// Projects pension streams under one set of assumptions
pub struct PensionProjector<'a> {
    assumptions: &'a Assumptions,
}

impl<'a> PensionProjector<'a> {
    pub fn new(assumptions: &'a Assumptions) -> Self {
        Self { assumptions }
    }

    /// Project every adult's pensions
    ///
    /// `retirement_shift` moves each person's effective retirement age by the
    /// same number of years; the scenario comparison uses it.
    pub fn project(&self, position: &FinancialPosition, retirement_shift: i32) -> PensionProjection {
        let as_of_year = position.as_of.year();
        let mut projection = PensionProjection::default();

        for person in position.people() {
            let base_age = self.assumptions.effective_retirement_age(person.retirement_age);
            let retirement_age = shift_age(base_age, retirement_shift);
            self.project_person(person, retirement_age, as_of_year, &position.pensions, &mut projection);
        }

        projection
    }

    fn project_person(
        &self,
        person: &PersonProfile,
        retirement_age: u32,
        as_of_year: i32,
        pensions: &PensionEntitlements,
        projection: &mut PensionProjection,
    ) {
        let owner = person.owner;
        let inflation = self.assumptions.inflation_rate;

        for national in pensions.national.iter().filter(|p| p.owner == owner) {
            let years = years_between(person.current_age, national.start_age);
            projection.streams.push(PensionStream {
                owner,
                kind: StreamKind::National,
                accumulation: 0.0,
                start_age: national.start_age,
                payout_years: 0,
                monthly_payout: compound_future_value(national.expected_monthly, inflation, years),
                lump_sum: 0.0,
                rollover_into: None,
            });
        }

        for occupational in pensions.occupational.iter().filter(|p| p.owner == owner) {
            if let Some(stream) = self.occupational_stream(person, retirement_age, occupational) {
                projection.streams.push(stream);
            }
        }

        let personal: Vec<&PersonalPension> =
            pensions.personal.iter().filter(|p| p.owner == owner).collect();
        self.personal_streams(person, as_of_year, &personal, projection);
    }

    fn occupational_stream(
        &self,
        person: &PersonProfile,
        retirement_age: u32,
        pension: &OccupationalPension,
    ) -> Option<PensionStream> {
        let a = self.assumptions;
        let years_to_retirement = years_between(person.current_age, retirement_age);

        let accumulation = match pension.scheme {
            OccupationalScheme::Db => {
                let final_monthly_salary = compound_future_value(
                    person.monthly_labor_income,
                    a.income_growth_rate,
                    years_to_retirement,
                );
                let total_years_of_service = pension.years_of_service.max(0.0) + years_to_retirement as f64;
                final_monthly_salary * total_years_of_service
            }
            OccupationalScheme::Dc => future_value_with_contribution(
                pension.current_balance,
                person.monthly_labor_income * a.heuristics.dc_contribution_rate,
                years_to_retirement,
                a.investment_return_rate,
            ),
            OccupationalScheme::None => return None,
        };

        let (monthly_payout, lump_sum) = match pension.payout_mode {
            PayoutMode::Annuity => {
                let deferral = years_between(retirement_age, pension.start_age);
                let at_start = compound_future_value(accumulation, a.investment_return_rate, deferral);
                let annual = annuity_payment(at_start, pension.payout_years, a.investment_return_rate);
                (annual / 12.0, 0.0)
            }
            PayoutMode::LumpSum => (0.0, accumulation),
        };

        Some(PensionStream {
            owner: person.owner,
            kind: StreamKind::Occupational(pension.scheme),
            accumulation,
            start_age: pension.start_age,
            payout_years: pension.payout_years,
            monthly_payout,
            lump_sum,
            rollover_into: None,
        })
    }

    fn personal_streams(
        &self,
        person: &PersonProfile,
        as_of_year: i32,
        products: &[&PersonalPension],
        projection: &mut PensionProjection,
    ) {
        let rate = self.assumptions.investment_return_rate;

        // Matured ISA values to fold into each product before annuitizing
        let mut rolled_in = vec![0.0; products.len()];

        for isa in products.iter().filter(|p| p.product == PersonalProduct::Isa) {
            let years_to_maturity = isa
                .maturity_year
                .map_or(0, |year| (year - as_of_year).max(0) as u32);
            let at_maturity =
                future_value_with_contribution(isa.balance, isa.monthly_contribution, years_to_maturity, rate);
            let maturity_age = person.current_age + years_to_maturity;

            let target = isa
                .rollover_target
                .filter(|t| *t != PersonalProduct::Isa)
                .and_then(|t| products.iter().position(|p| p.product == t));

            match target {
                Some(index) => {
                    let target_start = products[index].start_age;
                    rolled_in[index] += if target_start > maturity_age {
                        compound_future_value(at_maturity, rate, target_start - maturity_age)
                    } else {
                        at_maturity
                    };
                }
                None => warn!(
                    "{} ISA has no rollover target product; its value is not annuitized",
                    person.owner.as_str()
                ),
            }

            projection.streams.push(PensionStream {
                owner: person.owner,
                kind: StreamKind::Personal(PersonalProduct::Isa),
                accumulation: at_maturity,
                start_age: isa.start_age,
                payout_years: isa.payout_years,
                monthly_payout: 0.0,
                lump_sum: 0.0,
                rollover_into: target.map(|index| products[index].product),
            });
        }

        for (index, pension) in products.iter().enumerate() {
            if pension.product == PersonalProduct::Isa {
                continue;
            }

            let years = years_between(person.current_age, pension.start_age);
            let accumulation =
                future_value_with_contribution(pension.balance, pension.monthly_contribution, years, rate)
                    + rolled_in[index];
            let annual = annuity_payment(accumulation, pension.payout_years, rate);

            projection.streams.push(PensionStream {
                owner: person.owner,
                kind: StreamKind::Personal(pension.product),
                accumulation,
                start_age: pension.start_age,
                payout_years: pension.payout_years,
                monthly_payout: annual / 12.0,
                lump_sum: 0.0,
                rollover_into: None,
            });
        }
    }
}

/// Apply a signed shift to an age, floored at zero
pub fn shift_age(age: u32, shift: i32) -> u32 {
    (age as i64 + shift as i64).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::NationalPension;
    use crate::position::{AssetTotals, DebtTotals};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn profile(owner: Owner, age: u32, income: f64) -> PersonProfile {
        PersonProfile {
            owner,
            current_age: age,
            retirement_age: 60,
            life_expectancy: 90,
            monthly_labor_income: income,
        }
    }

    fn position(pensions: PensionEntitlements) -> FinancialPosition {
        FinancialPosition {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            primary: profile(Owner::Primary, 40, 500.0),
            spouse: Some(profile(Owner::Spouse, 40, 300.0)),
            monthly_income: 800.0,
            income_by_category: Vec::new(),
            fixed_expense: 0.0,
            living_expense: 0.0,
            expense_by_category: Vec::new(),
            assets: AssetTotals::default(),
            debts: DebtTotals::default(),
            pensions,
        }
    }

    fn personal(owner: Owner, product: PersonalProduct, balance: f64, contribution: f64, start_age: u32) -> PersonalPension {
        PersonalPension {
            owner,
            product,
            balance,
            monthly_contribution: contribution,
            start_age,
            payout_years: 20,
            maturity_year: None,
            rollover_target: None,
        }
    }

    #[test]
    fn test_national_grows_with_inflation() {
        let pensions = PensionEntitlements {
            national: vec![
                NationalPension { owner: Owner::Primary, expected_monthly: 60.0, start_age: 65 },
                NationalPension { owner: Owner::Spouse, expected_monthly: 40.0, start_age: 65 },
            ],
            ..Default::default()
        };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);

        assert_relative_eq!(projection.national_monthly(), 100.0 * 1.02_f64.powi(25), max_relative = 1e-12);
        assert_eq!(projection.private_monthly(), 0.0);
        assert_eq!(projection.for_owner(Owner::Spouse).count(), 1);
    }

    #[test]
    fn test_db_accumulation_and_deferred_annuity() {
        let pensions = PensionEntitlements {
            occupational: vec![OccupationalPension {
                owner: Owner::Primary,
                scheme: OccupationalScheme::Db,
                years_of_service: 10.0,
                current_balance: 0.0,
                payout_mode: PayoutMode::Annuity,
                start_age: 62,
                payout_years: 15,
            }],
            ..Default::default()
        };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);
        let stream = &projection.streams[0];

        let final_salary = 500.0 * 1.02_f64.powi(20);
        let accumulation = final_salary * 30.0;
        assert_relative_eq!(stream.accumulation, accumulation, max_relative = 1e-12);

        let at_start = accumulation * 1.05_f64.powi(2);
        let expected = annuity_payment(at_start, 15, 0.05) / 12.0;
        assert_relative_eq!(stream.monthly_payout, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_dc_lump_sum_has_no_monthly_payout() {
        let pensions = PensionEntitlements {
            occupational: vec![OccupationalPension {
                owner: Owner::Spouse,
                scheme: OccupationalScheme::Dc,
                years_of_service: 0.0,
                current_balance: 1_000.0,
                payout_mode: PayoutMode::LumpSum,
                start_age: 60,
                payout_years: 10,
            }],
            ..Default::default()
        };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);
        let stream = &projection.streams[0];

        let expected = future_value_with_contribution(1_000.0, 300.0 * 0.0833, 20, 0.05);
        assert_relative_eq!(stream.lump_sum, expected, max_relative = 1e-12);
        assert_eq!(stream.monthly_payout, 0.0);
        assert_eq!(projection.total_monthly(), 0.0);
    }

    #[test]
    fn test_scheme_none_is_skipped() {
        let pensions = PensionEntitlements {
            occupational: vec![OccupationalPension {
                owner: Owner::Primary,
                scheme: OccupationalScheme::None,
                years_of_service: 5.0,
                current_balance: 100.0,
                payout_mode: PayoutMode::Annuity,
                start_age: 60,
                payout_years: 10,
            }],
            ..Default::default()
        };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);
        assert!(projection.streams.is_empty());
    }

    #[test]
    fn test_isa_rolls_into_irp() {
        let mut isa = personal(Owner::Primary, PersonalProduct::Isa, 1_000.0, 0.0, 60);
        isa.maturity_year = Some(2028);
        isa.rollover_target = Some(PersonalProduct::Irp);
        let irp = personal(Owner::Primary, PersonalProduct::Irp, 500.0, 10.0, 60);

        let pensions = PensionEntitlements { personal: vec![isa, irp], ..Default::default() };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);

        // Matures at 43 after three years, then compounds to the IRP start at 60
        let isa_at_maturity = 1_000.0 * 1.05_f64.powi(3);
        let rolled = isa_at_maturity * 1.05_f64.powi(17);
        let irp_own = future_value_with_contribution(500.0, 10.0, 20, 0.05);

        let irp_stream = projection
            .streams
            .iter()
            .find(|s| s.kind == StreamKind::Personal(PersonalProduct::Irp))
            .unwrap();
        assert_relative_eq!(irp_stream.accumulation, irp_own + rolled, max_relative = 1e-12);
        assert_relative_eq!(
            irp_stream.monthly_payout,
            annuity_payment(irp_own + rolled, 20, 0.05) / 12.0,
            max_relative = 1e-12
        );

        let isa_stream = &projection.streams[0];
        assert_eq!(isa_stream.rollover_into, Some(PersonalProduct::Irp));
        assert_eq!(isa_stream.monthly_payout, 0.0);
    }

    #[test]
    fn test_isa_maturing_after_target_start_is_not_compounded() {
        let mut isa = personal(Owner::Primary, PersonalProduct::Isa, 1_000.0, 0.0, 60);
        isa.maturity_year = Some(2050);
        isa.rollover_target = Some(PersonalProduct::PensionSavings);
        let savings = personal(Owner::Primary, PersonalProduct::PensionSavings, 0.0, 0.0, 57);

        let pensions = PensionEntitlements { personal: vec![isa, savings], ..Default::default() };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);

        // Maturity at 65 is past the 57 start: value at maturity is added unchanged
        let at_maturity = 1_000.0 * 1.05_f64.powi(25);
        let stream = projection.streams.last().unwrap();
        assert_relative_eq!(stream.accumulation, at_maturity, max_relative = 1e-12);
    }

    #[test]
    fn test_isa_rollover_stays_with_owner() {
        let mut isa = personal(Owner::Spouse, PersonalProduct::Isa, 1_000.0, 0.0, 60);
        isa.maturity_year = Some(2025);
        isa.rollover_target = Some(PersonalProduct::Irp);
        let primary_irp = personal(Owner::Primary, PersonalProduct::Irp, 0.0, 0.0, 60);

        let pensions = PensionEntitlements { personal: vec![isa, primary_irp], ..Default::default() };
        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&position(pensions), 0);

        assert_eq!(projection.total_monthly(), 0.0);
        let spouse_isa = projection.for_owner(Owner::Spouse).next().unwrap();
        assert_eq!(spouse_isa.rollover_into, None);
    }

    #[test]
    fn test_personal_past_start_age_uses_current_balance() {
        let mut pos = position(PensionEntitlements {
            personal: vec![personal(Owner::Primary, PersonalProduct::PensionSavings, 1_200.0, 50.0, 56)],
            ..Default::default()
        });
        pos.primary.current_age = 58;

        let assumptions = Assumptions::default();
        let projection = PensionProjector::new(&assumptions).project(&pos, 0);
        assert_eq!(projection.streams[0].accumulation, 1_200.0);
    }

    #[test]
    fn test_shift_age() {
        assert_eq!(shift_age(60, -5), 55);
        assert_eq!(shift_age(3, -5), 0);
        assert_eq!(shift_age(60, 5), 65);
    }
}
