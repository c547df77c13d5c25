use serde::Serialize;

use super::assumptions::{AssumptionSet, IncomeTaxBands, MortgageAssumptions, elapsed_years_i32};
use super::tax::income_tax;
use super::types::{AppliedLifeEvent, FinancialProfile, Phase, YearProjection, round_money};

/// Level annual repayment for a loan of `principal` over `term_years`.
pub fn annual_mortgage_payment(principal: f64, rate: f64, term_years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    if term_years == 0 {
        return principal;
    }

    let years = term_years as f64;
    if rate.abs() < 1e-12 {
        return principal / years;
    }

    let denom = 1.0 - (1.0 + rate).powf(-years);
    if denom <= 1e-12 {
        principal
    } else {
        principal * rate / denom
    }
}

/// Property value and the debt secured against the household, projected with a
/// fixed share of each year's repayment going to principal.
#[derive(Debug, Clone)]
struct PropertyLedger {
    value: f64,
    growth_rate: f64,
    debt: f64,
    annual_principal: f64,
}

impl PropertyLedger {
    fn new(profile: &FinancialProfile, assumptions: &AssumptionSet) -> Self {
        let debt = non_negative(profile.total_debt);
        let MortgageAssumptions {
            interest_rate,
            term_years,
            principal_share,
        } = assumptions.mortgage;
        let payment = annual_mortgage_payment(debt, interest_rate, term_years);

        Self {
            value: non_negative(profile.property_value.unwrap_or(0.0)),
            growth_rate: assumptions.property_growth_rate,
            debt,
            annual_principal: payment * principal_share,
        }
    }

    fn outstanding_debt(&self, years_elapsed: u32) -> f64 {
        (self.debt - self.annual_principal * years_elapsed as f64).max(0.0)
    }

    fn property_value(&self, years_elapsed: u32) -> f64 {
        self.value * (1.0 + self.growth_rate).powi(elapsed_years_i32(years_elapsed))
    }
}

/// Pension-side figures for one simulated year, before income, tax and net worth
/// are attached.
#[derive(Debug, Clone)]
pub(crate) struct PensionYear {
    pub year: i32,
    pub age: Option<u32>,
    pub phase: Phase,
    pub pot_start: i64,
    pub growth: i64,
    pub contribution: i64,
    pub lump_sum: i64,
    pub drawdown: i64,
    pub life_event_cost: i64,
    pub pot_end: i64,
    pub state_pension: i64,
    pub shortfall: i64,
    pub applied_events: Vec<AppliedLifeEvent>,
    pub funds_depleted: bool,
}

/// Turns each simulated pension year into a reporting row. Holds the only state
/// that spans rows on the reporting side: lump sums already received.
pub(crate) struct RowAssembler<'a> {
    property: PropertyLedger,
    income_tax: &'a IncomeTaxBands,
    cash_on_hand: i64,
}

impl<'a> RowAssembler<'a> {
    pub(crate) fn new(profile: &FinancialProfile, assumptions: &'a AssumptionSet) -> Self {
        Self {
            property: PropertyLedger::new(profile, assumptions),
            income_tax: &assumptions.income_tax,
            cash_on_hand: 0,
        }
    }

    pub(crate) fn assemble(&mut self, years_elapsed: u32, pension: PensionYear) -> YearProjection {
        self.cash_on_hand = self.cash_on_hand.saturating_add(pension.lump_sum);

        let taxable_income = pension.state_pension.saturating_add(pension.drawdown);
        let tax_paid = round_money(income_tax(taxable_income as f64, self.income_tax));
        let total_income = taxable_income.saturating_add(pension.lump_sum);

        let outstanding_debt = round_money(self.property.outstanding_debt(years_elapsed));
        let property_equity =
            round_money(self.property.property_value(years_elapsed)) - outstanding_debt;

        YearProjection {
            year: pension.year,
            age: pension.age,
            phase: pension.phase,
            pension_pot_start: pension.pot_start,
            investment_growth: pension.growth,
            contribution: pension.contribution,
            lump_sum_taken: pension.lump_sum,
            drawdown: pension.drawdown,
            life_event_cost: pension.life_event_cost,
            pension_pot_end: pension.pot_end,
            state_pension_income: pension.state_pension,
            total_income,
            tax_paid,
            net_income: total_income - tax_paid,
            income_shortfall: pension.shortfall,
            outstanding_debt,
            property_equity,
            cash_on_hand: self.cash_on_hand,
            net_worth: pension
                .pot_end
                .saturating_add(property_equity)
                .saturating_add(self.cash_on_hand),
            applied_life_events: pension.applied_events,
            funds_depleted: pension.funds_depleted,
        }
    }
}

/// Headline facts the conversational layer turns into milestone narratives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub start_year: i32,
    pub end_year: i32,
    pub retirement_year: Option<i32>,
    pub pot_at_retirement: Option<i64>,
    pub lump_sum_taken: i64,
    pub first_depletion_year: Option<i32>,
    pub first_depletion_age: Option<u32>,
    pub total_tax_paid: i64,
    pub total_income_shortfall: i64,
    pub final_pension_pot: i64,
    pub final_net_worth: i64,
}

/// The full ordered result of one projection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionReport {
    rows: Vec<YearProjection>,
}

impl ProjectionReport {
    pub(crate) fn new(rows: Vec<YearProjection>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[YearProjection] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<YearProjection> {
        self.rows
    }

    pub fn first_depletion(&self) -> Option<&YearProjection> {
        self.rows.iter().find(|row| row.funds_depleted)
    }

    pub fn first_depletion_year(&self) -> Option<i32> {
        self.first_depletion().map(|row| row.year)
    }

    pub fn row_at_age(&self, age: u32) -> Option<&YearProjection> {
        self.rows.iter().find(|row| row.age == Some(age))
    }

    pub fn retirement_row(&self) -> Option<&YearProjection> {
        self.rows.iter().find(|row| row.phase == Phase::Retirement)
    }

    pub fn final_row(&self) -> Option<&YearProjection> {
        self.rows.last()
    }

    pub fn total_tax_paid(&self) -> i64 {
        self.rows.iter().map(|row| row.tax_paid).sum()
    }

    pub fn summary(&self) -> ProjectionSummary {
        let retirement = self.retirement_row();
        let depletion = self.first_depletion();
        let last = self.final_row();

        ProjectionSummary {
            start_year: self.rows.first().map(|row| row.year).unwrap_or_default(),
            end_year: last.map(|row| row.year).unwrap_or_default(),
            retirement_year: retirement.map(|row| row.year),
            pot_at_retirement: retirement.map(|row| row.pension_pot_start),
            lump_sum_taken: self.rows.iter().map(|row| row.lump_sum_taken).sum(),
            first_depletion_year: depletion.map(|row| row.year),
            first_depletion_age: depletion.and_then(|row| row.age),
            total_tax_paid: self.total_tax_paid(),
            total_income_shortfall: self.rows.iter().map(|row| row.income_shortfall).sum(),
            final_pension_pot: last.map(|row| row.pension_pot_end).unwrap_or_default(),
            final_net_worth: last.map(|row| row.net_worth).unwrap_or_default(),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MAX_MONEY;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn pension_year(year: i32, lump_sum: i64, drawdown: i64, state_pension: i64) -> PensionYear {
        PensionYear {
            year,
            age: Some(66),
            phase: Phase::Retirement,
            pot_start: 200_000,
            growth: 0,
            contribution: 0,
            lump_sum,
            drawdown,
            life_event_cost: 0,
            pot_end: 200_000 - lump_sum - drawdown,
            state_pension,
            shortfall: 0,
            applied_events: Vec::new(),
            funds_depleted: false,
        }
    }

    #[test]
    fn annual_payment_matches_amortization_formula() {
        let payment = annual_mortgage_payment(100_000.0, 0.05, 25);
        assert_approx(payment, 100_000.0 * 0.05 / (1.0 - 1.05_f64.powf(-25.0)));
        assert_approx(annual_mortgage_payment(30_000.0, 0.0, 10), 3_000.0);
        assert_approx(annual_mortgage_payment(0.0, 0.05, 25), 0.0);
    }

    #[test]
    fn debt_is_paid_down_by_constant_principal_share() {
        let profile = FinancialProfile {
            total_debt: 100_000.0,
            ..FinancialProfile::default()
        };
        let mut assumptions = AssumptionSet::default();
        assumptions.mortgage = MortgageAssumptions {
            interest_rate: 0.0,
            term_years: 10,
            principal_share: 0.30,
        };
        let ledger = PropertyLedger::new(&profile, &assumptions);

        assert_approx(ledger.outstanding_debt(0), 100_000.0);
        assert_approx(ledger.outstanding_debt(1), 97_000.0);
        assert_approx(ledger.outstanding_debt(10), 70_000.0);
        assert_approx(ledger.outstanding_debt(1_000), 0.0);
    }

    #[test]
    fn lump_sum_is_untaxed_income_and_stays_in_net_worth() {
        let profile = FinancialProfile {
            property_value: Some(300_000.0),
            total_debt: 0.0,
            ..FinancialProfile::default()
        };
        let mut assumptions = AssumptionSet::default();
        assumptions.property_growth_rate = 0.0;
        let mut assembler = RowAssembler::new(&profile, &assumptions);

        let first = assembler.assemble(0, pension_year(2030, 50_000, 20_000, 0));
        assert_eq!(first.total_income, 70_000);
        assert_eq!(first.tax_paid, 1_486);
        assert_eq!(first.cash_on_hand, 50_000);
        assert_eq!(first.net_worth, 130_000 + 300_000 + 50_000);

        let second = assembler.assemble(1, pension_year(2031, 0, 20_000, 0));
        assert_eq!(second.cash_on_hand, 50_000);
        assert_eq!(second.net_income, 20_000 - 1_486);
    }

    #[test]
    fn figures_at_money_ceiling_do_not_overflow() {
        let profile = FinancialProfile {
            property_value: Some(1e300),
            ..FinancialProfile::default()
        };
        let mut assumptions = AssumptionSet::default();
        assumptions.property_growth_rate = 0.0;
        let mut assembler = RowAssembler::new(&profile, &assumptions);

        let mut year = pension_year(2030, MAX_MONEY, MAX_MONEY, MAX_MONEY);
        year.pot_end = MAX_MONEY;
        let row = assembler.assemble(0, year);

        assert_eq!(row.property_equity, MAX_MONEY);
        assert_eq!(row.total_income, 3 * MAX_MONEY);
        assert_eq!(row.net_worth, 3 * MAX_MONEY);
        assert!(row.tax_paid > 0 && row.tax_paid < row.total_income);
    }

    #[test]
    fn property_equity_nets_outstanding_debt() {
        let profile = FinancialProfile {
            property_value: Some(200_000.0),
            total_debt: 250_000.0,
            ..FinancialProfile::default()
        };
        let mut assumptions = AssumptionSet::default();
        assumptions.property_growth_rate = 0.0;
        let mut assembler = RowAssembler::new(&profile, &assumptions);

        let row = assembler.assemble(0, pension_year(2030, 0, 0, 0));
        assert_eq!(row.outstanding_debt, 250_000);
        assert_eq!(row.property_equity, -50_000);
    }

    #[test]
    fn queries_over_rows() {
        let profile = FinancialProfile::default();
        let assumptions = AssumptionSet::default();
        let mut assembler = RowAssembler::new(&profile, &assumptions);

        let mut accumulating = pension_year(2030, 0, 0, 0);
        accumulating.phase = Phase::Accumulation;
        accumulating.age = Some(65);
        let mut depleted = pension_year(2032, 0, 0, 0);
        depleted.age = Some(67);
        depleted.funds_depleted = true;
        depleted.shortfall = 4_000;

        let rows = vec![
            assembler.assemble(0, accumulating),
            assembler.assemble(1, pension_year(2031, 0, 0, 0)),
            assembler.assemble(2, depleted),
        ];
        let report = ProjectionReport::new(rows);

        assert_eq!(report.first_depletion_year(), Some(2032));
        assert_eq!(report.row_at_age(66).map(|r| r.year), Some(2031));
        assert!(report.row_at_age(90).is_none());
        assert_eq!(report.retirement_row().map(|r| r.year), Some(2031));

        let summary = report.summary();
        assert_eq!(summary.start_year, 2030);
        assert_eq!(summary.end_year, 2032);
        assert_eq!(summary.first_depletion_age, Some(67));
        assert_eq!(summary.total_income_shortfall, 4_000);
    }
}
