use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::assumptions::{
    AssumptionSet, MAX_HORIZON_YEARS, MIN_RETIREMENT_AGE, elapsed_years_i32,
};
use super::error::ProjectionError;
use super::events::apply_life_events;
use super::report::{PensionYear, ProjectionReport, RowAssembler};
use super::types::{FinancialProfile, LifeEvent, MAX_MONEY, Phase, round_money};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum PotState {
    Accumulating,
    Retired,
    Depleted,
}

/// Owns the running pension balance for one run.
#[derive(Debug)]
struct PotSimulator<'a> {
    assumptions: &'a AssumptionSet,
    state: PotState,
    pot: i64,
    start_age: Option<u32>,
    retirement_age: u32,
    annual_contribution: i64,
    lump_sum_available: bool,
    state_pension_base: f64,
    income_needed: f64,
}

impl<'a> PotSimulator<'a> {
    fn new(
        profile: &FinancialProfile,
        assumptions: &'a AssumptionSet,
        start_age: Option<u32>,
    ) -> Self {
        let retirement_age = profile.planned_retirement_age;
        // Someone already past retirement age has no transition left to crystallise on.
        let state = match start_age {
            Some(age) if age > retirement_age => PotState::Retired,
            _ => PotState::Accumulating,
        };
        let annual_contribution = if profile.still_contributing {
            round_money(non_negative(profile.monthly_contribution.unwrap_or(0.0)) * 12.0)
        } else {
            0
        };

        Self {
            assumptions,
            state,
            pot: round_money(non_negative(profile.pension_pot_value)),
            start_age,
            retirement_age,
            annual_contribution,
            lump_sum_available: !profile.lump_sum_already_taken,
            state_pension_base: non_negative(
                profile
                    .state_pension_annual_amount
                    .unwrap_or(assumptions.full_state_pension_amount),
            ),
            income_needed: non_negative(profile.annual_income_needed),
        }
    }

    fn advance(&mut self, years_elapsed: u32, year: i32, events: &[LifeEvent]) -> PensionYear {
        let age = self.start_age.map(|start| start + years_elapsed);

        let reaches_retirement = self.state == PotState::Accumulating
            && age.is_some_and(|age| age >= self.retirement_age);
        if reaches_retirement {
            self.state = PotState::Retired;
            debug!(year, ?age, pot = self.pot, "reached planned retirement age");
        }

        let pot_start = self.pot;

        let growth_rate = match self.state {
            PotState::Accumulating => Some(self.assumptions.growth_rate_accumulation),
            PotState::Retired => Some(self.assumptions.growth_rate_drawdown),
            PotState::Depleted => None,
        };
        // Growth and contributions stop at MAX_MONEY; the recorded flow is what
        // actually reached the pot.
        let growth = growth_rate
            .map(|rate| {
                round_money(self.pot as f64 * rate).clamp(-self.pot, MAX_MONEY - self.pot)
            })
            .unwrap_or(0);
        self.pot += growth;

        let contribution = if self.state == PotState::Accumulating {
            self.annual_contribution.min(MAX_MONEY - self.pot)
        } else {
            0
        };
        self.pot += contribution;

        let lump_sum = if reaches_retirement && self.lump_sum_available {
            self.lump_sum_available = false;
            round_money(self.pot as f64 * self.assumptions.tax_free_lump_sum_fraction)
                .clamp(0, self.pot)
        } else {
            0
        };
        self.pot -= lump_sum;

        let inflation_factor =
            (1.0 + self.assumptions.inflation_rate).powi(elapsed_years_i32(years_elapsed));
        let state_pension = match age {
            Some(age) if age >= self.assumptions.state_pension_age => {
                round_money(self.state_pension_base * inflation_factor)
            }
            _ => 0,
        };

        let (drawdown, shortfall) = if self.state == PotState::Accumulating {
            (0, 0)
        } else {
            let required =
                (round_money(self.income_needed * inflation_factor) - state_pension).max(0);
            let withdrawn = required.min(self.pot);
            self.pot -= withdrawn;
            (withdrawn, required - withdrawn)
        };

        if shortfall > 0 && self.state != PotState::Depleted {
            self.state = PotState::Depleted;
            debug!(year, ?age, shortfall, "pension pot depleted");
        }

        let events = apply_life_events(events, age, year, &mut self.pot);
        self.pot = self.pot.max(0);

        PensionYear {
            year,
            age,
            phase: if self.state == PotState::Accumulating {
                Phase::Accumulation
            } else {
                Phase::Retirement
            },
            pot_start,
            growth,
            contribution,
            lump_sum,
            drawdown,
            life_event_cost: events.pot_cost,
            pot_end: self.pot,
            state_pension,
            shortfall,
            applied_events: events.applied,
            funds_depleted: self.state == PotState::Depleted,
        }
    }
}

/// Runs the year-by-year projection starting in the calendar year of `as_of`.
///
/// Pure: the same inputs always give the same rows, and nothing outlives the call.
pub fn project(
    profile: &FinancialProfile,
    assumptions: &AssumptionSet,
    events: &[LifeEvent],
    as_of: NaiveDate,
) -> Result<ProjectionReport, ProjectionError> {
    assumptions.validate()?;

    if profile.planned_retirement_age < MIN_RETIREMENT_AGE {
        return Err(ProjectionError::RetirementAgeTooLow {
            age: profile.planned_retirement_age,
            minimum: MIN_RETIREMENT_AGE,
        });
    }

    if let Some(date_of_birth) = profile.date_of_birth {
        if date_of_birth > as_of {
            return Err(ProjectionError::BirthAfterStart {
                date_of_birth,
                as_of,
            });
        }
    }

    let start_age = profile.age_on(as_of);
    let years = horizon_years(start_age, assumptions)?;
    let start_year = as_of.year();
    debug!(start_year, ?start_age, years, events = events.len(), "running projection");

    let mut simulator = PotSimulator::new(profile, assumptions, start_age);
    let mut assembler = RowAssembler::new(profile, assumptions);
    let mut rows = Vec::with_capacity(years as usize);

    for years_elapsed in 0..years {
        let year = start_year.saturating_add(elapsed_years_i32(years_elapsed));
        let pension = simulator.advance(years_elapsed, year, events);
        rows.push(assembler.assemble(years_elapsed, pension));
    }

    Ok(ProjectionReport::new(rows))
}

fn horizon_years(
    start_age: Option<u32>,
    assumptions: &AssumptionSet,
) -> Result<u32, ProjectionError> {
    let years = match start_age {
        Some(age) => i64::from(assumptions.planning_horizon_age) - i64::from(age),
        None => i64::from(assumptions.projection_years),
    };
    if years < 1 {
        return Err(ProjectionError::HorizonTooShort { years });
    }
    if years > i64::from(MAX_HORIZON_YEARS) {
        return Err(ProjectionError::HorizonTooLong {
            years,
            maximum: MAX_HORIZON_YEARS,
        });
    }
    Ok(years as u32)
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
