use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Snapshot of one person's finances at the start of a projection.
///
/// Currency fields that the intake agent could not establish arrive as `None`
/// or are omitted; the engine treats them as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialProfile {
    pub date_of_birth: Option<NaiveDate>,
    pub pension_pot_value: f64,
    pub monthly_contribution: Option<f64>,
    pub still_contributing: bool,
    pub planned_retirement_age: u32,
    pub annual_income_needed: f64,
    /// Falls back to the assumption set's full state pension when absent.
    pub state_pension_annual_amount: Option<f64>,
    pub property_value: Option<f64>,
    pub total_debt: f64,
    pub lump_sum_already_taken: bool,
}

impl Default for FinancialProfile {
    fn default() -> Self {
        Self {
            date_of_birth: None,
            pension_pot_value: 0.0,
            monthly_contribution: None,
            still_contributing: false,
            planned_retirement_age: 67,
            annual_income_needed: 0.0,
            state_pension_annual_amount: None,
            property_value: None,
            total_debt: 0.0,
            lump_sum_already_taken: false,
        }
    }
}

impl FinancialProfile {
    /// Whole years lived on `as_of`, or `None` when the date of birth is unknown.
    pub fn age_on(&self, as_of: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| as_of.years_since(dob))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifeEventCategory {
    Expense,
    Income,
    #[serde(alias = "assetChange", alias = "asset_change")]
    AssetChange,
}

/// When a life event fires, once its age/year ambiguity has been settled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventTrigger {
    Age(u32),
    Year(i32),
}

/// A scheduled one-off cash movement into or out of the pension pot.
///
/// `amount` is signed from the pot's point of view: positive leaves the pot,
/// negative enters it. The category pins the sign down, see [`LifeEvent::pot_cost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeEvent {
    pub name: String,
    pub category: LifeEventCategory,
    #[serde(default)]
    pub trigger_age: Option<u32>,
    #[serde(default)]
    pub trigger_year: Option<i32>,
    pub amount: f64,
}

impl LifeEvent {
    pub fn new(
        name: impl Into<String>,
        category: LifeEventCategory,
        trigger: EventTrigger,
        amount: f64,
    ) -> Self {
        let (trigger_age, trigger_year) = match trigger {
            EventTrigger::Age(age) => (Some(age), None),
            EventTrigger::Year(year) => (None, Some(year)),
        };
        Self {
            name: name.into(),
            category,
            trigger_age,
            trigger_year,
            amount,
        }
    }

    /// Amount removed from the pot when the event fires.
    ///
    /// Expenses always cost and income always adds regardless of how the caller
    /// signed `amount`; only asset changes carry their own sign.
    pub fn pot_cost(&self) -> f64 {
        let amount = if self.amount.is_finite() {
            self.amount
        } else {
            0.0
        };
        match self.category {
            LifeEventCategory::Expense => amount.abs(),
            LifeEventCategory::Income => -amount.abs(),
            LifeEventCategory::AssetChange => amount,
        }
    }

    /// Age wins when both triggers are present and the age is known; otherwise
    /// the calendar year is used. `None` means the event can never fire.
    pub fn resolve_trigger(&self, age_known: bool) -> Option<EventTrigger> {
        match (self.trigger_age, self.trigger_year) {
            (Some(age), _) if age_known => Some(EventTrigger::Age(age)),
            (_, Some(year)) => Some(EventTrigger::Year(year)),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Phase {
    Accumulation,
    Retirement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedLifeEvent {
    pub name: String,
    pub category: LifeEventCategory,
    pub cost: i64,
}

/// One reported year. Currency is in whole units of the profile's currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub year: i32,
    pub age: Option<u32>,
    pub phase: Phase,
    pub pension_pot_start: i64,
    pub investment_growth: i64,
    pub contribution: i64,
    pub lump_sum_taken: i64,
    pub drawdown: i64,
    /// Net change to the pot caused by life events; negative for windfalls.
    pub life_event_cost: i64,
    pub pension_pot_end: i64,
    pub state_pension_income: i64,
    pub total_income: i64,
    pub tax_paid: i64,
    pub net_income: i64,
    pub income_shortfall: i64,
    pub outstanding_debt: i64,
    pub property_equity: i64,
    /// Lump sums received so far and held outside the pot.
    pub cash_on_hand: i64,
    pub net_worth: i64,
    pub applied_life_events: Vec<AppliedLifeEvent>,
    pub funds_depleted: bool,
}

/// Largest magnitude any single currency figure is allowed to reach. Balances
/// and flows are capped here so that summing a handful of them stays far inside
/// `i64`.
pub const MAX_MONEY: i64 = 1_000_000_000_000_000;

/// Rounds to whole currency units, capped at `±MAX_MONEY`. Infinities land on
/// the cap; NaN collapses to zero.
pub(crate) fn round_money(value: f64) -> i64 {
    if value.is_nan() {
        0
    } else {
        (value.round() as i64).clamp(-MAX_MONEY, MAX_MONEY)
    }
}
