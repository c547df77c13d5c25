mod assumptions;
mod engine;
mod error;
mod events;
mod report;
mod tax;
mod types;

pub use assumptions::{
    AssumptionSet, IncomeTaxBands, MAX_HORIZON_YEARS, MAX_RATE, MIN_RATE, MIN_RETIREMENT_AGE,
    MortgageAssumptions, TaxBand,
};
pub use engine::project;
pub use error::ProjectionError;
pub use events::{LifeEventOutcome, apply_life_events};
pub use report::{ProjectionReport, ProjectionSummary, annual_mortgage_payment};
pub use tax::{effective_allowance, income_tax, marginal_rate};
pub use types::{
    AppliedLifeEvent, EventTrigger, FinancialProfile, LifeEvent, LifeEventCategory, MAX_MONEY,
    Phase, YearProjection,
};
