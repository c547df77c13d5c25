use chrono::NaiveDate;

/// Inputs the engine refuses to project from.
///
/// Missing or negative economic figures are normalised instead of rejected;
/// only inputs that would make the whole projection meaningless end up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("{name} must be a finite rate between {min} and {max}, got {value}")]
    RateOutOfBounds {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name} must be a fraction between 0 and 1, got {value}")]
    FractionOutOfBounds { name: &'static str, value: f64 },

    #[error("planning horizon must cover at least 1 year, got {years}")]
    HorizonTooShort { years: i64 },

    #[error("planning horizon of {years} years exceeds the maximum of {maximum}")]
    HorizonTooLong { years: i64, maximum: u32 },

    #[error("planned retirement age {age} is below the minimum of {minimum}")]
    RetirementAgeTooLow { age: u32, minimum: u32 },

    #[error("date of birth {date_of_birth} is after the projection start {as_of}")]
    BirthAfterStart {
        date_of_birth: NaiveDate,
        as_of: NaiveDate,
    },

    #[error("invalid income tax bands: {0}")]
    InvalidTaxBands(String),
}
