use serde::{Deserialize, Serialize};

use super::error::ProjectionError;

/// Earliest age a private pension can be drawn without penalty.
pub const MIN_RETIREMENT_AGE: u32 = 55;

/// Longest projection, in years, the engine will run.
pub const MAX_HORIZON_YEARS: u32 = 120;

/// Years elapsed as a `powi` exponent or calendar offset. Every caller is
/// already inside `MAX_HORIZON_YEARS`; the `min` keeps the cast lossless.
pub(crate) fn elapsed_years_i32(years_elapsed: u32) -> i32 {
    years_elapsed.min(MAX_HORIZON_YEARS) as i32
}

/// Sane range for any annual growth, inflation or interest rate.
pub const MIN_RATE: f64 = -0.5;
pub const MAX_RATE: f64 = 1.0;

/// One slice of the progressive income tax schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBand {
    /// Upper edge of the band measured in income above the personal allowance.
    /// `None` marks the final, unbounded band.
    pub upper_limit: Option<f64>,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxBands {
    pub personal_allowance: f64,
    /// Income above which the allowance is withdrawn at £1 per £2.
    pub taper_threshold: f64,
    pub bands: Vec<TaxBand>,
}

impl IncomeTaxBands {
    /// 2024/25 rest-of-UK rates.
    pub fn uk() -> Self {
        Self {
            personal_allowance: 12_570.0,
            taper_threshold: 100_000.0,
            bands: vec![
                TaxBand {
                    upper_limit: Some(37_700.0),
                    rate: 0.20,
                },
                TaxBand {
                    upper_limit: Some(125_140.0),
                    rate: 0.40,
                },
                TaxBand {
                    upper_limit: None,
                    rate: 0.45,
                },
            ],
        }
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        if !self.personal_allowance.is_finite() || self.personal_allowance < 0.0 {
            return Err(ProjectionError::InvalidTaxBands(
                "personal allowance must be >= 0".to_string(),
            ));
        }
        if !self.taper_threshold.is_finite() || self.taper_threshold < 0.0 {
            return Err(ProjectionError::InvalidTaxBands(
                "taper threshold must be >= 0".to_string(),
            ));
        }

        let Some((last, bounded)) = self.bands.split_last() else {
            return Err(ProjectionError::InvalidTaxBands(
                "at least one band is required".to_string(),
            ));
        };
        if last.upper_limit.is_some() {
            return Err(ProjectionError::InvalidTaxBands(
                "the final band must be unbounded".to_string(),
            ));
        }

        let mut previous = 0.0;
        for band in bounded {
            let Some(limit) = band.upper_limit else {
                return Err(ProjectionError::InvalidTaxBands(
                    "only the final band may be unbounded".to_string(),
                ));
            };
            if !limit.is_finite() || limit <= previous {
                return Err(ProjectionError::InvalidTaxBands(format!(
                    "band limits must be ascending, {limit} follows {previous}"
                )));
            }
            previous = limit;
        }

        for band in &self.bands {
            if !(0.0..=1.0).contains(&band.rate) {
                return Err(ProjectionError::InvalidTaxBands(format!(
                    "band rate {} must be between 0 and 1",
                    band.rate
                )));
            }
        }

        Ok(())
    }
}

/// Inputs to the simplified mortgage paydown: a level annual payment is derived
/// from the starting debt, and a fixed share of it is treated as principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageAssumptions {
    pub interest_rate: f64,
    pub term_years: u32,
    pub principal_share: f64,
}

impl Default for MortgageAssumptions {
    fn default() -> Self {
        Self {
            interest_rate: 0.045,
            term_years: 25,
            principal_share: 0.30,
        }
    }
}

/// Run-wide economic constants. Rates are decimal fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionSet {
    pub growth_rate_accumulation: f64,
    pub growth_rate_drawdown: f64,
    pub inflation_rate: f64,
    pub state_pension_age: u32,
    pub full_state_pension_amount: f64,
    pub tax_free_lump_sum_fraction: f64,
    pub property_growth_rate: f64,
    pub planning_horizon_age: u32,
    /// Number of years projected when the date of birth is unknown.
    pub projection_years: u32,
    pub income_tax: IncomeTaxBands,
    pub mortgage: MortgageAssumptions,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self {
            growth_rate_accumulation: 0.05,
            growth_rate_drawdown: 0.04,
            inflation_rate: 0.025,
            state_pension_age: 67,
            full_state_pension_amount: 11_502.0,
            tax_free_lump_sum_fraction: 0.25,
            property_growth_rate: 0.03,
            planning_horizon_age: 95,
            projection_years: 30,
            income_tax: IncomeTaxBands::uk(),
            mortgage: MortgageAssumptions::default(),
        }
    }
}

impl AssumptionSet {
    pub fn validate(&self) -> Result<(), ProjectionError> {
        for (name, value) in [
            ("growthRateAccumulation", self.growth_rate_accumulation),
            ("growthRateDrawdown", self.growth_rate_drawdown),
            ("inflationRate", self.inflation_rate),
            ("propertyGrowthRate", self.property_growth_rate),
            ("mortgage.interestRate", self.mortgage.interest_rate),
        ] {
            if !value.is_finite() || !(MIN_RATE..=MAX_RATE).contains(&value) {
                return Err(ProjectionError::RateOutOfBounds {
                    name,
                    value,
                    min: MIN_RATE,
                    max: MAX_RATE,
                });
            }
        }

        for (name, value) in [
            ("taxFreeLumpSumFraction", self.tax_free_lump_sum_fraction),
            ("mortgage.principalShare", self.mortgage.principal_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProjectionError::FractionOutOfBounds { name, value });
            }
        }

        if !self.full_state_pension_amount.is_finite() {
            return Err(ProjectionError::RateOutOfBounds {
                name: "fullStatePensionAmount",
                value: self.full_state_pension_amount,
                min: 0.0,
                max: f64::MAX,
            });
        }

        self.income_tax.validate()
    }
}
