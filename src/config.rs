use clap::Args;
use serde::Deserialize;

use crate::core::AssumptionSet;

/// Field-by-field changes to the default assumption set.
///
/// Shared by the JSON API and the CLI. Rates, fractions and shares are given in
/// percent (`5` means 5%); ages, years and currency amounts are plain numbers.
#[derive(Args, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssumptionOverrides {
    #[arg(long, help = "Pension growth before retirement in percent, e.g. 5")]
    pub growth_rate_accumulation: Option<f64>,
    #[arg(long, help = "Pension growth during drawdown in percent, e.g. 4")]
    pub growth_rate_drawdown: Option<f64>,
    #[arg(long, help = "Annual inflation in percent, e.g. 2.5")]
    pub inflation_rate: Option<f64>,
    #[arg(long)]
    pub state_pension_age: Option<u32>,
    #[arg(long, help = "Full new state pension per year in today's money")]
    pub full_state_pension_amount: Option<f64>,
    #[arg(long, help = "Share of the pot taken tax-free at retirement in percent")]
    pub tax_free_lump_sum: Option<f64>,
    #[arg(long, help = "Annual property price growth in percent")]
    pub property_growth_rate: Option<f64>,
    #[arg(long)]
    pub planning_horizon_age: Option<u32>,
    #[arg(long, help = "Years to project when the date of birth is unknown")]
    pub projection_years: Option<u32>,

    #[arg(long)]
    pub personal_allowance: Option<f64>,
    #[arg(long, help = "Income above which the personal allowance is withdrawn")]
    pub allowance_taper_threshold: Option<f64>,
    #[arg(long, help = "Width of the basic rate band above the allowance")]
    pub basic_rate_limit: Option<f64>,
    #[arg(long, help = "Upper edge of the higher rate band above the allowance")]
    pub higher_rate_limit: Option<f64>,
    #[arg(long, help = "Basic income tax rate in percent")]
    pub basic_rate: Option<f64>,
    #[arg(long, help = "Higher income tax rate in percent")]
    pub higher_rate: Option<f64>,
    #[arg(long, help = "Additional (top) income tax rate in percent")]
    pub additional_rate: Option<f64>,

    #[arg(long, help = "Mortgage interest rate in percent")]
    pub mortgage_interest_rate: Option<f64>,
    #[arg(long)]
    pub mortgage_term_years: Option<u32>,
    #[arg(long, help = "Share of each mortgage payment that repays principal, in percent")]
    pub mortgage_principal_share: Option<f64>,
}

impl AssumptionOverrides {
    /// Layers these overrides over `base`. The result is not validated here;
    /// [`crate::core::project`] rejects anything out of range.
    pub fn apply(&self, base: AssumptionSet) -> AssumptionSet {
        let mut assumptions = base;

        if let Some(v) = self.growth_rate_accumulation {
            assumptions.growth_rate_accumulation = v / 100.0;
        }
        if let Some(v) = self.growth_rate_drawdown {
            assumptions.growth_rate_drawdown = v / 100.0;
        }
        if let Some(v) = self.inflation_rate {
            assumptions.inflation_rate = v / 100.0;
        }
        if let Some(v) = self.state_pension_age {
            assumptions.state_pension_age = v;
        }
        if let Some(v) = self.full_state_pension_amount {
            assumptions.full_state_pension_amount = v;
        }
        if let Some(v) = self.tax_free_lump_sum {
            assumptions.tax_free_lump_sum_fraction = v / 100.0;
        }
        if let Some(v) = self.property_growth_rate {
            assumptions.property_growth_rate = v / 100.0;
        }
        if let Some(v) = self.planning_horizon_age {
            assumptions.planning_horizon_age = v;
        }
        if let Some(v) = self.projection_years {
            assumptions.projection_years = v;
        }

        let tax = &mut assumptions.income_tax;
        if let Some(v) = self.personal_allowance {
            tax.personal_allowance = v;
        }
        if let Some(v) = self.allowance_taper_threshold {
            tax.taper_threshold = v;
        }
        if let (Some(v), Some(band)) = (self.basic_rate_limit, tax.bands.get_mut(0)) {
            band.upper_limit = Some(v);
        }
        if let (Some(v), Some(band)) = (self.higher_rate_limit, tax.bands.get_mut(1)) {
            band.upper_limit = Some(v);
        }
        if let (Some(v), Some(band)) = (self.basic_rate, tax.bands.get_mut(0)) {
            band.rate = v / 100.0;
        }
        if let (Some(v), Some(band)) = (self.higher_rate, tax.bands.get_mut(1)) {
            band.rate = v / 100.0;
        }
        if let (Some(v), Some(band)) = (self.additional_rate, tax.bands.last_mut()) {
            band.rate = v / 100.0;
        }

        if let Some(v) = self.mortgage_interest_rate {
            assumptions.mortgage.interest_rate = v / 100.0;
        }
        if let Some(v) = self.mortgage_term_years {
            assumptions.mortgage.term_years = v;
        }
        if let Some(v) = self.mortgage_principal_share {
            assumptions.mortgage.principal_share = v / 100.0;
        }

        assumptions
    }
}
