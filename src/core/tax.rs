use super::assumptions::IncomeTaxBands;

/// Personal allowance left after the £1-per-£2 taper above the threshold.
pub fn effective_allowance(gross_income: f64, schedule: &IncomeTaxBands) -> f64 {
    let gross = sanitize(gross_income);
    let mut allowance = schedule.personal_allowance.max(0.0);
    if gross > schedule.taper_threshold {
        let reduction = (gross - schedule.taper_threshold) / 2.0;
        allowance = (allowance - reduction).max(0.0);
    }
    allowance
}

/// Income tax due on a year's taxable income (state pension plus drawdown).
pub fn income_tax(taxable_income: f64, schedule: &IncomeTaxBands) -> f64 {
    let gross = sanitize(taxable_income);
    let allowance = effective_allowance(gross, schedule);

    let mut remaining = (gross - allowance).max(0.0);
    let mut band_floor = 0.0;
    let mut tax = 0.0;

    for band in &schedule.bands {
        if remaining <= 0.0 {
            break;
        }

        let slice = match band.upper_limit {
            Some(upper) => remaining.min((upper - band_floor).max(0.0)),
            None => remaining,
        };
        tax += slice * band.rate.clamp(0.0, 1.0);
        remaining -= slice;

        if let Some(upper) = band.upper_limit {
            band_floor = upper;
        }
    }

    tax
}

/// Tax on the next unit of income, taper included.
pub fn marginal_rate(taxable_income: f64, schedule: &IncomeTaxBands) -> f64 {
    let gross = sanitize(taxable_income);
    income_tax(gross + 1.0, schedule) - income_tax(gross, schedule)
}

fn sanitize(income: f64) -> f64 {
    if income.is_nan() { 0.0 } else { income.max(0.0) }
}
