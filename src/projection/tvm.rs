//! Time-value-of-money primitives
//!
//! All horizons are whole years. Negative horizons are floored to zero and
//! non-finite results collapse to zero, so nothing downstream can observe
//! NaN or Infinity.

/// Tolerance under which the return and growth rates are treated as equal
const RATE_EPSILON: f64 = 1e-9;

/// Years between two ages, floored at zero
pub fn years_between(from_age: u32, to_age: u32) -> u32 {
    to_age.saturating_sub(from_age)
}

/// Division that short-circuits to 0 for a zero or non-finite denominator
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `principal * (1 + rate)^years`
pub fn compound_future_value(principal: f64, rate: f64, years: u32) -> f64 {
    finite_or_zero(principal * (1.0 + rate).powi(years as i32))
}

/// Roll a balance forward year by year, adding twelve monthly
/// contributions at the start of each year before growth.
pub fn future_value_with_contribution(
    balance: f64,
    monthly_contribution: f64,
    years: u32,
    rate: f64,
) -> f64 {
    let annual_contribution = monthly_contribution * 12.0;
    let mut value = balance;
    for _ in 0..years {
        value = (value + annual_contribution) * (1.0 + rate);
    }
    finite_or_zero(value)
}

/// Level annual withdrawal that exhausts `present_value` over `years`
/// while the remaining balance keeps earning `rate`.
///
/// Returns 0 when there is nothing to pay out or no payout period.
pub fn annuity_payment(present_value: f64, years: u32, rate: f64) -> f64 {
    if years == 0 || present_value <= 0.0 {
        return 0.0;
    }

    let n = years as f64;
    if rate.abs() < RATE_EPSILON {
        return present_value / n;
    }

    let growth = (1.0 + rate).powi(years as i32);
    let denominator = growth - 1.0;
    if denominator.abs() < RATE_EPSILON {
        return present_value / n;
    }

    finite_or_zero(present_value * rate * growth / denominator)
}

/// Future value of an annual contribution stream that starts at
/// `initial_annual_amount` and grows by `growth_rate` each year.
///
/// Closed form `A * ((1+r)^n - (1+g)^n) / (r - g)`; when `r` and `g`
/// coincide the limit `A * n * (1+r)^(n-1)` is used instead.
pub fn growing_contribution_future_value(
    initial_annual_amount: f64,
    years: u32,
    return_rate: f64,
    growth_rate: f64,
) -> f64 {
    if years == 0 || initial_annual_amount == 0.0 {
        return 0.0;
    }

    let n = years as i32;
    let spread = return_rate - growth_rate;
    let value = if spread.abs() < RATE_EPSILON {
        initial_annual_amount * years as f64 * (1.0 + return_rate).powi(n - 1)
    } else {
        let return_factor = (1.0 + return_rate).powi(n);
        let growth_factor = (1.0 + growth_rate).powi(n);
        initial_annual_amount * (return_factor - growth_factor) / spread
    };

    finite_or_zero(value)
}
