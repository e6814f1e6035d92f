//! Rental price and deposit computation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use rental_entity::booking::BookingPeriod;

/// Share of the total collected as deposit.
pub const DEPOSIT_RATE: Decimal = dec!(0.20);

/// Computed price of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Days charged; never less than one.
    pub billable_days: i64,
    /// `daily_rate * billable_days`, two fractional digits.
    pub total_amount: Decimal,
    /// `total_amount * 0.20`, rounded half-up to two fractional digits.
    pub deposit_amount: Decimal,
}

/// Whole days of the period, with sub-day rentals charged as one day.
pub fn billable_days(period: &BookingPeriod) -> i64 {
    period.whole_days().max(1)
}

/// Price a period at `daily_rate`.
pub fn quote(daily_rate: Decimal, period: &BookingPeriod) -> PriceQuote {
    let billable_days = billable_days(period);
    let total_amount = to_cents(daily_rate * Decimal::from(billable_days));
    let deposit_amount = to_cents(total_amount * DEPOSIT_RATE);
    PriceQuote {
        billable_days,
        total_amount,
        deposit_amount,
    }
}

/// Round half-up to two places and pin the scale so `100` renders as `100.00`.
fn to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
