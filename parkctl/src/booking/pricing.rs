//! Reservation pricing.

use crate::db::models::rates::RateScheduleDBResponse;
use rust_decimal::Decimal;

/// The rates a reservation is priced against.
///
/// Usually derived from the newest `rate_schedules` row; falls back to the
/// configured defaults while the table is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCard {
    pub reservation_fee: Decimal,
    pub per_minute_rate: Decimal,
}

impl From<&RateScheduleDBResponse> for RateCard {
    fn from(schedule: &RateScheduleDBResponse) -> Self {
        Self {
            reservation_fee: schedule.reservation_fee,
            per_minute_rate: schedule.per_minute_rate,
        }
    }
}

/// Amount charged for a reservation: flat fee plus the metered time.
/// No rounding; `Decimal` arithmetic is exact at these scales.
pub fn reservation_amount(duration_minutes: i32, rates: &RateCard) -> Decimal {
    rates.reservation_fee + Decimal::from(duration_minutes) * rates.per_minute_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_plus_metered_time() {
        let rates = RateCard {
            reservation_fee: Decimal::from(50),
            per_minute_rate: Decimal::from(2),
        };
        assert_eq!(reservation_amount(60, &rates), Decimal::from(170));
        assert_eq!(reservation_amount(1, &rates), Decimal::from(52));
    }

    #[test]
    fn fractional_rates_are_exact() {
        let rates = RateCard {
            reservation_fee: Decimal::new(1250, 2),  // 12.50
            per_minute_rate: Decimal::new(75, 2),    // 0.75
        };
        assert_eq!(reservation_amount(90, &rates), Decimal::new(8000, 2));
    }

    #[test]
    fn zero_duration_charges_only_the_fee() {
        let rates = RateCard {
            reservation_fee: Decimal::from(50),
            per_minute_rate: Decimal::from(2),
        };
        assert_eq!(reservation_amount(0, &rates), Decimal::from(50));
    }

    #[test]
    fn free_rates_charge_nothing() {
        let rates = RateCard {
            reservation_fee: Decimal::ZERO,
            per_minute_rate: Decimal::ZERO,
        };
        assert_eq!(reservation_amount(240, &rates), Decimal::ZERO);
    }
}
