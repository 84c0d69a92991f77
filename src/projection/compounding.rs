//! Compounding primitives shared by both asset models

use crate::{Money, Rate};

/// Value after `periods` periods of compound growth at `rate` per period
///
/// `periods` may be fractional (e.g. an 18-month cycle is 1.5 years).
pub fn grow(value: Money, rate: Rate, periods: f64) -> Money {
    value * (1.0 + rate).powf(periods)
}

/// One period of a running balance: compound at `rate`, then add `contribution`
pub fn accrue(balance: Money, rate: Rate, contribution: Money) -> Money {
    balance * (1.0 + rate) + contribution
}

/// Rate over `periods` periods equivalent to `rate` per period
pub fn compound_rate(rate: Rate, periods: f64) -> Rate {
    grow(1.0, rate, periods) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grow() {
        assert_relative_eq!(grow(100.0, 0.04, 5.0), 121.66529024, epsilon = 1e-8);
        assert_eq!(grow(100.0, 0.04, 0.0), 100.0);
    }

    #[test]
    fn test_accrue() {
        assert_eq!(accrue(0.0, 0.01, 800.0), 800.0);
        assert_relative_eq!(accrue(800.0, 0.01, 800.0), 1608.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compound_rate() {
        assert_relative_eq!(compound_rate(0.01, 12.0), 0.126825030131970, epsilon = 1e-12);
    }
}
