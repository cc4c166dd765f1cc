use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// Egyptian pound amount with exact decimal arithmetic.
///
/// Arithmetic never rounds on its own. Rounding to whole piastres happens
/// only where a figure is presented to the customer, through
/// [`Money::round_cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    /// one piastre
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.normalize())
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money::from_decimal(Decimal::from_str_exact(s)?))
    }

    /// create from whole pounds
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from piastres
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, 2))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to two places, half away from zero
    pub fn round_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// `None` on overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// `None` on overflow
    pub fn checked_mul(self, factor: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(factor)).map(Money)
    }

    /// share of this amount, e.g. 20% of 10,000 is 2,000; `None` on overflow
    pub fn checked_percentage(&self, percent: Percent) -> Option<Money> {
        self.0
            .checked_mul(percent.as_decimal())?
            .checked_div(Decimal::ONE_HUNDRED)
            .map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i64::from(i))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money(self.0 * other)
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, other: u32) -> Money {
        Money(self.0 * Decimal::from(other))
    }
}

impl Div<u32> for Money {
    type Output = Money;

    fn div(self, other: u32) -> Money {
        Money(self.0 / Decimal::from(other))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// percentage figure as configured on a plan, e.g. 12 for 12%
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);
    pub const HUNDRED: Percent = Percent(Decimal::ONE_HUNDRED);

    /// create from a percentage figure (12.5 for 12.5%)
    pub fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// create from a whole percentage
    pub fn from_whole(value: u32) -> Self {
        Percent(Decimal::from(value))
    }

    /// get the percentage figure
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl From<Decimal> for Percent {
    fn from(d: Decimal) -> Self {
        Percent::new(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_cents_half_up() {
        assert_eq!(Money::from_decimal(dec!(746.665)).round_cents(), Money::from_decimal(dec!(746.67)));
        assert_eq!(Money::from_decimal(dec!(746.664)).round_cents(), Money::from_decimal(dec!(746.66)));
        assert_eq!(Money::from_decimal(dec!(0.005)).round_cents(), Money::CENT);
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let total = Money::from_major(8960);
        let monthly = total / 12;
        assert_eq!(monthly * 12, total);
        assert!(monthly.as_decimal().scale() > 2);
    }

    #[test]
    fn test_percentage() {
        let amount = Money::from_major(10_000);
        assert_eq!(amount.checked_percentage(Percent::from_whole(20)), Some(Money::from_major(2_000)));
        assert_eq!(amount.checked_percentage(Percent::new(dec!(12.5))), Some(Money::from_major(1_250)));
        assert_eq!(amount.checked_percentage(Percent::ZERO), Some(Money::ZERO));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let max = Money::from_decimal(Decimal::MAX);
        assert_eq!(max.checked_percentage(Percent::from_whole(20)), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(max.checked_add(Money::ONE), None);
        assert_eq!(Money::from_major(5).checked_mul(3), Some(Money::from_major(15)));
        assert_eq!(Money::ONE.checked_add(Money::CENT), Some(Money::from_minor(101)));
    }

    #[test]
    fn test_sign_checks() {
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::CENT.is_positive());
        assert!((Money::ZERO - Money::CENT).is_negative());
    }

    #[test]
    fn test_parse_and_display() {
        let m: Money = "1999.99".parse().unwrap();
        assert_eq!(m, Money::from_minor(199_999));
        assert_eq!(m.to_string(), "1999.99");
        assert_eq!(Percent::from_whole(12).to_string(), "12%");
    }

    #[test]
    fn test_sum() {
        let total: Money = vec![Money::from_major(1), Money::from_minor(50), Money::CENT]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_minor(151));
    }
}
