pub mod schedule;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decimal::{Money, Rate};

pub use schedule::{AmortizationSchedule, ScheduledPayment};

/// request for a fixed-payment loan figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
}

impl LoanQuote {
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate,
            term_months,
        }
    }

    /// compute the monthly payment and totals
    pub fn amortize(&self) -> AmortizationResult {
        let monthly_payment =
            compute_monthly_payment(self.principal, self.annual_rate, self.term_months);
        AmortizationResult {
            principal: self.principal.max(Money::ZERO),
            term_months: self.term_months,
            monthly_payment,
        }
    }
}

/// vehicle purchase financed net of trade-in and down payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLoanQuote {
    pub vehicle_price: Money,
    pub trade_in_value: Money,
    pub down_payment: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
}

impl VehicleLoanQuote {
    /// amount to finance; zero or negative when trade-in and down payment cover the price
    pub fn principal(&self) -> Money {
        self.vehicle_price - self.trade_in_value - self.down_payment
    }

    pub fn to_loan_quote(&self) -> LoanQuote {
        LoanQuote::new(self.principal(), self.annual_rate, self.term_months)
    }

    pub fn amortize(&self) -> AmortizationResult {
        self.to_loan_quote().amortize()
    }
}

/// fixed monthly payment and derived totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// financed principal, floored at zero
    pub principal: Money,
    pub term_months: u32,
    /// unrounded monthly payment
    pub monthly_payment: Money,
}

impl AmortizationResult {
    /// sum of all monthly payments
    pub fn total_payment(&self) -> Money {
        let total = self
            .monthly_payment
            .as_decimal()
            .checked_mul(Decimal::from(self.term_months))
            .unwrap_or(Decimal::MAX);
        Money::from_decimal(total)
    }

    /// total interest over the life of the loan
    pub fn total_interest(&self) -> Money {
        (self.total_payment() - self.principal).max(Money::ZERO)
    }

    /// monthly payment rounded for display
    pub fn display_monthly_payment(&self) -> Money {
        self.monthly_payment.round_currency()
    }

    pub fn display_total_payment(&self) -> Money {
        self.total_payment().round_currency()
    }

    pub fn display_total_interest(&self) -> Money {
        self.total_interest().round_currency()
    }

    /// nothing is owed
    pub fn is_fully_covered(&self) -> bool {
        self.monthly_payment.is_zero()
    }
}

/// fixed monthly payment of an equal-installment loan
///
/// `principal <= 0` means the loan is fully covered and nothing is owed.
/// A zero rate spreads the principal evenly. A zero term is a caller error
/// and yields the principal itself rather than panicking. When `(1 + r)^n`
/// leaves the decimal range the payment is the interest-only limit `P * r`;
/// a payment that itself cannot be represented saturates.
pub fn compute_monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    if principal <= Money::ZERO {
        return Money::ZERO;
    }

    if term_months == 0 {
        return principal;
    }

    let r = annual_rate.monthly_rate().as_decimal();

    if r.is_zero() {
        return principal / Decimal::from(term_months);
    }

    let payment = match compound_factor(r, term_months) {
        Some(compound) => {
            let denominator = compound - Decimal::ONE;
            if denominator.is_zero() {
                // rate too small to register at decimal precision
                return principal / Decimal::from(term_months);
            }
            // P * r / (1 - (1 + r)^-n) == P * r * (1 + r)^n / ((1 + r)^n - 1)
            compound
                .checked_div(denominator)
                .and_then(|ratio| principal.as_decimal().checked_mul(r)?.checked_mul(ratio))
        }
        None => {
            debug!(rate = %annual_rate, term_months, "compound factor out of range, using limit payment");
            principal.as_decimal().checked_mul(r)
        }
    };

    let payment = match payment {
        Some(payment) => Money::from_decimal(payment),
        None => {
            warn!(principal = %principal, rate = %annual_rate, "monthly payment out of range");
            Money::from_decimal(Decimal::MAX)
        }
    };
    debug!(
        principal = %principal,
        rate = %annual_rate,
        term_months,
        payment = %payment,
        "computed monthly payment"
    );
    payment
}

/// same as [`compute_monthly_payment`] with the rate as typed on screen (10 for 10%)
pub fn compute_monthly_payment_percent(
    principal: Money,
    annual_rate_percent: Decimal,
    term_months: u32,
) -> Money {
    compute_monthly_payment(principal, Rate::from_percent(annual_rate_percent), term_months)
}

/// (1 + r)^n by repeated multiplication, `None` once it leaves the decimal range
pub(crate) fn compound_factor(r: Decimal, n: u32) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(r)?;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound.checked_mul(base)?;
    }
    Some(compound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_amortization() {
        let payment = compute_monthly_payment(
            Money::from_major(240_000),
            Rate::from_percentage(10),
            36,
        );
        assert_eq!(payment.round_currency(), Money::from_str_exact("7744.12").unwrap());
    }

    #[test]
    fn test_percent_form_matches_rate_form() {
        let a = compute_monthly_payment_percent(Money::from_major(50_000), dec!(7.5), 24);
        let b = compute_monthly_payment(
            Money::from_major(50_000),
            Rate::from_decimal(dec!(0.075)),
            24,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_positive_principal_owes_nothing() {
        for principal in [Money::ZERO, Money::from_major(-1), Money::from_major(-250_000)] {
            for rate in [Rate::ZERO, Rate::from_percentage(12)] {
                assert_eq!(compute_monthly_payment(principal, rate, 36), Money::ZERO);
            }
        }
    }

    #[test]
    fn test_zero_rate_divides_evenly() {
        let payment = compute_monthly_payment(Money::from_major(120_000), Rate::ZERO, 12);
        assert_eq!(payment, Money::from_major(10_000));

        let payment = compute_monthly_payment(Money::from_major(1_000), Rate::ZERO, 3);
        assert_eq!(payment, Money::from_major(1_000) / dec!(3));
    }

    #[test]
    fn test_zero_term_does_not_panic() {
        let payment = compute_monthly_payment(Money::from_major(5_000), Rate::from_percentage(10), 0);
        assert_eq!(payment, Money::from_major(5_000));
    }

    #[test]
    fn test_vehicle_quote_principal() {
        let quote = VehicleLoanQuote {
            vehicle_price: Money::from_major(300_000),
            trade_in_value: Money::from_major(40_000),
            down_payment: Money::from_major(20_000),
            annual_rate: Rate::from_percentage(10),
            term_months: 36,
        };
        assert_eq!(quote.principal(), Money::from_major(240_000));
        let result = quote.amortize();
        assert_eq!(result.display_monthly_payment(), Money::from_str_exact("7744.12").unwrap());
        assert!(result.total_interest() > Money::ZERO);
    }

    #[test]
    fn test_vehicle_quote_fully_covered() {
        let quote = VehicleLoanQuote {
            vehicle_price: Money::from_major(100_000),
            trade_in_value: Money::from_major(80_000),
            down_payment: Money::from_major(30_000),
            annual_rate: Rate::from_percentage(10),
            term_months: 24,
        };
        assert!(quote.principal().is_negative());
        let result = quote.amortize();
        assert!(result.is_fully_covered());
        assert_eq!(result.principal, Money::ZERO);
        assert_eq!(result.total_interest(), Money::ZERO);
    }

    #[test]
    fn test_totals() {
        let result = LoanQuote::new(Money::from_major(12_000), Rate::ZERO, 12).amortize();
        assert_eq!(result.total_payment(), Money::from_major(12_000));
        assert_eq!(result.total_interest(), Money::ZERO);
    }

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(0.1), 2), Some(dec!(1.21)));
        assert_eq!(compound_factor(dec!(0.5), 0), Some(Decimal::ONE));
        assert_eq!(compound_factor(dec!(1), 200), None);
    }

    #[test]
    fn test_huge_rate_uses_limit_payment() {
        // 1000% a year over ten years: (1 + r)^n is far beyond the decimal range
        let principal = Money::from_major(300_000);
        let rate = Rate::from_percentage(1_000);
        let payment = compute_monthly_payment(principal, rate, 120);
        assert_eq!(payment, principal * rate.monthly_rate().as_decimal());

        let result = LoanQuote::new(principal, rate, u32::MAX).amortize();
        assert!(result.total_payment() > principal);
        assert!(result.total_interest() > Money::ZERO);
    }

    #[test]
    fn test_payment_beyond_range_saturates() {
        let principal = Money::from_decimal(Decimal::MAX / dec!(10));
        let payment = compute_monthly_payment(principal, Rate::from_percentage(1_000_000), 12);
        assert_eq!(payment, Money::from_decimal(Decimal::MAX));
        let result = LoanQuote::new(principal, Rate::from_percentage(1_000_000), 12).amortize();
        assert_eq!(result.total_payment(), Money::from_decimal(Decimal::MAX));
    }
}
