use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::UnitEntry;

/// commodity terms carried by a loan type record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityLoanParameters {
    pub price_per_unit: Money,
    pub max_units: u32,
    /// share of commodity value that may be borrowed, 0 to 100
    pub loan_to_value_percent: Decimal,
}

impl CommodityLoanParameters {
    pub fn new(price_per_unit: Money, max_units: u32, loan_to_value_percent: Decimal) -> Self {
        Self {
            price_per_unit,
            max_units,
            loan_to_value_percent,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.price_per_unit.is_negative() {
            return Err(LoanError::InvalidAmount {
                amount: self.price_per_unit,
            });
        }
        if self.loan_to_value_percent < Decimal::ZERO
            || self.loan_to_value_percent > Decimal::ONE_HUNDRED
        {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "loan-to-value must be between 0 and 100, got {}",
                    self.loan_to_value_percent
                ),
            });
        }
        Ok(())
    }

    /// clamp a requested unit count against this loan type's ceiling
    pub fn clamp(&self, requested: u32) -> UnitEntry {
        clamp_units(requested, self.max_units)
    }

    /// loanable amount for `units`, after clamping to `max_units`
    pub fn loanable_amount(&self, units: u32) -> Money {
        let units = self.clamp(units).units();
        loanable(self.price_per_unit, units, self.loan_to_value_percent)
    }

    /// full commodity value before the loan-to-value haircut
    pub fn commodity_value(&self, units: u32) -> Money {
        self.price_per_unit.times(self.clamp(units).units())
    }
}

/// price x units x loan-to-value / 100; any unset input yields zero
pub fn compute_loanable_amount(
    price_per_unit: Option<Money>,
    units: Option<u32>,
    loan_to_value_percent: Option<Decimal>,
) -> Money {
    match (price_per_unit, units, loan_to_value_percent) {
        (Some(price), Some(units), Some(percent)) => loanable(price, units, percent),
        _ => Money::ZERO,
    }
}

fn loanable(price_per_unit: Money, units: u32, loan_to_value_percent: Decimal) -> Money {
    let amount = price_per_unit.times(units).percentage(loan_to_value_percent);
    debug!(
        price = %price_per_unit,
        units,
        ltv = %loan_to_value_percent,
        amount = %amount,
        "computed loanable amount"
    );
    amount
}

/// accept `requested` or reset it to `maximum`
pub fn clamp_units(requested: u32, maximum: u32) -> UnitEntry {
    if requested > maximum {
        warn!(requested, maximum, "unit entry above limit, resetting to maximum");
        UnitEntry::Clamped { requested, maximum }
    } else {
        UnitEntry::Accepted(requested)
    }
}
