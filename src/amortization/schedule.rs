use chrono::{DateTime, Months, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::amortization::compute_monthly_payment;
use crate::decimal::{Money, Rate};

/// scheduled payment in amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: DateTime<Utc>,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// equal-installment amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub start_date: DateTime<Utc>,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule, first payment one month after `start_date`
    pub fn generate(
        principal: Money,
        interest_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
    ) -> Self {
        let payments = if principal <= Money::ZERO {
            Vec::new()
        } else {
            equal_installments(principal, interest_rate, term_months, start_date)
        };

        let total_interest = payments
            .iter()
            .map(|p| p.interest_portion)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_payment = payments
            .iter()
            .map(|p| p.payment_amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        Self {
            principal: principal.max(Money::ZERO),
            interest_rate,
            term_months,
            start_date,
            payments,
            total_interest,
            total_payment,
        }
    }

    /// generate starting from the provider's current time
    pub fn generate_from_now(
        principal: Money,
        interest_rate: Rate,
        term_months: u32,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        Self::generate(principal, interest_rate, term_months, time_provider.now())
    }

    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        if payment_number == 0 {
            return None;
        }
        self.payments.get((payment_number - 1) as usize)
    }

    /// remaining balance after payment
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.principal)
    }

    pub fn maturity_date(&self) -> Option<DateTime<Utc>> {
        self.payments.last().map(|p| p.payment_date)
    }
}

/// every payment equal except the last, which absorbs rounding
fn equal_installments(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    start_date: DateTime<Utc>,
) -> Vec<ScheduledPayment> {
    let monthly_rate = annual_rate.monthly_rate().as_decimal();
    let installment = compute_monthly_payment(principal, annual_rate, term_months).round_currency();

    let mut payments = Vec::new();
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;

    for i in 1..=term_months {
        let payment_date = add_months(start_date, i);
        let interest_portion = Money::from_decimal(balance.as_decimal() * monthly_rate).round_currency();

        let principal_portion = if i == term_months {
            balance
        } else {
            (installment - interest_portion).min(balance)
        };
        let payment_amount = principal_portion + interest_portion;

        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;

        let ending_balance = balance - principal_portion;

        payments.push(ScheduledPayment {
            payment_number: i,
            payment_date,
            beginning_balance: balance,
            payment_amount,
            principal_portion,
            interest_portion,
            ending_balance,
            cumulative_interest,
            cumulative_principal,
        });

        balance = ending_balance;
    }

    payments
}

/// add calendar months, clamping to the last day of shorter months
fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}
