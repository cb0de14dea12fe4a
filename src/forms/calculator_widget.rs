use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::{AmortizationResult, AmortizationSchedule, VehicleLoanQuote};
use crate::config::CalculatorConfig;
use crate::decimal::{parse_amount, Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{FormEvent, FormKind};
use crate::forms::{FormState, INVALID_FIELDS_MESSAGE};
use crate::types::FormPhase;

/// vehicle loan calculator: price, trade-in and down payment to a monthly figure
#[derive(Debug)]
pub struct LoanCalculatorWidget {
    state: FormState,
    vehicle_price: String,
    trade_in_value: String,
    down_payment: String,
    rate_percent: String,
    term_months: String,
    term_options: Vec<u32>,
    max_term_months: u32,
    max_rate_percent: Decimal,
    maximum_amount: Decimal,
    last_result: Option<WidgetResult>,
}

/// what the widget displays after a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetResult {
    pub quote: VehicleLoanQuote,
    pub amortization: AmortizationResult,
}

impl WidgetResult {
    pub fn monthly_payment(&self) -> Money {
        self.amortization.display_monthly_payment()
    }

    pub fn total_payment(&self) -> Money {
        self.amortization.display_total_payment()
    }

    pub fn total_interest(&self) -> Money {
        self.amortization.display_total_interest()
    }

    /// month-by-month breakdown of the same loan
    pub fn schedule(&self, start_date: DateTime<Utc>) -> AmortizationSchedule {
        AmortizationSchedule::generate(
            self.quote.principal(),
            self.quote.annual_rate,
            self.quote.term_months,
            start_date,
        )
    }
}

impl LoanCalculatorWidget {
    /// blank widget with the configured rate and term pre-filled
    pub fn new(config: &CalculatorConfig) -> Self {
        Self {
            state: FormState::new(FormKind::LoanCalculator),
            vehicle_price: String::new(),
            trade_in_value: String::new(),
            down_payment: String::new(),
            rate_percent: config.default_rate_percent.normalize().to_string(),
            term_months: config.default_term_months.to_string(),
            term_options: config.term_options.clone(),
            max_term_months: config.max_term_months,
            max_rate_percent: config.max_rate_percent,
            maximum_amount: config.maximum_amount.as_decimal(),
            last_result: None,
        }
    }

    pub fn phase(&self) -> &FormPhase {
        self.state.phase()
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    /// terms offered in the term selector
    pub fn term_options(&self) -> &[u32] {
        &self.term_options
    }

    /// pick one of the offered terms
    pub fn select_term(&mut self, months: u32, time: &SafeTimeProvider) -> Result<()> {
        if !self.term_options.contains(&months) {
            return Err(LoanError::InvalidTerm { months });
        }
        self.set_term_months(&months.to_string(), time)
    }

    pub fn last_result(&self) -> Option<&WidgetResult> {
        self.last_result.as_ref()
    }

    pub fn set_vehicle_price(&mut self, input: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.vehicle_price = input.to_string();
        Ok(())
    }

    pub fn set_trade_in_value(&mut self, input: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.trade_in_value = input.to_string();
        Ok(())
    }

    pub fn set_down_payment(&mut self, input: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.down_payment = input.to_string();
        Ok(())
    }

    pub fn set_rate_percent(&mut self, input: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.rate_percent = input.to_string();
        Ok(())
    }

    pub fn set_term_months(&mut self, input: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.term_months = input.to_string();
        Ok(())
    }

    /// parse the fields into a quote
    ///
    /// Trade-in and down payment may be left blank (none offered); every
    /// other field must be a number. Term, rate and amounts must fall within
    /// the configured bounds.
    pub fn quote(&self) -> Result<VehicleLoanQuote> {
        let vehicle_price = parse_amount(&self.vehicle_price).ok_or_else(invalid_fields)?;
        let trade_in_value = optional_amount(&self.trade_in_value)?;
        let down_payment = optional_amount(&self.down_payment)?;
        let rate_percent = parse_amount(&self.rate_percent).ok_or_else(invalid_fields)?;
        let term_months: u32 = self.term_months.trim().parse().map_err(|_| invalid_fields())?;

        if term_months == 0 || term_months > self.max_term_months {
            return Err(invalid_fields());
        }
        if rate_percent < Decimal::ZERO || rate_percent > self.max_rate_percent {
            return Err(invalid_fields());
        }
        let amount_in_range = |amount: Decimal| amount >= Decimal::ZERO && amount <= self.maximum_amount;
        if ![vehicle_price, trade_in_value, down_payment].into_iter().all(amount_in_range) {
            return Err(invalid_fields());
        }

        Ok(VehicleLoanQuote {
            vehicle_price: Money::from_decimal(vehicle_price),
            trade_in_value: Money::from_decimal(trade_in_value),
            down_payment: Money::from_decimal(down_payment),
            annual_rate: Rate::from_percent(rate_percent),
            term_months,
        })
    }

    /// validate and compute; a failed calculation leaves the widget editable
    pub fn calculate(&mut self, time: &SafeTimeProvider) -> Result<WidgetResult> {
        self.state.start_validation(time)?;

        let outcome = self.quote();
        if outcome.is_err() {
            self.last_result = None;
        }
        let quote = self.state.settle(outcome, time)?;

        let result = WidgetResult {
            quote,
            amortization: quote.amortize(),
        };
        debug!(
            principal = %quote.principal(),
            monthly = %result.monthly_payment(),
            "vehicle loan calculated"
        );
        self.state.events_mut().emit(FormEvent::PaymentCalculated {
            principal: result.amortization.principal,
            monthly_payment: result.monthly_payment(),
            term_months: quote.term_months,
            timestamp: time.now(),
        });
        self.state.finish_validation(time)?;
        self.last_result = Some(result);
        Ok(result)
    }

    pub fn take_events(&mut self) -> Vec<FormEvent> {
        self.state.take_events()
    }
}

fn invalid_fields() -> LoanError {
    LoanError::InvalidInput {
        message: INVALID_FIELDS_MESSAGE.to_string(),
    }
}

/// blank is zero, garbage is an error
fn optional_amount(input: &str) -> Result<Decimal> {
    if input.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_amount(input).ok_or_else(invalid_fields)
}
