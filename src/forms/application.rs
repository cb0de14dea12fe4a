use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::amortization::{compute_monthly_payment, VehicleLoanQuote};
use crate::api::ApiRequest;
use crate::commodity::{clamp_units, SackLimitTable};
use crate::config::{CalculatorConfig, LoanKind, LoanTypeRecord};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{FormEvent, FormKind};
use crate::forms::FormState;
use crate::types::{
    ApplicationId, FormPhase, LoanCategory, LoanTypeId, StatementOfPurpose, UnitEntry,
};

/// loan-type-specific part of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanDetails {
    Regular {
        requested_amount: Money,
    },
    Vehicle {
        vehicle_price: Money,
        trade_in_value: Money,
        down_payment: Money,
    },
    Commodity {
        category: LoanCategory,
        units: u32,
        max_units: u32,
        price_per_unit: Money,
        loan_to_value_percent: Decimal,
        loanable_amount: Money,
    },
}

/// one validated application, the body of `POST /api/loan-application`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub member_id: String,
    pub applicant_name: String,
    pub loan_type_id: Option<LoanTypeId>,
    pub loan_type_name: String,
    pub statement_of_purpose: Option<StatementOfPurpose>,
    pub share_capital: Option<Money>,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub details: LoanDetails,
    /// amount actually borrowed
    pub principal: Money,
    /// estimate at the loan type's rate, rounded for display
    pub monthly_payment: Money,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
struct VehicleFields {
    price: Option<Money>,
    trade_in_value: Money,
    down_payment: Money,
}

/// member-facing application screen bound to one loan type
#[derive(Debug)]
pub struct LoanApplicationForm {
    state: FormState,
    loan_type: LoanTypeRecord,
    sack_limits: SackLimitTable,
    minimum_loan_amount: Money,
    member_id: String,
    applicant_name: String,
    purpose: Option<StatementOfPurpose>,
    share_capital: Option<Money>,
    term_months: Option<u32>,
    requested_amount: Option<Money>,
    units: u32,
    vehicle: VehicleFields,
}

impl LoanApplicationForm {
    pub fn new(loan_type: LoanTypeRecord, config: &CalculatorConfig) -> Self {
        Self {
            state: FormState::new(FormKind::LoanApplication),
            loan_type,
            sack_limits: config.sack_limits.clone(),
            minimum_loan_amount: config.minimum_loan_amount,
            member_id: String::new(),
            applicant_name: String::new(),
            purpose: None,
            share_capital: None,
            term_months: None,
            requested_amount: None,
            units: 0,
            vehicle: VehicleFields::default(),
        }
    }

    pub fn loan_type(&self) -> &LoanTypeRecord {
        &self.loan_type
    }

    pub fn phase(&self) -> &FormPhase {
        self.state.phase()
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn set_applicant(&mut self, member_id: &str, name: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.member_id = member_id.trim().to_string();
        self.applicant_name = name.trim().to_string();
        Ok(())
    }

    pub fn set_term_months(&mut self, months: u32, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.term_months = Some(months);
        Ok(())
    }

    pub fn set_requested_amount(&mut self, amount: Money, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.requested_amount = Some(amount);
        Ok(())
    }

    pub fn set_vehicle(
        &mut self,
        price: Money,
        trade_in_value: Money,
        down_payment: Money,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        self.state.begin_edit(time)?;
        self.vehicle = VehicleFields {
            price: Some(price),
            trade_in_value,
            down_payment,
        };
        Ok(())
    }

    /// statement of purpose; may lower the sack limit
    pub fn set_purpose(&mut self, purpose: StatementOfPurpose, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.purpose = Some(purpose);
        self.reclamp(time);
        Ok(())
    }

    /// member's share capital; may lower the sack limit
    pub fn set_share_capital(&mut self, share_capital: Money, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.share_capital = Some(share_capital);
        self.reclamp(time);
        Ok(())
    }

    /// most sacks this member may borrow under this loan type
    ///
    /// The smaller of the tier table and the loan type's own ceiling. Zero
    /// until purpose and share capital are known.
    pub fn max_units(&self) -> u32 {
        let Some(config) = self.loan_type.commodity_config() else {
            return 0;
        };
        match (self.share_capital, self.purpose) {
            (Some(share_capital), Some(purpose)) => self
                .sack_limits
                .max_units(share_capital, config.category, purpose)
                .min(config.parameters.max_units),
            _ => 0,
        }
    }

    /// type a sack count; anything above the limit resets the field to the limit
    pub fn enter_units(&mut self, requested: u32, time: &SafeTimeProvider) -> Result<UnitEntry> {
        if !self.loan_type.is_commodity() {
            return Err(LoanError::NotCommodityLoan {
                name: self.loan_type.name.clone(),
            });
        }
        self.state.begin_edit(time)?;
        let entry = clamp_units(requested, self.max_units());
        self.apply_units(entry, time);
        Ok(entry)
    }

    /// loanable amount for the sacks currently entered
    pub fn loanable_amount(&self) -> Money {
        match self.loan_type.commodity_config() {
            Some(config) => config.parameters.loanable_amount(self.units),
            None => Money::ZERO,
        }
    }

    /// amount to be borrowed given the fields so far
    pub fn principal(&self) -> Money {
        match &self.loan_type.kind {
            LoanKind::Regular => self.requested_amount.unwrap_or(Money::ZERO),
            LoanKind::Vehicle => self.vehicle_quote().map_or(Money::ZERO, |q| q.principal()),
            LoanKind::Commodity(_) => self.loanable_amount(),
        }
    }

    /// monthly payment at the loan type's rate, zero until a term is chosen
    pub fn monthly_payment_estimate(&self) -> Money {
        match self.term_months {
            Some(term) if term > 0 => {
                compute_monthly_payment(self.principal(), self.loan_type.annual_rate, term)
            }
            _ => Money::ZERO,
        }
    }

    /// validate the fields into one immutable application
    pub fn validate(&mut self, time: &SafeTimeProvider) -> Result<LoanApplication> {
        self.state.start_validation(time)?;
        let outcome = self.build(time);
        let application = self.state.settle(outcome, time)?;
        self.state.finish_validation(time)?;
        Ok(application)
    }

    /// validate and produce the submission request
    pub fn submit(&mut self, time: &SafeTimeProvider) -> Result<(LoanApplication, ApiRequest)> {
        self.state.start_validation(time)?;
        let outcome = self.build(time).and_then(|application| {
            let request = ApiRequest::submit_application(&application)?;
            Ok((application, request))
        });
        let (application, request) = self.state.settle(outcome, time)?;
        self.state.start_submit(time)?;

        info!(
            application_id = %application.id,
            member_id = %application.member_id,
            loan_type = %application.loan_type_name,
            principal = %application.principal,
            "submitting loan application"
        );
        self.state.events_mut().emit(FormEvent::ApplicationSubmitted {
            application_id: application.id,
            loan_type_id: application.loan_type_id,
            amount: application.principal,
            timestamp: time.now(),
        });
        Ok((application, request))
    }

    /// record the backend's answer
    pub fn complete(&mut self, outcome: std::result::Result<(), String>, time: &SafeTimeProvider) -> Result<()> {
        self.state.complete(outcome, time)
    }

    pub fn take_events(&mut self) -> Vec<FormEvent> {
        self.state.take_events()
    }

    fn vehicle_quote(&self) -> Option<VehicleLoanQuote> {
        let price = self.vehicle.price?;
        Some(VehicleLoanQuote {
            vehicle_price: price,
            trade_in_value: self.vehicle.trade_in_value,
            down_payment: self.vehicle.down_payment,
            annual_rate: self.loan_type.annual_rate,
            term_months: self.term_months.unwrap_or(0),
        })
    }

    fn reclamp(&mut self, time: &SafeTimeProvider) {
        if self.loan_type.is_commodity() {
            let entry = clamp_units(self.units, self.max_units());
            self.apply_units(entry, time);
        }
    }

    fn apply_units(&mut self, entry: UnitEntry, time: &SafeTimeProvider) {
        if let UnitEntry::Clamped { requested, maximum } = entry {
            self.state.events_mut().emit(FormEvent::UnitsClamped {
                requested,
                maximum,
                timestamp: time.now(),
            });
        }
        if entry.units() != self.units {
            self.units = entry.units();
            let amount = self.loanable_amount();
            self.state.events_mut().emit(FormEvent::LoanableAmountChanged {
                units: self.units,
                amount,
                timestamp: time.now(),
            });
        }
    }

    fn build(&self, time: &SafeTimeProvider) -> Result<LoanApplication> {
        if self.member_id.is_empty() {
            return Err(LoanError::MissingField { field: "member_id" });
        }
        if self.applicant_name.is_empty() {
            return Err(LoanError::MissingField { field: "applicant_name" });
        }
        let term_months = self
            .term_months
            .ok_or(LoanError::MissingField { field: "term_months" })?;
        if term_months == 0 || term_months > self.loan_type.max_term_months {
            return Err(LoanError::InvalidTerm { months: term_months });
        }

        let details = match &self.loan_type.kind {
            LoanKind::Regular => {
                let amount = self
                    .requested_amount
                    .ok_or(LoanError::MissingField { field: "requested_amount" })?;
                if !amount.is_positive() || amount < self.minimum_loan_amount {
                    return Err(LoanError::InvalidAmount { amount });
                }
                LoanDetails::Regular {
                    requested_amount: amount,
                }
            }
            LoanKind::Vehicle => {
                let quote = self
                    .vehicle_quote()
                    .ok_or(LoanError::MissingField { field: "vehicle_price" })?;
                for amount in [quote.vehicle_price, quote.trade_in_value, quote.down_payment] {
                    if amount.is_negative() {
                        return Err(LoanError::InvalidAmount { amount });
                    }
                }
                if !quote.principal().is_positive() {
                    return Err(LoanError::InvalidAmount {
                        amount: quote.principal(),
                    });
                }
                LoanDetails::Vehicle {
                    vehicle_price: quote.vehicle_price,
                    trade_in_value: quote.trade_in_value,
                    down_payment: quote.down_payment,
                }
            }
            LoanKind::Commodity(config) => {
                if self.purpose.is_none() {
                    return Err(LoanError::MissingField { field: "statement_of_purpose" });
                }
                if self.share_capital.is_none() {
                    return Err(LoanError::MissingField { field: "share_capital" });
                }
                let max_units = self.max_units();
                if self.units == 0 {
                    return Err(LoanError::InvalidInput {
                        message: format!("enter between 1 and {} sacks", max_units),
                    });
                }
                if self.units > max_units {
                    return Err(LoanError::UnitsExceedLimit {
                        requested: self.units,
                        maximum: max_units,
                    });
                }
                LoanDetails::Commodity {
                    category: config.category,
                    units: self.units,
                    max_units,
                    price_per_unit: config.parameters.price_per_unit,
                    loan_to_value_percent: config.parameters.loan_to_value_percent,
                    loanable_amount: self.loanable_amount(),
                }
            }
        };

        let principal = self.principal();
        Ok(LoanApplication {
            id: Uuid::new_v4(),
            member_id: self.member_id.clone(),
            applicant_name: self.applicant_name.clone(),
            loan_type_id: self.loan_type.id,
            loan_type_name: self.loan_type.name.clone(),
            statement_of_purpose: self.purpose,
            share_capital: self.share_capital,
            annual_rate: self.loan_type.annual_rate,
            term_months,
            details,
            principal,
            monthly_payment: compute_monthly_payment(principal, self.loan_type.annual_rate, term_months)
                .round_currency(),
            submitted_at: time.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpMethod;
    use crate::commodity::CommodityLoanParameters;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 4, 10, 14, 0, 0).unwrap()))
    }

    fn rice_loan() -> LoanTypeRecord {
        LoanTypeRecord::rice(
            "Rice Loan",
            Rate::from_percentage(12),
            6,
            CommodityLoanParameters::new(Money::from_major(2_400), 40, dec!(80)),
        )
        .with_id(5)
    }

    fn rice_form(time: &SafeTimeProvider) -> LoanApplicationForm {
        let mut form = LoanApplicationForm::new(rice_loan(), &CalculatorConfig::default());
        form.set_applicant("M-0042", "Dela Cruz, Juan", time).unwrap();
        form.set_term_months(6, time).unwrap();
        form
    }

    #[test]
    fn test_limit_unknown_until_purpose_and_capital() {
        let time = time();
        let mut form = rice_form(&time);
        assert_eq!(form.max_units(), 0);
        form.set_purpose(StatementOfPurpose::Personal, &time).unwrap();
        assert_eq!(form.max_units(), 0);
        form.set_share_capital(Money::from_major(6_000), &time).unwrap();
        assert_eq!(form.max_units(), 4);
    }

    #[test]
    fn test_units_clamped_to_limit() {
        let time = time();
        let mut form = rice_form(&time);
        form.set_purpose(StatementOfPurpose::Personal, &time).unwrap();
        form.set_share_capital(Money::from_major(5_999), &time).unwrap();

        let entry = form.enter_units(3, &time).unwrap();
        assert_eq!(entry, UnitEntry::Clamped { requested: 3, maximum: 2 });
        assert_eq!(form.units(), 2);
        // 2 sacks x 2400 x 80%
        assert_eq!(form.loanable_amount(), Money::from_major(3_840));

        let events = form.take_events();
        assert!(events.iter().any(|e| matches!(e, FormEvent::UnitsClamped { requested: 3, maximum: 2, .. })));
    }

    #[test]
    fn test_loan_type_ceiling_caps_table() {
        let time = time();
        let mut form = rice_form(&time);
        form.set_purpose(StatementOfPurpose::Business, &time).unwrap();
        form.set_share_capital(Money::from_major(25_000), &time).unwrap();
        // table says 50, loan type allows 40
        assert_eq!(form.max_units(), 40);
    }

    #[test]
    fn test_lowering_capital_reclamps_units() {
        let time = time();
        let mut form = rice_form(&time);
        form.set_purpose(StatementOfPurpose::Business, &time).unwrap();
        form.set_share_capital(Money::from_major(20_000), &time).unwrap();
        assert_eq!(form.enter_units(30, &time).unwrap(), UnitEntry::Accepted(30));

        form.set_purpose(StatementOfPurpose::Personal, &time).unwrap();
        assert_eq!(form.units(), 4);
    }

    #[test]
    fn test_commodity_submission() {
        let time = time();
        let mut form = rice_form(&time);
        form.set_purpose(StatementOfPurpose::Business, &time).unwrap();
        form.set_share_capital(Money::from_major(20_000), &time).unwrap();
        form.enter_units(10, &time).unwrap();

        let (application, request) = form.submit(&time).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/api/loan-application");
        assert_eq!(application.principal, Money::from_major(19_200));
        assert_eq!(application.loan_type_id, Some(5));
        assert_eq!(application.submitted_at, time.now());
        assert!(application.monthly_payment > Money::from_major(3_200));
        match &application.details {
            LoanDetails::Commodity { units, max_units, loanable_amount, .. } => {
                assert_eq!(*units, 10);
                assert_eq!(*max_units, 30);
                assert_eq!(*loanable_amount, Money::from_major(19_200));
            }
            other => panic!("unexpected details {:?}", other),
        }

        let body = request.body.unwrap();
        assert_eq!(body["details"]["type"], "commodity");
        assert_eq!(body["statement_of_purpose"], "business");
        assert_eq!(form.phase(), &FormPhase::Submitting);

        form.complete(Ok(()), &time).unwrap();
        assert_eq!(form.phase(), &FormPhase::Succeeded);
    }

    #[test]
    fn test_commodity_requires_sacks() {
        let time = time();
        let mut form = rice_form(&time);
        form.set_purpose(StatementOfPurpose::Business, &time).unwrap();
        form.set_share_capital(Money::from_major(10_000), &time).unwrap();
        assert_eq!(form.max_units(), 0);
        assert_eq!(form.enter_units(5, &time).unwrap().units(), 0);
        assert!(matches!(form.validate(&time), Err(LoanError::InvalidInput { .. })));
        assert!(matches!(form.phase(), FormPhase::Failed { .. }));
    }

    #[test]
    fn test_regular_loan() {
        let time = time();
        let loan_type = LoanTypeRecord::regular("Salary Loan", Rate::from_percentage(10), 36).with_id(1);
        let mut form = LoanApplicationForm::new(loan_type, &CalculatorConfig::default());
        form.set_applicant("M-7", "Santos, Ana", &time).unwrap();
        form.set_term_months(36, &time).unwrap();
        form.set_requested_amount(Money::from_major(240_000), &time).unwrap();

        assert!(matches!(form.enter_units(1, &time), Err(LoanError::NotCommodityLoan { .. })));

        let application = form.validate(&time).unwrap();
        assert_eq!(application.monthly_payment, Money::from_str_exact("7744.12").unwrap());
        assert_eq!(form.phase(), &FormPhase::Editing);
    }

    #[test]
    fn test_term_outside_loan_type() {
        let time = time();
        let loan_type = LoanTypeRecord::regular("Salary Loan", Rate::from_percentage(10), 12);
        let mut form = LoanApplicationForm::new(loan_type, &CalculatorConfig::default());
        form.set_applicant("M-7", "Santos, Ana", &time).unwrap();
        form.set_requested_amount(Money::from_major(10_000), &time).unwrap();
        form.set_term_months(24, &time).unwrap();
        assert!(matches!(form.validate(&time), Err(LoanError::InvalidTerm { months: 24 })));
    }

    #[test]
    fn test_vehicle_loan_needs_balance() {
        let time = time();
        let loan_type = LoanTypeRecord::vehicle("Car Loan", Rate::from_percentage(10), 60);
        let mut form = LoanApplicationForm::new(loan_type, &CalculatorConfig::default());
        form.set_applicant("M-9", "Reyes, Lito", &time).unwrap();
        form.set_term_months(36, &time).unwrap();
        form.set_vehicle(
            Money::from_major(100_000),
            Money::from_major(60_000),
            Money::from_major(40_000),
            &time,
        )
        .unwrap();
        assert_eq!(form.monthly_payment_estimate(), Money::ZERO);
        assert!(matches!(form.validate(&time), Err(LoanError::InvalidAmount { .. })));

        form.set_vehicle(
            Money::from_major(300_000),
            Money::from_major(40_000),
            Money::from_major(20_000),
            &time,
        )
        .unwrap();
        let application = form.validate(&time).unwrap();
        assert_eq!(application.principal, Money::from_major(240_000));
        assert_eq!(application.monthly_payment, Money::from_str_exact("7744.12").unwrap());
    }

    #[test]
    fn test_vehicle_amounts_must_not_be_negative() {
        let time = time();
        let loan_type = LoanTypeRecord::vehicle("Car Loan", Rate::from_percentage(10), 60);
        let mut form = LoanApplicationForm::new(loan_type, &CalculatorConfig::default());
        form.set_applicant("M-9", "Reyes, Lito", &time).unwrap();
        form.set_term_months(36, &time).unwrap();

        // a negative trade-in would finance more than the vehicle costs
        form.set_vehicle(Money::from_major(300_000), Money::from_major(-50_000), Money::ZERO, &time)
            .unwrap();
        let err = form.validate(&time).unwrap_err();
        assert!(matches!(err, LoanError::InvalidAmount { amount } if amount == Money::from_major(-50_000)));
        assert!(matches!(form.phase(), FormPhase::Failed { .. }));

        form.set_vehicle(Money::from_major(300_000), Money::ZERO, Money::from_major(-1), &time)
            .unwrap();
        assert!(matches!(form.submit(&time), Err(LoanError::InvalidAmount { .. })));

        form.set_vehicle(Money::from_major(-300_000), Money::ZERO, Money::ZERO, &time)
            .unwrap();
        assert!(matches!(form.validate(&time), Err(LoanError::InvalidAmount { .. })));

        form.set_vehicle(Money::from_major(300_000), Money::from_major(50_000), Money::ZERO, &time)
            .unwrap();
        assert_eq!(form.validate(&time).unwrap().principal, Money::from_major(250_000));
    }

    #[test]
    fn test_missing_applicant() {
        let time = time();
        let mut form = LoanApplicationForm::new(rice_loan(), &CalculatorConfig::default());
        assert!(matches!(
            form.submit(&time),
            Err(LoanError::MissingField { field: "member_id" })
        ));
    }
}
