use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::commodity::{CommodityLoanParameters, SackLimitTable};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{LoanCategory, LoanTypeId};

/// loan product as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTypeRecord {
    /// assigned by the backend on creation
    #[serde(default)]
    pub id: Option<LoanTypeId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub annual_rate: Rate,
    pub max_term_months: u32,
    pub kind: LoanKind,
}

/// what the loan finances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanKind {
    /// cash loan for a requested amount
    Regular,
    /// vehicle purchase net of trade-in and down payment
    Vehicle,
    /// sack-based commodity loan
    Commodity(CommodityConfig),
}

/// commodity settings of a loan type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityConfig {
    pub category: LoanCategory,
    pub parameters: CommodityLoanParameters,
}

impl LoanTypeRecord {
    /// create regular cash loan type
    pub fn regular(name: &str, annual_rate: Rate, max_term_months: u32) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: String::new(),
            annual_rate,
            max_term_months,
            kind: LoanKind::Regular,
        }
    }

    /// create vehicle loan type
    pub fn vehicle(name: &str, annual_rate: Rate, max_term_months: u32) -> Self {
        Self {
            kind: LoanKind::Vehicle,
            ..Self::regular(name, annual_rate, max_term_months)
        }
    }

    /// create feeds loan type
    pub fn feeds(
        name: &str,
        annual_rate: Rate,
        max_term_months: u32,
        parameters: CommodityLoanParameters,
    ) -> Self {
        Self::commodity(name, annual_rate, max_term_months, LoanCategory::Feeds, parameters)
    }

    /// create rice loan type
    pub fn rice(
        name: &str,
        annual_rate: Rate,
        max_term_months: u32,
        parameters: CommodityLoanParameters,
    ) -> Self {
        Self::commodity(name, annual_rate, max_term_months, LoanCategory::Rice, parameters)
    }

    fn commodity(
        name: &str,
        annual_rate: Rate,
        max_term_months: u32,
        category: LoanCategory,
        parameters: CommodityLoanParameters,
    ) -> Self {
        Self {
            kind: LoanKind::Commodity(CommodityConfig { category, parameters }),
            ..Self::regular(name, annual_rate, max_term_months)
        }
    }

    pub fn with_id(mut self, id: LoanTypeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn is_commodity(&self) -> bool {
        matches!(self.kind, LoanKind::Commodity(_))
    }

    pub fn commodity_config(&self) -> Option<&CommodityConfig> {
        match &self.kind {
            LoanKind::Commodity(config) => Some(config),
            _ => None,
        }
    }

    /// check the record before it is sent to the backend
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LoanError::MissingField { field: "name" });
        }
        if self.annual_rate < Rate::ZERO {
            return Err(LoanError::InvalidInterestRate {
                rate: self.annual_rate,
            });
        }
        if self.max_term_months == 0 {
            return Err(LoanError::InvalidTerm {
                months: self.max_term_months,
            });
        }
        if let Some(config) = self.commodity_config() {
            config.parameters.validate()?;
        }
        Ok(())
    }

    /// parse one record from a backend response
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// parse the `GET /api/loan-types` list
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// defaults and tables shared by the calculator screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// rate pre-filled in the calculator widget, as a percentage
    pub default_rate_percent: Decimal,
    pub default_term_months: u32,
    /// terms offered in the widget's term selector
    pub term_options: Vec<u32>,
    /// longest term the widget will calculate
    #[serde(default = "default_max_term_months")]
    pub max_term_months: u32,
    /// highest annual rate the widget accepts, as a percentage
    #[serde(default = "default_max_rate_percent")]
    pub max_rate_percent: Decimal,
    /// largest amount the widget accepts in any money field
    #[serde(default = "default_maximum_amount")]
    pub maximum_amount: Money,
    /// smallest amount the application form accepts for a regular loan
    pub minimum_loan_amount: Money,
    #[serde(default)]
    pub sack_limits: SackLimitTable,
}

fn default_max_term_months() -> u32 {
    600
}

fn default_max_rate_percent() -> Decimal {
    Decimal::ONE_HUNDRED
}

fn default_maximum_amount() -> Money {
    Money::from_major(1_000_000_000_000)
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_rate_percent: Decimal::from(10),
            default_term_months: 36,
            term_options: vec![12, 24, 36, 48, 60],
            max_term_months: default_max_term_months(),
            max_rate_percent: default_max_rate_percent(),
            maximum_amount: default_maximum_amount(),
            minimum_loan_amount: Money::ZERO,
            sack_limits: SackLimitTable::default(),
        }
    }
}

impl CalculatorConfig {
    /// load from JSON, missing sack limits fall back to the standing table
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_rate_percent < Decimal::ZERO {
            return Err(LoanError::InvalidInterestRate {
                rate: Rate::from_percent(self.default_rate_percent),
            });
        }
        if self.default_term_months == 0 || self.term_options.iter().any(|t| *t == 0) {
            return Err(LoanError::InvalidConfiguration {
                message: "terms must be at least one month".to_string(),
            });
        }
        if self.default_term_months > self.max_term_months
            || self.term_options.iter().any(|t| *t > self.max_term_months)
        {
            return Err(LoanError::InvalidConfiguration {
                message: format!("terms must not exceed {} months", self.max_term_months),
            });
        }
        if self.default_rate_percent > self.max_rate_percent {
            return Err(LoanError::InvalidConfiguration {
                message: format!("default rate above the {}% ceiling", self.max_rate_percent),
            });
        }
        if !self.maximum_amount.is_positive() || self.minimum_loan_amount > self.maximum_amount {
            return Err(LoanError::InvalidConfiguration {
                message: "maximum amount must be positive and above the minimum".to_string(),
            });
        }
        if self.minimum_loan_amount.is_negative() {
            return Err(LoanError::InvalidAmount {
                amount: self.minimum_loan_amount,
            });
        }
        Ok(())
    }
}
