use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::FormPhase;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid term: {months} months")]
    InvalidTerm {
        months: u32,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("units exceed limit: requested {requested}, maximum {maximum}")]
    UnitsExceedLimit {
        requested: u32,
        maximum: u32,
    },

    #[error("loan type is not a commodity loan: {name}")]
    NotCommodityLoan {
        name: String,
    },

    #[error("missing field: {field}")]
    MissingField {
        field: &'static str,
    },

    #[error("invalid state: current {current:?}, expected {expected}")]
    InvalidState {
        current: FormPhase,
        expected: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoanError>;
