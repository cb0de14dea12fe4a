//! request descriptions handed to the host for sending
//!
//! The backend is reached over plain JSON/HTTP by whoever embeds these
//! forms; this module only describes what to send.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;
use crate::types::LoanTypeId;

pub const LOAN_TYPES_PATH: &str = "/api/loan-types";
pub const LOAN_APPLICATION_PATH: &str = "/api/loan-application";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

/// one REST call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// `GET /api/loan-types`
    pub fn list_loan_types() -> Self {
        Self {
            method: HttpMethod::Get,
            path: LOAN_TYPES_PATH.to_string(),
            body: None,
        }
    }

    /// `POST /api/loan-types`
    pub fn create_loan_type<T: Serialize>(body: &T) -> Result<Self> {
        Ok(Self {
            method: HttpMethod::Post,
            path: LOAN_TYPES_PATH.to_string(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// `PUT /api/loan-types/:id`
    pub fn update_loan_type<T: Serialize>(id: LoanTypeId, body: &T) -> Result<Self> {
        Ok(Self {
            method: HttpMethod::Put,
            path: format!("{}/{}", LOAN_TYPES_PATH, id),
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// `POST /api/loan-application`
    pub fn submit_application<T: Serialize>(body: &T) -> Result<Self> {
        Ok(Self {
            method: HttpMethod::Post,
            path: LOAN_APPLICATION_PATH.to_string(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// body serialized for the wire
    pub fn body_json(&self) -> Result<Option<String>> {
        self.body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(Into::into)
    }
}
