use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// backend identifier of a loan type record
pub type LoanTypeId = u64;

/// unique identifier for a loan application
pub type ApplicationId = Uuid;

/// commodity loan purpose category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanCategory {
    Feeds,
    Rice,
}

impl fmt::Display for LoanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanCategory::Feeds => write!(f, "feeds"),
            LoanCategory::Rice => write!(f, "rice"),
        }
    }
}

/// statement of purpose declared on the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementOfPurpose {
    Personal,
    Business,
}

impl fmt::Display for StatementOfPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOfPurpose::Personal => write!(f, "personal"),
            StatementOfPurpose::Business => write!(f, "business"),
        }
    }
}

/// lifecycle of a data-entry form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormPhase {
    /// nothing entered yet
    Idle,
    /// user is changing fields
    Editing,
    /// fields are being checked
    Validating,
    /// request handed to the host for sending
    Submitting,
    /// backend accepted the request
    Succeeded,
    /// backend or validation rejected the request, form is editable again
    Failed { message: String },
}

impl FormPhase {
    /// whether field edits are accepted in this phase
    pub fn accepts_edits(&self) -> bool {
        matches!(
            self,
            FormPhase::Idle | FormPhase::Editing | FormPhase::Succeeded | FormPhase::Failed { .. }
        )
    }
}

/// outcome of entering a unit (sack) count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEntry {
    /// within the limit, kept as typed
    Accepted(u32),
    /// above the limit, input must be reset to `maximum`
    Clamped { requested: u32, maximum: u32 },
}

impl UnitEntry {
    /// the unit count the form should now display
    pub fn units(&self) -> u32 {
        match self {
            UnitEntry::Accepted(units) => *units,
            UnitEntry::Clamped { maximum, .. } => *maximum,
        }
    }

    pub fn was_clamped(&self) -> bool {
        matches!(self, UnitEntry::Clamped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(serde_json::to_string(&LoanCategory::Feeds).unwrap(), "\"feeds\"");
        let purpose: StatementOfPurpose = serde_json::from_str("\"business\"").unwrap();
        assert_eq!(purpose, StatementOfPurpose::Business);
    }

    #[test]
    fn test_unit_entry() {
        assert_eq!(UnitEntry::Accepted(3).units(), 3);
        let clamped = UnitEntry::Clamped { requested: 9, maximum: 4 };
        assert_eq!(clamped.units(), 4);
        assert!(clamped.was_clamped());
    }

    #[test]
    fn test_phase_edit_gate() {
        assert!(FormPhase::Idle.accepts_edits());
        assert!(FormPhase::Failed { message: "x".into() }.accepts_edits());
        assert!(!FormPhase::Submitting.accepts_edits());
        assert!(!FormPhase::Validating.accepts_edits());
    }
}
