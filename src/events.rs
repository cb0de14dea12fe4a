use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ApplicationId, FormPhase, LoanTypeId};

/// which screen emitted an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    LoanCalculator,
    LoanTypeConfigurator,
    LoanApplication,
}

/// all events that can be emitted by the forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormEvent {
    PhaseChanged {
        form: FormKind,
        old_phase: FormPhase,
        new_phase: FormPhase,
        timestamp: DateTime<Utc>,
    },
    ValidationFailed {
        form: FormKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    // calculator events
    PaymentCalculated {
        principal: Money,
        monthly_payment: Money,
        term_months: u32,
        timestamp: DateTime<Utc>,
    },

    // commodity events
    UnitsClamped {
        requested: u32,
        maximum: u32,
        timestamp: DateTime<Utc>,
    },
    LoanableAmountChanged {
        units: u32,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // submission events
    LoanTypeSaved {
        loan_type_id: Option<LoanTypeId>,
        name: String,
        timestamp: DateTime<Utc>,
    },
    ApplicationSubmitted {
        application_id: ApplicationId,
        loan_type_id: Option<LoanTypeId>,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    SubmissionFailed {
        form: FormKind,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<FormEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: FormEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<FormEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[FormEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_store() {
        let mut store = EventStore::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        store.emit(FormEvent::UnitsClamped { requested: 9, maximum: 4, timestamp: now });
        assert_eq!(store.events().len(), 1);

        let taken = store.take_events();
        assert_eq!(taken.len(), 1);
        assert!(store.events().is_empty());

        store.emit(FormEvent::ValidationFailed {
            form: FormKind::LoanCalculator,
            message: "bad".to_string(),
            timestamp: now,
        });
        store.clear();
        assert!(store.events().is_empty());
    }
}
