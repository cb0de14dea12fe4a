pub mod application;
pub mod calculator_widget;
pub mod loan_type;

use hourglass_rs::SafeTimeProvider;
use tracing::{debug, warn};

use crate::errors::{LoanError, Result};
use crate::events::{EventStore, FormEvent, FormKind};
use crate::types::FormPhase;

pub use application::{LoanApplication, LoanApplicationForm, LoanDetails};
pub use calculator_widget::{LoanCalculatorWidget, WidgetResult};
pub use loan_type::LoanTypeConfigurator;

/// message shown when a required field is blank or not a number
pub const INVALID_FIELDS_MESSAGE: &str = "Please enter valid information for all fields";

/// phase tracking shared by every form
///
/// idle -> editing -> validating -> submitting -> succeeded | failed.
/// A failed form accepts edits again; nothing is retried or rolled back.
#[derive(Debug)]
pub struct FormState {
    kind: FormKind,
    phase: FormPhase,
    events: EventStore,
}

impl FormState {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            phase: FormPhase::Idle,
            events: EventStore::new(),
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventStore {
        &mut self.events
    }

    pub fn take_events(&mut self) -> Vec<FormEvent> {
        self.events.take_events()
    }

    /// field changed
    pub fn begin_edit(&mut self, time: &SafeTimeProvider) -> Result<()> {
        if !self.phase.accepts_edits() {
            return Err(self.unexpected("a phase that accepts edits"));
        }
        if self.phase != FormPhase::Editing {
            self.transition(FormPhase::Editing, time);
        }
        Ok(())
    }

    pub fn start_validation(&mut self, time: &SafeTimeProvider) -> Result<()> {
        if !self.phase.accepts_edits() {
            return Err(self.unexpected("a phase that accepts edits"));
        }
        self.transition(FormPhase::Validating, time);
        Ok(())
    }

    /// validation passed and nothing is submitted (calculator-only screens)
    pub fn finish_validation(&mut self, time: &SafeTimeProvider) -> Result<()> {
        self.require_phase(&FormPhase::Validating, "Validating")?;
        self.transition(FormPhase::Editing, time);
        Ok(())
    }

    pub fn fail_validation(&mut self, error: &LoanError, time: &SafeTimeProvider) -> Result<()> {
        self.require_phase(&FormPhase::Validating, "Validating")?;
        let message = error.to_string();
        warn!(form = ?self.kind, %message, "validation failed");
        self.events.emit(FormEvent::ValidationFailed {
            form: self.kind,
            message: message.clone(),
            timestamp: time.now(),
        });
        self.transition(FormPhase::Failed { message }, time);
        Ok(())
    }

    /// close out a validation step: an error fails the form, success stays in Validating
    pub fn settle<T>(&mut self, outcome: Result<T>, time: &SafeTimeProvider) -> Result<T> {
        match outcome {
            Ok(value) => Ok(value),
            Err(err) => {
                self.fail_validation(&err, time)?;
                Err(err)
            }
        }
    }

    pub fn start_submit(&mut self, time: &SafeTimeProvider) -> Result<()> {
        self.require_phase(&FormPhase::Validating, "Validating")?;
        self.transition(FormPhase::Submitting, time);
        Ok(())
    }

    /// record the backend's answer
    pub fn complete(&mut self, outcome: std::result::Result<(), String>, time: &SafeTimeProvider) -> Result<()> {
        self.require_phase(&FormPhase::Submitting, "Submitting")?;
        match outcome {
            Ok(()) => self.transition(FormPhase::Succeeded, time),
            Err(reason) => {
                warn!(form = ?self.kind, %reason, "submission failed");
                self.events.emit(FormEvent::SubmissionFailed {
                    form: self.kind,
                    reason: reason.clone(),
                    timestamp: time.now(),
                });
                self.transition(FormPhase::Failed { message: reason }, time);
            }
        }
        Ok(())
    }

    fn require_phase(&self, phase: &FormPhase, name: &str) -> Result<()> {
        if &self.phase != phase {
            return Err(self.unexpected(name));
        }
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> LoanError {
        LoanError::InvalidState {
            current: self.phase.clone(),
            expected: expected.to_string(),
        }
    }

    fn transition(&mut self, new_phase: FormPhase, time: &SafeTimeProvider) {
        let old_phase = std::mem::replace(&mut self.phase, new_phase.clone());
        debug!(form = ?self.kind, from = ?old_phase, to = ?new_phase, "form phase changed");
        self.events.emit(FormEvent::PhaseChanged {
            form: self.kind,
            old_phase,
            new_phase,
            timestamp: time.now(),
        });
    }
}
