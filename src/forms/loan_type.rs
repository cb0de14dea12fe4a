use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use tracing::info;

use crate::api::ApiRequest;
use crate::commodity::CommodityLoanParameters;
use crate::config::{CommodityConfig, LoanKind, LoanTypeRecord};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{FormEvent, FormKind};
use crate::forms::FormState;
use crate::types::{FormPhase, LoanCategory, LoanTypeId};

/// staff screen for creating and editing loan products
#[derive(Debug)]
pub struct LoanTypeConfigurator {
    state: FormState,
    draft: LoanTypeRecord,
}

impl LoanTypeConfigurator {
    /// empty draft for a new loan type
    pub fn create() -> Self {
        Self::edit(LoanTypeRecord::regular("", Rate::ZERO, 1))
    }

    /// edit an existing record as loaded from the backend
    pub fn edit(record: LoanTypeRecord) -> Self {
        Self {
            state: FormState::new(FormKind::LoanTypeConfigurator),
            draft: record,
        }
    }

    pub fn draft(&self) -> &LoanTypeRecord {
        &self.draft
    }

    pub fn phase(&self) -> &FormPhase {
        self.state.phase()
    }

    pub fn set_name(&mut self, name: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.draft.name = name.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.draft.description = description.to_string();
        Ok(())
    }

    pub fn set_rate_percent(&mut self, percent: Decimal, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.draft.annual_rate = Rate::from_percent(percent);
        Ok(())
    }

    pub fn set_max_term_months(&mut self, months: u32, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.draft.max_term_months = months;
        Ok(())
    }

    pub fn set_vehicle(&mut self, time: &SafeTimeProvider) -> Result<()> {
        self.state.begin_edit(time)?;
        self.draft.kind = LoanKind::Vehicle;
        Ok(())
    }

    /// mark or unmark as a commodity loan
    ///
    /// Unmarking drops the commodity parameters; marking starts from zeroed
    /// parameters unless the draft already carries some for this category.
    pub fn set_commodity(
        &mut self,
        category: Option<LoanCategory>,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        self.state.begin_edit(time)?;
        self.draft.kind = match (category, self.draft.commodity_config()) {
            (None, _) => LoanKind::Regular,
            (Some(category), Some(existing)) => LoanKind::Commodity(CommodityConfig {
                category,
                parameters: existing.parameters,
            }),
            (Some(category), None) => LoanKind::Commodity(CommodityConfig {
                category,
                parameters: CommodityLoanParameters::new(Money::ZERO, 0, Decimal::ZERO),
            }),
        };
        Ok(())
    }

    pub fn set_commodity_parameters(
        &mut self,
        parameters: CommodityLoanParameters,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let category = match self.draft.commodity_config() {
            Some(config) => config.category,
            None => {
                return Err(LoanError::NotCommodityLoan {
                    name: self.draft.name.clone(),
                })
            }
        };
        self.state.begin_edit(time)?;
        self.draft.kind = LoanKind::Commodity(CommodityConfig { category, parameters });
        Ok(())
    }

    /// validate and build the create or update request
    pub fn submit(&mut self, time: &SafeTimeProvider) -> Result<ApiRequest> {
        self.state.start_validation(time)?;
        let outcome = self.draft.validate().and_then(|()| match self.draft.id {
            Some(id) => ApiRequest::update_loan_type(id, &self.draft),
            None => ApiRequest::create_loan_type(&self.draft),
        });
        let request = self.state.settle(outcome, time)?;
        self.state.start_submit(time)?;
        info!(name = %self.draft.name, path = %request.path, "submitting loan type");
        Ok(request)
    }

    /// record the backend's answer; a create returns the new id
    pub fn complete(
        &mut self,
        outcome: std::result::Result<Option<LoanTypeId>, String>,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        match outcome {
            Ok(assigned) => {
                self.state.complete(Ok(()), time)?;
                if let Some(id) = assigned {
                    self.draft.id = Some(id);
                }
                self.state.events_mut().emit(FormEvent::LoanTypeSaved {
                    loan_type_id: self.draft.id,
                    name: self.draft.name.clone(),
                    timestamp: time.now(),
                });
            }
            Err(reason) => self.state.complete(Err(reason), time)?,
        }
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<FormEvent> {
        self.state.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpMethod;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()))
    }

    #[test]
    fn test_create_commodity_loan_type() {
        let time = time();
        let mut form = LoanTypeConfigurator::create();
        form.set_name("Feeds Loan", &time).unwrap();
        form.set_rate_percent(dec!(12), &time).unwrap();
        form.set_max_term_months(6, &time).unwrap();
        form.set_commodity(Some(LoanCategory::Feeds), &time).unwrap();
        form.set_commodity_parameters(
            CommodityLoanParameters::new(Money::from_major(500), 30, dec!(70)),
            &time,
        )
        .unwrap();

        let request = form.submit(&time).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/api/loan-types");
        let body = request.body.unwrap();
        assert_eq!(body["kind"]["type"], "commodity");
        assert_eq!(body["kind"]["category"], "feeds");
        assert_eq!(body["kind"]["parameters"]["max_units"], 30);
        assert_eq!(form.phase(), &FormPhase::Submitting);

        form.complete(Ok(Some(11)), &time).unwrap();
        assert_eq!(form.draft().id, Some(11));
        assert_eq!(form.phase(), &FormPhase::Succeeded);
        assert!(form
            .take_events()
            .iter()
            .any(|e| matches!(e, FormEvent::LoanTypeSaved { loan_type_id: Some(11), .. })));
    }

    #[test]
    fn test_update_existing_uses_put() {
        let time = time();
        let record = LoanTypeRecord::regular("Salary Loan", Rate::from_percentage(12), 24).with_id(3);
        let mut form = LoanTypeConfigurator::edit(record);
        form.set_max_term_months(36, &time).unwrap();

        let request = form.submit(&time).unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path, "/api/loan-types/3");
    }

    #[test]
    fn test_unmarking_commodity_drops_parameters() {
        let time = time();
        let record = LoanTypeRecord::rice(
            "Rice Loan",
            Rate::from_percentage(10),
            6,
            CommodityLoanParameters::new(Money::from_major(2_400), 50, dec!(80)),
        );
        let mut form = LoanTypeConfigurator::edit(record);

        // switching category keeps the parameters
        form.set_commodity(Some(LoanCategory::Feeds), &time).unwrap();
        assert_eq!(form.draft().commodity_config().unwrap().parameters.max_units, 50);

        form.set_commodity(None, &time).unwrap();
        assert!(!form.draft().is_commodity());

        form.set_commodity(Some(LoanCategory::Rice), &time).unwrap();
        assert_eq!(form.draft().commodity_config().unwrap().parameters.max_units, 0);
    }

    #[test]
    fn test_parameters_need_commodity_type() {
        let time = time();
        let mut form = LoanTypeConfigurator::create();
        let err = form
            .set_commodity_parameters(CommodityLoanParameters::new(Money::ONE, 1, dec!(50)), &time)
            .unwrap_err();
        assert!(matches!(err, LoanError::NotCommodityLoan { .. }));
    }

    #[test]
    fn test_invalid_draft_is_not_sent() {
        let time = time();
        let mut form = LoanTypeConfigurator::create();
        form.set_commodity(Some(LoanCategory::Rice), &time).unwrap();
        assert!(matches!(form.submit(&time), Err(LoanError::MissingField { field: "name" })));
        assert!(matches!(form.phase(), FormPhase::Failed { .. }));

        form.set_name("Rice Loan", &time).unwrap();
        form.set_commodity_parameters(
            CommodityLoanParameters::new(Money::from_major(2_400), 50, dec!(101)),
            &time,
        )
        .unwrap();
        assert!(matches!(form.submit(&time), Err(LoanError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_backend_rejection_reenables_form() {
        let time = time();
        let mut form = LoanTypeConfigurator::edit(LoanTypeRecord::vehicle("Car Loan", Rate::from_percentage(9), 60));
        form.submit(&time).unwrap();
        form.complete(Err("duplicate name".to_string()), &time).unwrap();
        assert_eq!(form.phase(), &FormPhase::Failed { message: "duplicate name".to_string() });
        form.set_name("Car Loan 2", &time).unwrap();
        assert_eq!(form.phase(), &FormPhase::Editing);
    }
}
