pub mod amortization;
pub mod api;
pub mod commodity;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod forms;
pub mod types;

// re-export key types
pub use amortization::{
    compute_monthly_payment, compute_monthly_payment_percent, AmortizationResult,
    AmortizationSchedule, LoanQuote, ScheduledPayment, VehicleLoanQuote,
};
pub use api::{ApiRequest, HttpMethod};
pub use commodity::{
    clamp_units, compute_loanable_amount, compute_max_units, CommodityLoanParameters,
    SackLimitTable, SackLimitTier, ShareCapitalBound,
};
pub use config::{CalculatorConfig, CommodityConfig, LoanKind, LoanTypeRecord};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{EventStore, FormEvent, FormKind};
pub use forms::{
    LoanApplication, LoanApplicationForm, LoanCalculatorWidget, LoanDetails,
    LoanTypeConfigurator, WidgetResult,
};
pub use types::{
    ApplicationId, FormPhase, LoanCategory, LoanTypeId, StatementOfPurpose, UnitEntry,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
