pub mod loanable;
pub mod sack_limits;

pub use loanable::{clamp_units, compute_loanable_amount, CommodityLoanParameters};
pub use sack_limits::{compute_max_units, SackLimitTable, SackLimitTier, ShareCapitalBound};
