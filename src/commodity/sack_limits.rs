use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{LoanCategory, StatementOfPurpose};

/// share-capital condition of a tier row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum ShareCapitalBound {
    /// exactly this amount
    Equals(Money),
    /// strictly above
    Above(Money),
    /// at or above
    AtLeast(Money),
    /// no condition
    Any,
}

impl ShareCapitalBound {
    pub fn matches(&self, share_capital: Money) -> bool {
        match self {
            ShareCapitalBound::Equals(v) => share_capital == *v,
            ShareCapitalBound::Above(v) => share_capital > *v,
            ShareCapitalBound::AtLeast(v) => share_capital >= *v,
            ShareCapitalBound::Any => true,
        }
    }
}

/// one row of the sack-limit table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SackLimitTier {
    pub category: LoanCategory,
    /// `None` applies to every statement of purpose
    pub purpose: Option<StatementOfPurpose>,
    pub share_capital: ShareCapitalBound,
    pub max_units: u32,
}

impl SackLimitTier {
    fn applies(&self, share_capital: Money, category: LoanCategory, purpose: StatementOfPurpose) -> bool {
        self.category == category
            && self.purpose.map_or(true, |p| p == purpose)
            && self.share_capital.matches(share_capital)
    }
}

/// ordered tier rows; the first matching row decides, no match means zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SackLimitTable {
    pub tiers: Vec<SackLimitTier>,
}

impl SackLimitTable {
    pub fn new(tiers: Vec<SackLimitTier>) -> Self {
        Self { tiers }
    }

    /// load a table from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// maximum sacks a member may borrow
    pub fn max_units(
        &self,
        share_capital: Money,
        category: LoanCategory,
        purpose: StatementOfPurpose,
    ) -> u32 {
        let max_units = self
            .tiers
            .iter()
            .find(|tier| tier.applies(share_capital, category, purpose))
            .map_or(0, |tier| tier.max_units);
        debug!(
            share_capital = %share_capital,
            %category,
            %purpose,
            max_units,
            "resolved sack limit"
        );
        max_units
    }
}

impl Default for SackLimitTable {
    /// the cooperative's standing sack limits
    ///
    /// The 20000 tiers match on exact equality, so 20000.01 jumps to the
    /// upper tier and 19999.99 gets nothing. Pending product-owner
    /// confirmation this is kept as-is.
    fn default() -> Self {
        let threshold = Money::from_major(20_000);
        Self::new(vec![
            SackLimitTier {
                category: LoanCategory::Feeds,
                purpose: None,
                share_capital: ShareCapitalBound::Equals(threshold),
                max_units: 15,
            },
            SackLimitTier {
                category: LoanCategory::Feeds,
                purpose: None,
                share_capital: ShareCapitalBound::Above(threshold),
                max_units: 30,
            },
            SackLimitTier {
                category: LoanCategory::Rice,
                purpose: Some(StatementOfPurpose::Business),
                share_capital: ShareCapitalBound::Equals(threshold),
                max_units: 30,
            },
            SackLimitTier {
                category: LoanCategory::Rice,
                purpose: Some(StatementOfPurpose::Business),
                share_capital: ShareCapitalBound::Above(threshold),
                max_units: 50,
            },
            SackLimitTier {
                category: LoanCategory::Rice,
                purpose: Some(StatementOfPurpose::Personal),
                share_capital: ShareCapitalBound::AtLeast(Money::from_major(6_000)),
                max_units: 4,
            },
            SackLimitTier {
                category: LoanCategory::Rice,
                purpose: Some(StatementOfPurpose::Personal),
                share_capital: ShareCapitalBound::Any,
                max_units: 2,
            },
        ])
    }
}

/// maximum sacks under the standing table
pub fn compute_max_units(
    share_capital: Money,
    category: LoanCategory,
    purpose: StatementOfPurpose,
) -> u32 {
    SackLimitTable::default().max_units(share_capital, category, purpose)
}
