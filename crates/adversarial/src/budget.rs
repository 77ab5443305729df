//! Per-tick step quotas.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How many steps may still be taken.
///
/// Serialized as `"unlimited"` or a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BudgetRepr", into = "BudgetRepr")]
pub enum Budget {
    /// No limit.
    #[default]
    Unlimited,
    /// At most this many more steps.
    Limited(u64),
}

impl Budget {
    /// Nothing left to spend.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Budget::Limited(0))
    }

    /// Spend one unit, `false` when none is left.
    pub fn try_consume(&mut self) -> bool {
        match self {
            Budget::Unlimited => true,
            Budget::Limited(0) => false,
            Budget::Limited(n) => {
                *n -= 1;
                true
            }
        }
    }

    /// Units left, `None` when unlimited.
    pub fn remaining(&self) -> Option<u64> {
        match self {
            Budget::Unlimited => None,
            Budget::Limited(n) => Some(*n),
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Unlimited => f.write_str("unlimited"),
            Budget::Limited(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BudgetRepr {
    Count(u64),
    Word(String),
}

impl TryFrom<BudgetRepr> for Budget {
    type Error = String;

    fn try_from(repr: BudgetRepr) -> Result<Self, Self::Error> {
        match repr {
            BudgetRepr::Count(n) => Ok(Budget::Limited(n)),
            BudgetRepr::Word(word) if word.eq_ignore_ascii_case("unlimited") => Ok(Budget::Unlimited),
            BudgetRepr::Word(word) => Err(format!(
                "invalid budget \"{}\", expected \"unlimited\" or a non-negative integer",
                word
            )),
        }
    }
}

impl From<Budget> for BudgetRepr {
    fn from(budget: Budget) -> Self {
        match budget {
            Budget::Unlimited => BudgetRepr::Word("unlimited".to_string()),
            Budget::Limited(n) => BudgetRepr::Count(n),
        }
    }
}
