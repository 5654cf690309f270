//! Quota Value Object
//!
//! A ceiling that is either a positive integer cap or unlimited.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MembershipError;

/// Resource or benefit ceiling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quota {
    /// At most `n` (`n` must be at least 1)
    Capped(u32),
    /// No ceiling; never exhausted
    Unlimited,
}

impl Quota {
    /// Create a capped quota, rejecting a zero cap
    pub fn capped(n: u32) -> Result<Self, MembershipError> {
        let quota = Self::Capped(n);
        quota.validate()?;
        Ok(quota)
    }

    /// A cap of zero is malformed, not "no capacity".
    pub fn validate(&self) -> Result<(), MembershipError> {
        match self {
            Self::Capped(0) => Err(MembershipError::InvalidArgument(
                "quota cap must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// The cap, or `None` when unlimited
    pub fn cap(&self) -> Option<u32> {
        match self {
            Self::Capped(n) => Some(*n),
            Self::Unlimited => None,
        }
    }

    /// True iff another unit fits on top of `current` (exclusive ceiling)
    pub fn admits(&self, current: u32) -> bool {
        match self {
            Self::Capped(n) => current < *n,
            Self::Unlimited => true,
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capped(n) => write!(f, "{}", n),
            Self::Unlimited => write!(f, "Unlimited"),
        }
    }
}

/// Parses the legacy single-field form: `"Unlimited"` or a decimal count.
///
/// `"0"` parses to `Capped(0)` so that validation can report it.
impl FromStr for Quota {
    type Err = MembershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unlimited") {
            return Ok(Self::Unlimited);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Capped)
            .map_err(|_| MembershipError::InvalidArgument(format!("malformed quota: {:?}", s)))
    }
}

/// Units left in a period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remaining {
    Count(u32),
    Unlimited,
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Unlimited => write!(f, "Unlimited"),
        }
    }
}
