//! Penalty records produced by cancellation and no-show patterns.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Behaviour a penalty was recorded for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    /// Customer cancelled shortly before the slot start
    LateCancellation,
    /// Customer cancelled more than once on the same day
    SameDayCancellations,
    /// Customer cancelled on consecutive days
    ConsecutiveDayCancellations,
    /// Provider never arrived
    ProviderNoShow,
}

impl FromStr for PenaltyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "late_cancellation" => Ok(Self::LateCancellation),
            "same_day_cancellations" => Ok(Self::SameDayCancellations),
            "consecutive_day_cancellations" => Ok(Self::ConsecutiveDayCancellations),
            "provider_no_show" => Ok(Self::ProviderNoShow),
            _ => Err(format!("Invalid penalty kind: {s}")),
        }
    }
}

impl PenaltyKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LateCancellation => "late_cancellation",
            Self::SameDayCancellations => "same_day_cancellations",
            Self::ConsecutiveDayCancellations => "consecutive_day_cancellations",
            Self::ProviderNoShow => "provider_no_show",
        }
    }
}

/// A recorded penalty against a customer or provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Penalty {
    pub id: u64,
    pub user_id: u64,
    pub appointment_id: u64,
    pub kind: PenaltyKind,
    pub detail: String,
    pub created_at: Timestamp,
}
