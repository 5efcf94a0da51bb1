//! Core types for survey settlement

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validated input to a refund calculation
///
/// Fields are private so that every instance has passed validation:
/// non-negative budget, strictly positive reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementInput {
    total_budget: Decimal,
    reward_per_response: Decimal,
    completed_responses: u64,
}

impl SettlementInput {
    /// Create validated settlement input
    ///
    /// `completed_responses` is capped at `i64::MAX`.
    pub fn new(
        total_budget: Decimal,
        reward_per_response: Decimal,
        completed_responses: u64,
    ) -> Result<Self> {
        if total_budget < Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "total budget must be non-negative, got {}",
                total_budget
            )));
        }

        if reward_per_response <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "reward per response must be positive, got {}",
                reward_per_response
            )));
        }

        // Remaining slots are signed, so the count must fit in i64
        if i64::try_from(completed_responses).is_err() {
            return Err(Error::InvalidInput(format!(
                "completed responses must not exceed {}, got {}",
                i64::MAX,
                completed_responses
            )));
        }

        Ok(Self {
            total_budget,
            reward_per_response,
            completed_responses,
        })
    }

    /// Create settlement input from floating-point dashboard values
    ///
    /// Rejects NaN, infinities and negative response counts.
    pub fn from_f64(
        total_budget: f64,
        reward_per_response: f64,
        completed_responses: i64,
    ) -> Result<Self> {
        let total_budget = finite_decimal("total budget", total_budget)?;
        let reward_per_response = finite_decimal("reward per response", reward_per_response)?;
        let completed_responses = u64::try_from(completed_responses).map_err(|_| {
            Error::InvalidInput(format!(
                "completed responses must be non-negative, got {}",
                completed_responses
            ))
        })?;

        Self::new(total_budget, reward_per_response, completed_responses)
    }

    /// Total budget allocated to the survey
    pub fn total_budget(&self) -> Decimal {
        self.total_budget
    }

    /// Reward paid per completed response
    pub fn reward_per_response(&self) -> Decimal {
        self.reward_per_response
    }

    /// Responses already paid out
    pub fn completed_responses(&self) -> u64 {
        self.completed_responses
    }
}

fn finite_decimal(field: &str, value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} must be finite, got {}",
            field, value
        )));
    }

    Decimal::from_f64(value).ok_or_else(|| {
        Error::InvalidInput(format!("{} is out of range: {}", field, value))
    })
}

/// Refund breakdown for one survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    /// Participants the budget supports including fee overhead
    pub max_participants: u64,

    /// Unused capacity (negative when over-delivered)
    pub remaining_slots: i64,

    /// Rewards for the unused slots
    pub refund_rewards: Decimal,

    /// Fee component on the refunded rewards
    pub refund_fee: Decimal,

    /// Amount returned to the creator, never negative
    pub refund_amount: Decimal,
}

impl SettlementResult {
    /// Whether the survey consumed its whole capacity
    pub fn is_fully_consumed(&self) -> bool {
        self.remaining_slots <= 0
    }
}

/// Budget snapshot of a persisted survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyBudget {
    /// Survey ID
    pub survey_id: Uuid,

    /// Survey title
    pub title: String,

    /// Total budget
    pub total_budget: Decimal,

    /// Reward per completed response
    pub reward_per_response: Decimal,

    /// Completed (paid) responses
    pub completed_responses: u64,
}

impl SurveyBudget {
    /// Build the validated calculator input for this survey
    pub fn settlement_input(&self) -> Result<SettlementInput> {
        SettlementInput::new(
            self.total_budget,
            self.reward_per_response,
            self.completed_responses,
        )
    }
}

/// Cancellation request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationStatus {
    /// Awaiting admin review
    Pending,
    /// Approved and refunded
    Approved,
    /// Rejected by an admin
    Rejected,
}

impl std::fmt::Display for CancellationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CancellationStatus::Pending => "pending",
            CancellationStatus::Approved => "approved",
            CancellationStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// Creator's request to cancel a running survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    /// Request ID
    pub request_id: Uuid,

    /// Survey being cancelled
    pub survey_id: Uuid,

    /// Reason given by the creator
    pub reason: String,

    /// Current status
    pub status: CancellationStatus,

    /// Submission timestamp
    pub requested_at: DateTime<Utc>,

    /// Decision timestamp
    pub processed_at: Option<DateTime<Utc>>,

    /// Refund computed on approval
    pub refund: Option<SettlementResult>,

    /// Note left by the processing admin
    pub admin_note: Option<String>,
}

impl CancellationRequest {
    /// Create a pending request
    pub fn new(survey_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            survey_id,
            reason: reason.into(),
            status: CancellationStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
            refund: None,
            admin_note: None,
        }
    }

    /// Check if still awaiting review
    pub fn is_pending(&self) -> bool {
        self.status == CancellationStatus::Pending
    }

    /// Refund granted, zero unless approved
    pub fn refunded_amount(&self) -> Decimal {
        match (self.status, &self.refund) {
            (CancellationStatus::Approved, Some(refund)) => refund.refund_amount,
            _ => Decimal::ZERO,
        }
    }
}

/// Admin decision on a cancellation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CancellationDecision {
    /// Cancel the survey and refund unused capacity
    Approve {
        /// Optional admin note
        note: Option<String>,
    },
    /// Keep the survey running
    Reject {
        /// Optional admin note
        note: Option<String>,
    },
}

/// Result of processing a cancellation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    /// Request ID
    pub request_id: Uuid,

    /// Survey ID
    pub survey_id: Uuid,

    /// Final status
    pub status: CancellationStatus,

    /// Refund breakdown (approved requests only)
    pub refund: Option<SettlementResult>,

    /// Decision timestamp
    pub processed_at: DateTime<Utc>,
}
