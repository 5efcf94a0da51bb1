//! Survey cancellation requests
//!
//! A creator asks to stop a running survey; an admin approves (refunding the
//! unused capacity) or rejects it. Only pending requests can be processed.
//!
//! ```text
//! Pending ──approve──▶ Approved (refund computed)
//!    │
//!    └─────reject────▶ Rejected
//! ```

use crate::{
    calculator::SettlementCalculator,
    config::{CancellationConfig, Config},
    metrics::Metrics,
    types::*,
    Error, Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Processes cancellation requests against survey budgets
#[derive(Debug, Clone, Default)]
pub struct CancellationDesk {
    calculator: SettlementCalculator,
    config: CancellationConfig,
    metrics: Option<Metrics>,
}

impl CancellationDesk {
    /// Create new desk
    pub fn new(calculator: SettlementCalculator, config: CancellationConfig) -> Self {
        Self {
            calculator,
            config,
            metrics: None,
        }
    }

    /// Create desk from service configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.calculator()?, config.cancellation.clone()))
    }

    /// Attach metrics collector, shared with the calculator
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.calculator = self.calculator.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    /// Open a cancellation request for a survey
    pub fn submit(
        &self,
        survey: &SurveyBudget,
        reason: impl Into<String>,
    ) -> Result<CancellationRequest> {
        let reason = reason.into();

        if self.config.require_reason && reason.trim().is_empty() {
            return Err(Error::InvalidInput(
                "cancellation reason is required".to_string(),
            ));
        }

        // Reject surveys the calculator could never settle
        survey.settlement_input()?;

        let request = CancellationRequest::new(survey.survey_id, reason);
        tracing::info!(
            request_id = %request.request_id,
            survey_id = %survey.survey_id,
            "cancellation requested"
        );

        Ok(request)
    }

    /// Apply an admin decision to a pending request
    pub fn process(
        &self,
        request: &mut CancellationRequest,
        survey: &SurveyBudget,
        decision: CancellationDecision,
    ) -> Result<CancellationOutcome> {
        if !request.is_pending() {
            return Err(Error::InvalidState(format!(
                "request {} already {}",
                request.request_id, request.status
            )));
        }

        if request.survey_id != survey.survey_id {
            return Err(Error::InvalidInput(format!(
                "request {} targets survey {}, got {}",
                request.request_id, request.survey_id, survey.survey_id
            )));
        }

        // Compute before mutating so a failed calculation leaves the request pending
        let (status, refund, note) = match decision {
            CancellationDecision::Approve { note } => {
                let refund = self.calculator.calculate(&survey.settlement_input()?)?;
                (CancellationStatus::Approved, Some(refund), note)
            }
            CancellationDecision::Reject { note } => (CancellationStatus::Rejected, None, note),
        };

        let processed_at = Utc::now();
        request.status = status;
        request.refund = refund;
        request.admin_note = note;
        request.processed_at = Some(processed_at);

        if let Some(metrics) = &self.metrics {
            metrics.record_cancellation(status == CancellationStatus::Approved);
        }

        tracing::info!(
            request_id = %request.request_id,
            survey_id = %request.survey_id,
            status = %status,
            refund_amount = %request.refunded_amount(),
            "cancellation processed"
        );

        Ok(CancellationOutcome {
            request_id: request.request_id,
            survey_id: request.survey_id,
            status,
            refund,
            processed_at,
        })
    }
}

/// Dashboard statistics over cancellation requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationStats {
    /// All requests
    pub total: usize,

    /// Awaiting review
    pub pending: usize,

    /// Approved
    pub approved: usize,

    /// Rejected
    pub rejected: usize,

    /// Sum of approved refunds
    pub total_refunded: Decimal,
}

impl CancellationStats {
    /// Aggregate over a set of requests
    pub fn from_requests(requests: &[CancellationRequest]) -> Self {
        let mut stats = Self {
            total: requests.len(),
            pending: 0,
            approved: 0,
            rejected: 0,
            total_refunded: Decimal::ZERO,
        };

        for request in requests {
            match request.status {
                CancellationStatus::Pending => stats.pending += 1,
                CancellationStatus::Approved => stats.approved += 1,
                CancellationStatus::Rejected => stats.rejected += 1,
            }
            stats.total_refunded += request.refunded_amount();
        }

        stats
    }
}

/// Most recent requests first, at most `limit`
pub fn recent(requests: &[CancellationRequest], limit: usize) -> Vec<&CancellationRequest> {
    let mut sorted: Vec<&CancellationRequest> = requests.iter().collect();
    sorted.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
    sorted.truncate(limit);
    sorted
}
