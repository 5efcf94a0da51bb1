//! Prometheus metrics for settlement
//!
//! # Metrics
//!
//! - `settlement_calculations_total` - Refund calculations completed
//! - `settlement_failures_total` - Refund calculations rejected
//! - `settlement_refund_amount` - Histogram of refund amounts
//! - `cancellation_approved_total` - Cancellation requests approved
//! - `cancellation_rejected_total` - Cancellation requests rejected

use crate::types::SettlementResult;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns its registry, so several can coexist in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Completed calculations
    pub calculations_total: IntCounter,

    /// Rejected calculations
    pub failures_total: IntCounter,

    /// Refund amount histogram
    pub refund_amount: Histogram,

    /// Approved cancellations
    pub cancellations_approved: IntCounter,

    /// Rejected cancellations
    pub cancellations_rejected: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let calculations_total = IntCounter::new(
            "settlement_calculations_total",
            "Refund calculations completed",
        )?;
        registry.register(Box::new(calculations_total.clone()))?;

        let failures_total = IntCounter::new(
            "settlement_failures_total",
            "Refund calculations rejected",
        )?;
        registry.register(Box::new(failures_total.clone()))?;

        let refund_amount = Histogram::with_opts(
            HistogramOpts::new("settlement_refund_amount", "Histogram of refund amounts").buckets(
                vec![
                    0.0, 1_000.0, 10_000.0, 50_000.0, 100_000.0, 500_000.0, 1_000_000.0,
                    10_000_000.0,
                ],
            ),
        )?;
        registry.register(Box::new(refund_amount.clone()))?;

        let cancellations_approved = IntCounter::new(
            "cancellation_approved_total",
            "Cancellation requests approved",
        )?;
        registry.register(Box::new(cancellations_approved.clone()))?;

        let cancellations_rejected = IntCounter::new(
            "cancellation_rejected_total",
            "Cancellation requests rejected",
        )?;
        registry.register(Box::new(cancellations_rejected.clone()))?;

        Ok(Self {
            calculations_total,
            failures_total,
            refund_amount,
            cancellations_approved,
            cancellations_rejected,
            registry,
        })
    }

    /// Record a completed calculation
    pub fn record_calculation(&self, result: &SettlementResult) {
        self.calculations_total.inc();
        if let Some(amount) = result.refund_amount.to_f64() {
            self.refund_amount.observe(amount);
        }
    }

    /// Record a rejected calculation
    pub fn record_failure(&self) {
        self.failures_total.inc();
    }

    /// Record a cancellation decision
    pub fn record_cancellation(&self, approved: bool) {
        if approved {
            self.cancellations_approved.inc();
        } else {
            self.cancellations_rejected.inc();
        }
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("calculations_total", &self.calculations_total.get())
            .field("failures_total", &self.failures_total.get())
            .finish_non_exhaustive()
    }
}
