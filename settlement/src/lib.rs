//! Survey Settlement
//!
//! Computes the refund owed to a survey creator when a survey is cancelled
//! or closed early, and processes the admin-side cancellation requests that
//! trigger it.
//!
//! # Refund Formula
//!
//! A survey's capacity is its budget divided by the reward cost inflated by
//! the platform fee. Unused capacity is refunded together with the fee that
//! was charged on it:
//!
//! ```text
//! max_participants = round(total_budget / (reward * (1 + fee_rate)))
//! remaining_slots  = max_participants - completed_responses
//! refund_rewards   = remaining_slots * reward
//! refund_fee       = refund_rewards * fee_rate
//! refund_amount    = max(0, refund_rewards + refund_fee)
//! ```
//!
//! The fee is charged on the refunded portion only, never on the full budget.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use survey_settlement::{calculate_refund, SettlementInput};
//!
//! # fn main() -> survey_settlement::Result<()> {
//! let input = SettlementInput::new(Decimal::from(55_000), Decimal::from(1_000), 1)?;
//! let result = calculate_refund(&input)?;
//!
//! assert_eq!(result.max_participants, 50);
//! assert_eq!(result.refund_amount, Decimal::from(53_900));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod calculator;
pub mod cancellation;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use calculator::{calculate_refund, FeePolicy, SettlementCalculator};
pub use cancellation::{CancellationDesk, CancellationStats};
pub use metrics::Metrics;
