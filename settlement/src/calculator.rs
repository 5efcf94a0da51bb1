//! Refund calculation for cancelled or early-closed surveys
//!
//! # Example
//!
//! ```text
//! total budget:     ₩55,000
//! reward:           ₩1,000 per response
//! completed:        1 response
//!
//! capacity:         round(55,000 / 1,100) = 50
//! remaining slots:  49
//! refund rewards:   ₩49,000
//! refund fee (10%): ₩4,900
//! refund amount:    ₩53,900
//! ```

use crate::{metrics::Metrics, types::*, Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Platform fee applied to survey rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    fee_rate: Decimal,
}

impl FeePolicy {
    /// Create fee policy; rate must lie in [0, 1]
    pub fn new(fee_rate: Decimal) -> Result<Self> {
        if fee_rate < Decimal::ZERO || fee_rate > Decimal::ONE {
            return Err(Error::Config(format!(
                "fee rate must be between 0 and 1, got {}",
                fee_rate
            )));
        }
        Ok(Self { fee_rate })
    }

    /// Fee rate (0.1 = 10%)
    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    /// Cost multiplier of one response including fee overhead
    pub fn capacity_markup(&self) -> Decimal {
        Decimal::ONE + self.fee_rate
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee_rate: Decimal::new(1, 1), // 10%
        }
    }
}

/// Refund calculator bound to a fee policy
#[derive(Debug, Clone, Default)]
pub struct SettlementCalculator {
    policy: FeePolicy,
    metrics: Option<Metrics>,
}

impl SettlementCalculator {
    /// Create new calculator
    pub fn new(policy: FeePolicy) -> Self {
        Self {
            policy,
            metrics: None,
        }
    }

    /// Attach metrics collector
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Fee policy in use
    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    /// Compute the refund for unused survey capacity
    pub fn calculate(&self, input: &SettlementInput) -> Result<SettlementResult> {
        let result = compute(&self.policy, input);

        match (&result, &self.metrics) {
            (Ok(settlement), Some(metrics)) => metrics.record_calculation(settlement),
            (Err(_), Some(metrics)) => metrics.record_failure(),
            _ => {}
        }

        match &result {
            Ok(settlement) => tracing::debug!(
                total_budget = %input.total_budget(),
                reward_per_response = %input.reward_per_response(),
                completed_responses = input.completed_responses(),
                max_participants = settlement.max_participants,
                refund_amount = %settlement.refund_amount,
                "refund calculated"
            ),
            Err(e) => tracing::warn!(error = %e, "refund calculation failed"),
        }

        result
    }
}

/// Compute the refund with the default 10% fee policy
pub fn calculate_refund(input: &SettlementInput) -> Result<SettlementResult> {
    compute(&FeePolicy::default(), input)
}

fn compute(policy: &FeePolicy, input: &SettlementInput) -> Result<SettlementResult> {
    let reward = input.reward_per_response();

    // Step 1: capacity including fee overhead
    let unit_cost = reward
        .checked_mul(policy.capacity_markup())
        .ok_or_else(|| overflow("unit cost"))?;
    if unit_cost.is_zero() {
        return Err(Error::InvalidInput(
            "reward per response rounds to zero".to_string(),
        ));
    }
    let max_participants = input
        .total_budget()
        .checked_div(unit_cost)
        .ok_or_else(|| overflow("capacity"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| overflow("capacity"))?;

    // Step 2: unused slots, negative when over-delivered
    let remaining_slots = i64::try_from(max_participants)
        .ok()
        .zip(i64::try_from(input.completed_responses()).ok())
        .and_then(|(max, done)| max.checked_sub(done))
        .ok_or_else(|| overflow("remaining slots"))?;

    // Step 3-4: refunded rewards plus the fee charged on them
    let refund_rewards = Decimal::from(remaining_slots)
        .checked_mul(reward)
        .ok_or_else(|| overflow("refund rewards"))?;
    let refund_fee = refund_rewards
        .checked_mul(policy.fee_rate())
        .ok_or_else(|| overflow("refund fee"))?;

    // Step 5: no clawback
    let refund_amount = refund_rewards
        .checked_add(refund_fee)
        .ok_or_else(|| overflow("refund amount"))?
        .max(Decimal::ZERO);

    Ok(SettlementResult {
        max_participants,
        remaining_slots,
        refund_rewards: refund_rewards.normalize(),
        refund_fee: refund_fee.normalize(),
        refund_amount: refund_amount.normalize(),
    })
}

fn overflow(step: &str) -> Error {
    Error::Calculation(format!("{} exceeds the representable range", step))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(budget: i64, reward: i64, completed: u64) -> SettlementInput {
        SettlementInput::new(Decimal::from(budget), Decimal::from(reward), completed).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let result = calculate_refund(&input(55_000, 1_000, 1)).unwrap();

        assert_eq!(result.max_participants, 50);
        assert_eq!(result.remaining_slots, 49);
        assert_eq!(result.refund_rewards, Decimal::from(49_000));
        assert_eq!(result.refund_fee, Decimal::from(4_900));
        assert_eq!(result.refund_amount, Decimal::from(53_900));
    }

    #[test]
    fn test_flat_fee_formula_diverges() {
        let input = input(55_000, 1_000, 1);
        let result = calculate_refund(&input).unwrap();

        // Superseded policy: 5% of the whole budget, no fee refund
        let paid = Decimal::from(input.completed_responses()) * input.reward_per_response();
        let flat_fee = input.total_budget() * Decimal::new(5, 2);
        let flat_refund = (input.total_budget() - paid - flat_fee).max(Decimal::ZERO);

        assert_eq!(flat_refund, Decimal::from(51_250));
        assert_ne!(result.refund_amount, flat_refund);
        assert_eq!(result.refund_amount - flat_refund, Decimal::from(2_650));
    }

    #[test]
    fn test_full_consumption_refunds_nothing() {
        let result = calculate_refund(&input(55_000, 1_000, 50)).unwrap();
        assert_eq!(result.remaining_slots, 0);
        assert_eq!(result.refund_amount, Decimal::ZERO);
        assert!(result.is_fully_consumed());
    }

    #[test]
    fn test_over_delivery_is_clamped() {
        let result = calculate_refund(&input(55_000, 1_000, 60)).unwrap();
        assert_eq!(result.remaining_slots, -10);
        assert_eq!(result.refund_rewards, Decimal::from(-10_000));
        assert_eq!(result.refund_fee, Decimal::from(-1_000));
        assert_eq!(result.refund_amount, Decimal::ZERO);
    }

    #[test]
    fn test_largest_response_count_is_clamped() {
        let result = calculate_refund(&input(55_000, 1_000, i64::MAX as u64)).unwrap();
        assert_eq!(result.remaining_slots, 50 - i64::MAX);
        assert!(result.refund_rewards < Decimal::ZERO);
        assert_eq!(result.refund_amount, Decimal::ZERO);
    }

    #[test]
    fn test_zero_budget() {
        let result = calculate_refund(&input(0, 1_000, 0)).unwrap();
        assert_eq!(result.max_participants, 0);
        assert_eq!(result.refund_amount, Decimal::ZERO);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 550 / 1100 = 0.5 exactly
        let result = calculate_refund(&input(550, 1_000, 0)).unwrap();
        assert_eq!(result.max_participants, 1);

        // 2750 / 1100 = 2.5 exactly; banker's rounding would give 2
        let result = calculate_refund(&input(2_750, 1_000, 0)).unwrap();
        assert_eq!(result.max_participants, 3);
    }

    #[test]
    fn test_rounds_down_below_midpoint() {
        // 54_000 / 1100 = 49.09
        let result = calculate_refund(&input(54_000, 1_000, 0)).unwrap();
        assert_eq!(result.max_participants, 49);
    }

    #[test]
    fn test_custom_fee_policy() {
        let policy = FeePolicy::new(Decimal::new(2, 1)).unwrap(); // 20%
        let calculator = SettlementCalculator::new(policy);

        // 60_000 / 1200 = 50
        let result = calculator.calculate(&input(60_000, 1_000, 10)).unwrap();
        assert_eq!(result.max_participants, 50);
        assert_eq!(result.refund_rewards, Decimal::from(40_000));
        assert_eq!(result.refund_fee, Decimal::from(8_000));
        assert_eq!(result.refund_amount, Decimal::from(48_000));
    }

    #[test]
    fn test_zero_fee_policy() {
        let calculator = SettlementCalculator::new(FeePolicy::new(Decimal::ZERO).unwrap());
        let result = calculator.calculate(&input(10_000, 1_000, 4)).unwrap();
        assert_eq!(result.max_participants, 10);
        assert_eq!(result.refund_fee, Decimal::ZERO);
        assert_eq!(result.refund_amount, Decimal::from(6_000));
    }

    #[test]
    fn test_fee_policy_bounds() {
        assert!(FeePolicy::new(Decimal::new(-1, 2)).is_err());
        assert!(FeePolicy::new(Decimal::new(11, 1)).is_err());
        assert!(FeePolicy::new(Decimal::ONE).is_ok());
        assert_eq!(FeePolicy::default().capacity_markup(), Decimal::new(11, 1));
    }

    #[test]
    fn test_fractional_reward() {
        // 1100 / (2.5 * 1.1) = 400
        let input =
            SettlementInput::new(Decimal::from(1_100), Decimal::new(25, 1), 100).unwrap();
        let result = calculate_refund(&input).unwrap();
        assert_eq!(result.max_participants, 400);
        assert_eq!(result.refund_rewards, Decimal::from(750));
        assert_eq!(result.refund_fee, Decimal::from(75));
        assert_eq!(result.refund_amount, Decimal::from(825));
    }

    #[test]
    fn test_capacity_overflow_is_an_error() {
        let input = SettlementInput::new(Decimal::MAX, Decimal::new(1, 28), 0).unwrap();
        let err = calculate_refund(&input).unwrap_err();
        assert!(matches!(err, Error::Calculation(_) | Error::InvalidInput(_)));
    }

    #[test]
    fn test_calculator_records_metrics() {
        let metrics = Metrics::new().unwrap();
        let calculator = SettlementCalculator::default().with_metrics(metrics.clone());

        calculator.calculate(&input(55_000, 1_000, 1)).unwrap();
        calculator.calculate(&input(55_000, 1_000, 2)).unwrap();

        assert_eq!(metrics.calculations_total.get(), 2);
        assert_eq!(metrics.refund_amount.get_sample_count(), 2);
    }
}
