//! Refund calculation check
//!
//! Prints the refund breakdown for a survey. Without arguments, checks the
//! reference case (₩55,000 budget, ₩1,000 reward, 1 response ⇒ ₩53,900).
//!
//! ```text
//! refund-check [TOTAL_BUDGET REWARD_PER_RESPONSE COMPLETED_RESPONSES]
//! ```

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use std::str::FromStr;
use survey_settlement::{Config, FeePolicy, SettlementInput};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = if let Ok(config_path) = std::env::var("SETTLEMENT_CONFIG") {
        info!("Loading config from: {}", config_path);
        Config::from_file(&config_path)?
    } else {
        Config::from_env()?
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let reference = args.is_empty();
    let input = match args.as_slice() {
        [] => SettlementInput::new(Decimal::from(55_000), Decimal::from(1_000), 1)?,
        [budget, reward, completed] => SettlementInput::new(
            Decimal::from_str(budget).with_context(|| format!("invalid budget {:?}", budget))?,
            Decimal::from_str(reward).with_context(|| format!("invalid reward {:?}", reward))?,
            completed
                .parse()
                .with_context(|| format!("invalid response count {:?}", completed))?,
        )?,
        _ => bail!("usage: refund-check [TOTAL_BUDGET REWARD_PER_RESPONSE COMPLETED_RESPONSES]"),
    };

    let calculator = config.calculator()?;
    info!(
        fee_rate = %calculator.policy().fee_rate(),
        "Running refund check"
    );

    let result = calculator.calculate(&input)?;
    let report = serde_json::json!({
        "input": input,
        "feeRate": calculator.policy().fee_rate(),
        "result": result,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    let default_policy = calculator.policy() == &FeePolicy::default();
    if reference && default_policy && result.refund_amount != Decimal::from(53_900) {
        bail!(
            "reference refund mismatch: expected 53900, got {}",
            result.refund_amount
        );
    }

    Ok(())
}
