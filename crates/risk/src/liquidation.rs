use crate::error::RiskError;
use core_types::PositionSide;
use rust_decimal::Decimal;

pub const MAX_LEVERAGE: u32 = 100;

/// The price at which a leveraged position is wiped out, ignoring fees and
/// maintenance margin.
///
/// A long at `entry` with leverage `L` is liquidated at `entry * (1 - 1/L)`,
/// a short at `entry * (1 + 1/L)`.
pub fn liquidation_price(entry: Decimal, leverage: u32, side: PositionSide) -> Result<Decimal, RiskError> {
    if entry <= Decimal::ZERO {
        return Err(RiskError::InvalidEntryPrice(entry));
    }
    if leverage == 0 || leverage > MAX_LEVERAGE {
        return Err(RiskError::InvalidParameters(format!(
            "leverage must be within 1..={}, got {}",
            MAX_LEVERAGE, leverage
        )));
    }

    let margin = entry / Decimal::from(leverage);
    Ok(match side {
        PositionSide::Long => entry - margin,
        PositionSide::Short => entry + margin,
    })
}
