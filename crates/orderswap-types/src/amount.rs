//! Amount arithmetic in asset base units.
//!
//! Amounts are whole numbers of base units. A human quantity such as
//! `100` of an 18-decimal asset becomes `100 * 10^18` base units.

use rust_decimal::Decimal;

use crate::{constants, Result, SwapError};

/// A quantity of some asset, in base units.
pub type Amount = Decimal;

/// `10^decimals` as a `Decimal`.
///
/// # Errors
/// Returns `InvalidAmount` if `decimals` exceeds [`constants::MAX_ASSET_DECIMALS`].
pub fn unit_scale(decimals: u32) -> Result<Decimal> {
    if decimals > constants::MAX_ASSET_DECIMALS {
        return Err(SwapError::InvalidAmount {
            reason: format!(
                "precision {decimals} exceeds maximum {}",
                constants::MAX_ASSET_DECIMALS
            ),
        });
    }
    let mut scale = Decimal::ONE;
    for _ in 0..decimals {
        scale *= Decimal::TEN;
    }
    Ok(scale)
}

/// Convert a human quantity into base units (the `parseUnits` operation).
///
/// # Errors
/// Returns `InvalidAmount` on overflow or if the value has more fractional
/// digits than the asset's precision.
pub fn to_base_units(value: Decimal, decimals: u32) -> Result<Amount> {
    let scaled = value
        .checked_mul(unit_scale(decimals)?)
        .ok_or_else(|| SwapError::InvalidAmount {
            reason: format!("{value} overflows at {decimals} decimals"),
        })?;
    if !is_whole(scaled) {
        return Err(SwapError::InvalidAmount {
            reason: format!("{value} has more than {decimals} fractional digits"),
        });
    }
    Ok(scaled.normalize())
}

/// Convert base units back into a human quantity.
///
/// # Errors
/// Returns `InvalidAmount` if `decimals` is out of range.
pub fn from_base_units(amount: Amount, decimals: u32) -> Result<Decimal> {
    Ok((amount / unit_scale(decimals)?).normalize())
}

/// Whether `amount` is a whole number of base units.
#[must_use]
pub fn is_whole(amount: Amount) -> bool {
    amount.fract().is_zero()
}

/// Check that `amount` is a strictly positive whole number of base units.
///
/// # Errors
/// Returns `InvalidAmount` naming `field` otherwise.
pub fn ensure_positive_whole(field: &str, amount: Amount) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(SwapError::InvalidAmount {
            reason: format!("{field} must be positive, got {amount}"),
        });
    }
    if !is_whole(amount) {
        return Err(SwapError::InvalidAmount {
            reason: format!("{field} must be a whole number of base units, got {amount}"),
        });
    }
    Ok(())
}
