//! Amount scaling, balance-percent math and wallet address derivation.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::chains::{evm, solana};
use crate::config::SecretString;
use crate::constants::ChainType;
use crate::error::{DexError, DexResult};
use crate::models::BalancePercent;

/// Convert a human amount (`"1.5"`) to base units for `decimals`.
///
/// Fraction digits beyond `decimals` are truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> DexResult<U256> {
    let amount = amount.trim();
    let invalid = || DexError::InvalidInput(format!("invalid amount '{}'", amount));

    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    if frac.len() >= decimals {
        digits.push_str(&frac[..decimals]);
    } else {
        digits.push_str(frac);
        digits.extend(std::iter::repeat('0').take(decimals - frac.len()));
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10)
        .map_err(|e| DexError::InvalidInput(format!("amount '{}': {}", amount, e)))
}

/// Base units to a human amount; `None` when out of `Decimal` range.
pub fn from_base_units(raw: &str, decimals: u32) -> Option<Decimal> {
    let value: Decimal = raw.trim().parse().ok()?;
    if decimals > 28 {
        return None;
    }
    let scale = Decimal::try_from_i128_with_scale(10i128.pow(decimals), 0).ok()?;
    value.checked_div(scale).map(|d| d.normalize())
}

/// `raw × percent`, truncated toward zero.
pub fn apply_percent(raw: U256, percent: BalancePercent) -> DexResult<U256> {
    let percent = percent.value();
    let mantissa = u128::try_from(percent.mantissa())
        .map_err(|_| DexError::InvalidInput(format!("invalid percent {}", percent)))?;
    let scale = U256::from(10u8).pow(U256::from(percent.scale()));

    raw.checked_mul(U256::from(mantissa))
        .map(|product| product / scale)
        .ok_or_else(|| DexError::InvalidInput("balance too large to scale".to_string()))
}

/// Absolute amount in base units for a fraction of a human-readable balance.
///
/// The balance is first truncated to `decimals`, then scaled, then the
/// percent is applied exactly. A zero result is rejected.
pub fn balance_percent_amount(
    balance: &str,
    decimals: u8,
    percent: BalancePercent,
) -> DexResult<U256> {
    let raw = to_base_units(balance, decimals)?;
    let amount = apply_percent(raw, percent)?;
    if amount.is_zero() {
        return Err(DexError::InvalidInput(format!(
            "{} of balance {} is zero",
            percent, balance
        )));
    }
    Ok(amount)
}

/// Wallet address for a private key of the given chain family.
pub fn get_wallet_address(chain_type: ChainType, private_key: &SecretString) -> DexResult<String> {
    match chain_type {
        ChainType::Evm => Ok(evm::address_from_private_key(private_key.expose())?),
        ChainType::Solana => Ok(solana::address_from_private_key(private_key.expose())?),
        ChainType::Sui => Err(DexError::UnsupportedChain(chain_type.to_string())),
    }
}
