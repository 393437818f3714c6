// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversions between smallest units (MIST) and display units (SUI).
//!
//! Amounts stay in MIST everywhere in the client; these helpers are only
//! called when rendering or when reading what the user typed.

use lottery_abi::{LotteryError, Result, TICKER_SYMBOL, UNIT_DECIMALS, UNIT_SCALE};

/// Display value of an amount, for charts and comparisons only.
pub fn to_display_units(mist: u64) -> f64 {
    mist as f64 / UNIT_SCALE as f64
}

/// Formats `mist` in display units with integer arithmetic.
///
/// The value is rounded half-up to `max_fraction` digits, trailing zeros are
/// trimmed down to `min_fraction` digits and the integer part is grouped by
/// thousands.
pub fn format_display(mist: u64, min_fraction: u32, max_fraction: u32) -> String {
    let max_fraction = max_fraction.min(UNIT_DECIMALS);
    let min_fraction = min_fraction.min(max_fraction);

    let step = 10u128.pow(UNIT_DECIMALS - max_fraction);
    let rounded = (u128::from(mist) + step / 2) / step * step;
    let whole = rounded / u128::from(UNIT_SCALE);
    let fraction = rounded % u128::from(UNIT_SCALE);

    let mut digits = format!("{:09}", fraction);
    digits.truncate(max_fraction as usize);
    while digits.len() > min_fraction as usize && digits.ends_with('0') {
        digits.pop();
    }

    let whole = group_thousands(whole);
    if digits.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, digits)
    }
}

/// Prize pool as shown to the user, e.g. `5 SUI`.
pub fn display_pool(mist: u64) -> String {
    format!("{} {}", format_display(mist, 0, 3), TICKER_SYMBOL)
}

/// Account balance as shown next to the wallet, e.g. `12.50 SUI`.
pub fn display_balance(mist: u64) -> String {
    format!("{} {}", format_display(mist, 2, 4), TICKER_SYMBOL)
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Parses an amount typed in display units into MIST.
///
/// Rejects anything that is not a plain positive decimal number with at most
/// nine fractional digits: signs, exponents, `NaN`, `inf`, zero and values
/// above `u64::MAX` MIST.
pub fn parse_display_amount(input: &str) -> Result<u64> {
    let input = input.trim();
    let invalid = |reason: &str| LotteryError::InvalidAmount(format!("{:?}: {}", input, reason));

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("not a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a number"));
    }
    if fraction.len() > UNIT_DECIMALS as usize {
        return Err(invalid("too many decimal places"));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = UNIT_DECIMALS as usize);
        padded.parse().map_err(|_| invalid("not a number"))?
    };

    let mist = whole
        .checked_mul(UNIT_SCALE)
        .and_then(|mist| mist.checked_add(fraction))
        .ok_or_else(|| invalid("too large"))?;
    if mist == 0 {
        return Err(invalid("must be positive"));
    }
    Ok(mist)
}
