//! Arbitrary-precision on-chain amounts.
//!
//! Substrate balances are `u128` on the wire, but the inputs an LLM-proposed plan may
//! hand us — decimal strings, whole numbers, already-normalized big integers — are not
//! bounded by that at parse time, so normalization happens against [`num_bigint::BigUint`]
//! and is only range-checked once the caller asks for the wire-sized value.

use num_bigint::BigUint;
use num_traits::{Num, ToPrimitive, Zero};
use std::fmt;

/// A non-negative amount in the smallest on-chain unit (e.g. Planck for DOT).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(BigUint);

/// The ways an amount may fail to normalize.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AmountError {
    /// The input was not an integer string, a decimal string, or a pre-normalized value.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// A decimal string had more fractional digits than the chain's configured decimals.
    #[error("amount has {given} fractional digits, chain supports at most {max}")]
    TooManyFractionalDigits {
        /// Fractional digits present in the input.
        given: usize,
        /// The chain's configured decimal places.
        max: u32,
    },
    /// The normalized amount does not fit in a `u128` wire value.
    #[error("amount overflows a u128 wire value")]
    Overflow,
}

impl chain_error_code::ErrorCode for AmountError {
    fn code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "INVALID_AMOUNT",
            Self::TooManyFractionalDigits { .. } => "INVALID_AMOUNT",
            Self::Overflow => "INVALID_AMOUNT",
        }
    }
}

// Re-exported under a private alias so this module does not need to depend on the
// rest of the crate's module tree just to implement `ErrorCode`.
mod chain_error_code {
    pub use crate::error::ErrorCode;
}

impl Amount {
    /// The zero amount.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Wraps an already-normalized big integer, smallest-unit value.
    pub fn from_normalized(value: BigUint) -> Self {
        Self(value)
    }

    /// Normalizes a native unsigned integer as a smallest-unit amount.
    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    /// Parses user input into a normalized smallest-unit amount.
    ///
    /// Accepts:
    /// - integer strings (decimal digits only): treated as already-normalized.
    /// - decimal strings (`"w.f"`) with at most `decimals` fractional digits: scaled up.
    ///
    /// Anything else — empty strings, signs, exponents, non-digit characters — is
    /// rejected with [`AmountError::Invalid`].
    pub fn parse(input: &str, decimals: u32) -> Result<Self, AmountError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AmountError::Invalid(input.to_string()));
        }

        if let Some((whole, frac)) = input.split_once('.') {
            if whole.is_empty() && frac.is_empty() {
                return Err(AmountError::Invalid(input.to_string()));
            }
            let whole = if whole.is_empty() { "0" } else { whole };
            if !whole.bytes().all(|b| b.is_ascii_digit())
                || !frac.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(AmountError::Invalid(input.to_string()));
            }
            if frac.len() as u32 > decimals {
                return Err(AmountError::TooManyFractionalDigits {
                    given: frac.len(),
                    max: decimals,
                });
            }
            let whole_value = BigUint::from_str_radix(whole, 10)
                .map_err(|_| AmountError::Invalid(input.to_string()))?;
            let scale = BigUint::from(10u32).pow(decimals);
            let whole_scaled = &whole_value * &scale;
            let frac_value = if frac.is_empty() {
                BigUint::zero()
            } else {
                let frac_digits = BigUint::from_str_radix(frac, 10)
                    .map_err(|_| AmountError::Invalid(input.to_string()))?;
                let pad = decimals - frac.len() as u32;
                frac_digits * BigUint::from(10u32).pow(pad)
            };
            Ok(Self(whole_scaled + frac_value))
        } else {
            if !input.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::Invalid(input.to_string()));
            }
            let value = BigUint::from_str_radix(input, 10)
                .map_err(|_| AmountError::Invalid(input.to_string()))?;
            Ok(Self(value))
        }
    }

    /// Returns the underlying big integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Converts to a `u128` wire value, failing if the amount does not fit.
    pub fn to_u128(&self) -> Result<u128, AmountError> {
        self.0.to_u128().ok_or(AmountError::Overflow)
    }

    /// Formats the amount as a decimal string with the given number of decimal places,
    /// trimming no digits (used for warning messages, never for wire encoding).
    pub fn format_decimal(&self, decimals: u32) -> String {
        let scale = BigUint::from(10u32).pow(decimals);
        let whole = &self.0 / &scale;
        let frac = &self.0 % &scale;
        if decimals == 0 {
            return whole.to_string();
        }
        let frac_str = frac.to_string();
        let padded = "0".repeat(decimals as usize - frac_str.len()) + &frac_str;
        format!("{whole}.{padded}")
    }

    /// True when the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for &Amount {
    type Output = Option<Amount>;
    fn sub(self, rhs: &Amount) -> Option<Amount> {
        if self.0 < rhs.0 {
            None
        } else {
            Some(Amount(&self.0 - &rhs.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_one_point_five_with_ten_decimals() {
        let amount = Amount::parse("1.5", 10).unwrap();
        assert_eq!(amount.to_u128().unwrap(), 15_000_000_000u128);
    }

    #[test]
    fn normalizes_plain_integer_strings() {
        let amount = Amount::parse("42", 10).unwrap();
        assert_eq!(amount.to_u128().unwrap(), 42u128);
    }

    #[test]
    fn rejects_too_many_fractional_digits() {
        let err = Amount::parse("1.23456789012", 10).unwrap_err();
        assert!(matches!(err, AmountError::TooManyFractionalDigits { .. }));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!(Amount::parse("abc", 10).is_err());
        assert!(Amount::parse("-5", 10).is_err());
        assert!(Amount::parse("1e10", 10).is_err());
        assert!(Amount::parse("", 10).is_err());
    }

    #[test]
    fn round_trips_whole_and_fraction_for_arbitrary_decimals() {
        for decimals in 0u32..=12 {
            for whole in [0u64, 1, 7, 1_000_000] {
                for frac_digits in 0..=decimals.min(5) {
                    let frac_value: u64 = 3u64.pow(frac_digits.min(5));
                    let frac_str = format!("{:0width$}", frac_value % 10u64.pow(frac_digits.max(1)), width = frac_digits as usize);
                    let input = if frac_digits == 0 {
                        format!("{whole}")
                    } else {
                        format!("{whole}.{frac_str}")
                    };
                    let amount = Amount::parse(&input, decimals).unwrap();
                    let scale = 10u128.pow(decimals);
                    let frac_scaled = if frac_digits == 0 {
                        0
                    } else {
                        (frac_str.parse::<u128>().unwrap()) * 10u128.pow(decimals - frac_digits)
                    };
                    let expected = whole as u128 * scale + frac_scaled;
                    assert_eq!(amount.to_u128().unwrap(), expected, "input={input} decimals={decimals}");
                }
            }
        }
    }

    #[test]
    fn format_decimal_renders_fixed_width_fraction() {
        let amount = Amount::from_u128(15_000_000_000);
        assert_eq!(amount.format_decimal(10), "1.5000000000");
    }
}
