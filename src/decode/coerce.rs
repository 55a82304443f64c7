//! Type coercion of raw fields
//!
//! Turns a raw string field into a value of the column's semantic type.
//! Decimals are parsed digit by digit into an unscaled `i128`; no
//! floating-point value is ever produced along the way.

use crate::schema::SemanticType;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Date layout of `.tbl` extracts
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Why a single field could not be converted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("invalid integer: {reason}")]
    IntegerParse { reason: String },

    #[error("invalid date (expected format '{format}'): {reason}")]
    DateParse { format: String, reason: String },

    #[error("invalid decimal: {reason}")]
    DecimalParse { reason: String },
}

/// A coerced field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedValue<'a> {
    Int32(i32),
    Int64(i64),
    Utf8(&'a str),
    /// Unscaled value, `None` for an empty field
    Decimal { value: Option<i128>, scale: i8 },
    /// Days since 1970-01-01
    Date(i32),
}

/// Converts raw fields according to their declared type
#[derive(Debug, Clone)]
pub struct Coercer {
    date_format: String,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl Coercer {
    /// Create a coercer parsing dates with the given chrono format
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Coerce one raw field to `semantic_type`
    pub fn coerce<'a>(
        &self,
        raw: &'a str,
        semantic_type: SemanticType,
    ) -> Result<TypedValue<'a>, CoercionError> {
        match semantic_type {
            SemanticType::Int32 => raw
                .parse::<i32>()
                .map(TypedValue::Int32)
                .map_err(|e| CoercionError::IntegerParse {
                    reason: e.to_string(),
                }),
            SemanticType::Int64 => raw
                .parse::<i64>()
                .map(TypedValue::Int64)
                .map_err(|e| CoercionError::IntegerParse {
                    reason: e.to_string(),
                }),
            SemanticType::Utf8String => Ok(TypedValue::Utf8(raw)),
            SemanticType::FixedDecimal { precision, scale } => {
                parse_decimal(raw, precision, scale).map(|value| TypedValue::Decimal { value, scale })
            }
            SemanticType::Date => parse_date(raw, &self.date_format).map(TypedValue::Date),
        }
    }
}

/// Parse a date into days since the Unix epoch
pub fn parse_date(raw: &str, format: &str) -> Result<i32, CoercionError> {
    let date = NaiveDate::parse_from_str(raw, format).map_err(|e| CoercionError::DateParse {
        format: format.to_string(),
        reason: e.to_string(),
    })?;
    Ok(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

/// Parse an exact base-10 decimal into its unscaled representation
///
/// An empty string is `None`. Fractional digits past `scale` are accepted
/// only when they are all zeros, so the result is never rounded.
pub fn parse_decimal(raw: &str, precision: u8, scale: i8) -> Result<Option<i128>, CoercionError> {
    if raw.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| CoercionError::DecimalParse { reason };

    let (negative, unsigned) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (int_digits, frac_digits) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(invalid("no digits".to_string()));
    }
    if let Some(c) = int_digits
        .chars()
        .chain(frac_digits.chars())
        .find(|c| !c.is_ascii_digit())
    {
        return Err(invalid(format!("unexpected character '{c}'")));
    }

    let scale = scale.max(0) as usize;
    let frac_digits = if frac_digits.len() > scale {
        let (kept, dropped) = frac_digits.split_at(scale);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(invalid(format!(
                "more than {scale} fractional digits would lose precision"
            )));
        }
        kept
    } else {
        frac_digits
    };

    let limit = 10_i128
        .checked_pow(u32::from(precision))
        .ok_or_else(|| invalid(format!("precision {precision} is out of range")))?;
    let overflow = || invalid(format!("exceeds precision {precision}"));

    let padding = scale - frac_digits.len();
    let mut unscaled: i128 = 0;
    for digit in int_digits
        .bytes()
        .chain(frac_digits.bytes())
        .chain(std::iter::repeat(b'0').take(padding))
    {
        unscaled = unscaled
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(digit - b'0')))
            .filter(|v| *v < limit)
            .ok_or_else(overflow)?;
    }

    Ok(Some(if negative { -unscaled } else { unscaled }))
}
