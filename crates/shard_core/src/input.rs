//! Parsing of raw numeric user input.
//!
//! Every numeric field accepts any finite, non-negative number and keeps its
//! integer part; "12.9" logs 12 shards.

use crate::ValidationError;

/// Parses a required amount. `unit` names the quantity in the error message.
pub fn parse_amount(raw: &str, unit: &'static str) -> Result<u64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::InvalidAmount { unit });
    }
    floor_non_negative(raw).ok_or(ValidationError::InvalidAmount { unit })
}

/// Parses one field of the per-Sinner shard editor, where blank means 0.
pub fn parse_shard_field(sinner: &str, raw: &str) -> Result<u64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    floor_non_negative(raw).ok_or_else(|| ValidationError::InvalidShardValue {
        sinner: sinner.to_string(),
    })
}

/// Floors a finite, non-negative number; `None` for anything else.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_f64(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return None;
    }
    Some(value.floor() as u64)
}

fn floor_non_negative(raw: &str) -> Option<u64> {
    if let Ok(whole) = raw.parse::<u64>() {
        return Some(whole);
    }
    raw.parse::<f64>().ok().and_then(floor_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_and_fractional_amounts() {
        assert_eq!(parse_amount("18", "shards"), Ok(18));
        assert_eq!(parse_amount("  7 ", "shards"), Ok(7));
        assert_eq!(parse_amount("12.9", "shards"), Ok(12));
        assert_eq!(parse_amount("0", "shards"), Ok(0));
    }

    #[test]
    fn rejects_negative_and_garbage() {
        let err = ValidationError::InvalidAmount { unit: "shards" };
        assert_eq!(parse_amount("-5", "shards"), Err(err.clone()));
        assert_eq!(parse_amount("", "shards"), Err(err.clone()));
        assert_eq!(parse_amount("abc", "shards"), Err(err.clone()));
        assert_eq!(parse_amount("inf", "shards"), Err(err.clone()));
        assert_eq!(parse_amount("NaN", "shards"), Err(err));
    }

    #[test]
    fn error_message_names_the_unit() {
        let err = parse_amount("-1", "boxes").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a non-negative number of boxes.");
    }

    #[test]
    fn blank_shard_field_means_zero() {
        assert_eq!(parse_shard_field("Faust", ""), Ok(0));
        assert_eq!(parse_shard_field("Faust", "42"), Ok(42));
        assert_eq!(
            parse_shard_field("Faust", "-3"),
            Err(ValidationError::InvalidShardValue {
                sinner: "Faust".to_string()
            })
        );
    }
}
