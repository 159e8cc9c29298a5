//! Small parsing helpers shared by command handlers. Byte-level, not
//! locale-dependent, matching spec §4.1 "Binary safety" for command names
//! and numeric fields.

use crate::error::CommandError;

pub fn parse_i64(bytes: &[u8]) -> Result<i64, CommandError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(CommandError::not_integer)
}

pub fn parse_f64(bytes: &[u8]) -> Result<f64, CommandError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v: &f64| !v.is_nan())
        .ok_or_else(CommandError::not_float)
}

/// Clamp a (possibly negative, possibly out-of-range) start/stop index pair
/// against a collection of length `len`, Redis range-command style
/// (negative counts from the tail). Returns `None` if the resulting range is
/// empty.
pub fn clamp_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let norm = |i: i64| -> i64 {
        if i < 0 {
            (len + i).max(0)
        } else {
            i
        }
    };
    let start = norm(start).min(len - 1).max(0);
    let stop = norm(stop).min(len - 1);
    if stop < start {
        return None;
    }
    Some((start as usize, stop as usize))
}

pub fn uppercase(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_range_handles_negative_indices() {
        assert_eq!(clamp_range(-2, -1, 5), Some((3, 4)));
        assert_eq!(clamp_range(0, -1, 5), Some((0, 4)));
        assert_eq!(clamp_range(10, 20, 5), None);
    }

    #[test]
    fn rejects_non_numeric_integer() {
        assert!(parse_i64(b"abc").is_err());
        assert!(parse_i64(b"12").is_ok());
    }
}
