//! Human-readable data age for the "last updated" indicator.

use serde::Serialize;

use tripwatch_core::Timestamp;

/// Elapsed time since a refresh, in the largest whole unit that fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum Elapsed {
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
}

/// Time from `then` until `now`. A `then` in the future reads as `0s ago`.
pub fn time_ago(then: Timestamp, now: Timestamp) -> Elapsed {
    let secs = u64::try_from(then.duration_until(&now).num_seconds()).unwrap_or(0);
    match secs {
        0..=59 => Elapsed::Seconds(secs),
        60..=3_599 => Elapsed::Minutes(secs / 60),
        _ => Elapsed::Hours(secs / 3_600),
    }
}

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds(n) => write!(f, "{n}s ago"),
            Self::Minutes(n) => write!(f, "{n}m ago"),
            Self::Hours(n) => write!(f, "{n}h ago"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(1_768_464_000 + secs).unwrap()
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(time_ago(at(0), at(12)).to_string(), "12s ago");
        assert_eq!(time_ago(at(0), at(59)), Elapsed::Seconds(59));
        assert_eq!(time_ago(at(0), at(60)), Elapsed::Minutes(1));
        assert_eq!(time_ago(at(0), at(4 * 60 + 59)).to_string(), "4m ago");
        assert_eq!(time_ago(at(0), at(3_600)), Elapsed::Hours(1));
        assert_eq!(time_ago(at(0), at(2 * 3_600 + 1_800)).to_string(), "2h ago");
    }

    #[test]
    fn future_clamps_to_zero() {
        assert_eq!(time_ago(at(30), at(0)), Elapsed::Seconds(0));
    }
}
