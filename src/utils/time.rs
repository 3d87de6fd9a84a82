/// Time helpers. Capture timestamps are epoch milliseconds UTC; display
/// formatting uses Hong Kong time, where the races run.
use chrono::{TimeZone, Utc};
use chrono_tz::Asia::Hong_Kong;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format an epoch-millisecond timestamp as a Hong Kong local time string.
pub fn hk_time_string(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(utc) => utc
            .with_timezone(&Hong_Kong)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hk_time_is_utc_plus_eight() {
        // 2025-09-21 04:00:00 UTC = 12:00:00 in Hong Kong
        assert_eq!(hk_time_string(1_758_427_200_000), "2025-09-21 12:00:00");
    }

    #[test]
    fn test_out_of_range_timestamp_formats_as_dash() {
        assert_eq!(hk_time_string(i64::MAX), "-");
    }
}
