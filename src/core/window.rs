use crate::domain::model::TimeWindow;
use crate::utils::error::Result;
use crate::utils::validation::validate_range;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;
/// 一年，超過這個範圍單頁 `$limit` 幾乎必定被截斷
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 365;

const SOQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Rolling window ending at the current wall-clock time.
pub fn rolling_window(hours: i64, timezone: Tz) -> Result<TimeWindow> {
    window_ending_at(Utc::now(), hours, timezone)
}

/// Rolling window ending at `now`, expressed in `timezone` and UTC.
pub fn window_ending_at(now: DateTime<Utc>, hours: i64, timezone: Tz) -> Result<TimeWindow> {
    validate_range("window.hours", hours, 1, MAX_LOOKBACK_HOURS)?;

    let now_local = now.with_timezone(&timezone);
    let local_start = now_local - Duration::hours(hours);
    let utc_start = local_start.with_timezone(&Utc);
    let utc_start_iso = utc_start.format(SOQL_TIMESTAMP_FORMAT).to_string();

    tracing::debug!(
        "Window for {}h: local {} / utc {}",
        hours,
        local_start,
        utc_start_iso
    );

    Ok(TimeWindow {
        hours,
        local_start,
        utc_start,
        utc_start_iso,
    })
}
