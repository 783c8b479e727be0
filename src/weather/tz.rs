//! Timezone equivalence over a time range.
//!
//! The summary tables are bucketed in the server's configured zone. A
//! request for another zone can still be served from them when both zones
//! keep the same total UTC offset across the whole range.

use chrono::{Duration, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

fn total_offset_secs(tz: Tz, instant: NaiveDateTime) -> i32 {
    tz.offset_from_utc_datetime(&instant).fix().local_minus_utc()
}

/// Walk `[start, end]` in one-day steps and compare the total UTC offset
/// (zone plus DST) of both zones at every sampled instant. Transitions
/// inside a day can slip through the sampling; the zones this service
/// targets all transition on day boundaries.
///
/// Unknown zone names and ranges whose start cannot be mapped into `tz_a`
/// read as not equivalent.
#[must_use]
pub fn same_offsets_over_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    tz_a: &str,
    tz_b: &str,
) -> bool {
    if tz_a == tz_b {
        return true;
    }

    let (Ok(a), Ok(b)) = (tz_a.parse::<Tz>(), tz_b.parse::<Tz>()) else {
        return false;
    };

    // Wall-clock endpoints are interpreted in the requested zone.
    let Some(start_utc) = a.from_local_datetime(&start).earliest() else {
        return false;
    };
    let Some(end_utc) = a.from_local_datetime(&end).earliest() else {
        return false;
    };

    let end_utc = end_utc.naive_utc();
    let mut current = start_utc.naive_utc();
    while current <= end_utc {
        if total_offset_secs(a, current) != total_offset_secs(b, current) {
            return false;
        }
        current += Duration::days(1);
    }

    true
}
