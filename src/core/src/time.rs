//! Time helpers
//!
//! All timestamps in the broker are UTC. Signed token claims carry second
//! precision, so the helpers truncate sub-second components to keep stored
//! timestamps and round-tripped claims comparable.

use chrono::{DateTime, Duration, Utc};

/// Current UTC time, truncated to whole seconds
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now - Duration::nanoseconds(now.timestamp_subsec_nanos() as i64)
}

/// Current UTC time plus an offset, truncated to whole seconds
pub fn now_plus(offset: Duration) -> DateTime<Utc> {
    now() + offset
}
