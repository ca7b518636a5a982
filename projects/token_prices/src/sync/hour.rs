use std::ops::RangeInclusive;

pub const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Hours covered by the start-up backfill: the trailing seven days.
pub const BACKFILL_HOURS: i64 = 7 * 24;

/// `floor(epoch_seconds / 3600)`; floors toward negative infinity as well.
pub fn hour_index(epoch_seconds: i64) -> i64 {
    epoch_seconds.div_euclid(SECONDS_PER_HOUR)
}

pub fn hour_start(epoch_seconds: i64) -> i64 {
    hour_index(epoch_seconds) * SECONDS_PER_HOUR
}

/// The `count` hour buckets ending with the bucket that contains `now`.
pub fn trailing_hours(now_epoch_seconds: i64, count: i64) -> RangeInclusive<i64> {
    let current = hour_index(now_epoch_seconds);
    (current - count + 1)..=current
}
