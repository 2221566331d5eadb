//! Progressive buzz pricing.
//!
//! A stepped curve over fixed count bands, priced in euro-cents. Past the
//! daily ceiling the curve returns the zero sentinel, which callers must
//! treat as "blocked for today" and short-circuit on.

/// Maximum buzz actions per user per calendar day.
pub const DAILY_BUZZ_CEILING: u32 = 50;

/// Price in euro-cents for the nth buzz of the day.
///
/// `daily_count` is the counter value *after* incrementing for the
/// current action, so the first buzz of the day is `1`. Returns 0 once
/// the count exceeds [`DAILY_BUZZ_CEILING`].
pub fn price_cents(daily_count: u32) -> i64 {
    match daily_count {
        1..=10 => 199,
        11..=20 => 399,
        21..=30 => 599,
        31..=40 => 799,
        41..=50 => 999,
        _ => 0,
    }
}
