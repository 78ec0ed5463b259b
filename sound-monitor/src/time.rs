//! Millisecond timestamps.
//!
//! All timestamps are `u32` milliseconds since boot, as read from the
//! board's free-running timer. They wrap after ~49.7 days, so every
//! comparison goes through [`elapsed_ms`].

/// Milliseconds from `since` to `now`, correct across a counter wrap.
#[inline(always)]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// `true` once at least `interval` milliseconds have passed since `since`.
#[inline(always)]
pub const fn has_elapsed(now: u32, since: u32, interval: u32) -> bool {
    elapsed_ms(now, since) >= interval
}
