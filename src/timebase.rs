//! Whole-second time base over a wrapping millisecond clock.
//!
//! The hardware millisecond counter is a `u32` and wraps roughly every
//! 49.7 days.  The time base keeps a boundary schedule exactly 1000 ms
//! apart and reports one tick per crossed boundary:
//!
//! ```text
//!   last_boundary            next_boundary = last + 1000 (wrapping)
//!        │<──────── 1000 ms ───────>│
//!   ─────┼──────────────────────────┼──────────▶ now_ms
//!                                   └─ tick_occurred, elapsed += 1
//! ```
//!
//! Naive `now >= next` misfires in two windows around the wrap, so the
//! due check handles them explicitly (see [`TimeBase::is_due`]).

const BOUNDARY_MS: u32 = 1000;

/// Result of one [`TimeBase::tick`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// Seconds counted since start or since the last reset.
    pub elapsed_seconds: u32,
    /// True on exactly one iteration per elapsed second.
    pub tick_occurred: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeBase {
    elapsed_seconds: u32,
    last_boundary_ms: u32,
    next_boundary_ms: u32,
}

impl TimeBase {
    /// Start counting with the first boundary one second after `now_ms`.
    pub fn starting_at(now_ms: u32) -> Self {
        Self {
            elapsed_seconds: 0,
            last_boundary_ms: now_ms,
            next_boundary_ms: now_ms.wrapping_add(BOUNDARY_MS),
        }
    }

    /// Advance the schedule by at most one boundary.
    ///
    /// A loop that stalls for several seconds catches up one tick per
    /// call, so no second is ever skipped or counted twice.
    pub fn tick(&mut self, now_ms: u32) -> Tick {
        let tick_occurred = self.is_due(now_ms);
        if tick_occurred {
            self.last_boundary_ms = self.next_boundary_ms;
            self.next_boundary_ms = self.next_boundary_ms.wrapping_add(BOUNDARY_MS);
            self.elapsed_seconds = self.elapsed_seconds.wrapping_add(1);
        }
        Tick {
            elapsed_seconds: self.elapsed_seconds,
            tick_occurred,
        }
    }

    /// Zero the second counter.  The boundary schedule is untouched, so
    /// the next tick still lands exactly on the second.
    pub fn reset_elapsed(&mut self) {
        self.elapsed_seconds = 0;
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    fn is_due(&self, now_ms: u32) -> bool {
        let (last, next) = (self.last_boundary_ms, self.next_boundary_ms);
        if next >= last {
            // Schedule has not wrapped.  A clock reading below the last
            // boundary means the clock itself wrapped past `next`.
            now_ms >= next || now_ms < last
        } else {
            // Boundary wrapped ahead of the clock.  Until the clock wraps
            // too (drops below `last`), `now_ms >= next` is spurious.
            now_ms < last && now_ms >= next
        }
    }
}
