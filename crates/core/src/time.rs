use chrono::{DateTime, Duration, Utc};

/// Wall-clock source for timestamps such as `completed_at`.
///
/// Countdown progress never reads this clock; it only advances on ticks.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. No effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Result of feeding one tick into a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still running, with the given seconds left.
    Running(u32),
    /// This tick brought the countdown to zero.
    Expired,
    /// The countdown had already reached zero before this tick.
    AlreadyExpired,
}

/// Whole-second countdown for a timed quiz.
///
/// Remaining time only ever decreases, and [`CountdownTick::Expired`] is
/// reported for exactly one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total_seconds: u32,
    remaining_seconds: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            remaining_seconds: total_seconds,
        }
    }

    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }

    pub fn tick(&mut self) -> CountdownTick {
        if self.remaining_seconds == 0 {
            return CountdownTick::AlreadyExpired;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining_seconds)
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_expires_exactly_once() {
        let mut countdown = Countdown::new(2);
        assert_eq!(countdown.tick(), CountdownTick::Running(1));
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(countdown.tick(), CountdownTick::AlreadyExpired);
        assert_eq!(countdown.tick(), CountdownTick::AlreadyExpired);
        assert_eq!(countdown.remaining_seconds(), 0);
        assert_eq!(countdown.elapsed_seconds(), 2);
    }

    #[test]
    fn zero_length_countdown_is_already_expired() {
        let mut countdown = Countdown::new(0);
        assert!(countdown.is_expired());
        assert_eq!(countdown.tick(), CountdownTick::AlreadyExpired);
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(30));
    }
}
