use std::{
    fmt,
    time::{Duration, Instant},
};

/// Source of elapsed time since a fixed start instant.
///
/// Implementations are `Copy` so each stream pump can own its own handle to
/// the same start instant without any locking.
pub trait Clock: Copy + Send + Sync + 'static {
    fn elapsed(&self) -> Duration;

    /// Elapsed time truncated to whole seconds, ready for display.
    fn stamp(&self) -> Elapsed {
        Elapsed::from_duration(self.elapsed())
    }
}

/// Wall-clock stopwatch started once, right after the child begins running.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl Clock for Stopwatch {
    fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Clock frozen at a single elapsed value. Output produced with it is
/// byte-for-byte reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedClock(pub Duration);

impl Clock for FixedClock {
    fn elapsed(&self) -> Duration {
        self.0
    }
}

/// Elapsed duration split into minutes and seconds.
///
/// Renders as `[M:SS] ` with unpadded minutes and zero-padded seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed {
    pub minutes: u64,
    pub seconds: u8,
}

impl Elapsed {
    pub fn from_duration(duration: Duration) -> Self {
        let secs = duration.as_secs();
        Self {
            minutes: secs / 60,
            seconds: (secs % 60) as u8,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{:02}] ", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_unpadded_and_seconds_padded() {
        assert_eq!(Elapsed::from_duration(Duration::ZERO).to_string(), "[0:00] ");
        assert_eq!(
            Elapsed::from_duration(Duration::from_secs(83)).to_string(),
            "[1:23] "
        );
        assert_eq!(
            Elapsed::from_duration(Duration::from_secs(125 * 60 + 7)).to_string(),
            "[125:07] "
        );
    }

    #[test]
    fn truncates_to_whole_seconds() {
        let elapsed = Elapsed::from_duration(Duration::from_millis(59_999));
        assert_eq!(
            elapsed,
            Elapsed {
                minutes: 0,
                seconds: 59
            }
        );
        assert_eq!(
            Elapsed::from_duration(Duration::from_millis(60_000)).to_string(),
            "[1:00] "
        );
    }

    #[test]
    fn fixed_clock_stamps_its_value() {
        let clock = FixedClock(Duration::from_secs(61));
        assert_eq!(clock.stamp().to_string(), "[1:01] ");
    }

    #[test]
    fn stopwatch_starts_near_zero() {
        let clock = Stopwatch::start();
        assert!(clock.started_at() <= Instant::now());
        assert_eq!(clock.stamp().minutes, 0);
    }
}
