//! Manually driven `Clock` for tests that care when a session last synced.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use taleweave_core::clock::Clock;

use crate::fixtures::fixed_now;

/// A clock that only moves when the test moves it.
#[derive(Debug)]
pub struct StepClock {
    now: Mutex<DateTime<Utc>>,
}

impl StepClock {
    /// Starts the clock at `start`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::starting_at(fixed_now())
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_only_moves_when_advanced() {
        let clock = StepClock::default();

        let before = clock.now();
        clock.advance(TimeDelta::seconds(30));

        assert_eq!(before, fixed_now());
        assert_eq!(clock.now(), before + TimeDelta::seconds(30));
    }
}
