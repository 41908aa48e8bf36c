//! Clocks driving the watchdog and status timing.

use embedded_time::{clock, rate::Fraction, Clock, Instant};
use std::{cell::Cell, rc::Rc, time};

/// A monotonic wall clock with microsecond ticks, starting at creation.
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    start: time::Instant,
}

impl Default for StdClock {
    fn default() -> Self {
        Self {
            start: time::Instant::now(),
        }
    }
}

impl Clock for StdClock {
    type T = u64;

    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
        let micros = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);
        Ok(Instant::new(micros))
    }
}

/// A clock that only moves when advanced.
///
/// Clones share the same time, so a simulation can advance the clock it handed
/// to the controller.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    micros: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Advance the clock by `dt` seconds.
    pub fn advance(&self, dt: f32) {
        let step = (f64::from(dt) * 1e6).round().max(0.) as u64;
        self.micros.set(self.micros.get().saturating_add(step));
    }

    pub fn set_micros(&self, micros: u64) {
        self.micros.set(micros);
    }

    pub fn micros(&self) -> u64 {
        self.micros.get()
    }
}

impl Clock for ManualClock {
    type T = u64;

    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
        Ok(Instant::new(self.micros.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ManualClock, StdClock};
    use embedded_time::{duration::Milliseconds, Clock};

    #[test]
    fn it_advances_shared_time() {
        let clock = ManualClock::default();
        let handle = clock.clone();

        handle.advance(0.032);
        handle.advance(0.032);
        assert_eq!(clock.micros(), 64_000);

        let now = Milliseconds::<u64>::try_from(clock.try_now().unwrap().duration_since_epoch());
        assert_eq!(now.unwrap(), Milliseconds(64u64));
    }

    #[test]
    fn it_is_monotonic() {
        let clock = StdClock::default();
        let a = clock.try_now().unwrap();
        let b = clock.try_now().unwrap();
        assert!(b >= a);
    }
}
