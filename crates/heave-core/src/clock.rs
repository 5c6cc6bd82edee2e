/// Tracks simulated time as a tick counter and a fixed timestep.
///
/// Time is always `tick × timestep`, never an accumulated sum, so sample
/// `n` of a run reports exactly `n × dt`.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    timestep: f64,
}

impl SimClock {
    /// Create a clock at tick 0 with the given step size in seconds.
    pub fn new(timestep: f64) -> Self {
        Self { tick: 0, timestep }
    }

    /// Advance the clock by one step. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.timestep
    }

    /// Return the configured step size in seconds.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new(0.015);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn clock_advance_increments() {
        let mut clock = SimClock::new(0.5);
        clock.advance();
        clock.advance();
        assert_eq!(clock.advance(), 3);
        assert!((clock.time() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_time_does_not_drift() {
        let mut clock = SimClock::new(0.015);
        for _ in 0..2666 {
            clock.advance();
        }
        assert_eq!(clock.time(), 2666.0 * 0.015);
        assert!(clock.time() <= 40.0);
        clock.advance();
        assert!(clock.time() > 40.0);
    }

    proptest! {
        #[test]
        fn time_is_tick_times_step(dt in 1e-4f64..1.0, n in 0u64..5000) {
            let mut clock = SimClock::new(dt);
            for _ in 0..n {
                clock.advance();
            }
            prop_assert_eq!(clock.tick(), n);
            prop_assert_eq!(clock.time(), n as f64 * dt);
        }
    }
}
