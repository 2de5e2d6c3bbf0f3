use std::thread;
use std::time::{Duration, Instant};

use chip8vm::Clock;

/// Wall clock pacing steps to a fixed rate
///
/// Each call sleeps until one period passed since the previous one and reports the time
/// that really elapsed, so a slow host still keeps timers in sync with real time.
pub struct WallClock {
    period: Duration,
    last: Instant,
}

impl WallClock {
    pub fn new(hz: u32) -> Self {
        Self {
            period: Duration::from_nanos(1_000_000_000u64 / hz.max(1) as u64),
            last: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Clock for WallClock {
    fn elapsed_ms(&mut self) -> f64 {
        let deadline = self.last + self.period;
        let now = Instant::now();
        if now < deadline {
            thread::sleep(deadline - now);
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paces_to_period() {
        let mut clock = WallClock::new(200);
        assert_eq!(clock.period(), Duration::from_millis(5));
        let steps: Vec<f64> = (0..4).map(|_| clock.elapsed_ms()).collect();
        assert!(steps.iter().all(|&ms| ms > 4.99), "{:?}", steps);
    }
}
