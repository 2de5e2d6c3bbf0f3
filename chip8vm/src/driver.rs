//! Cycle driver: feeds elapsed time to the interpreter one step at a time.
//!
//! The driver owns no UI. Hosts decide what happens between steps through the `run`
//! hook, where input can be injected and the frame can be drawn.

use log::{debug, info};

use crate::chip8::{Chip8, CycleOutcome};
use crate::context::Context;
use crate::error::Fault;

/// Source of elapsed real time between two steps
pub trait Clock {
    /// Milliseconds passed since the previous call
    fn elapsed_ms(&mut self) -> f64;
}

/// Clock advancing by the same amount on every step, for running at a nominal rate
/// without looking at the wall clock
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedClock {
    step_ms: f64,
}

impl FixedClock {
    pub fn new(step_ms: f64) -> Self {
        Self { step_ms }
    }

    /// Clock matching `hz` steps per second
    pub fn from_hz(hz: u32) -> Self {
        Self::new(1000.0 / hz.max(1) as f64)
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }
}

impl Clock for FixedClock {
    fn elapsed_ms(&mut self) -> f64 {
        self.step_ms
    }
}

/// Why `Driver::run` returned
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopReason {
    Halted,
    Fault(Fault),
    /// Cycle budget used up while the program was still running
    CycleLimit,
}

pub struct Driver<C: Context, K: Clock> {
    chip: Chip8<C>,
    clock: K,
    cycles: u64,
}

impl<C: Context, K: Clock> Driver<C, K> {
    pub fn new(chip: Chip8<C>, clock: K) -> Self {
        Self {
            chip,
            clock,
            cycles: 0,
        }
    }

    /// Single step with the time reported by the clock
    pub fn step(&mut self) -> CycleOutcome {
        let elapsed = self.clock.elapsed_ms();
        let outcome = self.chip.step(elapsed);
        self.cycles += 1;
        outcome
    }

    /// Step until the program halts, faults or `max_cycles` steps were made
    pub fn run(&mut self, max_cycles: u64) -> StopReason {
        self.run_with(max_cycles, |_, _| {})
    }

    /// Like `run`, calling `hook` with the machine and the cycle counter before every step
    pub fn run_with<F>(&mut self, max_cycles: u64, mut hook: F) -> StopReason
    where
        F: FnMut(&mut Chip8<C>, u64),
    {
        let started = self.cycles;
        while self.cycles - started < max_cycles {
            hook(&mut self.chip, self.cycles);
            match self.step() {
                CycleOutcome::Continue => {}
                CycleOutcome::Halted => {
                    info!("Program halted after {} cycles", self.cycles);
                    return StopReason::Halted;
                }
                CycleOutcome::Fault(fault) => return StopReason::Fault(fault),
            }
        }
        debug!("Cycle limit of {} reached", max_cycles);
        StopReason::CycleLimit
    }

    /// Number of steps made so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn chip(&self) -> &Chip8<C> {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut Chip8<C> {
        &mut self.chip
    }

    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }

    pub fn into_inner(self) -> (Chip8<C>, K) {
        (self.chip, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::TestingContext;

    fn driver_with(prog: &[u8], hz: u32) -> Driver<TestingContext, FixedClock> {
        let chip = Chip8::load(TestingContext::new(0), prog).unwrap();
        Driver::new(chip, FixedClock::from_hz(hz))
    }

    #[test]
    fn fixed_clock() {
        assert_eq!(FixedClock::from_hz(500).step_ms(), 2.0);
        assert_eq!(FixedClock::from_hz(0).step_ms(), 1000.0);
        let mut clock = FixedClock::new(16.0);
        assert_eq!(clock.elapsed_ms(), 16.0);
        assert_eq!(clock.elapsed_ms(), 16.0);
    }

    #[test]
    fn run_until_halt() {
        let mut driver = driver_with(&[0x60, 0x01, 0x70, 0x01], 500);
        assert_eq!(driver.run(100), StopReason::Halted);
        assert_eq!(driver.cycles(), 3);
        assert_eq!(driver.chip().registers()[0], 0x02);
    }

    #[test]
    fn run_until_limit() {
        // 0x200: jump to 0x200
        let mut driver = driver_with(&[0x12, 0x00], 500);
        assert_eq!(driver.run(250), StopReason::CycleLimit);
        assert_eq!(driver.cycles(), 250);
        assert_eq!(driver.run(50), StopReason::CycleLimit);
        assert_eq!(driver.cycles(), 300);
    }

    #[test]
    fn run_until_fault() {
        let mut driver = driver_with(&[0x00, 0xEE], 500);
        assert_eq!(driver.run(10), StopReason::Fault(Fault::StackUnderflow));
        assert_eq!(driver.cycles(), 1);
    }

    #[test]
    fn clock_drives_timers() {
        // V0 = 30, DT = V0, loop forever
        let mut driver = driver_with(&[0x60, 0x1E, 0xF0, 0x15, 0x12, 0x04], 60);
        driver.run(2);
        assert_eq!(driver.chip().delay_timer(), 30);
        driver.run(30);
        assert_eq!(driver.chip().delay_timer(), 0);
    }

    #[test]
    fn hook_injects_input() {
        // wait for key into V3, then halt
        let mut driver = driver_with(&[0xF3, 0x0A], 500);
        let reason = driver.run_with(100, |chip, cycle| {
            if cycle == 40 {
                chip.ctx.set_key(0x9);
            }
        });
        assert_eq!(reason, StopReason::Halted);
        assert_eq!(driver.chip().registers()[3], 0x9);
        assert_eq!(driver.cycles(), 42);
    }
}
