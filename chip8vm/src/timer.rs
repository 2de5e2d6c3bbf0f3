use log::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    On,
    Off,
    Finished,
}

/// 8-bit countdown register, stops at zero
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timer(u8);

impl Timer {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn store(&mut self, value: u8) {
        self.0 = value;
    }

    #[inline]
    pub fn load(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn decrement(&mut self) -> TimerState {
        if self.0 > 0 {
            self.0 -= 1;
            if self.0 == 0 {
                TimerState::Finished
            } else {
                TimerState::On
            }
        } else {
            TimerState::Off
        }
    }
}

/// Timer decay rate in Hz
pub const TIMER_FREQUENCY: u64 = 60;

/// Accumulator unit: one nanosecond of real time is worth `TIMER_FREQUENCY` units, so a single
/// timer period is exactly one second of units and no rounding drift builds up.
const NANOS_PER_MILLI: f64 = 1_000_000.0;
const UNITS_PER_TICK: u64 = 1_000_000_000;

/// Delay and sound timers decayed at 60 Hz from a variable real-time step
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timers {
    pub delay: Timer,
    pub sound: Timer,
    accumulator: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `elapsed_ms` of real time, decrementing both timers once per elapsed
    /// 1/60 s period.
    ///
    /// Negative, NaN and infinite values carry no usable time and are treated as zero.
    /// Returns the state of the sound timer after its last decrement, `None` when no
    /// period elapsed.
    pub fn advance(&mut self, elapsed_ms: f64) -> Option<TimerState> {
        let elapsed_ms = sanitize_elapsed(elapsed_ms);
        // elapsed_ms is finite and non-negative here, the cast saturates
        let nanos = (elapsed_ms * NANOS_PER_MILLI + 0.5) as u64;
        self.accumulator = self
            .accumulator
            .saturating_add(nanos.saturating_mul(TIMER_FREQUENCY));

        let ticks = self.accumulator / UNITS_PER_TICK;
        self.accumulator %= UNITS_PER_TICK;

        // both timers are 8-bit, anything past 255 ticks only keeps them at zero
        let mut sound_state = None;
        for _ in 0..ticks.min(u8::MAX as u64 + 1) {
            self.delay.decrement();
            sound_state = Some(match (sound_state, self.sound.decrement()) {
                (Some(TimerState::Finished), TimerState::Off) => TimerState::Finished,
                (_, state) => state,
            });
        }
        sound_state
    }

    /// Drop real time accumulated towards the next period
    pub fn reset_accumulator(&mut self) {
        self.accumulator = 0;
    }
}

fn sanitize_elapsed(elapsed_ms: f64) -> f64 {
    if elapsed_ms.is_finite() && elapsed_ms >= 0.0 {
        elapsed_ms
    } else {
        warn!("Ignoring invalid elapsed time {}ms", elapsed_ms);
        0.0
    }
}
