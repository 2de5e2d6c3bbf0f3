use chip8vm::{Context, KeypadState};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cli::KeyPress;

/// Key presses replayed at fixed steps, each held for `hold` steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    presses: Vec<KeyPress>,
    hold: u64,
}

impl Script {
    pub fn new(mut presses: Vec<KeyPress>, hold: u64) -> Self {
        presses.sort_by_key(|press| press.cycle);
        Self {
            presses,
            hold: hold.max(1),
        }
    }

    /// Bring `keypad` to the state scripted for step `cycle`
    pub fn apply(&self, keypad: &mut KeypadState, cycle: u64) {
        for press in &self.presses {
            if press.cycle == cycle {
                debug!("Scripted press of key {:X} at cycle {}", press.key, cycle);
                keypad.press(press.key);
            } else if press.cycle.saturating_add(self.hold) == cycle
                && !self.is_held(press.key, cycle)
            {
                debug!("Scripted release of key {:X} at cycle {}", press.key, cycle);
                keypad.release(press.key);
            }
        }
    }

    fn is_held(&self, key: u8, cycle: u64) -> bool {
        self.presses.iter().any(|p| {
            p.key == key && p.cycle <= cycle && cycle < p.cycle.saturating_add(self.hold)
        })
    }
}

/// Terminal host: scripted keypad, seeded random numbers, buzzer reported through the log
pub struct HostContext {
    pub keypad: KeypadState,
    script: Script,
    rng: StdRng,
    buzzing: bool,
}

impl HostContext {
    pub fn new(script: Script, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            keypad: KeypadState::new(),
            script,
            rng,
            buzzing: false,
        }
    }

    /// Called before every step
    pub fn on_cycle(&mut self, cycle: u64) {
        self.script.apply(&mut self.keypad, cycle);
    }

    pub fn is_buzzing(&self) -> bool {
        self.buzzing
    }
}

impl Context for HostContext {
    fn is_key_down(&self, key: u8) -> bool {
        self.keypad.is_key_down(key)
    }

    fn poll_key_press_event(&mut self) -> Option<u8> {
        self.keypad.poll_key_press_event()
    }

    fn gen_random(&mut self) -> u8 {
        self.rng.gen()
    }

    fn sound_on(&mut self) {
        info!("Buzzer on");
        self.buzzing = true;
    }

    fn sound_off(&mut self) {
        info!("Buzzer off");
        self.buzzing = false;
    }
}
