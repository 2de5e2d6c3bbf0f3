//! Hexadecimal keypad: layout table and a ready to use key state tracker.
//!
//! ```text
//! |1|2|3|C|      |1|2|3|4|
//! |4|5|6|D|  ->  |Q|W|E|R|
//! |7|8|9|E|  ->  |A|S|D|F|
//! |A|0|B|F|      |Z|X|C|V|
//! ```

use heapless::Deque;
use log::trace;

pub const KEY_COUNT: usize = 16;

/// Maximum number of key presses remembered between polls
pub const EVENT_QUEUE_LEN: usize = 16;

/// Table from logical keys `0x0..=0xF` to the physical keys of a host
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyMap<K>([K; KEY_COUNT]);

impl<K: PartialEq> KeyMap<K> {
    /// Layout indexed by logical key
    pub fn new(physical: [K; KEY_COUNT]) -> Self {
        Self(physical)
    }

    /// Logical key bound to `physical`, if any
    pub fn logical(&self, physical: &K) -> Option<u8> {
        self.0
            .iter()
            .position(|key| key == physical)
            .map(|idx| idx as u8)
    }

    pub fn physical(&self, logical: u8) -> Option<&K> {
        self.0.get(logical as usize)
    }
}

impl KeyMap<char> {
    /// Left four alphanumeric columns of a QWERTY keyboard
    #[rustfmt::skip]
    pub fn qwerty() -> Self {
        Self([
            'x', '1', '2', '3',
            'q', 'w', 'e', 'a',
            's', 'd', 'z', 'c',
            '4', 'r', 'f', 'v',
        ])
    }

    /// Case insensitive lookup
    pub fn logical_char(&self, physical: char) -> Option<u8> {
        self.logical(&physical.to_ascii_lowercase())
    }
}

impl Default for KeyMap<char> {
    fn default() -> Self {
        Self::qwerty()
    }
}

/// Level and edge state of the 16 logical keys
///
/// Hosts feed it with `press` and `release` and forward queries made by the interpreter
/// through their `Context` implementation.
#[derive(Clone, Debug, Default)]
pub struct KeypadState {
    down: [bool; KEY_COUNT],
    presses: Deque<u8, EVENT_QUEUE_LEN>,
}

impl KeypadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as held, queueing a press event on the up -> down transition
    pub fn press(&mut self, key: u8) {
        let Some(down) = self.down.get_mut(key as usize) else {
            trace!("Ignoring press of non existent key {:#X}", key);
            return;
        };
        if !*down {
            *down = true;
            if self.presses.push_back(key).is_err() {
                trace!("Key event queue full, dropping press of {:#X}", key);
            }
        }
    }

    pub fn release(&mut self, key: u8) {
        if let Some(down) = self.down.get_mut(key as usize) {
            *down = false;
        }
    }

    pub fn release_all(&mut self) {
        self.down = [false; KEY_COUNT];
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        self.down.get(key as usize).copied().unwrap_or(false)
    }

    /// Oldest press not yet consumed
    pub fn poll_key_press_event(&mut self) -> Option<u8> {
        self.presses.pop_front()
    }

    /// Forget presses not consumed so far
    pub fn clear_events(&mut self) {
        self.presses.clear();
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.down
    }
}
