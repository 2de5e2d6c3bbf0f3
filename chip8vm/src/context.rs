//! Context for accessing functionalities of platform that `Chip8` is
//! emulated on.
//!
//! The interpreter never talks to keyboard, audio or random number hardware itself.
//! Everything it needs from the outside world goes through this trait, so a headless
//! implementation with synthetic input is as good as a real one.

/// Trait aggregating platform functionalities
pub trait Context {
    /// Whether logical key `key` (`0x0..=0xF`) is currently held
    ///
    /// Called by `EX9E` and `EXA1`
    fn is_key_down(&self, key: u8) -> bool;
    /// Take the next key press (up -> down transition) reported by the host
    ///
    /// Called by `FX0A` on every step while waiting for a key
    fn poll_key_press_event(&mut self) -> Option<u8>;
    /// Generate random 8-bit number
    ///
    /// Called whenever requested by executing program
    fn gen_random(&mut self) -> u8;
    /// Turn sound on
    ///
    /// Called when sound timer is activated
    fn sound_on(&mut self);
    /// Turn sound off
    ///
    /// Called when sound timer has finished counting down
    fn sound_off(&mut self);
}
