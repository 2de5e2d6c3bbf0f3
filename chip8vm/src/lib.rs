#![cfg_attr(not(test), no_std)]
pub mod builder;
pub mod chip8;
pub mod context;
pub mod driver;
pub mod error;
pub mod frame;
pub mod keypad;
pub mod memory;
pub mod opcode;
pub mod timer;
#[cfg(test)]
pub(crate) mod utils;

pub use builder::Builder;
pub use chip8::{Chip8, CycleOutcome, ExecState};
pub use context::Context;
pub use driver::{Clock, Driver, FixedClock, StopReason};
pub use error::{BuildError, Fault, LoadError};
pub use frame::{FrameView, HEIGHT, WIDTH};
pub use keypad::{KeyMap, KeypadState};
pub use opcode::OpCode;

#[cfg(feature = "embedded-graphics")]
pub use embedded_graphics;
