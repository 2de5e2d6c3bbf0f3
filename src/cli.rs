use std::path::PathBuf;
use std::str::FromStr;

use chip8vm::KeyMap;
use clap::Parser;

pub const DEFAULT_HZ: u32 = 500;
pub const DEFAULT_HOLD: u64 = 10;

/// Headless CHIP-8 interpreter
///
/// Runs a program image until it halts, faults or reaches the cycle limit, then prints
/// the display as text.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the program image
    pub rom: PathBuf,

    /// Instruction steps per second
    #[arg(long, default_value_t = DEFAULT_HZ, value_parser = clap::value_parser!(u32).range(1..))]
    pub hz: u32,

    /// Stop after this many steps
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Pace steps with the wall clock instead of a fixed simulated step
    #[arg(long)]
    pub realtime: bool,

    /// Scripted key press, KEY is a keyboard key (1234 qwer asdf zxcv) or a hex key like 0xA
    #[arg(long = "press", value_name = "KEY@CYCLE")]
    pub presses: Vec<KeyPress>,

    /// Number of steps a scripted key stays held
    #[arg(long, default_value_t = DEFAULT_HOLD)]
    pub hold: u64,

    /// Seed of the random number generator, random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Size of a display pixel in printed characters
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub scale: u8,

    /// Increase logging verbosity, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Logical key pressed at the given step
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: u8,
    pub cycle: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyPressError {
    #[error("expected KEY@CYCLE")]
    MissingSeparator,
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("invalid cycle `{0}`")]
    BadCycle(String),
}

impl FromStr for KeyPress {
    type Err = KeyPressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, cycle) = s.split_once('@').ok_or(KeyPressError::MissingSeparator)?;
        let cycle = cycle
            .trim()
            .parse()
            .map_err(|_| KeyPressError::BadCycle(cycle.to_owned()))?;
        let key = parse_key(key.trim()).ok_or_else(|| KeyPressError::UnknownKey(key.to_owned()))?;
        Ok(Self { key, cycle })
    }
}

fn parse_key(key: &str) -> Option<u8> {
    if let Some(hex) = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).ok().filter(|&k| k < 16);
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => KeyMap::qwerty().logical_char(c),
        _ => None,
    }
}
