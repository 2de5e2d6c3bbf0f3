//! Headless host for the `chip8vm` interpreter.
//!
//! Loads a program image from disk, runs it with scripted input either at a fixed
//! simulated rate or paced by the wall clock, and reports the final display.

pub mod cli;
pub mod clock;
pub mod context;
pub mod logger;
pub mod render;

use std::fmt;
use std::fs;

use anyhow::Context as _;
use chip8vm::{Builder, Chip8, Clock, Driver, FixedClock, StopReason};
use log::info;

use crate::cli::Args;
use crate::clock::WallClock;
use crate::context::{HostContext, Script};

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub reason: StopReason,
    pub cycles: u64,
    pub pc: u16,
    /// Final display as text
    pub frame: String,
}

impl Report {
    pub fn exit_code(&self) -> i32 {
        match self.reason {
            StopReason::Halted | StopReason::CycleLimit => 0,
            StopReason::Fault(_) => 1,
        }
    }

    fn new(chip: &Chip8<HostContext>, reason: StopReason, cycles: u64, scale: usize) -> Self {
        Self {
            reason,
            cycles,
            pc: chip.pc(),
            frame: render::ascii(chip.frame(), scale),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)?;
        match self.reason {
            StopReason::Halted => write!(f, "halted after {} cycles", self.cycles),
            StopReason::CycleLimit => write!(f, "stopped at cycle limit of {}", self.cycles),
            StopReason::Fault(fault) => write!(
                f,
                "fault at {:#05X} after {} cycles: {}",
                self.pc, self.cycles, fault
            ),
        }
    }
}

/// Read the program image named by `args` and run it
pub fn run(args: &Args) -> anyhow::Result<Report> {
    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read program image {}", args.rom.display()))?;
    info!("Loaded {} ({} bytes)", args.rom.display(), rom.len());
    run_image(args, &rom)
}

/// Run an in-memory program image configured by `args`
pub fn run_image(args: &Args, rom: &[u8]) -> anyhow::Result<Report> {
    let ctx = HostContext::new(Script::new(args.presses.clone(), args.hold), args.seed);
    let chip = Builder::new()
        .with_context(ctx)
        .with_program(rom)
        .build()
        .with_context(|| format!("cannot start {}", args.rom.display()))?;

    if args.realtime {
        Ok(drive(chip, WallClock::new(args.hz), args))
    } else {
        Ok(drive(chip, FixedClock::from_hz(args.hz), args))
    }
}

fn drive<K: Clock>(chip: Chip8<HostContext>, clock: K, args: &Args) -> Report {
    let mut driver = Driver::new(chip, clock);
    let max_cycles = args.max_cycles.unwrap_or(u64::MAX);
    let reason = driver.run_with(max_cycles, |chip, cycle| chip.ctx.on_cycle(cycle));
    Report::new(driver.chip(), reason, driver.cycles(), args.scale as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip8vm::Fault;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["chip8", "test.ch8"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn assemble(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn halting_program() {
        let rom = assemble(&[0xA000, 0xD005]);
        let report = run_image(&args(&[]), &rom).unwrap();
        assert_eq!(report.reason, StopReason::Halted);
        assert_eq!(report.cycles, 3);
        assert_eq!(report.exit_code(), 0);
        assert!(report.frame.starts_with("####....."));
        assert!(report.to_string().ends_with("halted after 3 cycles"));
    }

    #[test]
    fn cycle_limit() {
        let rom = assemble(&[0x1200]);
        let report = run_image(&args(&["--max-cycles", "64"]), &rom).unwrap();
        assert_eq!(report.reason, StopReason::CycleLimit);
        assert_eq!(report.cycles, 64);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn faulting_program() {
        let rom = assemble(&[0x00EE]);
        let report = run_image(&args(&[]), &rom).unwrap();
        assert_eq!(report.reason, StopReason::Fault(Fault::StackUnderflow));
        assert_eq!(report.exit_code(), 1);
        assert!(report.to_string().contains("fault at 0x200"));
    }

    #[test]
    fn scripted_key_wakes_program() {
        // wait for key into V0, show its glyph
        let rom = assemble(&[0xF00A, 0xF029, 0x6100, 0xD115]);
        let report = run_image(&args(&["--press", "z@30"]), &rom).unwrap();
        assert_eq!(report.reason, StopReason::Halted);
        assert_eq!(report.cycles, 31 + 4);
        // glyph of A
        assert!(report.frame.starts_with("####."));
        assert!(report.frame.lines().nth(4).unwrap().starts_with("#..#."));
    }

    #[test]
    fn oversized_image() {
        let rom = vec![0u8; 4000];
        let err = run_image(&args(&[]), &rom).unwrap_err();
        assert!(format!("{:#}", err).contains("exceeds available 3584 bytes"));
    }

    #[test]
    fn missing_file() {
        let err = run(&args(&[])).unwrap_err();
        assert!(err.to_string().contains("test.ch8"));
    }
}
