//! Flat 4KiB address space of the interpreter.
//!
//! ```text
//! 0x000-0x04F  built-in hexadecimal font (16 glyphs, 5 rows each)
//! 0x050-0x1FF  unused
//! 0x200-0xFFF  program image and work memory
//! ```

use crate::error::{Fault, LoadError};

pub const MEM_LENGTH: usize = 4096;
/// Address of the first instruction of every program
pub const PROGRAM_START: usize = 0x200;
pub const MAX_PROGRAM_LEN: usize = MEM_LENGTH - PROGRAM_START;

pub const FONT_BASE: usize = 0x000;
pub const GLYPH_HEIGHT: usize = 5;

#[rustfmt::skip]
pub const FONT_SET: [u8; 16 * GLYPH_HEIGHT] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Memory([u8; MEM_LENGTH]);

impl Memory {
    /// Zeroed memory with the font set in place
    pub fn new() -> Self {
        let mut memory = Self([0; MEM_LENGTH]);
        memory.0[FONT_BASE..FONT_BASE + FONT_SET.len()].copy_from_slice(&FONT_SET);
        memory
    }

    /// Copy program image to memory from 0x200 (_start address)
    ///
    /// Whatever was stored in the program area before is cleared, so a shorter image never
    /// leaves remnants of a previous one behind.
    pub fn load(&mut self, prog: &[u8]) -> Result<(), LoadError> {
        if prog.len() > MAX_PROGRAM_LEN {
            return Err(LoadError::too_large(prog.len()));
        }
        let program_area = &mut self.0[PROGRAM_START..];
        program_area.fill(0);
        program_area[..prog.len()].copy_from_slice(prog);
        Ok(())
    }

    /// Address of the glyph drawing hexadecimal digit `digit`
    pub fn glyph_address(digit: u8) -> u16 {
        (FONT_BASE + (digit & 0x0F) as usize * GLYPH_HEIGHT) as u16
    }

    pub fn read(&self, address: usize) -> Result<u8, Fault> {
        self.0
            .get(address)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), Fault> {
        self.0
            .get_mut(address)
            .map(|cell| *cell = value)
            .ok_or(Fault::MemoryOutOfBounds { address })
    }

    /// Read big-endian instruction word stored at `address` and `address + 1`
    pub fn read_word(&self, address: usize) -> Result<u16, Fault> {
        let hi = self.read(address)?;
        let lo = self.read(address + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Borrow `len` consecutive bytes starting at `address`
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8], Fault> {
        self.bounds(address, len).map(|range| &self.0[range])
    }

    pub fn slice_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8], Fault> {
        let range = self.bounds(address, len)?;
        Ok(&mut self.0[range])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.0
    }

    fn bounds(&self, address: usize, len: usize) -> Result<core::ops::Range<usize>, Fault> {
        let end = address + len;
        if end <= MEM_LENGTH {
            Ok(address..end)
        } else {
            // report the first byte which does not fit
            Err(Fault::MemoryOutOfBounds {
                address: address.max(MEM_LENGTH),
            })
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
