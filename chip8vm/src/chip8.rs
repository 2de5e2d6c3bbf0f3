use core::convert::Infallible;

use heapless::Vec;
use log::{debug, error, trace, warn};

use crate::context::Context;
use crate::error::{Fault, LoadError};
use crate::frame::{Frame, FrameView};
use crate::keypad::KEY_COUNT;
use crate::memory::{Memory, PROGRAM_START};
use crate::opcode::OpCode;
use crate::timer::{TimerState, Timers};

/// Maximum depth of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

const VF: usize = 0xF;

/// Result of a single `step`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Instruction executed or still waiting for a key, keep stepping
    Continue,
    /// Zero word fetched at pc, the program has ended
    Halted,
    /// Irrecoverable program error, the faulting instruction had no effect
    Fault(Fault),
}

/// Execution sub-state of the interpreter
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExecState {
    Running,
    /// Parked on `FX0A` until a key press is reported, the key goes to VX
    WaitingForKey { x: u8 },
}

pub struct Chip8<C: Context + Sized> {
    pub ctx: C,
    v: [u8; 16],
    i: u16,
    pc: u16,
    frame: Frame,
    memory: Memory,
    stack: Vec<u16, STACK_DEPTH>,
    timers: Timers,
    state: ExecState,
    // outcome of the halt or fault which stopped the program, reported again until reset
    stopped: Option<CycleOutcome>,
    // memory as it was right after the last program load, restored by `reset`
    image: Memory,
}

impl<C: Context + Sized> Chip8<C> {
    /// Powered on machine with the font in memory and no program
    pub fn new(ctx: C) -> Self {
        let memory = Memory::new();
        Self {
            ctx,
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START as u16,
            frame: Frame::new(),
            image: memory.clone(),
            memory,
            stack: Vec::new(),
            timers: Timers::new(),
            state: ExecState::Running,
            stopped: None,
        }
    }

    /// Create machine and load program from slice of bytes to memory from 0x200 (_start address)
    pub fn load(ctx: C, prog: &[u8]) -> Result<Self, LoadError> {
        let mut chip = Self::new(ctx);
        chip.load_program(prog)?;
        Ok(chip)
    }

    /// Replace the program and re-initialize the machine
    ///
    /// On error the machine is left untouched.
    pub fn load_program(&mut self, prog: &[u8]) -> Result<(), LoadError> {
        let mut image = Memory::new();
        image.load(prog)?;
        debug!("Loaded program of {} bytes", prog.len());
        self.image = image;
        self.reset();
        Ok(())
    }

    /// Bring back the state right after the last program load
    pub fn reset(&mut self) {
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START as u16;
        self.frame.clear();
        self.memory = self.image.clone();
        self.stack.clear();
        if self.timers.sound.load() > 0 {
            self.ctx.sound_off();
        }
        self.timers = Timers::new();
        self.state = ExecState::Running;
        self.stopped = None;
    }

    /// Emulate one cycle: decay timers by `elapsed_ms` of real time, then execute one
    /// instruction
    ///
    /// While waiting for a key (`FX0A`) no instruction is fetched, each step polls the
    /// context for a key press once and returns.
    pub fn step(&mut self, elapsed_ms: f64) -> CycleOutcome {
        self.tick_timers(elapsed_ms);
        self.tick_chip()
    }

    /// Decrement timers once for every 1/60 s contained in the accumulated time
    pub fn tick_timers(&mut self, elapsed_ms: f64) {
        if let Some(TimerState::Finished) = self.timers.advance(elapsed_ms) {
            trace!("Sound timer finished");
            self.ctx.sound_off();
        }
    }

    /// Execute a single instruction at pc, or poll for the key awaited by `FX0A`
    pub fn tick_chip(&mut self) -> CycleOutcome {
        if let Some(outcome) = self.stopped {
            return outcome;
        }
        if let ExecState::WaitingForKey { x } = self.state {
            return match self.wait_for_key(x) {
                Ok(()) | Err(nb::Error::WouldBlock) => CycleOutcome::Continue,
                Err(nb::Error::Other(never)) => match never {},
            };
        }
        let outcome = match self.fetch_execute() {
            Ok(outcome) => outcome,
            Err(fault) => {
                error!("Fault at {:#05X}: {}", self.pc, fault);
                CycleOutcome::Fault(fault)
            }
        };
        if outcome != CycleOutcome::Continue {
            self.stopped = Some(outcome);
        }
        outcome
    }

    fn fetch_execute(&mut self) -> Result<CycleOutcome, Fault> {
        let raw = self.memory.read_word(self.pc as usize)?;
        if raw == 0x0000 {
            debug!("Reached end of program at {:#05X}", self.pc);
            return Ok(CycleOutcome::Halted);
        }
        let opcode = OpCode::from(raw);
        trace!("{:#05X} | {:#06X} | {}", self.pc, raw, opcode);
        self.execute(opcode)?;
        Ok(CycleOutcome::Continue)
    }

    /// Take one key press from the context, blocks until there is one
    fn wait_for_key(&mut self, x: u8) -> nb::Result<(), Infallible> {
        let key = self
            .ctx
            .poll_key_press_event()
            .ok_or(nb::Error::WouldBlock)?;
        if key as usize >= KEY_COUNT {
            warn!("Ignoring press of non existent key {:#X}", key);
            return Err(nb::Error::WouldBlock);
        }
        debug!("Key {:X} pressed, resuming", key);
        self.v[x as usize] = key;
        self.state = ExecState::Running;
        self.pc_increment();
        Ok(())
    }

    fn pc_increment(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    /// Stack pointer, the number of return addresses on the call stack
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay.load()
    }

    /// Current value of the sound timer, the buzzer sounds while it is nonzero
    pub fn sound_timer(&self) -> u8 {
        self.timers.sound.load()
    }

    pub fn is_sound_on(&self) -> bool {
        self.sound_timer() > 0
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }
}

// OpCodes impls
impl<C: Context + Sized> Chip8<C> {
    #[rustfmt::skip]
    fn execute(&mut self, opcode: OpCode) -> Result<(), Fault> {
        match opcode {
            OpCode::_0NNN { nnn }     => self.exec_ml_subroutine_at(nnn),
            OpCode::_00E0             => self.clear_screen(),
            OpCode::_00EE             => return self.subroutine_return(),
            OpCode::_1NNN { nnn }     => return self.jump_to(nnn),
            OpCode::_2NNN { nnn }     => return self.exec_subroutine_at(nnn),
            OpCode::_3XNN { x, nn }   => self.skip_if_vx_eq_nn(x, nn),
            OpCode::_4XNN { x, nn }   => self.skip_if_vx_ne_nn(x, nn),
            OpCode::_5XY0 { x, y }    => self.skip_if_vx_eq_vy(x, y),
            OpCode::_6XNN { x, nn }   => self.assign_vx_nn(x, nn),
            OpCode::_7XNN { x, nn }   => self.assign_add_vx_nn(x, nn),
            OpCode::_8XY0 { x, y }    => self.assign_vx_vy(x, y),
            OpCode::_8XY1 { x, y }    => self.assign_or_vx_vy(x, y),
            OpCode::_8XY2 { x, y }    => self.assign_and_vx_vy(x, y),
            OpCode::_8XY3 { x, y }    => self.assign_xor_vx_vy(x, y),
            OpCode::_8XY4 { x, y }    => self.assign_add_vx_vy(x, y),
            OpCode::_8XY5 { x, y }    => self.assign_sub_vx_vy(x, y),
            OpCode::_8XY6 { x, .. }   => self.assign_vx_shifted_r(x),
            OpCode::_8XY7 { x, y }    => self.assign_vx_vy_sub_vx(x, y),
            OpCode::_8XYE { x, .. }   => self.assign_vx_shifted_l(x),
            OpCode::_9XY0 { x, y }    => self.skip_if_vx_ne_vy(x, y),
            OpCode::_ANNN { nnn }     => self.assign_i_nnn(nnn),
            OpCode::_BNNN { nnn }     => return self.jump_to_nnn_add_v0(nnn),
            OpCode::_CXNN { x, nn }   => self.assign_vx_random_and_nn(x, nn),
            OpCode::_DXYN { x, y, n } => self.draw_n_at_vx_vy(x, y, n),
            OpCode::_EX9E { x }       => self.skip_if_vx_in_keys(x),
            OpCode::_EXA1 { x }       => self.skip_if_vx_not_in_keys(x),
            OpCode::_FX07 { x }       => self.assign_vx_delay_t(x),
            OpCode::_FX0A { x }       => return self.assign_vx_wait_for_key(x),
            OpCode::_FX15 { x }       => self.assign_delay_t_vx(x),
            OpCode::_FX18 { x }       => self.assign_sound_t_vx(x),
            OpCode::_FX1E { x }       => self.assign_add_i_vx(x),
            OpCode::_FX29 { x }       => self.assign_i_addr_of_sprite_vx(x),
            OpCode::_FX33 { x }       => self.assign_mem_at_i_bcd_of_vx(x),
            OpCode::_FX55 { x }       => self.assign_mem_at_i_v0_to_vx(x),
            OpCode::_FX65 { x }       => self.assign_v0_to_vx_mem_at_i(x),
            OpCode::Unknown { raw }   => self.unknown(raw),
        }
        .map(|_| self.pc_increment())
    }

    /// Execute machine language subroutine at address NNN
    /// 0NNN { nnn: u16 },
    fn exec_ml_subroutine_at(&mut self, nnn: u16) -> Result<(), Fault> {
        warn!("Machine code routines are not supported, ignoring call to {:#05X}", nnn);
        Ok(())
    }

    /// Clear the screen
    /// 00E0,
    fn clear_screen(&mut self) -> Result<(), Fault> {
        self.frame.clear();
        Ok(())
    }

    /// Return from a subroutine
    /// 00EE,
    fn subroutine_return(&mut self) -> Result<(), Fault> {
        self.stack
            .pop()
            .ok_or(Fault::StackUnderflow)
            .map(|addr| self.pc = addr)
    }

    /// Jump to address NNN
    /// 1NNN { nnn: u16 },
    fn jump_to(&mut self, nnn: u16) -> Result<(), Fault> {
        self.pc = nnn;
        Ok(())
    }

    /// Execute subroutine starting at address NNN, the address of the following instruction
    /// is pushed on the stack
    /// 2NNN { nnn: u16 },
    fn exec_subroutine_at(&mut self, nnn: u16) -> Result<(), Fault> {
        self.stack
            .push(self.pc.wrapping_add(2))
            .map_err(|_| Fault::StackOverflow)
            .map(|_| self.pc = nnn)
    }

    /// Skip the following instruction if the value of register VX equals NN
    /// 3XNN { x: u8, nn: u8 },
    fn skip_if_vx_eq_nn(&mut self, x: u8, nn: u8) -> Result<(), Fault> {
        if self.v[x as usize] == nn {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to NN
    /// 4XNN { x: u8, nn: u8 },
    fn skip_if_vx_ne_nn(&mut self, x: u8, nn: u8) -> Result<(), Fault> {
        if self.v[x as usize] != nn {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    /// 5XY0 { x: u8, y: u8 },
    fn skip_if_vx_eq_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        if self.v[x as usize] == self.v[y as usize] {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store number NN in register VX
    /// 6XNN { x: u8, nn: u8 },
    fn assign_vx_nn(&mut self, x: u8, nn: u8) -> Result<(), Fault> {
        self.v[x as usize] = nn;
        Ok(())
    }

    /// Add the value NN to register VX
    /// 7XNN { x: u8, nn: u8 },
    fn assign_add_vx_nn(&mut self, x: u8, nn: u8) -> Result<(), Fault> {
        self.v[x as usize] = self.v[x as usize].wrapping_add(nn);
        Ok(())
    }

    /// Store the value of register VY in register VX
    /// 8XY0 { x: u8, y: u8 },
    fn assign_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        self.v[x as usize] = self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX OR VY
    /// 8XY1 { x: u8, y: u8 },
    fn assign_or_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        self.v[x as usize] |= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX AND VY
    /// 8XY2 { x: u8, y: u8 },
    fn assign_and_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        self.v[x as usize] &= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX XOR VY
    /// 8XY3 { x: u8, y: u8 },
    fn assign_xor_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        self.v[x as usize] ^= self.v[y as usize];
        Ok(())
    }

    // Flag producing instructions write VF last, so the flag wins when X is F.

    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, Set VF to 00 if a carry does not occur
    /// 8XY4 { x: u8, y: u8 },
    fn assign_add_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        let (value, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[VF] = carry as u8;
        Ok(())
    }

    /// Subtract the value of register VY from register VX, Set VF to 00 if a borrow occurs, Set VF to 01 if a borrow does not occur
    /// 8XY5 { x: u8, y: u8 },
    fn assign_sub_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = vx.wrapping_sub(vy);
        self.v[VF] = (vx > vy) as u8;
        Ok(())
    }

    /// Shift VX right by one bit, Set register VF to the least significant bit prior to the shift
    /// 8XY6 { x: u8, y: u8 },
    fn assign_vx_shifted_r(&mut self, x: u8) -> Result<(), Fault> {
        let lsb = self.v[x as usize] & 1u8;
        self.v[x as usize] >>= 1;
        self.v[VF] = lsb;
        Ok(())
    }

    /// Set register VX to the value of VY minus VX, Set VF to 00 if a borrow occurs, Set VF to 01 if a borrow does not occur
    /// 8XY7 { x: u8, y: u8 },
    fn assign_vx_vy_sub_vx(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = vy.wrapping_sub(vx);
        self.v[VF] = (vy > vx) as u8;
        Ok(())
    }

    /// Shift VX left by one bit, Set register VF to the most significant bit prior to the shift
    /// 8XYE { x: u8, y: u8 },
    fn assign_vx_shifted_l(&mut self, x: u8) -> Result<(), Fault> {
        let msb = self.v[x as usize] >> 7;
        self.v[x as usize] <<= 1;
        self.v[VF] = msb;
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    /// 9XY0 { x: u8, y: u8 },
    fn skip_if_vx_ne_vy(&mut self, x: u8, y: u8) -> Result<(), Fault> {
        if self.v[x as usize] != self.v[y as usize] {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store memory address NNN in register I
    /// ANNN { nnn: u16 },
    fn assign_i_nnn(&mut self, nnn: u16) -> Result<(), Fault> {
        self.i = nnn;
        Ok(())
    }

    /// Jump to address NNN + V0
    /// BNNN { nnn: u16 },
    fn jump_to_nnn_add_v0(&mut self, nnn: u16) -> Result<(), Fault> {
        self.pc = nnn + self.v[0] as u16;
        Ok(())
    }

    /// Set VX to a random number with a mask of NN
    /// CXNN { x: u8, nn: u8 },
    fn assign_vx_random_and_nn(&mut self, x: u8, nn: u8) -> Result<(), Fault> {
        self.v[x as usize] = self.ctx.gen_random() & nn;
        Ok(())
    }

    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    /// DXYN { x: u8, y: u8, n: u8 },
    fn draw_n_at_vx_vy(&mut self, x: u8, y: u8, n: u8) -> Result<(), Fault> {
        let sprite = self.memory.slice(self.i as usize, n as usize)?;
        let (vx, vy) = (self.v[x as usize] as usize, self.v[y as usize] as usize);
        let collision = self.frame.draw_sprite(vx, vy, sprite);
        self.v[VF] = collision as u8;
        Ok(())
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    /// EX9E { x: u8 },
    fn skip_if_vx_in_keys(&mut self, x: u8) -> Result<(), Fault> {
        if self.ctx.is_key_down(self.v[x as usize] & 0x0F) {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    /// EXA1 { x: u8 },
    fn skip_if_vx_not_in_keys(&mut self, x: u8) -> Result<(), Fault> {
        if !self.ctx.is_key_down(self.v[x as usize] & 0x0F) {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store the current value of the delay timer in register VX
    /// FX07 { x: u8 },
    fn assign_vx_delay_t(&mut self, x: u8) -> Result<(), Fault> {
        self.v[x as usize] = self.timers.delay.load();
        Ok(())
    }

    /// Wait for a keypress and store the result in register VX
    ///
    /// Polls once right away, further polls happen on the following steps.
    /// FX0A { x: u8 },
    fn assign_vx_wait_for_key(&mut self, x: u8) -> Result<(), Fault> {
        self.state = ExecState::WaitingForKey { x };
        if let Err(nb::Error::WouldBlock) = self.wait_for_key(x) {
            debug!("Waiting for key press into V{:X}", x);
        }
        Ok(())
    }

    /// Set the delay timer to the value of register VX
    /// FX15 { x: u8 },
    fn assign_delay_t_vx(&mut self, x: u8) -> Result<(), Fault> {
        self.timers.delay.store(self.v[x as usize]);
        Ok(())
    }

    /// Set the sound timer to the value of register VX
    /// FX18 { x: u8 },
    fn assign_sound_t_vx(&mut self, x: u8) -> Result<(), Fault> {
        let was_on = self.is_sound_on();
        self.timers.sound.store(self.v[x as usize]);
        match (was_on, self.is_sound_on()) {
            (false, true) => self.ctx.sound_on(),
            (true, false) => self.ctx.sound_off(),
            _ => {}
        }
        Ok(())
    }

    /// Add the value stored in register VX to register I
    /// FX1E { x: u8 },
    fn assign_add_i_vx(&mut self, x: u8) -> Result<(), Fault> {
        self.i = self.i.wrapping_add(self.v[x as usize] as u16);
        Ok(())
    }

    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    /// FX29 { x: u8 },
    fn assign_i_addr_of_sprite_vx(&mut self, x: u8) -> Result<(), Fault> {
        self.i = Memory::glyph_address(self.v[x as usize]);
        Ok(())
    }

    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    /// FX33 { x: u8 },
    fn assign_mem_at_i_bcd_of_vx(&mut self, x: u8) -> Result<(), Fault> {
        let value = self.v[x as usize];
        let digits = self.memory.slice_mut(self.i as usize, 3)?;
        digits[0] = value / 100u8;
        digits[1] = (value % 100) / 10u8;
        digits[2] = value % 10u8;
        Ok(())
    }

    /// Store the values of registers V0 to VX inclusive in memory starting at address I
    /// FX55 { x: u8 },
    fn assign_mem_at_i_v0_to_vx(&mut self, x: u8) -> Result<(), Fault> {
        let count = x as usize + 1;
        self.memory
            .slice_mut(self.i as usize, count)?
            .copy_from_slice(&self.v[..count]);
        Ok(())
    }

    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I
    /// FX65 { x: u8 },
    fn assign_v0_to_vx_mem_at_i(&mut self, x: u8) -> Result<(), Fault> {
        let count = x as usize + 1;
        self.v[..count].copy_from_slice(self.memory.slice(self.i as usize, count)?);
        Ok(())
    }

    fn unknown(&mut self, raw: u16) -> Result<(), Fault> {
        warn!("Unknown opcode {:#06X} at {:#05X}, skipping", raw, self.pc);
        Ok(())
    }
}
