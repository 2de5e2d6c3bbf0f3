use core::fmt;

/// An enum representing opcodes of chip-8 architecture
///
/// Based on [chip8 mastering](http://mattmik.com/files/chip8/mastering/chip8.html)
///
/// Decoding is total: words which do not encode any instruction within a known family
/// end up as `Unknown`.
///
/// Examples:
/// ```
/// use chip8vm::opcode::OpCode;
///
/// let instruction = 0x0ABC;
/// let opcode = OpCode::from(instruction);
///
/// assert_eq!(
///     opcode,
///     OpCode::_0NNN { nnn: 0x0ABC },
/// );
/// assert_eq!(OpCode::from(0x8AB8), OpCode::Unknown { raw: 0x8AB8 });
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    /// `SYS NNN`, call to a machine code routine of the original hardware
    _0NNN { nnn: u16 },
    /// `CLS`
    _00E0,
    /// `RET`, pop return address off the stack
    _00EE,
    /// `JP NNN`
    _1NNN { nnn: u16 },
    /// `CALL NNN`, push address of the next instruction and jump
    _2NNN { nnn: u16 },
    /// `SE VX, NN`, skip next if equal
    _3XNN { x: u8, nn: u8 },
    /// `SNE VX, NN`, skip next if not equal
    _4XNN { x: u8, nn: u8 },
    /// `SE VX, VY`
    _5XY0 { x: u8, y: u8 },
    /// `LD VX, NN`
    _6XNN { x: u8, nn: u8 },
    /// `ADD VX, NN`, wrapping and without touching VF
    _7XNN { x: u8, nn: u8 },
    /// `LD VX, VY`
    _8XY0 { x: u8, y: u8 },
    /// `OR VX, VY`
    _8XY1 { x: u8, y: u8 },
    /// `AND VX, VY`
    _8XY2 { x: u8, y: u8 },
    /// `XOR VX, VY`
    _8XY3 { x: u8, y: u8 },
    /// `ADD VX, VY`, VF = carry
    _8XY4 { x: u8, y: u8 },
    /// `SUB VX, VY`, VF = 1 when VX > VY
    _8XY5 { x: u8, y: u8 },
    /// `SHR VX`, VF = bit shifted out
    _8XY6 { x: u8, y: u8 },
    /// `SUBN VX, VY`, VX = VY - VX and VF = 1 when VY > VX
    _8XY7 { x: u8, y: u8 },
    /// `SHL VX`, VF = bit shifted out
    _8XYE { x: u8, y: u8 },
    /// `SNE VX, VY`
    _9XY0 { x: u8, y: u8 },
    /// `LD I, NNN`
    _ANNN { nnn: u16 },
    /// `JP V0, NNN`
    _BNNN { nnn: u16 },
    /// `RND VX, NN`, random byte masked with NN
    _CXNN { x: u8, nn: u8 },
    /// `DRW VX, VY, N`, XOR N sprite rows read from I, VF = collision
    _DXYN { x: u8, y: u8, n: u8 },
    /// `SKP VX`, skip next if key VX is held
    _EX9E { x: u8 },
    /// `SKNP VX`, skip next if key VX is not held
    _EXA1 { x: u8 },
    /// `LD VX, DT`
    _FX07 { x: u8 },
    /// `LD VX, K`, suspend until a key is pressed
    _FX0A { x: u8 },
    /// `LD DT, VX`
    _FX15 { x: u8 },
    /// `LD ST, VX`
    _FX18 { x: u8 },
    /// `ADD I, VX`
    _FX1E { x: u8 },
    /// `LD F, VX`, point I at the font glyph of digit VX
    _FX29 { x: u8 },
    /// `LD B, VX`, decimal digits of VX at I, I+1 and I+2
    _FX33 { x: u8 },
    /// `LD [I], VX`, dump V0..=VX at I
    _FX55 { x: u8 },
    /// `LD VX, [I]`, fill V0..=VX from I
    _FX65 { x: u8 },
    /// Secondary code not recognized within families 0x8, 0xE and 0xF
    Unknown { raw: u16 },
}

impl OpCode {
    fn read_first(raw: u16) -> u8 {
        (raw >> 12 & 0x000Fu16) as u8
    }

    fn read_last(raw: u16) -> u8 {
        (raw & 0x000Fu16) as u8
    }

    fn read_x(raw: u16) -> u8 {
        (raw >> 8 & 0x000Fu16) as u8
    }

    fn read_y(raw: u16) -> u8 {
        (raw >> 4 & 0x000Fu16) as u8
    }

    fn read_nn(raw: u16) -> u8 {
        (raw & 0x00FFu16) as u8
    }

    fn read_nnn(raw: u16) -> u16 {
        raw & 0x0FFFu16
    }
}

impl From<u16> for OpCode {
    #[rustfmt::skip]
    fn from(raw: u16) -> Self {
        use OpCode::*;
        let (x, y, n) = (Self::read_x(raw), Self::read_y(raw), Self::read_last(raw));
        let (nn, nnn) = (Self::read_nn(raw), Self::read_nnn(raw));
        match (Self::read_first(raw), x, y, n) {
            (0x0, 0x0, 0xE, 0x0) => _00E0,
            (0x0, 0x0, 0xE, 0xE) => _00EE,
            (0x0, ..)            => _0NNN { nnn },
            (0x1, ..)            => _1NNN { nnn },
            (0x2, ..)            => _2NNN { nnn },
            (0x3, ..)            => _3XNN { x, nn },
            (0x4, ..)            => _4XNN { x, nn },
            (0x5, ..)            => _5XY0 { x, y },
            (0x6, ..)            => _6XNN { x, nn },
            (0x7, ..)            => _7XNN { x, nn },
            (0x8, _, _, 0x0)     => _8XY0 { x, y },
            (0x8, _, _, 0x1)     => _8XY1 { x, y },
            (0x8, _, _, 0x2)     => _8XY2 { x, y },
            (0x8, _, _, 0x3)     => _8XY3 { x, y },
            (0x8, _, _, 0x4)     => _8XY4 { x, y },
            (0x8, _, _, 0x5)     => _8XY5 { x, y },
            (0x8, _, _, 0x6)     => _8XY6 { x, y },
            (0x8, _, _, 0x7)     => _8XY7 { x, y },
            (0x8, _, _, 0xE)     => _8XYE { x, y },
            (0x9, ..)            => _9XY0 { x, y },
            (0xA, ..)            => _ANNN { nnn },
            (0xB, ..)            => _BNNN { nnn },
            (0xC, ..)            => _CXNN { x, nn },
            (0xD, ..)            => _DXYN { x, y, n },
            (0xE, _, 0x9, 0xE)   => _EX9E { x },
            (0xE, _, 0xA, 0x1)   => _EXA1 { x },
            (0xF, _, 0x0, 0x7)   => _FX07 { x },
            (0xF, _, 0x0, 0xA)   => _FX0A { x },
            (0xF, _, 0x1, 0x5)   => _FX15 { x },
            (0xF, _, 0x1, 0x8)   => _FX18 { x },
            (0xF, _, 0x1, 0xE)   => _FX1E { x },
            (0xF, _, 0x2, 0x9)   => _FX29 { x },
            (0xF, _, 0x3, 0x3)   => _FX33 { x },
            (0xF, _, 0x5, 0x5)   => _FX55 { x },
            (0xF, _, 0x6, 0x5)   => _FX65 { x },
            _                    => Unknown { raw },
        }
    }
}

/// Assembly-like mnemonic, used for tracing executed instructions
impl fmt::Display for OpCode {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use OpCode::*;
        match *self {
            _0NNN { nnn }     => write!(f, "SYS  {:#05X}", nnn),
            _00E0             => write!(f, "CLS"),
            _00EE             => write!(f, "RET"),
            _1NNN { nnn }     => write!(f, "JP   {:#05X}", nnn),
            _2NNN { nnn }     => write!(f, "CALL {:#05X}", nnn),
            _3XNN { x, nn }   => write!(f, "SE   V{:X}, {:#04X}", x, nn),
            _4XNN { x, nn }   => write!(f, "SNE  V{:X}, {:#04X}", x, nn),
            _5XY0 { x, y }    => write!(f, "SE   V{:X}, V{:X}", x, y),
            _6XNN { x, nn }   => write!(f, "LD   V{:X}, {:#04X}", x, nn),
            _7XNN { x, nn }   => write!(f, "ADD  V{:X}, {:#04X}", x, nn),
            _8XY0 { x, y }    => write!(f, "LD   V{:X}, V{:X}", x, y),
            _8XY1 { x, y }    => write!(f, "OR   V{:X}, V{:X}", x, y),
            _8XY2 { x, y }    => write!(f, "AND  V{:X}, V{:X}", x, y),
            _8XY3 { x, y }    => write!(f, "XOR  V{:X}, V{:X}", x, y),
            _8XY4 { x, y }    => write!(f, "ADD  V{:X}, V{:X}", x, y),
            _8XY5 { x, y }    => write!(f, "SUB  V{:X}, V{:X}", x, y),
            _8XY6 { x, .. }   => write!(f, "SHR  V{:X}", x),
            _8XY7 { x, y }    => write!(f, "SUBN V{:X}, V{:X}", x, y),
            _8XYE { x, .. }   => write!(f, "SHL  V{:X}", x),
            _9XY0 { x, y }    => write!(f, "SNE  V{:X}, V{:X}", x, y),
            _ANNN { nnn }     => write!(f, "LD   I, {:#05X}", nnn),
            _BNNN { nnn }     => write!(f, "JP   V0, {:#05X}", nnn),
            _CXNN { x, nn }   => write!(f, "RND  V{:X}, {:#04X}", x, nn),
            _DXYN { x, y, n } => write!(f, "DRW  V{:X}, V{:X}, {}", x, y, n),
            _EX9E { x }       => write!(f, "SKP  V{:X}", x),
            _EXA1 { x }       => write!(f, "SKNP V{:X}", x),
            _FX07 { x }       => write!(f, "LD   V{:X}, DT", x),
            _FX0A { x }       => write!(f, "LD   V{:X}, K", x),
            _FX15 { x }       => write!(f, "LD   DT, V{:X}", x),
            _FX18 { x }       => write!(f, "LD   ST, V{:X}", x),
            _FX1E { x }       => write!(f, "ADD  I, V{:X}", x),
            _FX29 { x }       => write!(f, "LD   F, V{:X}", x),
            _FX33 { x }       => write!(f, "LD   B, V{:X}", x),
            _FX55 { x }       => write!(f, "LD   [I], V{:X}", x),
            _FX65 { x }       => write!(f, "LD   V{:X}, [I]", x),
            Unknown { raw }   => write!(f, "DW   {:#06X}", raw),
        }
    }
}
