use thiserror::Error;

use crate::memory::MAX_PROGRAM_LEN;

/// Fatal conditions which stop the interpreter
///
/// Reported through `CycleOutcome::Fault`. The state of the machine is left exactly as it was
/// before the faulting instruction, so repeated steps report the same fault again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("cannot enter subroutine, call stack depth of {} exceeded", crate::chip8::STACK_DEPTH)]
    StackOverflow,
    #[error("cannot return, not in a subroutine")]
    StackUnderflow,
    #[error("memory access out of address space at {address:#06X}")]
    MemoryOutOfBounds { address: usize },
}

/// Errors raised while placing a program image in memory
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program image of {len} bytes exceeds available {max} bytes")]
    ImageTooLarge { len: usize, max: usize },
}

impl LoadError {
    pub(crate) fn too_large(len: usize) -> Self {
        LoadError::ImageTooLarge {
            len,
            max: MAX_PROGRAM_LEN,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("context not provided")]
    MissingContext,
    #[error("program not provided")]
    MissingProgram,
    #[error(transparent)]
    Load(#[from] LoadError),
}
