use std::io;
use thiserror::Error;

/// Fatal conditions raised by the interpreter core. Every variant carries the
/// raw instruction word and the address it was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("invalid instruction {word:04x} at {pc:#05x}")]
    InvalidInstruction { word: u16, pc: u16 },
    #[error("stack overflow on {word:04x} at {pc:#05x}")]
    StackOverflow { word: u16, pc: u16 },
    #[error("stack underflow on {word:04x} at {pc:#05x}")]
    StackUnderflow { word: u16, pc: u16 },
    #[error("instruction {word:04x} at {pc:#05x} targets {target:#05x}, outside program memory")]
    InvalidAddress { word: u16, pc: u16, target: u16 },
}

impl Fault {
    /// the offending instruction word
    pub fn word(&self) -> u16 {
        match *self {
            Fault::InvalidInstruction { word, .. }
            | Fault::StackOverflow { word, .. }
            | Fault::StackUnderflow { word, .. }
            | Fault::InvalidAddress { word, .. } => word,
        }
    }

    /// address the offending instruction was fetched from
    pub fn pc(&self) -> u16 {
        match *self {
            Fault::InvalidInstruction { pc, .. }
            | Fault::StackOverflow { pc, .. }
            | Fault::StackUnderflow { pc, .. }
            | Fault::InvalidAddress { pc, .. } => pc,
        }
    }
}

/// Errors surfaced by the host side: terminal i/o, the sound device, or a
/// fault that stopped the machine.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("machine halted: {0}")]
    Fault(#[from] Fault),
    #[error("sound error: {0}")]
    Sound(String),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_accessors() {
        let f = Fault::StackUnderflow {
            word: 0x00ee,
            pc: 0x204,
        };
        assert_eq!(f.word(), 0x00ee);
        assert_eq!(f.pc(), 0x204);
    }

    #[test]
    fn test_fault_message_names_word() {
        let f = Fault::InvalidInstruction {
            word: 0x0123,
            pc: 0x200,
        };
        assert_eq!(f.to_string(), "invalid instruction 0123 at 0x200");
    }

    #[test]
    fn test_fault_converts_to_host_error() {
        let f = Fault::InvalidAddress {
            word: 0x1100,
            pc: 0x200,
            target: 0x100,
        };
        let e: Chip8Error = f.into();
        assert!(matches!(e, Chip8Error::Fault(_)));
    }
}
