//! Instruction words and the layered dispatch tables that map them to handlers.
//!
//! The top nibble picks a family. Families with more than one instruction
//! dispatch again on another nibble, so every handler is found by walking
//! at most four 16-entry tables. A word that falls on an empty slot at any
//! level is an invalid instruction.
use crate::error::Fault;
use crate::interpreter::Chip8Interpreter;
use crate::opcodes::*;
use std::fmt;

/// A fetched 16-bit instruction word, plus the address it came from so
/// handlers can report faults against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub word: u16,
    pub addr: u16,
}

impl Opcode {
    pub fn new(word: u16, addr: u16) -> Self {
        Opcode { word, addr }
    }

    /// the 4 bits starting at bit `shift`
    pub fn nibble(&self, shift: u8) -> usize {
        ((self.word >> shift) & 0xf) as usize
    }

    /// register index in bits 8-11
    pub fn x(&self) -> usize {
        self.nibble(8)
    }

    /// register index in bits 4-7
    pub fn y(&self) -> usize {
        self.nibble(4)
    }

    pub fn n(&self) -> u8 {
        (self.word & 0x000f) as u8
    }

    pub fn nn(&self) -> u8 {
        (self.word & 0x00ff) as u8
    }

    pub fn nnn(&self) -> u16 {
        self.word & 0x0fff
    }

    pub fn invalid(&self) -> Fault {
        Fault::InvalidInstruction {
            word: self.word,
            pc: self.addr,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05x}: {:04x}", self.addr, self.word)
    }
}

/// Executes one instruction against the machine.
pub type Handler = fn(&mut Chip8Interpreter, Opcode) -> Result<(), Fault>;

#[derive(Clone, Copy)]
enum Entry {
    Invalid,
    Exec(Handler),
    /// look up the nibble at `shift` in `table`
    Dispatch {
        shift: u8,
        table: &'static [Entry; 16],
    },
}

use Entry::Exec;
const X: Entry = Entry::Invalid;

static ROOT: Entry = Entry::Dispatch {
    shift: 12,
    table: &PRIMARY,
};

#[rustfmt::skip]
static PRIMARY: [Entry; 16] = [
    Entry::Dispatch { shift: 0, table: &SYSTEM },     // 0..?
    Exec(jump),                                        // 1NNN
    Exec(call),                                        // 2NNN
    Exec(skip_if_equal_imm),                           // 3XNN
    Exec(skip_if_not_equal_imm),                       // 4XNN
    Entry::Dispatch { shift: 0, table: &SKIP_EQ },     // 5XY0
    Exec(load_imm),                                    // 6XNN
    Exec(add_imm),                                     // 7XNN
    Entry::Dispatch { shift: 0, table: &ALU },         // 8XY.
    Entry::Dispatch { shift: 0, table: &SKIP_NE },     // 9XY0
    Exec(load_address),                                // ANNN
    Exec(jump_with_offset),                            // BNNN
    Exec(random_masked),                               // CXNN
    Exec(draw_sprite),                                 // DXYN
    Entry::Dispatch { shift: 0, table: &KEYS },        // EX..
    Entry::Dispatch { shift: 0, table: &MISC },        // FX..
];

// family 0 decides on the bottom nibble alone, so 00E0/00EE also answer to
// 0NN0/0NNE; 0NNN machine calls are not supported
#[rustfmt::skip]
static SYSTEM: [Entry; 16] = [
    Exec(clear_display), X, X, X, X, X, X, X,
    X, X, X, X, X, X, Exec(return_from_subroutine), X,
];

#[rustfmt::skip]
static SKIP_EQ: [Entry; 16] = [
    Exec(skip_if_registers_equal), X, X, X, X, X, X, X,
    X, X, X, X, X, X, X, X,
];

#[rustfmt::skip]
static SKIP_NE: [Entry; 16] = [
    Exec(skip_if_registers_not_equal), X, X, X, X, X, X, X,
    X, X, X, X, X, X, X, X,
];

#[rustfmt::skip]
static ALU: [Entry; 16] = [
    Exec(copy_register),          // 8XY0
    Exec(or_registers),           // 8XY1
    Exec(and_registers),          // 8XY2
    Exec(xor_registers),          // 8XY3
    Exec(add_with_carry),         // 8XY4
    Exec(sub_with_borrow),        // 8XY5
    Exec(shift_right),            // 8XY6
    Exec(reverse_sub_with_borrow),// 8XY7
    X, X, X, X, X, X,
    Exec(shift_left),             // 8XYE
    X,
];

#[rustfmt::skip]
static KEYS: [Entry; 16] = [
    X,
    Exec(skip_if_key_not_pressed), // EXA1
    X, X, X, X, X, X,
    X, X, X, X, X, X,
    Exec(skip_if_key_pressed),     // EX9E
    X,
];

#[rustfmt::skip]
static MISC: [Entry; 16] = [
    X, X, X,
    Exec(store_bcd),                                 // FX33
    X,
    Entry::Dispatch { shift: 4, table: &MISC_5 },    // FX15, FX55, FX65
    X,
    Exec(read_delay_timer),                          // FX07
    Exec(set_sound_timer),                           // FX18
    Exec(digit_sprite_address),                      // FX29
    Exec(wait_for_key),                              // FX0A
    X, X, X,
    Exec(add_to_address),                            // FX1E
    X,
];

#[rustfmt::skip]
static MISC_5: [Entry; 16] = [
    X,
    Exec(set_delay_timer),           // FX15
    X, X, X,
    Exec(store_registers),           // FX55
    Exec(load_registers),            // FX65
    X,
    X, X, X, X, X, X, X, X,
];

/// find the handler for an instruction word, if there is one
pub fn lookup(op: Opcode) -> Option<Handler> {
    let mut entry = &ROOT;
    loop {
        match *entry {
            Entry::Invalid => return None,
            Entry::Exec(handler) => return Some(handler),
            Entry::Dispatch { shift, table } => entry = &table[op.nibble(shift)],
        }
    }
}
