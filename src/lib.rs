//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter core is deterministic and does no i/o; everything it
//!   needs from outside (keypad, timer ticks) is pushed in by the host
//! * one `Chip8Interpreter` owns all machine state, so several can coexist
//! * instructions are found through layered 16-entry dispatch tables keyed
//!   on nibbles of the instruction word
//! * faults (invalid instruction, stack over/underflow, bad jump target)
//!   halt the machine and are returned to the host, which decides what to do
//! * FX0A suspends the machine rather than spinning; `step` reports
//!   `Step::AwaitingKey` until a key press is delivered
//! * some config for the behaviours programs disagree on (shift source,
//!   borrow flag polarity)
//! * display, input and audio sit behind traits so alternatives can be
//!   plugged in; terminal implementations use TUI/crossterm and beep
//!
//! Model
//!
//! Host
//!  |-- display, input, sound, config
//!  |-- interpreter(config)
//!  |    |-- memory, registers, stack, timers, frame buffer, keypad
//!  |    `-- instruction tables -> opcode handlers
//!  `-- main loop, once per tick
//!       |-- interpreter.set_keypad(input.poll_keypad())
//!       |-- interpreter.step_cycles(cycles_per_tick)
//!       |-- interpreter.tick_timers()
//!       |-- display.draw(..) if the frame buffer changed; sound.update(..)
//!       `-- sleep until the next tick
pub mod config;
pub mod display;
pub mod error;
pub mod host;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod opcodes;
pub mod sound;
pub mod stack;

pub use config::{BorrowFlag, Config, Quirks, ShiftSource};
pub use error::{Chip8Error, Fault};
pub use host::{Exit, Host};
pub use input::Keypad;
pub use interpreter::{Chip8Interpreter, Step};
