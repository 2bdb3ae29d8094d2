//! # interpreter
//!
//! All machine state lives in one `Chip8Interpreter`, so independent
//! machines can run side by side:
//!  * 4K of memory, font at 0x000, program from 0x200
//!  * V0-VF, with VF doubling as the carry/borrow/collision flag
//!  * I, the 16-bit address register
//!  * PC, starting at 0x200
//!  * a 12-level call stack
//!  * delay and sound timers, ticked by the host
//!  * the 64x32 frame buffer and the host-supplied keypad snapshot
//!
//! The interpreter performs no i/o itself; the host loop feeds it keypad
//! snapshots and timer ticks and reads back the frame buffer.
use crate::config::{Config, Quirks};
use crate::display::FrameBuffer;
use crate::error::Fault;
use crate::input::Keypad;
use crate::instruction::{self, Opcode};
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_PROGRAM_ADDR};
use crate::stack::CallStack;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;

/// index of the flag register
pub const FLAG: usize = 0xf;

/// What a call to `step` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed,
    /// suspended on FX0A until a key press is delivered
    AwaitingKey,
}

pub struct Chip8Interpreter {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) v: [u8; 16],
    pub(crate) i: u16,
    pub(crate) pc: u16,
    pub(crate) stack: CallStack,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) display: FrameBuffer,
    pub(crate) keypad: Keypad,
    /// register to receive the next key press
    pub(crate) awaiting_key: Option<usize>,
    pub(crate) quirks: Quirks,
    pub(crate) rng: StdRng,
    fault: Option<Fault>,
}

impl Chip8Interpreter {
    pub fn new(config: &Config) -> Result<Chip8Interpreter, io::Error> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Chip8Interpreter {
            memory: Chip8MemoryMap::new()?,
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: CallStack::new(),
            delay_timer: 0,
            sound_timer: 0,
            display: FrameBuffer::new(),
            keypad: Keypad::default(),
            awaiting_key: None,
            quirks: config.quirks,
            rng,
            fault: None,
        })
    }

    /// zero all state, re-seed the font and load `image` at 0x200;
    /// returns how many bytes of the image were loaded
    pub fn reset(&mut self, image: &[u8]) -> Result<usize, io::Error> {
        self.memory.reset()?;
        self.v = [0; 16];
        self.i = 0;
        self.pc = CHIP8_PROGRAM_ADDR;
        self.stack.reset();
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.display.clear();
        self.keypad = Keypad::default();
        self.awaiting_key = None;
        self.fault = None;
        debug!("reset");
        self.memory.load_image(image)
    }

    /// reset and load a chip8 program from a reader
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, io::Error> {
        let mut image = Vec::new();
        reader.read_to_end(&mut image)?;
        self.reset(&image)
    }

    /// one fetch-decode-execute cycle. Once a fault has been returned the
    /// machine is halted and keeps returning it.
    pub fn step(&mut self) -> Result<Step, Fault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if self.awaiting_key.is_some() {
            return Ok(Step::AwaitingKey);
        }

        let op = Opcode::new(self.memory.get_word(self.pc), self.pc);
        // advance first so jumps aren't overwritten
        self.pc = self.pc.wrapping_add(2);
        trace!("{}", op);

        let result = match instruction::lookup(op) {
            Some(handler) => handler(self, op),
            None => Err(op.invalid()),
        };
        if let Err(fault) = result {
            self.fault = Some(fault);
            return Err(fault);
        }

        Ok(match self.awaiting_key {
            Some(_) => Step::AwaitingKey,
            None => Step::Executed,
        })
    }

    /// run up to `cycles` steps back to back, stopping early while awaiting
    /// a key; returns how many instructions executed
    pub fn step_cycles(&mut self, cycles: usize) -> Result<usize, Fault> {
        let mut executed = 0;
        for _ in 0..cycles {
            if self.awaiting_key.is_some() {
                break;
            }
            self.step()?;
            executed += 1;
        }
        Ok(executed)
    }

    /// one host tick of both timers; they stop at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// authoritative keypad state until the next snapshot. A key that has
    /// gone down since the previous snapshot completes a pending FX0A.
    pub fn set_keypad(&mut self, keypad: Keypad) {
        let previous = std::mem::replace(&mut self.keypad, keypad);
        if self.awaiting_key.is_some() {
            if let Some(key) = keypad.newly_pressed(&previous) {
                self.deliver_key(key);
            }
        }
    }

    /// hand a pressed key to a pending FX0A; false if nothing was waiting
    pub fn deliver_key(&mut self, key: u8) -> bool {
        match self.awaiting_key.take() {
            Some(x) => {
                debug!("key {:x} delivered to V{:X}", key, x);
                self.v[x] = key & 0x0f;
                true
            }
            None => false,
        }
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }

    /// 0 or 1, for the renderer
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        self.display.get_pixel(x, y)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.display
    }

    pub fn frame_buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.display
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// V0-VF; only the low nibble of `x` is used
    pub fn register(&self, x: usize) -> u8 {
        self.v[x & 0xf]
    }

    pub fn set_register(&mut self, x: usize, value: u8) {
        self.v[x & 0xf] = value;
    }

    pub fn address_register(&self) -> u16 {
        self.i
    }

    pub fn set_address_register(&mut self, addr: u16) {
        self.i = addr;
    }

    pub fn program_counter(&self) -> u16 {
        self.pc
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Chip8MemoryMap {
        &mut self.memory
    }
}
