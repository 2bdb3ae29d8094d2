use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

pub const KEY_COUNT: usize = 16;

/// Pressed/released state of the 16 hex keys, indexed by key value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad([bool; KEY_COUNT]);

impl Keypad {
    pub fn new(keys: [bool; KEY_COUNT]) -> Self {
        Keypad(keys)
    }

    /// snapshot with just the listed keys pressed
    pub fn with_pressed(keys: &[u8]) -> Self {
        let mut k = Keypad::default();
        for &key in keys {
            k.set(key, true);
        }
        k
    }

    /// out-of-range keys read as released
    pub fn is_pressed(&self, key: u8) -> bool {
        self.0.get(key as usize).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(k) = self.0.get_mut(key as usize) {
            *k = pressed;
        }
    }

    /// lowest key pressed in `self` but not in `previous`
    pub fn newly_pressed(&self, previous: &Keypad) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|&k| self.is_pressed(k) && !previous.is_pressed(k))
    }
}

/// left-hand side of a qwerty keyboard, laid out like the COSMAC hex pad
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// terminals only report presses, so each press is held for this many polls
const KEY_HOLD_POLLS: u8 = 6;

/// produces keypad snapshots for the host loop
pub trait Input {
    /// current state of the keypad; called once per host tick
    fn poll_keypad(&mut self) -> Result<Keypad, io::Error>;

    /// true once the user has asked to stop the machine
    fn quit_requested(&self) -> bool;
}

/// Input from the terminal via crossterm
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [u8; KEY_COUNT],
    quit: bool,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
            quit: false,
        })
    }

    fn read_events(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.held[mapped_key as usize] = KEY_HOLD_POLLS,
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => self.quit = true,
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll_keypad(&mut self) -> Result<Keypad, io::Error> {
        self.read_events()?;
        let mut keypad = Keypad::default();
        for (key, hold) in self.held.iter_mut().enumerate() {
            if *hold > 0 {
                keypad.set(key as u8, true);
                *hold -= 1;
            }
        }
        Ok(keypad)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// scripted Input implementation for testing: yields each snapshot in turn,
/// then repeats the last one
pub struct DummyInput {
    script: Vec<Keypad>,
    next: usize,
}

impl DummyInput {
    pub fn new(script: &[Keypad]) -> Self {
        DummyInput {
            script: Vec::from(script),
            next: 0,
        }
    }
}

impl Input for DummyInput {
    fn poll_keypad(&mut self) -> Result<Keypad, io::Error> {
        let keypad = self
            .script
            .get(self.next)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or_default();
        self.next += 1;
        Ok(keypad)
    }

    fn quit_requested(&self) -> bool {
        false
    }
}
