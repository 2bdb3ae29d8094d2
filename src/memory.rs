use log::{debug, warn};
use std::io;
use std::io::Read;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat, byte-addressable address space
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"; copies as much of `data` as fits
    /// in `len` bytes
    fn write(&mut self, data: &[u8], addr: u16, len: usize) -> Result<(), io::Error> {
        let bytes = self.get_rw_slice(addr, len);
        let mut d: &[u8] = data;
        d.read(bytes)?;
        Ok(())
    }

    /// get a two-byte, big-endian word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.get_byte(addr) as u16) << 8) | (self.get_byte(addr.wrapping_add(1)) as u16)
    }

    /// single byte; the address wraps within the address space
    fn get_byte(&self, addr: u16) -> u8;

    /// single byte; the address wraps within the address space
    fn set_byte(&mut self, addr: u16, value: u8);

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  font sprites
///   0x0050-0x01ff  reserved for the interpreter
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub font_addr: u16,
    pub program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize]
    }
    fn set_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize] = value;
    }
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: u16 = 4096;
const CHIP8_ADDR_MASK: u16 = CHIP8_RAM_SIZE_BYTES - 1;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// highest address a program may occupy
pub const CHIP8_PROGRAM_END: u16 = 0x0fff;

/// largest program image that will be loaded; anything beyond is dropped
pub const CHIP8_PROGRAM_MAX_BYTES: usize = (CHIP8_PROGRAM_END - CHIP8_PROGRAM_ADDR) as usize;

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Result<Self, io::Error> {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES as usize].into_boxed_slice(),
            font_addr: CHIP8_FONT_ADDR,
            program_addr: CHIP8_PROGRAM_ADDR,
        };
        mm.reset()?;
        Ok(mm)
    }

    /// zero everything and re-seed the font table
    pub fn reset(&mut self) -> Result<(), io::Error> {
        self.bytes.iter_mut().for_each(|b| *b = 0);
        self.write(&CHIP8_FONT, self.font_addr, CHIP8_FONT.len())
    }

    /// copy a program image to 0x200, truncating silently past
    /// `CHIP8_PROGRAM_MAX_BYTES`; returns how many bytes were loaded
    pub fn load_image(&mut self, image: &[u8]) -> Result<usize, io::Error> {
        let len = image.len().min(CHIP8_PROGRAM_MAX_BYTES);
        if len < image.len() {
            warn!(
                "program image is {} bytes; only the first {} were loaded",
                image.len(),
                len
            );
        }
        self.write(&image[..len], self.program_addr, len)?;
        debug!("loaded {} byte image at {:#05x}", len, self.program_addr);
        Ok(len)
    }

    /// address of the sprite for hex digit `digit`
    pub fn digit_sprite_addr(&self, digit: u8) -> u16 {
        self.font_addr + digit as u16 * CHIP8_FONT_SPRITE_BYTES
    }
}

/// bytes per hex digit sprite
pub const CHIP8_FONT_SPRITE_BYTES: u16 = 5;

const CHIP8_FONT_ADDR: u16 = 0x000;
#[rustfmt::skip]
pub const CHIP8_FONT: [u8; 80] = [
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
