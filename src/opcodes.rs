//! Handlers for the 35 CHIP-8 instructions.
//!
//! NNN is a 12-bit address, NN a byte, N a nibble, X and Y register indexes.
//! The program counter has already moved past the instruction when a
//! handler runs, so a skip only adds 2 more and jumps simply overwrite it.
use crate::config::ShiftSource;
use crate::error::Fault;
use crate::instruction::Opcode;
use crate::interpreter::{Chip8Interpreter, FLAG};
use crate::memory::{MemoryMap, CHIP8_PROGRAM_ADDR, CHIP8_PROGRAM_END};
use crate::stack::StackError;
use rand::Rng;

fn skip_if(m: &mut Chip8Interpreter, cond: bool) {
    if cond {
        m.pc = m.pc.wrapping_add(2);
    }
}

/// jump targets must land inside the program area
fn checked_target(op: Opcode, target: u16) -> Result<u16, Fault> {
    if (CHIP8_PROGRAM_ADDR..=CHIP8_PROGRAM_END).contains(&target) {
        Ok(target)
    } else {
        Err(Fault::InvalidAddress {
            word: op.word,
            pc: op.addr,
            target,
        })
    }
}

fn stack_fault(op: Opcode, e: StackError) -> Fault {
    match e {
        StackError::Overflow => Fault::StackOverflow {
            word: op.word,
            pc: op.addr,
        },
        StackError::Underflow => Fault::StackUnderflow {
            word: op.word,
            pc: op.addr,
        },
    }
}

/// 00E0
pub fn clear_display(m: &mut Chip8Interpreter, _op: Opcode) -> Result<(), Fault> {
    m.display.clear();
    Ok(())
}

/// 00EE
pub fn return_from_subroutine(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.pc = m.stack.pop().map_err(|e| stack_fault(op, e))?;
    Ok(())
}

/// 1NNN
pub fn jump(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.pc = checked_target(op, op.nnn())?;
    Ok(())
}

/// 2NNN
pub fn call(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let target = checked_target(op, op.nnn())?;
    m.stack.push(m.pc).map_err(|e| stack_fault(op, e))?;
    m.pc = target;
    Ok(())
}

/// 3XNN
pub fn skip_if_equal_imm(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let cond = m.v[op.x()] == op.nn();
    skip_if(m, cond);
    Ok(())
}

/// 4XNN
pub fn skip_if_not_equal_imm(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let cond = m.v[op.x()] != op.nn();
    skip_if(m, cond);
    Ok(())
}

/// 5XY0
pub fn skip_if_registers_equal(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let cond = m.v[op.x()] == m.v[op.y()];
    skip_if(m, cond);
    Ok(())
}

/// 6XNN
pub fn load_imm(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] = op.nn();
    Ok(())
}

/// 7XNN; VF is left alone
pub fn add_imm(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] = m.v[op.x()].wrapping_add(op.nn());
    Ok(())
}

/// 8XY0
pub fn copy_register(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] = m.v[op.y()];
    Ok(())
}

/// 8XY1
pub fn or_registers(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] |= m.v[op.y()];
    Ok(())
}

/// 8XY2
pub fn and_registers(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] &= m.v[op.y()];
    Ok(())
}

/// 8XY3
pub fn xor_registers(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] ^= m.v[op.y()];
    Ok(())
}

// the flag is written after the result, so it wins when X is VF

/// 8XY4
pub fn add_with_carry(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let (result, carry) = m.v[op.x()].overflowing_add(m.v[op.y()]);
    m.v[op.x()] = result;
    m.v[FLAG] = carry as u8;
    Ok(())
}

fn subtract(m: &mut Chip8Interpreter, x: usize, minuend: u8, subtrahend: u8) {
    let (result, borrow) = minuend.overflowing_sub(subtrahend);
    m.v[x] = result;
    m.v[FLAG] = m.quirks.borrow_flag.flag(borrow);
}

/// 8XY5: VX = VX - VY
pub fn sub_with_borrow(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let (vx, vy) = (m.v[op.x()], m.v[op.y()]);
    subtract(m, op.x(), vx, vy);
    Ok(())
}

/// 8XY7: VX = VY - VX
pub fn reverse_sub_with_borrow(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let (vx, vy) = (m.v[op.x()], m.v[op.y()]);
    subtract(m, op.x(), vy, vx);
    Ok(())
}

fn shift_source(m: &Chip8Interpreter, op: Opcode) -> u8 {
    match m.quirks.shift_source {
        ShiftSource::Y => m.v[op.y()],
        ShiftSource::X => m.v[op.x()],
    }
}

/// 8XY6
pub fn shift_right(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let src = shift_source(m, op);
    m.v[op.x()] = src >> 1;
    m.v[FLAG] = src & 0x01;
    Ok(())
}

/// 8XYE
pub fn shift_left(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let src = shift_source(m, op);
    m.v[op.x()] = src << 1;
    m.v[FLAG] = src >> 7;
    Ok(())
}

/// 9XY0
pub fn skip_if_registers_not_equal(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let cond = m.v[op.x()] != m.v[op.y()];
    skip_if(m, cond);
    Ok(())
}

/// ANNN
pub fn load_address(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.i = op.nnn();
    Ok(())
}

/// BNNN
pub fn jump_with_offset(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.pc = checked_target(op, op.nnn() + m.v[0] as u16)?;
    Ok(())
}

/// CXNN
pub fn random_masked(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] = m.rng.gen::<u8>() & op.nn();
    Ok(())
}

/// DXYN: xor N rows of sprite data from I onto the screen at (VX, VY).
/// VF ends up 1 if any lit pixel was switched off.
pub fn draw_sprite(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let x0 = m.v[op.x()] as usize;
    let y0 = m.v[op.y()] as usize;
    m.v[FLAG] = 0;
    let mut collision = false;
    for row in 0..op.n() {
        let bits = m.memory.get_byte(m.i.wrapping_add(row as u16));
        for bit in 0..8 {
            if bits & (0x80 >> bit) != 0 {
                collision |= m.display.xor_pixel(x0 + bit, y0 + row as usize);
            }
        }
    }
    m.v[FLAG] = collision as u8;
    Ok(())
}

/// EX9E
pub fn skip_if_key_pressed(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let cond = m.keypad.is_pressed(m.v[op.x()]);
    skip_if(m, cond);
    Ok(())
}

/// EXA1
pub fn skip_if_key_not_pressed(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let cond = !m.keypad.is_pressed(m.v[op.x()]);
    skip_if(m, cond);
    Ok(())
}

/// FX07
pub fn read_delay_timer(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.v[op.x()] = m.delay_timer;
    Ok(())
}

/// FX0A: suspends the machine until the host delivers a key press
pub fn wait_for_key(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.awaiting_key = Some(op.x());
    Ok(())
}

/// FX15
pub fn set_delay_timer(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.delay_timer = m.v[op.x()];
    Ok(())
}

/// FX18
pub fn set_sound_timer(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.sound_timer = m.v[op.x()];
    Ok(())
}

/// FX1E
pub fn add_to_address(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.i = m.i.wrapping_add(m.v[op.x()] as u16);
    Ok(())
}

/// FX29
pub fn digit_sprite_address(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    m.i = m.memory.digit_sprite_addr(m.v[op.x()]);
    Ok(())
}

/// FX33
pub fn store_bcd(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    let value = m.v[op.x()];
    let digits = [value / 100, (value / 10) % 10, value % 10];
    for (offset, digit) in digits.into_iter().enumerate() {
        m.memory.set_byte(m.i.wrapping_add(offset as u16), digit);
    }
    Ok(())
}

/// FX55
pub fn store_registers(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    for r in 0..=op.x() {
        m.memory.set_byte(m.i.wrapping_add(r as u16), m.v[r]);
    }
    m.i = m.i.wrapping_add(op.x() as u16 + 1);
    Ok(())
}

/// FX65
pub fn load_registers(m: &mut Chip8Interpreter, op: Opcode) -> Result<(), Fault> {
    for r in 0..=op.x() {
        m.v[r] = m.memory.get_byte(m.i.wrapping_add(r as u16));
    }
    m.i = m.i.wrapping_add(op.x() as u16 + 1);
    Ok(())
}
