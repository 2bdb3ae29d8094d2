use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::path::PathBuf;

use chip8_vm::config::{
    BorrowFlag, Config, Quirks, ShiftSource, DEFAULT_CYCLES_PER_TICK, DEFAULT_TICK_RATE_HZ,
};
use chip8_vm::display::{MonoTermDisplay, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_vm::error::Result;
use chip8_vm::input::TermInput;
use chip8_vm::interpreter::Chip8Interpreter;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};
use chip8_vm::Host;

#[derive(Parser, Debug)]
#[command(about = "Run a CHIP-8 program in the terminal (Esc quits)")]
struct Args {
    /// program image, loaded at 0x200
    rom: PathBuf,

    /// instructions executed per timer tick
    #[arg(long, default_value_t = DEFAULT_CYCLES_PER_TICK)]
    cycles_per_tick: usize,

    /// timer ticks per second
    #[arg(long, default_value_t = DEFAULT_TICK_RATE_HZ)]
    tick_rate: f64,

    /// shift VX in place instead of shifting VY into VX
    #[arg(long, default_value_t = false)]
    shift_vx: bool,

    /// VF = 1 on borrow for 8XY5/8XY7, instead of on no borrow
    #[arg(long, default_value_t = false)]
    borrow_set: bool,

    /// seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// play tones through the PC speaker
    #[arg(long, default_value_t = false)]
    beep: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quirks: Quirks {
                shift_source: if self.shift_vx {
                    ShiftSource::X
                } else {
                    ShiftSource::Y
                },
                borrow_flag: if self.borrow_set {
                    BorrowFlag::SetOnBorrow
                } else {
                    BorrowFlag::SetWhenNoBorrow
                },
            },
            cycles_per_tick: self.cycles_per_tick,
            tick_rate_hz: self.tick_rate,
            seed: self.seed,
            max_ticks: self.max_ticks,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = args.config();

    // load a program
    let mut interpreter = Chip8Interpreter::new(&config)?;
    let mut f = File::open(&args.rom)?;
    let loaded = interpreter.load_program(&mut f)?;
    info!("loaded {} bytes from {}", loaded, args.rom.display());

    let mut display = MonoTermDisplay::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)?;
    let mut input = TermInput::new()?;
    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.beep { &mut beeper } else { &mut mute };

    let mut host = Host::new(interpreter, &mut display, &mut input, sound, config);
    let result = host.run();
    drop(host);
    drop(input);
    drop(display);

    match result {
        Ok(exit) => {
            info!("stopped: {:?}", exit);
            Ok(())
        }
        Err(e) => {
            warn!("{}", e);
            Err(e)
        }
    }
}
