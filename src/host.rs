//! The host loop around an interpreter.
//!
//! Each tick:
//!  * poll the input device for a keypad snapshot (may complete an FX0A)
//!  * run a batch of instructions; there's no timing between them
//!  * tick the delay and sound timers
//!  * redraw if the frame buffer changed, start/stop the tone
//!  * sleep off the rest of the tick
//!
//! Instructions run as fast as possible then sleep, so wallclock timing
//! looks right even though individual instructions aren't paced.
use crate::config::Config;
use crate::display::Display;
use crate::error::{Chip8Error, Result};
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use log::{debug, error, warn};
use spin_sleep::LoopHelper;

/// Why the host loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// the input device asked to stop
    Quit,
    /// ran for `Config::max_ticks`
    TickLimit,
}

pub struct Host<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    ticks: u64,
}

impl<'a> Host<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Self {
        Host {
            interpreter,
            display,
            input,
            sound,
            config,
            ticks: 0,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// one host tick
    pub fn tick(&mut self) -> Result<()> {
        let keypad = self.input.poll_keypad()?;
        self.interpreter.set_keypad(keypad);

        self.interpreter.step_cycles(self.config.cycles_per_tick)?;
        self.interpreter.tick_timers();

        if self.interpreter.frame_buffer_mut().take_dirty() {
            self.display
                .draw(self.interpreter.frame_buffer().as_bytes())?;
        }
        self.sound.update(self.interpreter.sound_active())?;
        self.ticks += 1;
        Ok(())
    }

    /// tick at the configured rate until asked to stop, the tick limit is
    /// reached, or the machine faults
    pub fn run(&mut self) -> Result<Exit> {
        let mut loop_helper = LoopHelper::builder().build_with_target_rate(self.config.tick_rate_hz);
        let exit = loop {
            loop_helper.loop_start();
            if self.input.quit_requested() {
                break Exit::Quit;
            }
            if matches!(self.config.max_ticks, Some(max) if self.ticks >= max) {
                break Exit::TickLimit;
            }
            if let Err(e) = self.tick() {
                if let Chip8Error::Fault(fault) = &e {
                    error!("stopping after {} ticks: {}", self.ticks, fault);
                }
                if let Err(stop_err) = self.sound.stop() {
                    warn!("couldn't stop tone: {}", stop_err);
                }
                return Err(e);
            }
            loop_helper.loop_sleep();
        };
        debug!("host loop finished after {} ticks: {:?}", self.ticks, exit);
        self.sound.update(false)?;
        Ok(exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::error::Fault;
    use crate::input::{DummyInput, Keypad};
    use crate::sound::Mute;

    fn config(max_ticks: u64) -> Config {
        Config {
            tick_rate_hz: 10_000.0,
            max_ticks: Some(max_ticks),
            seed: Some(3),
            ..Config::default()
        }
    }

    fn interpreter(image: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::new(&config(1)).unwrap();
        i.reset(image).unwrap();
        i
    }

    #[test]
    fn test_runs_until_tick_limit() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        // loop forever on a jump to self
        let i = interpreter(&[0x12, 0x00]);
        let mut host = Host::new(i, &mut display, &mut input, &mut sound, config(5));
        assert_eq!(host.run()?, Exit::TickLimit);
        assert_eq!(host.ticks(), 5);
        Ok(())
    }

    #[test]
    fn test_draw_reaches_display() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        // I = font "0"; draw at (V0, V1) = (0, 0); loop
        let i = interpreter(&[0xa0, 0x00, 0xd0, 0x15, 0x12, 0x04]);
        let mut host = Host::new(i, &mut display, &mut input, &mut sound, config(3));
        host.run()?;
        drop(host);
        // initial frame plus the draw, both in the first tick
        assert_eq!(display.frames, 1);
        assert_eq!(display.last[0], 0xf0);
        assert_eq!(display.last[8], 0x90);
        Ok(())
    }

    #[test]
    fn test_sound_follows_timer() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        // V0 = 3; sound timer = V0; loop
        let i = interpreter(&[0x60, 0x03, 0xf0, 0x18, 0x12, 0x04]);
        let mut host = Host::new(i, &mut display, &mut input, &mut sound, config(1));
        host.tick()?;
        assert_eq!(host.interpreter().sound_timer(), 2);
        host.tick()?;
        host.tick()?;
        assert_eq!(host.interpreter().sound_timer(), 0);
        drop(host);
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
        Ok(())
    }

    #[test]
    fn test_key_press_completes_wait() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[
            Keypad::default(),
            Keypad::default(),
            Keypad::with_pressed(&[0xe]),
        ]);
        let mut sound = Mute::new();
        // V2 = key; loop
        let i = interpreter(&[0xf2, 0x0a, 0x12, 0x02]);
        let mut host = Host::new(i, &mut display, &mut input, &mut sound, config(1));
        host.tick()?;
        host.tick()?;
        assert!(host.interpreter().is_awaiting_key());
        host.tick()?;
        assert!(!host.interpreter().is_awaiting_key());
        assert_eq!(host.interpreter().register(2), 0xe);
        Ok(())
    }

    #[test]
    fn test_fault_stops_run() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let i = interpreter(&[0x00, 0x05]);
        let mut host = Host::new(i, &mut display, &mut input, &mut sound, config(10));
        match host.run() {
            Err(Chip8Error::Fault(f)) => assert_eq!(
                f,
                Fault::InvalidInstruction {
                    word: 0x0005,
                    pc: 0x200
                }
            ),
            other => panic!("expected a fault, got {:?}", other),
        }
        assert_eq!(host.ticks(), 0);
    }

    /// a speaker that can start but never stop
    struct StuckSpeaker {
        stop_attempts: usize,
    }

    impl Sound for StuckSpeaker {
        fn beep(&mut self) -> Result<()> {
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.stop_attempts += 1;
            Err(Chip8Error::Sound("device gone".to_string()))
        }
        fn is_beeping(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_fault_survives_sound_error() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = StuckSpeaker { stop_attempts: 0 };
        let i = interpreter(&[0xff, 0xff]);
        let mut host = Host::new(i, &mut display, &mut input, &mut sound, config(10));
        assert!(matches!(
            host.run(),
            Err(Chip8Error::Fault(Fault::InvalidInstruction { word: 0xffff, .. }))
        ));
        drop(host);
        assert_eq!(sound.stop_attempts, 1);
    }
}
