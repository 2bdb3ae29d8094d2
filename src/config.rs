/// Which register the 8XY6 / 8XYE shifts read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftSource {
    /// shift VY into VX, as the original COSMAC VIP interpreter does
    #[default]
    Y,
    /// shift VX in place; later interpreters did this and some programs rely on it
    X,
}

/// What VF holds after 8XY5 / 8XY7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorrowFlag {
    /// VF = 1 when no borrow occurred, 0 when the subtrahend was larger
    #[default]
    SetWhenNoBorrow,
    /// VF = 1 when a borrow occurred
    SetOnBorrow,
}

/// behaviours where existing programs disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    pub shift_source: ShiftSource,
    pub borrow_flag: BorrowFlag,
}

impl BorrowFlag {
    /// VF value for a subtraction that did (or did not) borrow
    pub fn flag(self, borrowed: bool) -> u8 {
        match (self, borrowed) {
            (BorrowFlag::SetWhenNoBorrow, false) | (BorrowFlag::SetOnBorrow, true) => 1,
            _ => 0,
        }
    }
}

/// conventional timer cadence
pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;

/// instructions executed between timer ticks
pub const DEFAULT_CYCLES_PER_TICK: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub quirks: Quirks,
    pub cycles_per_tick: usize,
    pub tick_rate_hz: f64,
    /// fixed seed for CXNN; `None` seeds from entropy
    pub seed: Option<u64>,
    /// stop the host loop after this many ticks
    pub max_ticks: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            cycles_per_tick: DEFAULT_CYCLES_PER_TICK,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            seed: None,
            max_ticks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_faithful() {
        let c = Config::default();
        assert_eq!(c.quirks.shift_source, ShiftSource::Y);
        assert_eq!(c.quirks.borrow_flag, BorrowFlag::SetWhenNoBorrow);
        assert_eq!(c.cycles_per_tick, 10);
        assert_eq!(c.tick_rate_hz, 60.0);
    }

    #[test]
    fn test_borrow_polarity() {
        assert_eq!(BorrowFlag::SetWhenNoBorrow.flag(false), 1);
        assert_eq!(BorrowFlag::SetWhenNoBorrow.flag(true), 0);
        assert_eq!(BorrowFlag::SetOnBorrow.flag(false), 0);
        assert_eq!(BorrowFlag::SetOnBorrow.flag(true), 1);
    }
}
