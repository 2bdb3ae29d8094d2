/// how many return addresses fit on the call stack
pub const STACK_LEVELS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    Overflow,
    Underflow,
}

/// bounded LIFO of subroutine return addresses
#[derive(Debug, Clone)]
pub struct CallStack {
    levels: [u16; STACK_LEVELS],
    sp: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            levels: [0; STACK_LEVELS],
            sp: 0,
        }
    }

    /// clear all entries and the stack pointer
    pub fn reset(&mut self) {
        self.levels = [0; STACK_LEVELS];
        self.sp = 0;
    }

    pub fn push(&mut self, addr: u16) -> Result<(), StackError> {
        if self.sp >= STACK_LEVELS {
            return Err(StackError::Overflow);
        }
        self.levels[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StackError> {
        if self.sp == 0 {
            return Err(StackError::Underflow);
        }
        self.sp -= 1;
        Ok(self.levels[self.sp])
    }

    pub fn len(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// live entries, bottom of stack first
    pub fn as_slice(&self) -> &[u16] {
        &self.levels[..self.sp]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() -> Result<(), StackError> {
        let mut s = CallStack::new();
        s.push(0x202)?;
        s.push(0x306)?;
        assert_eq!(s.as_slice(), &[0x202, 0x306]);
        assert_eq!(s.pop()?, 0x306);
        assert_eq!(s.pop()?, 0x202);
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn test_thirteenth_push_overflows() {
        let mut s = CallStack::new();
        for n in 0..STACK_LEVELS as u16 {
            assert_eq!(s.push(0x200 + 2 * n), Ok(()));
        }
        assert_eq!(s.push(0x400), Err(StackError::Overflow));
        assert_eq!(s.len(), STACK_LEVELS);
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut s = CallStack::new();
        assert_eq!(s.pop(), Err(StackError::Underflow));
        s.push(0x200).unwrap();
        s.pop().unwrap();
        assert_eq!(s.pop(), Err(StackError::Underflow));
    }

    #[test]
    fn test_reset_empties() {
        let mut s = CallStack::new();
        s.push(0x200).unwrap();
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.as_slice(), &[] as &[u16]);
    }
}
