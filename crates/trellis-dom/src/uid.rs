//! Library-generated element identities

use std::fmt;

/// Unique id assigned to every upgraded widget element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(pub u64);

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Monotonic uid source, one per context
#[derive(Debug, Default)]
pub struct UidGenerator {
    next: u64,
}

impl UidGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> Uid {
        self.next += 1;
        Uid(self.next)
    }
}
