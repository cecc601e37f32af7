pub mod errors;

pub use errors::{Su2Error, Su2ErrorCategory};

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    SixJ,
    NineJ,
}

impl SymbolKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SixJ => "6j",
            Self::NineJ => "9j",
        }
    }

    /// Recoupling symbols are identified by their argument count.
    pub const fn from_spin_count(count: usize) -> Option<Self> {
        match count {
            6 => Some(Self::SixJ),
            9 => Some(Self::NineJ),
            _ => None,
        }
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
