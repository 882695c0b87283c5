//! Fixed-width symbol name hash used by the firmware loader.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Initial accumulator value of the name hash.
const SEED: u32 = 0x1505;

/// Per-byte multiplier of the name hash.
const MULTIPLIER: u32 = 33;

/// The 32-bit numeric identifier a plugin uses to resolve a firmware symbol.
///
/// Derived from the symbol name alone, never from its signature. The loader
/// looks symbols up by this value, so two distinct exported names must never
/// share one.
///
/// The accumulation is `h = h * 33 + byte` starting from `0x1505`, keeping
/// the low 32 bits of the result. Wrapping arithmetic on `u32` gives exactly
/// the low 32 bits of the unbounded accumulation, because reduction modulo
/// 2^32 commutes with both the multiply and the add.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolHash(u32);

impl SymbolHash {
    /// Computes the hash of a symbol name.
    pub fn of(name: &str) -> Self {
        let hash = name.bytes().fold(SEED, |h, b| {
            h.wrapping_mul(MULTIPLIER).wrapping_add(u32::from(b))
        });
        Self(hash)
    }

    /// Creates a hash from a raw value (tests and table generators).
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw 32-bit value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SymbolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::Debug for SymbolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolHash({self})")
    }
}
