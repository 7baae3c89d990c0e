//! Object-type identifiers and the bounded namespace they are drawn from.
//!
//! An [`Otype`] stamps a sealed capability with the identity of the authority
//! that sealed it. Identifiers live in a hardware-bounded namespace; the
//! values below `Otype::USER_MIN` are reserved by the architecture and are
//! never handed out to callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An object-type identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Otype(u64);

impl Otype {
    /// Smallest identifier available to user code.
    pub const USER_MIN: Otype = Otype(4);

    /// Largest identifier available to user code.
    pub const USER_MAX: Otype = Otype(0x3FFF);

    /// Wrap a raw identifier value.
    pub const fn new(value: u64) -> Self {
        Otype(value)
    }

    /// The raw identifier value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether this identifier lies in the user namespace.
    pub fn is_user(self) -> bool {
        OtypeRange::USER.contains(self)
    }
}

impl fmt::Display for Otype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// An inclusive range of object-type identifiers.
///
/// Allocators are seeded with a range; tests construct small private ranges
/// so each test owns a fresh namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtypeRange {
    min: Otype,
    max: Otype,
}

impl OtypeRange {
    /// The full user namespace.
    pub const USER: OtypeRange = OtypeRange {
        min: Otype::USER_MIN,
        max: Otype::USER_MAX,
    };

    /// Build a range, or `None` if `min` exceeds `max`.
    pub fn new(min: Otype, max: Otype) -> Option<Self> {
        if min <= max {
            Some(OtypeRange { min, max })
        } else {
            None
        }
    }

    /// Smallest identifier in the range.
    pub fn min(&self) -> Otype {
        self.min
    }

    /// Largest identifier in the range.
    pub fn max(&self) -> Otype {
        self.max
    }

    /// Number of identifiers in the range. Never zero by construction.
    pub fn count(&self) -> u64 {
        self.max.0 - self.min.0 + 1
    }

    /// Whether `otype` falls inside the range.
    pub fn contains(&self, otype: Otype) -> bool {
        self.min <= otype && otype <= self.max
    }
}

impl fmt::Display for OtypeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_range() {
        assert!(Otype::new(4).is_user());
        assert!(Otype::new(0x3FFF).is_user());
        assert!(!Otype::new(3).is_user());
        assert!(!Otype::new(0x4000).is_user());
    }

    #[test]
    fn test_range_construction() {
        let range = OtypeRange::new(Otype::new(4), Otype::new(10)).unwrap();
        assert_eq!(range.count(), 7);
        assert!(range.contains(Otype::new(4)));
        assert!(range.contains(Otype::new(10)));
        assert!(!range.contains(Otype::new(11)));

        assert!(OtypeRange::new(Otype::new(10), Otype::new(4)).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Otype::new(5).to_string(), "0x0005");
        let range = OtypeRange::new(Otype::new(4), Otype::new(7)).unwrap();
        assert_eq!(range.to_string(), "[0x0004, 0x0007]");
    }

    #[test]
    fn test_otype_serde() {
        let otype = Otype::new(42);
        let serialized = serde_json::to_string(&otype).unwrap();
        assert_eq!(serialized, "42");
        let deserialized: Otype = serde_json::from_str(&serialized).unwrap();
        assert_eq!(otype, deserialized);
    }
}
