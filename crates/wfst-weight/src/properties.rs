// Algebraic property flags declared by a weight type.

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Set of algebraic laws a weight type declares to hold.
///
/// Attached to a type through [`Weight::PROPERTIES`](crate::Weight::PROPERTIES)
/// and never changed at runtime. Algorithms treat the declaration as
/// authoritative and do not infer it from sampled behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Properties(u64);

impl Properties {
    /// For all a, b, c: `Times(c, Plus(a, b)) = Plus(Times(c, a), Times(c, b))`.
    pub const LEFT_SEMIRING: Self = Self(0x0000_0000_0000_0001);

    /// For all a, b, c: `Times(Plus(a, b), c) = Plus(Times(a, c), Times(b, c))`.
    pub const RIGHT_SEMIRING: Self = Self(0x0000_0000_0000_0002);

    /// Both left and right distributive.
    pub const SEMIRING: Self = Self(0x0000_0000_0000_0003);

    /// For all a, b: `Times(a, b) = Times(b, a)`.
    pub const COMMUTATIVE: Self = Self(0x0000_0000_0000_0004);

    /// For all a: `Plus(a, a) = a`.
    pub const IDEMPOTENT: Self = Self(0x0000_0000_0000_0008);

    /// For all a, b: `Plus(a, b) = a` or `Plus(a, b) = b`.
    pub const PATH: Self = Self(0x0000_0000_0000_0010);

    pub const NONE: Self = Self(0);

    const NAMES: [(Self, &'static str); 5] = [
        (Self::LEFT_SEMIRING, "left-semiring"),
        (Self::RIGHT_SEMIRING, "right-semiring"),
        (Self::COMMUTATIVE, "commutative"),
        (Self::IDEMPOTENT, "idempotent"),
        (Self::PATH, "path"),
    ];

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every flag in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Properties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for Properties {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
