use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Handle to a node of the [`Bdd`][crate::bdd::Bdd] manager.
///
/// The sign encodes a complement edge: `-r` denotes the negation of `r`.
/// Index `1` is the terminal node, so `Ref(1)` is the constant true and
/// `Ref(-1)` is the constant false.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Index of the node in the unique table, ignoring the complement bit.
    pub const fn index(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// The non-negated version of this reference.
    pub const fn regular(self) -> Self {
        Self(self.0.abs())
    }

    /// Encoding as a non-negative integer, suitable for hashing.
    pub(crate) const fn unsigned(self) -> u32 {
        (self.0.unsigned_abs() << 1) | (self.0 < 0) as u32
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation() {
        let r = Ref::positive(5);
        assert!(!r.is_negated());
        assert!((-r).is_negated());
        assert_eq!(-(-r), r);
        assert_eq!((-r).index(), 5);
        assert_eq!((-r).regular(), r);
    }

    #[test]
    fn test_unsigned_is_injective() {
        let a = Ref::positive(3);
        assert_ne!(a.unsigned(), (-a).unsigned());
        assert_ne!(a.unsigned(), Ref::positive(4).unsigned());
    }

    #[test]
    fn test_display() {
        let r = Ref::positive(7);
        assert_eq!(r.to_string(), "@7");
        assert_eq!((-r).to_string(), "~@7");
    }
}
