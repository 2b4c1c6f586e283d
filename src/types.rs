//! Literals over decision-diagram variables.
use std::fmt;
use std::ops::Neg;

/// A Boolean literal: a variable or its negation.
///
/// Stored as a signed integer, DIMACS-style: positive values are positive
/// literals, negative values are negated ones.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    /// # Panics
    ///
    /// Panics if `var` is zero.
    pub const fn pos(var: u32) -> Self {
        assert!(var > 0, "Variable must be positive (1-indexed)");
        Self(var as i32)
    }

    /// # Panics
    ///
    /// Panics if `var` is zero.
    pub const fn neg(var: u32) -> Self {
        assert!(var > 0, "Variable must be positive (1-indexed)");
        Self(-(var as i32))
    }

    /// Literal of `var` that is satisfied when the variable equals `value`.
    pub const fn new(var: u32, value: bool) -> Self {
        if value {
            Self::pos(var)
        } else {
            Self::neg(var)
        }
    }

    pub const fn from_dimacs(lit: i32) -> Self {
        assert!(lit != 0, "Literal cannot be zero");
        Self(lit)
    }

    pub const fn to_dimacs(self) -> i32 {
        self.0
    }

    pub const fn var(self) -> u32 {
        self.0.unsigned_abs()
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl From<i32> for Lit {
    fn from(lit: i32) -> Self {
        Self::from_dimacs(lit)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "!")?;
        }
        write!(f, "x{}", self.var())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit() {
        let x = Lit::new(3, true);
        assert!(x.is_positive());
        assert_eq!(x.var(), 3);
        assert_eq!(-x, Lit::from(-3));
        assert_eq!((-x).to_dimacs(), -3);
        assert_eq!(x.to_string(), "x3");
        assert_eq!((-x).to_string(), "!x3");
    }
}
