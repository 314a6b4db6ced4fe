use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A cell coordinate on the hexagonal grid.
///
/// Cells are addressed by two line indices `i` and `k`; the third axis is
/// derived as `j = k - i`. Moving along a line keeps one of the three
/// values constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hex {
    i: i32,
    k: i32,
}

/// Offsets of the six neighbours of a cell, clockwise starting from `(-1, -1)`.
pub(crate) const NEIGHBOR_OFFSETS: [Hex; 6] = [
    Hex { i: -1, k: -1 },
    Hex { i: -1, k: 0 },
    Hex { i: 0, k: 1 },
    Hex { i: 1, k: 1 },
    Hex { i: 1, k: 0 },
    Hex { i: 0, k: -1 },
];

impl Hex {
    pub const ORIGIN: Hex = Hex { i: 0, k: 0 };

    #[inline]
    pub const fn new(i: i32, k: i32) -> Self { Hex { i, k } }

    #[inline]
    pub const fn i(self) -> i32 { self.i }

    #[inline]
    pub const fn j(self) -> i32 { self.k - self.i }

    #[inline]
    pub const fn k(self) -> i32 { self.k }

    /// Move along the line of constant `i` (changes `j` and `k`).
    #[inline]
    pub const fn shift_i(self, by: i32) -> Self { Hex { i: self.i, k: self.k + by } }

    /// Move along the line of constant `j` (changes `i` and `k`).
    #[inline]
    pub const fn shift_j(self, by: i32) -> Self { Hex { i: self.i + by, k: self.k + by } }

    /// Move along the line of constant `k` (changes `i` and `j`).
    #[inline]
    pub const fn shift_k(self, by: i32) -> Self { Hex { i: self.i + by, k: self.k } }

    /// The six adjacent cells.
    pub fn neighbors(self) -> [Hex; 6] { NEIGHBOR_OFFSETS.map(|d| self + d) }

    pub fn is_adjacent(self, other: Hex) -> bool {
        NEIGHBOR_OFFSETS.iter().any(|&d| self + d == other)
    }
}

impl Add for Hex {
    type Output = Hex;
    #[inline]
    fn add(self, rhs: Hex) -> Hex { Hex { i: self.i + rhs.i, k: self.k + rhs.k } }
}

impl Sub for Hex {
    type Output = Hex;
    #[inline]
    fn sub(self, rhs: Hex) -> Hex { Hex { i: self.i - rhs.i, k: self.k - rhs.k } }
}

impl From<(i32, i32)> for Hex {
    fn from((i, k): (i32, i32)) -> Self { Hex::new(i, k) }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j_is_derived() {
        let h = Hex::new(2, 5);
        assert_eq!(h.j(), 3);
        assert_eq!(Hex::new(3, 1).j(), -2);
    }

    #[test]
    fn shifts_keep_their_axis() {
        let h = Hex::new(1, 2);
        assert_eq!(h.shift_i(3).i(), h.i());
        assert_eq!(h.shift_j(-2).j(), h.j());
        assert_eq!(h.shift_k(4).k(), h.k());
    }

    #[test]
    fn neighbors_are_adjacent_and_distinct() {
        let c = Hex::new(4, 4);
        let ns = c.neighbors();
        for (n, a) in ns.iter().enumerate() {
            assert!(c.is_adjacent(*a));
            assert!(a.is_adjacent(c));
            for b in &ns[n + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Hex::new(6, 4)));
    }

    #[test]
    fn arithmetic() {
        let a = Hex::new(1, -2);
        let b = Hex::new(3, 4);
        assert_eq!(a + b, Hex::new(4, 2));
        assert_eq!(b - a, Hex::new(2, 6));
        assert_eq!(a + b - b, a);
    }
}
