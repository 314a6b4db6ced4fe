use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hex::Hex;

/// Cells a piece may cover, relative to its anchor. Cell `n` maps to bit `6 - n`.
pub const POSITIONS: [Hex; 7] = [
    Hex::new(-1, -1),
    Hex::new(-1, 0),
    Hex::new(0, -1),
    Hex::new(0, 0),
    Hex::new(0, 1),
    Hex::new(1, 0),
    Hex::new(1, 1),
];

const MASK: u8 = 0x7f;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PieceError {
    #[error("piece value {0} does not fit in 7 bits")]
    OutOfRange(u32),
    #[error("invalid piece text: {0:?}")]
    Parse(String),
}

/// A piece of up to seven blocks packed into the low 7 bits of a byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Piece(u8);

impl Piece {
    pub const EMPTY: Piece = Piece(0);
    pub const FULL: Piece = Piece(MASK);

    pub fn from_byte(byte: u8) -> Result<Self, PieceError> {
        if byte & !MASK != 0 {
            return Err(PieceError::OutOfRange(byte as u32));
        }
        Ok(Piece(byte))
    }

    /// Build a piece from the anchor-relative cells it covers.
    ///
    /// Cells outside [`POSITIONS`] are ignored.
    pub fn from_coords<I: IntoIterator<Item = Hex>>(cells: I) -> Self {
        let byte = cells.into_iter().fold(0u8, |acc, c| match POSITIONS.iter().position(|&p| p == c) {
            Some(n) => acc | (1 << (6 - n)),
            None => acc,
        });
        Piece(byte)
    }

    #[inline]
    pub fn to_byte(self) -> u8 { self.0 }

    /// Occupancy of each cell in [`POSITIONS`] order.
    pub fn states(self) -> [bool; 7] {
        std::array::from_fn(|n| self.0 & (1 << (6 - n)) != 0)
    }

    /// Number of blocks.
    #[inline]
    pub fn len(self) -> usize { self.0.count_ones() as usize }

    #[inline]
    pub fn is_empty(self) -> bool { self.0 == 0 }

    /// Anchor-relative cells covered by the piece, in [`POSITIONS`] order.
    pub fn coords(self) -> impl Iterator<Item = Hex> {
        POSITIONS
            .into_iter()
            .enumerate()
            .filter(move |&(n, _)| self.0 & (1 << (6 - n)) != 0)
            .map(|(_, c)| c)
    }

    /// True when every block touches the rest of the piece through shared edges.
    pub fn is_connected(self) -> bool {
        let cells: Vec<Hex> = self.coords().collect();
        let Some(&first) = cells.first() else { return false };
        let mut seen = vec![first];
        let mut frontier = vec![first];
        while let Some(cur) = frontier.pop() {
            for &c in &cells {
                if !seen.contains(&c) && cur.is_adjacent(c) {
                    seen.push(c);
                    frontier.push(c);
                }
            }
        }
        seen.len() == cells.len()
    }

    /// The pool new pieces are dealt from: every connected piece of 3 or 4 blocks.
    pub fn spawnable() -> &'static [Piece] {
        SPAWNABLE.get_or_init(build_spawnable).as_ref()
    }

    /// Deal a uniformly random piece from [`Piece::spawnable`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let pool = Self::spawnable();
        pool[rng.gen_range(0..pool.len())]
    }
}

static SPAWNABLE: OnceLock<Box<[Piece]>> = OnceLock::new();

fn build_spawnable() -> Box<[Piece]> {
    (1..=MASK)
        .map(Piece)
        .filter(|p| matches!(p.len(), 3 | 4) && p.is_connected())
        .collect::<Vec<_>>()
        .into_boxed_slice()
}

impl TryFrom<u8> for Piece {
    type Error = PieceError;
    fn try_from(v: u8) -> Result<Self, Self::Error> { Piece::from_byte(v) }
}

impl From<Piece> for u8 {
    fn from(p: Piece) -> Self { p.0 }
}

impl FromStr for Piece {
    type Err = PieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: u32 = s.trim().parse().map_err(|_| PieceError::Parse(s.to_string()))?;
        let byte = u8::try_from(v).map_err(|_| PieceError::OutOfRange(v))?;
        Piece::from_byte(byte)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({:07b})", self.0)
    }
}
