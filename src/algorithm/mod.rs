//! Placement policies that rank where to put the next piece.
//!
//! An [`Algorithm`] looks at a board and the queue of pieces and returns the
//! most promising placements, best first. Generated samples store that list
//! as their label and the game plays its first entry.
//!
//! Any `FnMut(&HexEngine, &[Piece], usize) -> Vec<Placement>` is an
//! algorithm too, which keeps ad-hoc policies short.
//!
//! ```
//! use happyhex_data::algorithm::{Algorithm, NrSearchRank};
//! use happyhex_data::engine::HexEngine;
//! use happyhex_data::piece::Piece;
//!
//! let engine = HexEngine::new(5).unwrap();
//! let queue = [Piece::FULL, Piece::from_byte(0b0001011).unwrap()];
//! let mut algo = NrSearchRank::new();
//! let best = algo.choose(&engine, &queue, 7);
//! assert_eq!(best.len(), 7);
//! assert!(engine.check_add(best[0].coord, queue[best[0].piece_index]));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::HexEngine;
use crate::hex::Hex;
use crate::piece::Piece;

mod nrsearchrank;

pub use nrsearchrank::NrSearchRank;

/// Put `queue[piece_index]` with its anchor on `coord`.
///
/// Text form is `index:i:k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub piece_index: usize,
    pub coord: Hex,
}

impl Placement {
    #[inline]
    pub fn new(piece_index: usize, coord: Hex) -> Self { Placement { piece_index, coord } }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid placement {0:?}, expected index:i:k")]
pub struct PlacementParseError(pub String);

impl FromStr for Placement {
    type Err = PlacementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PlacementParseError(s.to_string());
        let mut parts = s.trim().split(':');
        let (Some(idx), Some(i), Some(k), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(err());
        };
        let piece_index = idx.trim().parse().map_err(|_| err())?;
        let i = i.trim().parse().map_err(|_| err())?;
        let k = k.trim().parse().map_err(|_| err())?;
        Ok(Placement::new(piece_index, Hex::new(i, k)))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.piece_index, self.coord.i(), self.coord.k())
    }
}

/// A policy ranking placements for the current board and queue.
pub trait Algorithm {
    /// Short identifier, used in logs and dataset directory names.
    fn name(&self) -> &str;

    /// Up to `significant_choices` valid placements, best first.
    ///
    /// An empty result means the policy found nothing to play.
    fn choose(&mut self, engine: &HexEngine, queue: &[Piece], significant_choices: usize) -> Vec<Placement>;
}

impl<F> Algorithm for F
where
    F: FnMut(&HexEngine, &[Piece], usize) -> Vec<Placement>,
{
    fn name(&self) -> &str { "custom" }

    fn choose(&mut self, engine: &HexEngine, queue: &[Piece], significant_choices: usize) -> Vec<Placement> {
        self(engine, queue, significant_choices)
    }
}

/// Counters from the last [`Algorithm::choose`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankStats {
    /// Distinct pieces examined.
    pub pieces: usize,
    /// Valid placements scored.
    pub candidates: usize,
}
