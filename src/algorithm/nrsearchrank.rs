use std::cmp::Ordering;

use crate::engine::HexEngine;
use crate::piece::Piece;

use super::{Algorithm, Placement, RankStats};

/// Greedy one-ply ranking by density, piece size and cleared lines.
///
/// Each distinct piece in the queue is tried at every anchor where it fits.
/// A candidate scores
/// `dense_index + blocks + cleared_cells / radius`, measured on a copy of the
/// board after the placement. Duplicate pieces are only evaluated for their
/// first queue slot, and equal scores keep discovery order.
#[derive(Debug, Default)]
pub struct NrSearchRank {
    stats: RankStats,
}

impl NrSearchRank {
    pub fn new() -> Self { Self::default() }

    /// Every candidate with its score, best first.
    pub fn ranked(&mut self, engine: &HexEngine, queue: &[Piece]) -> Vec<(Placement, f64)> {
        let mut seen: Vec<Piece> = Vec::with_capacity(queue.len());
        let mut options: Vec<(Placement, f64)> = Vec::new();
        let radius = engine.radius() as f64;
        for (piece_index, &piece) in queue.iter().enumerate() {
            if seen.contains(&piece) {
                continue;
            }
            seen.push(piece);
            for coord in engine.check_positions(piece) {
                let mut score = engine.compute_dense_index(coord, piece) + piece.len() as f64;
                let mut after = engine.clone();
                if after.add(coord, piece).is_err() {
                    continue;
                }
                score += after.eliminate().len() as f64 / radius;
                options.push((Placement::new(piece_index, coord), score));
            }
        }
        // Stable sort: ties stay in discovery order.
        options.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        self.stats = RankStats { pieces: seen.len(), candidates: options.len() };
        options
    }

    /// Counters from the last ranking.
    #[inline]
    pub fn last_stats(&self) -> RankStats { self.stats }
}

impl Algorithm for NrSearchRank {
    fn name(&self) -> &str { "nrsearchrank" }

    fn choose(&mut self, engine: &HexEngine, queue: &[Piece], significant_choices: usize) -> Vec<Placement> {
        let mut ranked = self.ranked(engine, queue);
        ranked.truncate(significant_choices);
        ranked.into_iter().map(|(p, _)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Hex;

    fn single() -> Piece { Piece::from_coords([Hex::ORIGIN]) }

    #[test]
    fn prefers_clearing_a_line() {
        let mut engine = HexEngine::new(3).unwrap();
        // Row i = 0 is one block short of full.
        engine.set(Hex::new(0, 0), true).unwrap();
        engine.set(Hex::new(0, 1), true).unwrap();
        let mut algo = NrSearchRank::new();
        let best = algo.choose(&engine, &[single()], 1);
        assert_eq!(best, vec![Placement::new(0, Hex::new(0, 2))]);
    }

    #[test]
    fn duplicates_only_use_first_slot() {
        let engine = HexEngine::new(3).unwrap();
        let mut algo = NrSearchRank::new();
        let ranked = algo.ranked(&engine, &[single(), single()]);
        assert_eq!(ranked.len(), engine.len());
        assert!(ranked.iter().all(|(p, _)| p.piece_index == 0));
        assert_eq!(algo.last_stats(), RankStats { pieces: 1, candidates: 19 });
    }

    #[test]
    fn scores_are_descending_and_truncated() {
        let engine = HexEngine::new(4).unwrap();
        let pair = Piece::from_coords([Hex::ORIGIN, Hex::new(0, 1)]);
        let mut algo = NrSearchRank::new();
        let ranked = algo.ranked(&engine, &[pair, Piece::FULL]);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        let best = algo.choose(&engine, &[pair, Piece::FULL], 5);
        assert_eq!(best.len(), 5);
        for p in best {
            let piece = [pair, Piece::FULL][p.piece_index];
            assert!(engine.check_add(p.coord, piece));
        }
    }

    #[test]
    fn nothing_fits_gives_nothing() {
        let mut engine = HexEngine::new(1).unwrap();
        engine.set(Hex::ORIGIN, true).unwrap();
        let mut algo = NrSearchRank::new();
        assert!(algo.choose(&engine, &[single()], 7).is_empty());
    }
}
