//! Hexagonal HappyHex board.
//!
//! A board of radius `r` holds `1 + 3r(r-1)` cells. Cell `(i, k)` is on the
//! board when `0 <= i < 2r-1`, `0 <= k < 2r-1` and `|k - i| < r`. Cells are
//! stored i-major, then by `k`; the text form of a board is one `0`/`1` per
//! cell in that order, which is also how the radius is recovered when parsing.

use std::fmt;
use std::str::FromStr;

use crate::hex::Hex;
use crate::piece::Piece;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("radius must be at least 1")]
    InvalidRadius,
    #[error("{0} cells do not form a hexagonal board")]
    BadLength(usize),
    #[error("unexpected character {0:?} in board text")]
    BadChar(char),
    #[error("coordinate {0} is outside the board")]
    OutOfRange(Hex),
    #[error("piece {piece} does not fit at {coord}")]
    DoesNotFit { coord: Hex, piece: Piece },
}

/// Number of cells on a board of `radius`.
#[inline]
pub const fn block_count(radius: usize) -> usize {
    if radius == 0 { 0 } else { 1 + 3 * radius * (radius - 1) }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HexEngine {
    radius: usize,
    states: Vec<bool>,
}

impl HexEngine {
    /// An empty board.
    pub fn new(radius: usize) -> Result<Self, EngineError> {
        if radius == 0 {
            return Err(EngineError::InvalidRadius);
        }
        Ok(HexEngine { radius, states: vec![false; block_count(radius)] })
    }

    #[inline]
    pub fn radius(&self) -> usize { self.radius }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize { self.states.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    /// Occupancy of every cell in storage order.
    #[inline]
    pub fn states(&self) -> &[bool] { &self.states }

    pub fn count_occupied(&self) -> usize { self.states.iter().filter(|&&s| s).count() }

    #[inline]
    fn span(&self) -> i32 { 2 * self.radius as i32 - 1 }

    /// Inclusive range of `k` on row `i`.
    #[inline]
    fn row_bounds(&self, i: i32) -> (i32, i32) {
        let r = self.radius as i32;
        ((i - (r - 1)).max(0), (i + r - 1).min(self.span() - 1))
    }

    pub fn in_range(&self, coord: Hex) -> bool {
        let span = self.span();
        (0..span).contains(&coord.i())
            && (0..span).contains(&coord.k())
            && coord.j().abs() < self.radius as i32
    }

    /// Storage index of `coord`, or `None` when it is off the board.
    pub fn index_of(&self, coord: Hex) -> Option<usize> {
        if !self.in_range(coord) {
            return None;
        }
        let offset: i32 = (0..coord.i())
            .map(|row| {
                let (lo, hi) = self.row_bounds(row);
                hi - lo + 1
            })
            .sum();
        let (lo, _) = self.row_bounds(coord.i());
        Some((offset + coord.k() - lo) as usize)
    }

    /// All cells in storage order.
    pub fn coords(&self) -> impl Iterator<Item = Hex> + '_ {
        (0..self.span()).flat_map(move |i| {
            let (lo, hi) = self.row_bounds(i);
            (lo..=hi).map(move |k| Hex::new(i, k))
        })
    }

    pub fn get(&self, coord: Hex) -> Option<bool> { self.index_of(coord).map(|idx| self.states[idx]) }

    pub fn set(&mut self, coord: Hex, occupied: bool) -> Result<(), EngineError> {
        let idx = self.index_of(coord).ok_or(EngineError::OutOfRange(coord))?;
        self.states[idx] = occupied;
        Ok(())
    }

    /// True when every block of `piece` anchored at `coord` lands on a free cell.
    pub fn check_add(&self, coord: Hex, piece: Piece) -> bool {
        piece
            .coords()
            .all(|c| matches!(self.index_of(coord + c), Some(idx) if !self.states[idx]))
    }

    /// Anchors over board cells where `piece` fits, in storage order.
    pub fn check_positions(&self, piece: Piece) -> Vec<Hex> {
        self.coords().filter(|&c| self.check_add(c, piece)).collect()
    }

    pub fn add(&mut self, coord: Hex, piece: Piece) -> Result<(), EngineError> {
        if !self.check_add(coord, piece) {
            return Err(EngineError::DoesNotFit { coord, piece });
        }
        for c in piece.coords() {
            if let Some(idx) = self.index_of(coord + c) {
                self.states[idx] = true;
            }
        }
        Ok(())
    }

    /// Clear every completely filled line along the three axes.
    ///
    /// Returns the cleared cells in storage order; a cell on several full
    /// lines is reported once.
    pub fn eliminate(&mut self) -> Vec<Hex> {
        let span = self.span() as usize;
        let r = self.radius as i32;
        let mut full_i = vec![true; span];
        let mut full_j = vec![true; span];
        let mut full_k = vec![true; span];
        for (c, &occupied) in self.coords().zip(&self.states) {
            if !occupied {
                full_i[c.i() as usize] = false;
                full_j[(c.j() + r - 1) as usize] = false;
                full_k[c.k() as usize] = false;
            }
        }
        let cleared: Vec<(usize, Hex)> = self
            .coords()
            .enumerate()
            .filter(|&(_, c)| full_i[c.i() as usize] || full_j[(c.j() + r - 1) as usize] || full_k[c.k() as usize])
            .collect();
        for &(idx, _) in &cleared {
            self.states[idx] = false;
        }
        cleared.into_iter().map(|(_, c)| c).collect()
    }

    /// Share of the cells bordering a placed piece that are already blocked.
    ///
    /// Off-board neighbours count as blocked; cells of the piece itself are
    /// not counted. Returns 0.0 when the piece has no outside neighbours.
    pub fn compute_dense_index(&self, coord: Hex, piece: Piece) -> f64 {
        let placed: Vec<Hex> = piece.coords().map(|c| coord + c).collect();
        let mut total = 0u32;
        let mut blocked = 0u32;
        for &cell in &placed {
            for n in cell.neighbors() {
                if placed.contains(&n) {
                    continue;
                }
                total += 1;
                if self.get(n).unwrap_or(true) {
                    blocked += 1;
                }
            }
        }
        if total == 0 { 0.0 } else { blocked as f64 / total as f64 }
    }

    /// Multi-line drawing of the board, one row of constant `i` per line.
    pub fn render(&self) -> String {
        let r = self.radius as i32;
        let mut out = String::new();
        for i in 0..self.span() {
            let (lo, hi) = self.row_bounds(i);
            out.push_str(&" ".repeat((i - (r - 1)).unsigned_abs() as usize));
            let row: Vec<&str> = (lo..=hi)
                .map(|k| if self.get(Hex::new(i, k)).unwrap_or(false) { "#" } else { "." })
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }
}

impl FromStr for HexEngine {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let states = s
            .chars()
            .map(|ch| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(EngineError::BadChar(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut radius = 1;
        while block_count(radius) < states.len() {
            radius += 1;
        }
        if states.is_empty() || block_count(radius) != states.len() {
            return Err(EngineError::BadLength(states.len()));
        }
        Ok(HexEngine { radius, states })
    }
}

impl fmt::Display for HexEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &s in &self.states {
            f.write_str(if s { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexEngine(r={}, {})", self.radius, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> Piece { Piece::from_coords([Hex::ORIGIN]) }

    #[test]
    fn block_counts() {
        assert_eq!(block_count(1), 1);
        assert_eq!(block_count(2), 7);
        assert_eq!(block_count(5), 61);
        for r in 1..8 {
            let e = HexEngine::new(r).unwrap();
            assert_eq!(e.len(), block_count(r));
            assert_eq!(e.coords().count(), e.len());
        }
        assert_eq!(HexEngine::new(0), Err(EngineError::InvalidRadius));
    }

    #[test]
    fn index_matches_coords_order() {
        let e = HexEngine::new(4).unwrap();
        for (idx, c) in e.coords().enumerate() {
            assert_eq!(e.index_of(c), Some(idx));
        }
        assert_eq!(e.index_of(Hex::new(0, 4)), None);
        assert_eq!(e.index_of(Hex::new(-1, 0)), None);
        assert_eq!(e.index_of(Hex::new(7, 7)), None);
    }

    #[test]
    fn text_round_trip() {
        let mut e = HexEngine::new(3).unwrap();
        e.set(Hex::new(0, 0), true).unwrap();
        e.set(Hex::new(2, 3), true).unwrap();
        let text = e.to_string();
        assert_eq!(text.len(), 19);
        assert_eq!(&text[..1], "1");
        let back: HexEngine = text.parse().unwrap();
        assert_eq!(back, e);
        assert_eq!(back.radius(), 3);
    }

    #[test]
    fn parse_rejects_bad_text() {
        assert_eq!("".parse::<HexEngine>(), Err(EngineError::BadLength(0)));
        assert_eq!("0000".parse::<HexEngine>(), Err(EngineError::BadLength(4)));
        assert_eq!("0010x00".parse::<HexEngine>(), Err(EngineError::BadChar('x')));
        assert_eq!("1".parse::<HexEngine>().unwrap().radius(), 1);
    }

    #[test]
    fn full_piece_fits_only_in_center_of_radius_two() {
        let e = HexEngine::new(2).unwrap();
        assert_eq!(e.check_positions(Piece::FULL), vec![Hex::new(1, 1)]);
        assert_eq!(e.check_positions(single()).len(), 7);
    }

    #[test]
    fn add_rejects_overlap() {
        let mut e = HexEngine::new(3).unwrap();
        e.add(Hex::new(2, 2), Piece::FULL).unwrap();
        assert_eq!(e.count_occupied(), 7);
        let err = e.add(Hex::new(2, 2), single()).unwrap_err();
        assert!(matches!(err, EngineError::DoesNotFit { .. }));
        assert_eq!(e.count_occupied(), 7);
    }

    #[test]
    fn eliminate_clears_one_full_row() {
        let mut e = HexEngine::new(3).unwrap();
        // Row i = 0 holds k = 0..=2.
        for k in 0..3 {
            e.set(Hex::new(0, k), true).unwrap();
        }
        e.set(Hex::new(4, 4), true).unwrap();
        let cleared = e.eliminate();
        assert_eq!(cleared, vec![Hex::new(0, 0), Hex::new(0, 1), Hex::new(0, 2)]);
        assert_eq!(e.count_occupied(), 1);
        assert_eq!(e.get(Hex::new(4, 4)), Some(true));
    }

    #[test]
    fn eliminate_reports_crossing_cells_once() {
        let mut e = HexEngine::new(2).unwrap();
        // Row i = 1 and column k = 1 cross at (1, 1).
        for c in [Hex::new(1, 0), Hex::new(1, 1), Hex::new(1, 2), Hex::new(0, 1), Hex::new(2, 1)] {
            e.set(c, true).unwrap();
        }
        let cleared = e.eliminate();
        assert_eq!(cleared.len(), 5);
        assert_eq!(e.count_occupied(), 0);
    }

    #[test]
    fn dense_index_counts_walls() {
        let e = HexEngine::new(3).unwrap();
        // A single block in a corner: (0, 0) has 3 off-board neighbours out of 6.
        assert!((e.compute_dense_index(Hex::new(0, 0), single()) - 0.5).abs() < 1e-9);
        // Center of an empty board: nothing blocked.
        assert_eq!(e.compute_dense_index(Hex::new(2, 2), single()), 0.0);
        assert_eq!(e.compute_dense_index(Hex::new(2, 2), Piece::EMPTY), 0.0);
    }

    #[test]
    fn render_has_one_line_per_row() {
        let e = HexEngine::new(3).unwrap();
        let text = e.render();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.matches('.').count(), 19);
    }
}
