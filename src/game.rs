use rand::Rng;

use crate::engine::{EngineError, HexEngine};
use crate::hex::Hex;
use crate::piece::Piece;

/// Points per cleared cell, on top of one point per placed block.
pub const ELIMINATION_REWARD: u64 = 5;

/// A running HappyHex game: a board, a queue of pieces to place and a score.
///
/// Randomness only enters when pieces are dealt; pass a seeded RNG for
/// reproducible games.
///
/// ```
/// use happyhex_data::game::Game;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let mut game = Game::new(4, 3, &mut rng).unwrap();
/// let piece = game.queue()[0];
/// let anchor = game.engine().check_positions(piece)[0];
/// assert!(game.add_piece(0, anchor, &mut rng));
/// assert_eq!(game.turn(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    engine: HexEngine,
    queue: Vec<Piece>,
    score: u64,
    turn: u32,
    end: bool,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(radius: usize, queue_size: usize, rng: &mut R) -> Result<Self, EngineError> {
        let engine = HexEngine::new(radius)?;
        let queue = (0..queue_size).map(|_| Piece::random(&mut *rng)).collect();
        Ok(Self::from_parts(engine, queue))
    }

    /// Resume from an existing board and queue with score and turn at zero.
    pub fn from_parts(engine: HexEngine, queue: Vec<Piece>) -> Self {
        let mut game = Game { engine, queue, score: 0, turn: 0, end: false };
        game.end = !game.has_move();
        game
    }

    #[inline]
    pub fn engine(&self) -> &HexEngine { &self.engine }

    #[inline]
    pub fn queue(&self) -> &[Piece] { &self.queue }

    #[inline]
    pub fn score(&self) -> u64 { self.score }

    #[inline]
    pub fn turn(&self) -> u32 { self.turn }

    #[inline]
    pub fn is_over(&self) -> bool { self.end }

    /// `(turn, score)`.
    #[inline]
    pub fn result(&self) -> (u32, u64) { (self.turn, self.score) }

    fn has_move(&self) -> bool {
        self.queue.iter().any(|&p| !self.engine.check_positions(p).is_empty())
    }

    /// Place `queue[piece_index]` anchored at `coord`.
    ///
    /// On success the filled lines are cleared, the score updated, a new
    /// piece dealt into the used slot and the end condition re-checked.
    /// Returns `false` without touching the game when the game is already
    /// over, the index is out of range or the piece does not fit.
    pub fn add_piece<R: Rng + ?Sized>(&mut self, piece_index: usize, coord: Hex, rng: &mut R) -> bool {
        if self.end {
            return false;
        }
        let Some(&piece) = self.queue.get(piece_index) else { return false };
        if self.engine.add(coord, piece).is_err() {
            return false;
        }
        let cleared = self.engine.eliminate();
        self.score += piece.len() as u64 + ELIMINATION_REWARD * cleared.len() as u64;
        self.queue[piece_index] = Piece::random(rng);
        self.turn += 1;
        self.end = !self.has_move();
        true
    }
}
