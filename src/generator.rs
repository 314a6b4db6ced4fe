//! Self-play generation of training samples.
//!
//! A [`SelfPlay`] rule plays whole games with an [`Algorithm`]: every turn
//! the algorithm ranks placements, the game plays the best one, and the
//! position together with the ranking becomes a sample. Samples are dropped
//! at random with `move_dropout`, and each game's list is trimmed by
//! `remove_head` / `remove_tail` before it is handed out.
//!
//! ```
//! use happyhex_data::algorithm::NrSearchRank;
//! use happyhex_data::config::GeneratorConfig;
//! use happyhex_data::generator::generate_training_data;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let cfg = GeneratorConfig { engine_radius: 3, ..Default::default() };
//! let mut rng = StdRng::seed_from_u64(11);
//! let samples = generate_training_data(20, NrSearchRank::new(), &cfg, &mut rng).unwrap();
//! assert_eq!(samples.len(), 20);
//! assert!(samples.iter().all(|s| s.is_consistent()));
//! ```

use rand::Rng;

use crate::algorithm::Algorithm;
use crate::config::GeneratorConfig;
use crate::dataset::{self, GenerateError, GenerationRule, Progress};
use crate::game::Game;
use crate::sample::TrainingSample;

/// Outcome of one self-play game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameSummary {
    pub turn: u32,
    pub score: u64,
    /// Samples recorded before trimming.
    pub collected: usize,
    /// Samples left after trimming.
    pub kept: usize,
}

/// Generation rule that yields the kept samples of one game per batch.
pub struct SelfPlay<A> {
    algorithm: A,
    config: GeneratorConfig,
    games: usize,
    last: GameSummary,
}

impl<A: Algorithm> SelfPlay<A> {
    pub fn new(algorithm: A, config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        Ok(SelfPlay { algorithm, config, games: 0, last: GameSummary::default() })
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig { &self.config }

    #[inline]
    pub fn games_played(&self) -> usize { self.games }

    #[inline]
    pub fn last_game(&self) -> GameSummary { self.last }

    pub fn algorithm(&self) -> &A { &self.algorithm }

    /// Play one game to the end and return its trimmed samples.
    pub fn play_game<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<TrainingSample>, GenerateError> {
        let cfg = &self.config;
        let mut game = Game::new(cfg.engine_radius, cfg.queue_size, rng)?;
        let mut samples = Vec::new();
        while !game.is_over() {
            if cfg.max_turns.is_some_and(|cap| game.turn() >= cap) {
                break;
            }
            let options = self.algorithm.choose(game.engine(), game.queue(), cfg.significant_choices);
            let Some(&best) = options.first() else { break };
            let engine = game.engine().clone();
            let queue = game.queue().to_vec();
            if !game.add_piece(best.piece_index, best.coord, rng) {
                tracing::warn!(algorithm = self.algorithm.name(), placement = %best, "algorithm proposed an invalid placement");
                break;
            }
            if !rng.gen_bool(cfg.move_dropout) {
                samples.push(TrainingSample::new(engine, queue, options));
            }
        }
        let collected = samples.len();
        let range = cfg.kept_range(collected);
        samples.truncate(range.end);
        samples.drain(..range.start);

        let (turn, score) = game.result();
        self.games += 1;
        self.last = GameSummary { turn, score, collected, kept: samples.len() };
        tracing::debug!(
            game = self.games,
            turn,
            score,
            collected,
            kept = samples.len(),
            "game finished"
        );
        Ok(samples)
    }
}

impl<A: Algorithm> GenerationRule for SelfPlay<A> {
    type Item = TrainingSample;

    fn next_batch<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<TrainingSample>, GenerateError> {
        self.play_game(rng)
    }
}

/// Generate exactly `count` samples by self-play.
pub fn generate_training_data<A, R>(count: usize, algorithm: A, config: &GeneratorConfig, rng: &mut R) -> Result<Vec<TrainingSample>, GenerateError>
where
    A: Algorithm,
    R: Rng + ?Sized,
{
    generate_training_data_with_progress(count, algorithm, config, rng, |_| {})
}

/// Like [`generate_training_data`], reporting progress after every game.
pub fn generate_training_data_with_progress<A, R, F>(
    count: usize,
    algorithm: A,
    config: &GeneratorConfig,
    rng: &mut R,
    on_game: F,
) -> Result<Vec<TrainingSample>, GenerateError>
where
    A: Algorithm,
    R: Rng + ?Sized,
    F: FnMut(Progress),
{
    let mut rule = SelfPlay::new(algorithm, config.clone())?;
    let samples = dataset::generate_with_progress(count, &mut rule, rng, on_game)?;
    tracing::info!(
        algorithm = rule.algorithm().name(),
        games = rule.games_played(),
        samples = samples.len(),
        "generated training data"
    );
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{NrSearchRank, Placement};
    use crate::engine::HexEngine;
    use crate::piece::Piece;
    use rand::{rngs::StdRng, SeedableRng};

    fn small() -> GeneratorConfig { GeneratorConfig { engine_radius: 3, ..Default::default() } }

    #[test]
    fn returns_exact_count_of_valid_samples() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 37] {
            let samples = generate_training_data(n, NrSearchRank::new(), &small(), &mut rng).unwrap();
            assert_eq!(samples.len(), n);
            for s in &samples {
                assert!(s.is_consistent());
                assert_eq!(s.engine.radius(), 3);
                assert_eq!(s.queue.len(), 3);
                assert!(!s.options.is_empty() && s.options.len() <= 7);
            }
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = generate_training_data(15, NrSearchRank::new(), &small(), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_training_data(15, NrSearchRank::new(), &small(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trimming_applies_per_game() {
        let cfg = GeneratorConfig { remove_tail: 0.0, move_dropout: 0.0, max_turns: Some(10), ..small() };
        let mut rule = SelfPlay::new(NrSearchRank::new(), cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let samples = rule.play_game(&mut rng).unwrap();
        let last = rule.last_game();
        assert_eq!(last.collected, last.turn as usize);
        assert!(last.turn <= 10);
        assert_eq!(samples.len(), last.collected);

        let cfg = GeneratorConfig { remove_head: 0.5, remove_tail: 0.5, ..small() };
        let mut rule = SelfPlay::new(NrSearchRank::new(), cfg).unwrap();
        assert!(rule.play_game(&mut rng).unwrap().is_empty());
    }

    #[test]
    fn first_sample_is_the_empty_board() {
        let cfg = GeneratorConfig { remove_tail: 0.0, move_dropout: 0.0, ..small() };
        let mut rng = StdRng::seed_from_u64(4);
        let samples = generate_training_data(1, NrSearchRank::new(), &cfg, &mut rng).unwrap();
        assert_eq!(samples[0].engine, HexEngine::new(3).unwrap());
    }

    #[test]
    fn policy_without_moves_stalls() {
        let never = |_: &HexEngine, _: &[Piece], _: usize| -> Vec<Placement> { Vec::new() };
        let mut rng = StdRng::seed_from_u64(5);
        let err = generate_training_data(1, never, &small(), &mut rng).unwrap_err();
        assert!(matches!(err, GenerateError::Stalled { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = GeneratorConfig { queue_size: 0, ..small() };
        let mut rng = StdRng::seed_from_u64(6);
        let err = generate_training_data(1, NrSearchRank::new(), &cfg, &mut rng).unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }
}
