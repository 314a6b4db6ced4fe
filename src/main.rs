use happyhex_data::algorithm::{Algorithm, NrSearchRank};
use happyhex_data::config::GeneratorConfig;
use happyhex_data::game::Game;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = GeneratorConfig::default();
    let mut algorithm = NrSearchRank::new();
    let mut rng = rand::thread_rng();
    let mut game = Game::new(cfg.engine_radius, cfg.queue_size, &mut rng)?;
    println!("{}", game.engine().render());
    let mut candidates: u64 = 0;
    let mut peak_candidates: usize = 0;
    while !game.is_over() {
        let options = algorithm.choose(game.engine(), game.queue(), cfg.significant_choices);
        let Some(best) = options.first() else { break };
        let piece = game.queue()[best.piece_index];
        if !game.add_piece(best.piece_index, best.coord, &mut rng) {
            break;
        }
        println!("turn {} | piece {} at {} | score {}", game.turn(), piece, best.coord, game.score());
        println!("{}", game.engine().render());
        let stats = algorithm.last_stats();
        candidates = candidates.saturating_add(stats.candidates as u64);
        peak_candidates = peak_candidates.max(stats.candidates);
    }
    let (turn, score) = game.result();
    println!(
        "Turns: {}, Score: {}, Placements considered: {}, Max placements for a turn: {}",
        turn, score, candidates, peak_candidates
    );
    Ok(())
}
