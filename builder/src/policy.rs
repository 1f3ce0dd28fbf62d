//! Pure move-selection policy.
//!
//! No I/O here: both selectors take a slice of per-move counters and the
//! fixed root-game denominator, so they can be exercised against canned
//! statistics.

use chess::Color;
use stats::MoveStats;

/// Opponent replies must account for strictly more than this share of
/// the games seen from the root position.
pub const DEFAULT_PROBABILITY_FLOOR: f64 = 0.001;
/// And for strictly more than this many games outright, to suppress
/// noise from tiny samples.
pub const DEFAULT_MIN_GAMES: u64 = 5;
/// The principal side's move is drawn from at most this many of the
/// most-played successors.
const PRINCIPAL_POOL: usize = 3;

/// Knobs for one build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// The side the repertoire is optimized for.
    pub principal: Color,
    pub probability_floor: f64,
    pub min_games: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            principal: Color::White,
            probability_floor: DEFAULT_PROBABILITY_FLOOR,
            min_games: DEFAULT_MIN_GAMES,
        }
    }
}

/// Select the principal side's move: rank successors by games played
/// (descending, stable), keep the top three, and take the first of those
/// with the maximal favorable-outcome rate. A zero-game move rates 0.
pub fn pick_principal_move(moves: &[MoveStats], principal: Color) -> Option<&MoveStats> {
    let mut ranked: Vec<&MoveStats> = moves.iter().collect();
    ranked.sort_by(|a, b| b.total().cmp(&a.total()));
    ranked.truncate(PRINCIPAL_POOL);

    let mut best: Option<(&MoveStats, f64)> = None;
    for mv in ranked {
        let rate = mv.rate_for(principal);
        match best {
            // Ties keep the earlier (more played) candidate.
            Some((_, best_rate)) if rate <= best_rate => {}
            _ => best = Some((mv, rate)),
        }
    }
    best.map(|(mv, _)| mv)
}

/// Enumerate the opponent replies worth answering: every successor whose
/// share of the root game count strictly exceeds the probability floor
/// and that clears the absolute noise floor. Inclusive branching, not
/// top-K.
pub fn opponent_replies<'a>(
    moves: &'a [MoveStats],
    root_total: u64,
    options: &BuildOptions,
) -> Vec<&'a MoveStats> {
    if root_total == 0 {
        return Vec::new();
    }
    moves
        .iter()
        .filter(|mv| mv.total() > options.min_games)
        .filter(|mv| mv.total() as f64 / root_total as f64 > options.probability_floor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(token: &str, white: u64, black: u64, draws: u64) -> MoveStats {
        MoveStats::new(token, white, black, draws)
    }

    #[test]
    fn test_principal_prefers_win_rate_over_popularity() {
        // Most played has the worse rate; the runner-up must win.
        let moves = vec![
            mv("d2d4", 40, 50, 30), // 120 games, 33% for white
            mv("e2e4", 50, 15, 15), // 80 games, 62.5% for white
        ];
        let picked = pick_principal_move(&moves, Color::White).unwrap();
        assert_eq!(picked.token, "e2e4");
    }

    #[test]
    fn test_principal_pool_is_top_three_by_volume() {
        // The best-scoring move is only fourth by volume and must not be
        // considered.
        let moves = vec![
            mv("a", 10, 80, 10),
            mv("b", 20, 60, 10),
            mv("c", 30, 30, 20),
            mv("d", 7, 0, 0),
        ];
        let picked = pick_principal_move(&moves, Color::White).unwrap();
        assert_eq!(picked.token, "c");
    }

    #[test]
    fn test_principal_tie_keeps_more_played_candidate() {
        // Identical rates; the first in ranked (volume) order sticks.
        let moves = vec![mv("less", 10, 10, 0), mv("more", 20, 20, 0)];
        let picked = pick_principal_move(&moves, Color::White).unwrap();
        assert_eq!(picked.token, "more");
    }

    #[test]
    fn test_principal_for_black_uses_black_wins() {
        let moves = vec![mv("g8f6", 50, 10, 20), mv("c7c5", 20, 45, 15)];
        let picked = pick_principal_move(&moves, Color::Black).unwrap();
        assert_eq!(picked.token, "c7c5");
    }

    #[test]
    fn test_principal_zero_game_moves_rate_zero() {
        let moves = vec![mv("a", 0, 0, 0), mv("b", 1, 99, 0)];
        let picked = pick_principal_move(&moves, Color::White).unwrap();
        assert_eq!(picked.token, "b");
    }

    #[test]
    fn test_principal_empty_moves_yields_none() {
        assert!(pick_principal_move(&[], Color::White).is_none());
    }

    #[test]
    fn test_opponent_threshold_is_strict() {
        let options = BuildOptions {
            min_games: 0,
            ..BuildOptions::default()
        };
        // With 10_000 root games and the 0.001 floor, 10 games is exactly
        // the boundary and must be excluded; 11 passes.
        let moves = vec![mv("at", 5, 5, 0), mv("above", 5, 5, 1)];
        let replies = opponent_replies(&moves, 10_000, &options);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].token, "above");
    }

    #[test]
    fn test_opponent_noise_floor_on_absolute_counts() {
        let options = BuildOptions::default();
        // 5 games clears the probability floor against 100 root games
        // but not the absolute floor; 6 clears both.
        let moves = vec![mv("thin", 3, 2, 0), mv("solid", 3, 2, 1)];
        let replies = opponent_replies(&moves, 100, &options);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].token, "solid");
    }

    #[test]
    fn test_opponent_branching_is_inclusive_not_top_k() {
        let options = BuildOptions::default();
        let moves: Vec<MoveStats> = (0..8).map(|i| mv(&format!("m{i}"), 10, 10, 0)).collect();
        let replies = opponent_replies(&moves, 1_000, &options);
        assert_eq!(replies.len(), 8);
    }

    #[test]
    fn test_opponent_zero_root_total_branches_nowhere() {
        let options = BuildOptions::default();
        let moves = vec![mv("a", 10, 10, 0)];
        assert!(opponent_replies(&moves, 0, &options).is_empty());
    }
}
