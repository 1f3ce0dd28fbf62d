//! Wire model of the explorer statistics endpoint.

use serde::Deserialize;

use stats::{MoveStats, PositionStats};

/// Response for one position: aggregate counters plus one entry per
/// successor move. Unknown positions come back with zero counters and an
/// empty move list rather than an error status.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub white: u64,
    #[serde(default)]
    pub draws: u64,
    #[serde(default)]
    pub black: u64,
    #[serde(default)]
    pub moves: Vec<ExplorerMove>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerMove {
    pub uci: String,
    #[serde(default)]
    pub white: u64,
    #[serde(default)]
    pub draws: u64,
    #[serde(default)]
    pub black: u64,
}

impl From<ExplorerResponse> for PositionStats {
    fn from(response: ExplorerResponse) -> Self {
        PositionStats {
            white: response.white,
            black: response.black,
            draws: response.draws,
            moves: response
                .moves
                .into_iter()
                .map(|mv| MoveStats::new(mv.uci, mv.white, mv.black, mv.draws))
                .collect(),
        }
    }
}
