//! Recursive tree growth over a statistics provider.

use futures::future::BoxFuture;
use futures::FutureExt;

use chess::Board;
use stats::{MoveStats, PositionStats, StatsSource};

use crate::node::RepertoireNode;
use crate::policy::{self, BuildOptions};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Root(#[from] chess::FenError),
    #[error("no statistics for the root position")]
    EmptyRoot,
    #[error("fetching root statistics failed: {0}")]
    RootFetch(String),
}

/// Grows a repertoire tree from a statistics provider.
///
/// The total game count observed at the root is the denominator for
/// every branching probability in the tree; it is computed once and
/// threaded unchanged through the recursion. A fetch or move-application
/// failure below the root prunes only that subtree; siblings already
/// built are kept and the partial tree is returned.
pub struct TreeBuilder<S> {
    source: S,
    options: BuildOptions,
}

impl<S: StatsSource> TreeBuilder<S> {
    pub fn new(source: S, options: BuildOptions) -> Self {
        Self { source, options }
    }

    /// Build the tree rooted at `root_fen`. Only the root itself can fail
    /// the build: an unparseable FEN, a provider error on the first
    /// fetch, or a position the provider has never seen.
    pub async fn build(&self, root_fen: &str) -> Result<RepertoireNode, BuildError> {
        let board = chess::parse_fen(root_fen)?;
        let position = chess::format_fen(&board);

        let stats = self
            .source
            .fetch_stats(&position, &[])
            .await
            .map_err(|err| BuildError::RootFetch(err.to_string()))?
            .ok_or(BuildError::EmptyRoot)?;
        let root_total = stats.total();
        tracing::info!(%position, root_total, "building repertoire");

        let root = RepertoireNode::root();
        Ok(self
            .grow(root, board, Vec::new(), Some(stats), root_total)
            .await)
    }

    /// Expand one node. `prefetched` carries the root's statistics so the
    /// first position is not fetched twice; every deeper call fetches for
    /// itself.
    fn grow(
        &self,
        mut node: RepertoireNode,
        board: Board,
        path: Vec<String>,
        prefetched: Option<PositionStats>,
        root_total: u64,
    ) -> BoxFuture<'_, RepertoireNode> {
        async move {
            let position = chess::format_fen(&board);
            let stats = match prefetched {
                Some(stats) => stats,
                None => match self.source.fetch_stats(&position, &path).await {
                    Ok(Some(stats)) => stats,
                    // No data: this branch of the repertoire ends here.
                    Ok(None) => return node,
                    Err(err) => {
                        tracing::warn!(%position, %err, "statistics fetch failed, pruning branch");
                        return node;
                    }
                },
            };

            let picked: Vec<&MoveStats> =
                if board.side_to_move() == self.options.principal {
                    policy::pick_principal_move(&stats.moves, self.options.principal)
                        .into_iter()
                        .collect()
                } else {
                    policy::opponent_replies(&stats.moves, root_total, &self.options)
                };

            for mv in picked {
                let child_board = match chess::apply_token(&board, &mv.token) {
                    Ok(next) => next,
                    Err(err) => {
                        tracing::warn!(%position, token = %mv.token, %err,
                            "move token not applicable, pruning branch");
                        continue;
                    }
                };
                let mut child_path = path.clone();
                child_path.push(mv.token.clone());

                let child = self
                    .grow(
                        RepertoireNode::for_move(mv),
                        child_board,
                        child_path,
                        None,
                        root_total,
                    )
                    .await;
                node.children.push(child);
            }

            node
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BuildOptions;
    use chess::Color;
    use stats::MoveStats;
    use std::collections::{HashMap, HashSet};

    #[derive(Debug, thiserror::Error)]
    #[error("injected fetch failure")]
    struct FakeError;

    /// Canned statistics keyed by FEN; positions in `failing` return an
    /// error instead.
    #[derive(Default)]
    struct FakeSource {
        stats: HashMap<String, PositionStats>,
        failing: HashSet<String>,
    }

    impl FakeSource {
        fn insert(&mut self, fen: &str, white: u64, black: u64, draws: u64, moves: Vec<MoveStats>) {
            self.stats.insert(
                fen.to_string(),
                PositionStats {
                    white,
                    black,
                    draws,
                    moves,
                },
            );
        }
    }

    impl StatsSource for FakeSource {
        type Error = FakeError;

        async fn fetch_stats(
            &self,
            position: &str,
            _path_from_root: &[String],
        ) -> Result<Option<PositionStats>, FakeError> {
            if self.failing.contains(position) {
                return Err(FakeError);
            }
            Ok(self.stats.get(position).cloned())
        }
    }

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn fen_after(fen: &str, tokens: &[&str]) -> String {
        let mut board = chess::parse_fen(fen).unwrap();
        for token in tokens {
            board = chess::apply_token(&board, token).unwrap();
        }
        chess::format_fen(&board)
    }

    fn options_for(principal: Color) -> BuildOptions {
        BuildOptions {
            principal,
            ..BuildOptions::default()
        }
    }

    #[tokio::test]
    async fn test_principal_picks_one_opponent_branches_all() {
        let mut source = FakeSource::default();
        // White to move at the root: e2e4 has the better rate despite
        // fewer games, so it must be the single child.
        source.insert(
            STARTPOS,
            100,
            50,
            50,
            vec![
                MoveStats::new("d2d4", 40, 50, 30),
                MoveStats::new("e2e4", 50, 15, 15),
            ],
        );
        // Black to move after e4: both common replies branch, the rare
        // one does not.
        source.insert(
            &fen_after(STARTPOS, &["e2e4"]),
            0,
            0,
            0,
            vec![
                MoveStats::new("c7c5", 30, 30, 20),
                MoveStats::new("e7e5", 20, 20, 10),
                MoveStats::new("a7a6", 1, 1, 0),
            ],
        );

        let builder = TreeBuilder::new(source, options_for(Color::White));
        let tree = builder.build(STARTPOS).await.unwrap();

        assert_eq!(tree.children.len(), 1);
        let e4 = &tree.children[0];
        assert_eq!(e4.token, "e2e4");
        assert_eq!((e4.white, e4.black, e4.draws), (50, 15, 15));

        let replies: Vec<&str> = e4.children.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(replies, vec!["c7c5", "e7e5"]);
        // No statistics beyond ply 2: every reply is a leaf.
        assert!(e4.children.iter().all(RepertoireNode::is_leaf));
    }

    #[tokio::test]
    async fn test_probability_denominator_stays_at_root_total() {
        let mut source = FakeSource::default();
        // Root sees 100 games.
        source.insert(
            STARTPOS,
            50,
            30,
            20,
            vec![MoveStats::new("e2e4", 50, 30, 20)],
        );
        // The position after e4 claims a vastly larger total. A reply
        // with 600 games passes 600/100 against the root denominator but
        // would fail 600/1_000_000 against a per-node recomputation.
        source.insert(
            &fen_after(STARTPOS, &["e2e4"]),
            500_000,
            400_000,
            100_000,
            vec![MoveStats::new("c7c5", 200, 200, 200)],
        );

        let builder = TreeBuilder::new(source, options_for(Color::White));
        let tree = builder.build(STARTPOS).await.unwrap();

        let e4 = &tree.children[0];
        assert_eq!(e4.children.len(), 1, "deeper totals must not shrink branching");
        assert_eq!(e4.children[0].token, "c7c5");
    }

    #[tokio::test]
    async fn test_fetch_failure_prunes_only_that_subtree() {
        // Black to move at the root while building for White: two replies
        // branch; fetching below one of them fails.
        let root = "rnbqkbnr/ppp2ppp/4p3/3p4/3PP3/2N5/PPP2PPP/R1BQKBNR b KQkq - 1 3";
        let mut source = FakeSource::default();
        source.insert(
            root,
            400,
            300,
            300,
            vec![
                MoveStats::new("d5e4", 100, 80, 60),
                MoveStats::new("g8f6", 90, 70, 40),
            ],
        );
        source.failing.insert(fen_after(root, &["d5e4"]));
        source.insert(
            &fen_after(root, &["g8f6"]),
            0,
            0,
            0,
            vec![MoveStats::new("e4e5", 120, 50, 30)],
        );

        let builder = TreeBuilder::new(source, options_for(Color::White));
        let tree = builder.build(root).await.unwrap();

        let tokens: Vec<&str> = tree.children.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(tokens, vec!["d5e4", "g8f6"]);
        // The failing branch is kept as a leaf; its sibling still grew.
        assert!(tree.children[0].is_leaf());
        assert_eq!(tree.children[1].children.len(), 1);
        assert_eq!(tree.children[1].children[0].token, "e4e5");
    }

    #[tokio::test]
    async fn test_unplayable_token_is_dropped() {
        let root = "rnbqkbnr/ppp2ppp/4p3/3p4/3PP3/2N5/PPP2PPP/R1BQKBNR b KQkq - 1 3";
        let mut source = FakeSource::default();
        source.insert(
            root,
            100,
            50,
            50,
            vec![
                // Illegal in this position.
                MoveStats::new("e2e4", 50, 30, 20),
                MoveStats::new("g8f6", 40, 30, 20),
            ],
        );

        let builder = TreeBuilder::new(source, options_for(Color::White));
        let tree = builder.build(root).await.unwrap();

        let tokens: Vec<&str> = tree.children.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(tokens, vec!["g8f6"]);
    }

    #[tokio::test]
    async fn test_unknown_root_position_is_an_error() {
        let builder = TreeBuilder::new(FakeSource::default(), options_for(Color::White));
        assert!(matches!(
            builder.build(STARTPOS).await,
            Err(BuildError::EmptyRoot)
        ));
    }

    #[tokio::test]
    async fn test_failing_root_fetch_is_an_error() {
        let mut source = FakeSource::default();
        source.failing.insert(STARTPOS.to_string());
        let builder = TreeBuilder::new(source, options_for(Color::White));
        assert!(matches!(
            builder.build(STARTPOS).await,
            Err(BuildError::RootFetch(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_root_fen_is_an_error() {
        let builder = TreeBuilder::new(FakeSource::default(), options_for(Color::White));
        assert!(matches!(
            builder.build("garbage").await,
            Err(BuildError::Root(_))
        ));
    }
}
