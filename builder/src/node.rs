//! Repertoire tree nodes.

use stats::MoveStats;

/// One node of a built repertoire: the move token that reached it, a
/// snapshot of the counters for games through that move, and the
/// continuations kept under it.
///
/// Children are owned by their parent; the tree is built top-down and a
/// subtree is never touched again once attached, so plain containment is
/// all the lifetime management needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepertoireNode {
    /// Empty only at the root.
    pub token: String,
    pub white: u64,
    pub black: u64,
    pub draws: u64,
    pub children: Vec<RepertoireNode>,
}

impl RepertoireNode {
    /// The tree root: no move, no counters.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn for_move(mv: &MoveStats) -> Self {
        Self {
            token: mv.token.clone(),
            white: mv.white,
            black: mv.black,
            draws: mv.draws,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(RepertoireNode::size).sum::<usize>()
    }
}
