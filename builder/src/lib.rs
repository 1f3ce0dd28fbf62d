//! Repertoire tree construction.
//!
//! Grows a tree of positions reachable under "best for us, plausible for
//! them" play: the principal side's move is chosen deterministically from
//! the statistics, every sufficiently common opponent reply becomes a
//! branch. The selection policy is pure ([`policy`]); all I/O goes
//! through the injected [`stats::StatsSource`], and a failing fetch
//! prunes only the branch it happened on.

mod build;
mod node;
mod policy;
mod serialize;

pub use build::{BuildError, TreeBuilder};
pub use node::RepertoireNode;
pub use policy::{opponent_replies, pick_principal_move, BuildOptions};
pub use serialize::write_leaf_lines;
