//! Node storage shared by the tree and the list. Crate-private.

pub mod node_arena;

pub(crate) use node_arena::{NodeArena, NodeId};
