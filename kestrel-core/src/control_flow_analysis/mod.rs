//! Control flow analysis is the construction of one graph per function body (or per
//! initializer) from the resolved typed tree. Every construct contributes a fixed set of
//! boundary nodes, created in a single pre/post-order pass, so the position of a node in the
//! graph mirrors the position of its construct in the source.
//!
//! Code that normal execution can never reach is not removed: its nodes are built as usual and
//! flagged dead, and a dead [`CfgNodeKind::Stub`] keeps the graph connected past every point
//! where flow stops. Consumers that only care about reachable code use the `useful_*` views.
//!
//! A flow analysis pass walks the finished graph; it is not part of this module.

mod builder;
mod flow_graph;
mod verify;

pub use builder::*;
pub use flow_graph::*;
