//! This is the flow graph, a graph which contains edges that represent possible steps of program
//! execution.

use std::fmt;

use itertools::Itertools;
use petgraph::{prelude::NodeIndex, visit::EdgeRef, Direction};

mod node;

pub use node::{BranchCondition, CfgNode, CfgNodeKind};

/// Identity of one graph, used as the non-owning back-reference from a node to its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(pub(crate) u32);

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cfg{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphKind {
    Function,
    /// The initializer expression of a property or variable.
    Initializer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlFlowGraphEdge {
    /// Ordinary forward flow, including jumps.
    Forward,
    /// Flow from the end of a loop iteration back to its start.
    Back,
    /// Flow leaving a construct because an exception was raised.
    Exceptional,
    /// An edge out of code that never completes normally, or between dead nodes.
    Dead,
}

impl fmt::Display for ControlFlowGraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlFlowGraphEdge::Forward => "",
            ControlFlowGraphEdge::Back => "back",
            ControlFlowGraphEdge::Exceptional => "exceptional",
            ControlFlowGraphEdge::Dead => "dead",
        })
    }
}

pub type Graph = petgraph::Graph<CfgNode, ControlFlowGraphEdge>;

/// The control-flow graph of one function body or initializer.
///
/// Nodes are created in a single pre/post-order pass over the tree, so node indices follow
/// the textual order of the constructs they stand for. The graph is a multigraph: the same
/// pair of nodes may be linked by more than one edge.
#[derive(Clone, Debug)]
pub struct ControlFlowGraph {
    pub(crate) id: GraphId,
    pub(crate) name: String,
    pub(crate) kind: GraphKind,
    pub(crate) graph: Graph,
    pub(crate) enter_node: NodeIndex,
    pub(crate) exit_node: NodeIndex,
    // Every enter node paired with the exit node closing it, in creation order of the enters.
    pub(crate) boundaries: Vec<(NodeIndex, NodeIndex)>,
}

impl ControlFlowGraph {
    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn enter_node(&self) -> NodeIndex {
        self.enter_node
    }

    pub fn exit_node(&self) -> NodeIndex {
        self.exit_node
    }

    pub fn node(&self, index: NodeIndex) -> &CfgNode {
        &self.graph[index]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &CfgNode)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    pub fn dead_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |index| self.graph[*index].is_dead)
    }

    pub fn boundaries(&self) -> &[(NodeIndex, NodeIndex)] {
        &self.boundaries
    }

    /// Marks a node unreachable. This is the only mutation allowed once a graph is built.
    pub fn mark_dead(&mut self, index: NodeIndex) {
        self.graph[index].is_dead = true;
    }

    /// Outgoing edges in the order they were added.
    pub fn outgoing_edges(&self, index: NodeIndex) -> Vec<(NodeIndex, ControlFlowGraphEdge)> {
        self.edges(index, Direction::Outgoing)
    }

    /// Incoming edges in the order they were added.
    pub fn incoming_edges(&self, index: NodeIndex) -> Vec<(NodeIndex, ControlFlowGraphEdge)> {
        self.edges(index, Direction::Incoming)
    }

    fn edges(
        &self,
        index: NodeIndex,
        direction: Direction,
    ) -> Vec<(NodeIndex, ControlFlowGraphEdge)> {
        // petgraph walks its adjacency lists newest first.
        self.graph
            .edges_directed(index, direction)
            .sorted_by_key(|edge| edge.id())
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (other, *edge.weight())
            })
            .collect()
    }

    pub fn following_nodes(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.outgoing_edges(index)
            .into_iter()
            .map(|(node, _)| node)
            .collect()
    }

    pub fn previous_nodes(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.incoming_edges(index)
            .into_iter()
            .map(|(node, _)| node)
            .collect()
    }

    /// Following nodes as seen by flow analysis.
    ///
    /// Alive code never observably flows into dead code, so dead followers are dropped. Dead
    /// code keeps its whole internal structure for diagnostics.
    pub fn useful_following_nodes(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.useful(index, self.following_nodes(index))
    }

    pub fn useful_previous_nodes(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.useful(index, self.previous_nodes(index))
    }

    fn useful(&self, index: NodeIndex, neighbours: Vec<NodeIndex>) -> Vec<NodeIndex> {
        if self.graph[index].is_dead {
            return neighbours;
        }
        neighbours
            .into_iter()
            .filter(|neighbour| !self.graph[*neighbour].is_dead)
            .collect()
    }

    /// Finds the exit node closing the construct opened by `enter` without using the recorded
    /// boundaries: it is the first later node on the same level whose kind closes `enter`'s kind.
    pub fn matching_exit(&self, enter: NodeIndex) -> Option<NodeIndex> {
        let enter_node = &self.graph[enter];
        self.graph
            .node_indices()
            .skip(enter.index() + 1)
            .find(|candidate| {
                let candidate = &self.graph[*candidate];
                candidate.level == enter_node.level
                    && enter_node.kind.matches_exit(&candidate.kind)
            })
    }

    /// Returns the nodes standing for `element`, in creation order.
    pub fn nodes_for_element(&self, element: kestrel_types::ElementId) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|index| self.graph[*index].element == element)
            .collect()
    }

    /// Prints out GraphViz DOT format for this graph.
    pub fn visualize(&self) {
        use petgraph::dot::Dot;
        tracing::info!(graph = %self.name, "{}", Dot::new(&self.graph));
    }
}
