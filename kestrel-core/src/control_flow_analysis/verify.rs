//! Structural checks for a finished [`ControlFlowGraph`].
//!
//! A graph that fails one of these checks was built from a malformed tree. That is a bug in
//! whatever produced the tree, so every failure is reported as an internal fault.

use kestrel_error::CompileError;
use petgraph::prelude::NodeIndex;
use rustc_hash::FxHashSet;

use super::ControlFlowGraph;

impl ControlFlowGraph {
    /// Verify that this graph is well formed.
    pub fn verify(&self) -> Result<(), CompileError> {
        self.verify_terminals()?;
        self.verify_nodes()?;
        self.verify_boundaries()?;
        Ok(())
    }

    fn verify_terminals(&self) -> Result<(), CompileError> {
        if !self.previous_nodes(self.enter_node).is_empty() {
            return Err(CompileError::EnterHasPredecessors {
                graph: self.name.clone(),
            });
        }
        if !self.following_nodes(self.exit_node).is_empty() {
            return Err(CompileError::ExitHasSuccessors {
                graph: self.name.clone(),
            });
        }
        Ok(())
    }

    fn verify_nodes(&self) -> Result<(), CompileError> {
        for (index, node) in self.nodes() {
            if node.owner != self.id {
                return Err(CompileError::ForeignNode {
                    graph: self.name.clone(),
                    node: self.describe(index),
                });
            }
            if index != self.enter_node && !node.is_dead && self.previous_nodes(index).is_empty()
            {
                return Err(CompileError::DanglingNode {
                    graph: self.name.clone(),
                    node: self.describe(index),
                });
            }
        }
        Ok(())
    }

    fn verify_boundaries(&self) -> Result<(), CompileError> {
        let mut paired_enters = FxHashSet::default();
        let mut paired_exits = FxHashSet::default();
        for (enter, exit) in self.boundaries.iter().copied() {
            let enter_node = self.node(enter);
            let exit_node = self.node(exit);
            if !enter_node.kind.matches_exit(&exit_node.kind) {
                return Err(CompileError::MissingExitNode {
                    graph: self.name.clone(),
                    enter: self.describe(enter),
                });
            }
            if enter_node.level != exit_node.level {
                return Err(CompileError::MismatchedLevel {
                    enter: self.describe(enter),
                    exit: self.describe(exit),
                    enter_level: enter_node.level,
                    exit_level: exit_node.level,
                });
            }
            // Consumers locate exits by level alone, so the recorded pairing must agree.
            if self.matching_exit(enter) != Some(exit) {
                return Err(CompileError::MissingExitNode {
                    graph: self.name.clone(),
                    enter: self.describe(enter),
                });
            }
            paired_enters.insert(enter);
            paired_exits.insert(exit);
        }

        for (index, node) in self.nodes() {
            if node.kind.is_enter() && !paired_enters.contains(&index) {
                return Err(CompileError::MissingExitNode {
                    graph: self.name.clone(),
                    enter: self.describe(index),
                });
            }
            if node.kind.is_exit() && !paired_exits.contains(&index) {
                return Err(CompileError::MissingEnterNode {
                    graph: self.name.clone(),
                    exit: self.describe(index),
                });
            }
        }
        Ok(())
    }

    fn describe(&self, index: NodeIndex) -> String {
        format!("#{} {}", index.index(), self.node(index))
    }
}
