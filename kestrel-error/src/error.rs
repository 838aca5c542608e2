use kestrel_types::ElementId;
use std::fmt;
use thiserror::Error;

/// The coarse classes of failure a compilation unit can run into.
///
/// None of them are recoverable within the unit: the caller receives the error and abandons
/// the unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A graph or declaration tree broke one of its own structural invariants.
    Structural,
    /// A declaration could not be placed within any known top-level container.
    UnresolvedIdentity,
    /// The input contained a construct no rule covers.
    UnsupportedInput,
    /// The wire records could not be encoded or decoded.
    Encoding,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Structural => "structural invariant violation",
            ErrorCategory::UnresolvedIdentity => "unresolvable identity",
            ErrorCategory::UnsupportedInput => "unsupported input shape",
            ErrorCategory::Encoding => "encoding failure",
        })
    }
}

/// Internal compiler faults raised by the middle-end.
///
/// These describe programming errors in the resolved input rather than mistakes in user code,
/// so they are phrased for compiler developers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompileError {
    #[error(
        "Node \"{enter}\" at level {enter_level} is closed by \"{exit}\" at level {exit_level}."
    )]
    MismatchedLevel {
        enter: String,
        exit: String,
        enter_level: u32,
        exit_level: u32,
    },
    #[error("Graph \"{graph}\" has exit node \"{exit}\" without a matching enter node.")]
    MissingEnterNode { graph: String, exit: String },
    #[error("Graph \"{graph}\" has enter node \"{enter}\" without a matching exit node.")]
    MissingExitNode { graph: String, enter: String },
    #[error("Node \"{node}\" in graph \"{graph}\" is alive but has no predecessors.")]
    DanglingNode { graph: String, node: String },
    #[error("The enter node of graph \"{graph}\" has predecessors.")]
    EnterHasPredecessors { graph: String },
    #[error("The exit node of graph \"{graph}\" has successors.")]
    ExitHasSuccessors { graph: String },
    #[error("Node \"{node}\" is stored in graph \"{graph}\" but owned by another graph.")]
    ForeignNode { graph: String, node: String },
    #[error("Accessor \"{accessor}\" claims property \"{property}\", which does not own it.")]
    UnmatchedAccessor { property: String, accessor: String },
    #[error("Unable to find the top-level container of declaration \"{declaration}\".")]
    UnresolvedTopLevelContainer { declaration: String },
    #[error(
        "Declaration \"{declaration}\" comes from a compiled library but has no implementation \
         class mapping."
    )]
    MissingImplementationClass { declaration: String },
    #[error("Declarations of kind {kind} cannot be mirrored (found \"{declaration}\").")]
    UnsupportedMirrorKind {
        kind: &'static str,
        declaration: String,
    },
    #[error("Element {element} of kind {kind} has no type rule.")]
    UnsupportedElementKind {
        kind: &'static str,
        element: ElementId,
    },
    #[error("The else branch at element {element} is followed by other branches.")]
    MisplacedElseBranch { element: ElementId },
    #[error("\"{kind}\" at element {element} is not inside any loop.")]
    JumpOutsideOfLoop {
        kind: &'static str,
        element: ElementId,
    },
    #[error("Unable to encode or decode a serialized unit: {0}")]
    Encoding(String),
}

impl CompileError {
    pub fn category(&self) -> ErrorCategory {
        use CompileError::*;
        match self {
            MismatchedLevel { .. }
            | MissingEnterNode { .. }
            | MissingExitNode { .. }
            | DanglingNode { .. }
            | EnterHasPredecessors { .. }
            | ExitHasSuccessors { .. }
            | ForeignNode { .. }
            | UnmatchedAccessor { .. }
            | JumpOutsideOfLoop { .. } => ErrorCategory::Structural,
            UnresolvedTopLevelContainer { .. } | MissingImplementationClass { .. } => {
                ErrorCategory::UnresolvedIdentity
            }
            UnsupportedMirrorKind { .. }
            | UnsupportedElementKind { .. }
            | MisplacedElseBranch { .. } => ErrorCategory::UnsupportedInput,
            Encoding(_) => ErrorCategory::Encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let err = CompileError::MissingImplementationClass {
            declaration: "a.b.f".into(),
        };
        assert_eq!(err.category(), ErrorCategory::UnresolvedIdentity);
        assert_eq!(
            err.to_string(),
            "Declaration \"a.b.f\" comes from a compiled library but has no implementation \
             class mapping."
        );
        assert_eq!(
            CompileError::Encoding("eof".into()).category(),
            ErrorCategory::Encoding
        );
    }
}
