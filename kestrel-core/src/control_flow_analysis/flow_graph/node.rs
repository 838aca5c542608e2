use std::fmt;

use kestrel_types::{constants::STUB_ELEMENT_NAME, ElementId};

use crate::language::JumpKind;

use super::GraphId;

/// One outcome of a `when` branch condition: the branch is taken when the condition element
/// evaluates to `expected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BranchCondition {
    pub element: ElementId,
    pub expected: bool,
}

/// The construct boundary a [`CfgNode`] stands for.
///
/// Each variant carries only the data specific to its construct.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
pub enum CfgNodeKind {
    FunctionEnter,
    FunctionExit,
    InitializerEnter,
    InitializerExit,

    BlockEnter,
    BlockExit,

    WhenEnter,
    WhenExit,
    WhenBranchConditionEnter,
    WhenBranchConditionExit {
        on_true: BranchCondition,
        on_false: BranchCondition,
    },
    WhenBranchResultEnter,
    WhenBranchResultExit,
    /// Flow out of a `when` none of whose branches matched.
    WhenSyntheticElseBranch,

    LoopEnter,
    LoopConditionEnter,
    LoopConditionExit,
    LoopBlockEnter,
    LoopBlockExit,
    LoopExit,

    TryExpressionEnter,
    TryMainBlockEnter,
    TryMainBlockExit,
    CatchClauseEnter,
    CatchClauseExit,
    FinallyProxyEnter,
    FinallyBlockEnter,
    FinallyBlockExit,
    FinallyProxyExit,
    TryExpressionExit,

    BinaryAndEnter,
    BinaryAndExitLeftOperand,
    BinaryAndEnterRightOperand,
    BinaryAndExit,
    BinaryOrEnter,
    BinaryOrExitLeftOperand,
    BinaryOrEnterRightOperand,
    BinaryOrExit,

    TypeOperatorCall,
    QualifiedAccess,
    FunctionCall {
        returns_nothing: bool,
    },
    Jump {
        kind: JumpKind,
    },
    Throw,
    VariableDeclaration,
    VariableAssignment,
    Const,
    Stub,
}

impl CfgNodeKind {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// `Some(returns_nothing)` for the call- and throw-like kinds, `None` for every other kind.
    pub fn returns_nothing(&self) -> Option<bool> {
        match self {
            CfgNodeKind::FunctionCall { returns_nothing } => Some(*returns_nothing),
            CfgNodeKind::Throw => Some(true),
            _ => None,
        }
    }

    /// True if normal flow never continues past this node.
    pub(crate) fn terminates_flow(&self) -> bool {
        matches!(self, CfgNodeKind::Jump { .. }) || self.returns_nothing() == Some(true)
    }

    pub fn is_enter(&self) -> bool {
        self.exit_counterpart_matches(&CfgNodeKind::Stub).is_some()
    }

    pub fn is_exit(&self) -> bool {
        use CfgNodeKind::*;
        matches!(
            self,
            FunctionExit
                | InitializerExit
                | BlockExit
                | WhenExit
                | WhenBranchConditionExit { .. }
                | WhenBranchResultExit
                | LoopConditionExit
                | LoopBlockExit
                | LoopExit
                | TryMainBlockExit
                | CatchClauseExit
                | FinallyProxyExit
                | FinallyBlockExit
                | TryExpressionExit
                | BinaryAndExit
                | BinaryOrExit
        )
    }

    /// True if `exit` is the kind of node that closes a construct opened by `self`.
    pub fn matches_exit(&self, exit: &CfgNodeKind) -> bool {
        self.exit_counterpart_matches(exit) == Some(true)
    }

    // `None` if `self` is not an enter kind at all.
    fn exit_counterpart_matches(&self, exit: &CfgNodeKind) -> Option<bool> {
        use CfgNodeKind::*;
        let matches = match self {
            FunctionEnter => matches!(exit, FunctionExit),
            InitializerEnter => matches!(exit, InitializerExit),
            BlockEnter => matches!(exit, BlockExit),
            WhenEnter => matches!(exit, WhenExit),
            WhenBranchConditionEnter => matches!(exit, WhenBranchConditionExit { .. }),
            WhenBranchResultEnter => matches!(exit, WhenBranchResultExit),
            LoopEnter => matches!(exit, LoopExit),
            LoopConditionEnter => matches!(exit, LoopConditionExit),
            LoopBlockEnter => matches!(exit, LoopBlockExit),
            TryExpressionEnter => matches!(exit, TryExpressionExit),
            TryMainBlockEnter => matches!(exit, TryMainBlockExit),
            CatchClauseEnter => matches!(exit, CatchClauseExit),
            FinallyProxyEnter => matches!(exit, FinallyProxyExit),
            FinallyBlockEnter => matches!(exit, FinallyBlockExit),
            BinaryAndEnter => matches!(exit, BinaryAndExit),
            BinaryOrEnter => matches!(exit, BinaryOrExit),
            _ => return None,
        };
        Some(matches)
    }
}

/// A node of a [`ControlFlowGraph`](super::ControlFlowGraph).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CfgNode {
    /// The graph this node was created in.
    pub owner: GraphId,
    /// Nesting depth. An enter node and its exit node always share a level.
    pub level: u32,
    /// Set for code that normal flow cannot reach. Dead nodes stay in the graph.
    pub is_dead: bool,
    /// The element this node represents; [`ElementId::SYNTHETIC`] for stubs.
    pub element: ElementId,
    pub kind: CfgNodeKind,
}

impl CfgNode {
    pub fn returns_nothing(&self) -> Option<bool> {
        self.kind.returns_nothing()
    }
}

impl fmt::Display for CfgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.element.is_synthetic() {
            write!(f, "{} {}", self.kind.name(), STUB_ELEMENT_NAME)?;
        } else {
            write!(f, "{} {}", self.kind.name(), self.element)?;
        }
        if self.is_dead {
            f.write_str(" (dead)")?;
        }
        Ok(())
    }
}
