//! Construction of [`ControlFlowGraph`]s from the typed tree.
//!
//! The builder walks a function body once. Each `connect_*` method receives the current
//! *leaves* (the nodes flow arrives from) and returns the leaves flow continues from.

use kestrel_error::CompileError;
use kestrel_types::ElementId;
use petgraph::prelude::NodeIndex;

use crate::{
    language::ty::{self, JumpKind, TyExpressionVariant},
    BuildConfig,
};

use super::{
    BranchCondition, CfgNode, CfgNodeKind, ControlFlowGraph, ControlFlowGraphEdge, Graph, GraphId,
    GraphKind,
};

/// Hands out graphs with distinct [`GraphId`]s for one compilation unit.
#[derive(Debug, Default)]
pub struct ControlFlowGraphBuilder {
    config: BuildConfig,
    next_graph_id: u32,
}

impl ControlFlowGraphBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            next_graph_id: 0,
        }
    }

    pub fn build_function(
        &mut self,
        function: &ty::TyFunctionDeclaration,
    ) -> Result<ControlFlowGraph, CompileError> {
        let mut builder = GraphBuilder::new(self.fresh_id());
        let enter = builder.add_node(CfgNodeKind::FunctionEnter, function.id, 0, &[]);
        let leaves = builder.connect_code_block(&function.body, &[enter], 1)?;

        let mut incoming = flows(&leaves, Flow::Normal);
        incoming.append(&mut builder.pending_exit);
        let exit = builder.add_node(CfgNodeKind::FunctionExit, function.id, 0, &incoming);
        builder.close(enter, exit);

        self.finish(
            builder,
            function.name.as_str().to_string(),
            GraphKind::Function,
            enter,
            exit,
        )
    }

    /// Builds the graph of a variable or property initializer.
    ///
    /// A declaration without initializer yields a graph made of its enter and exit nodes.
    pub fn build_initializer(
        &mut self,
        declaration: &ty::TyVariableDeclaration,
    ) -> Result<ControlFlowGraph, CompileError> {
        let mut builder = GraphBuilder::new(self.fresh_id());
        let enter = builder.add_node(CfgNodeKind::InitializerEnter, declaration.id, 0, &[]);
        let leaves = match &declaration.initializer {
            Some(initializer) => builder.connect_expression(initializer, &[enter], 1)?,
            None => vec![enter],
        };

        let mut incoming = flows(&leaves, Flow::Normal);
        incoming.append(&mut builder.pending_exit);
        let exit = builder.add_node(CfgNodeKind::InitializerExit, declaration.id, 0, &incoming);
        builder.close(enter, exit);

        self.finish(
            builder,
            declaration.name.as_str().to_string(),
            GraphKind::Initializer,
            enter,
            exit,
        )
    }

    fn fresh_id(&mut self) -> GraphId {
        let id = GraphId(self.next_graph_id);
        self.next_graph_id += 1;
        id
    }

    fn finish(
        &self,
        builder: GraphBuilder,
        name: String,
        kind: GraphKind,
        enter_node: NodeIndex,
        exit_node: NodeIndex,
    ) -> Result<ControlFlowGraph, CompileError> {
        let GraphBuilder {
            id,
            graph,
            mut boundaries,
            ..
        } = builder;
        boundaries.sort_by_key(|(enter, _)| *enter);

        let cfg = ControlFlowGraph {
            id,
            name,
            kind,
            graph,
            enter_node,
            exit_node,
            boundaries,
        };
        tracing::debug!(
            graph = %cfg.name,
            id = %cfg.id,
            nodes = cfg.node_count(),
            dead = cfg.dead_nodes().count(),
            "built control flow graph"
        );
        if self.config.print_cfg {
            cfg.visualize();
        }
        if self.config.verify_graphs {
            cfg.verify()?;
        }
        Ok(cfg)
    }
}

/// How flow reaches a node along one incoming edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    /// Falling through from the previous construct.
    Normal,
    /// Falling through to the start of the next loop iteration.
    Back,
    /// A `return` or `break` reaching its target.
    Jump,
    /// A `continue` reaching its loop condition.
    JumpBack,
    Exceptional,
}

impl Flow {
    fn edge(self) -> ControlFlowGraphEdge {
        match self {
            Flow::Normal | Flow::Jump => ControlFlowGraphEdge::Forward,
            Flow::Back | Flow::JumpBack => ControlFlowGraphEdge::Back,
            Flow::Exceptional => ControlFlowGraphEdge::Exceptional,
        }
    }

    /// Whether this flow starts from the node that stops normal execution.
    fn leaves_terminator(self) -> bool {
        matches!(self, Flow::Jump | Flow::JumpBack | Flow::Exceptional)
    }
}

fn flows(sources: &[NodeIndex], flow: Flow) -> Vec<(NodeIndex, Flow)> {
    sources.iter().map(|source| (*source, flow)).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TryPhase {
    Main,
    Catch,
    Finally,
}

/// An enclosing construct that jumps or exceptions can be routed to.
#[derive(Debug)]
enum Frame {
    Loop {
        // Known up front for `while`, only after the body for `do-while`.
        condition_enter: Option<NodeIndex>,
        breaks: Vec<NodeIndex>,
        continues: Vec<NodeIndex>,
    },
    Try {
        phase: TryPhase,
        has_catches: bool,
        has_finally: bool,
        throws: Vec<NodeIndex>,
    },
}

/// The state of one graph under construction.
struct GraphBuilder {
    id: GraphId,
    graph: Graph,
    boundaries: Vec<(NodeIndex, NodeIndex)>,
    frames: Vec<Frame>,
    // Jumps and exceptions that leave the whole graph.
    pending_exit: Vec<(NodeIndex, Flow)>,
}

impl GraphBuilder {
    fn new(id: GraphId) -> Self {
        Self {
            id,
            graph: Graph::new(),
            boundaries: vec![],
            frames: vec![],
            pending_exit: vec![],
        }
    }

    /// Creates a node together with its incoming edges.
    ///
    /// The node is dead unless at least one incoming edge carries live flow. A root node (no
    /// incoming edges) is alive.
    fn add_node(
        &mut self,
        kind: CfgNodeKind,
        element: ElementId,
        level: u32,
        incoming: &[(NodeIndex, Flow)],
    ) -> NodeIndex {
        let live: Vec<bool> = incoming
            .iter()
            .map(|(source, flow)| self.is_live(*source, *flow))
            .collect();
        let is_dead = !incoming.is_empty() && !live.iter().any(|live| *live);

        let node = self.graph.add_node(CfgNode {
            owner: self.id,
            level,
            is_dead,
            element,
            kind,
        });
        if is_dead {
            tracing::trace!(node = %self.graph[node], "no live flow reaches node");
        }
        for ((source, flow), live) in incoming.iter().zip(live) {
            let edge = if live {
                flow.edge()
            } else {
                ControlFlowGraphEdge::Dead
            };
            self.graph.add_edge(*source, node, edge);
        }
        node
    }

    /// Adds an edge to a node that already exists, without revisiting its liveness.
    fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, flow: Flow) {
        let edge = if self.is_live(source, flow) {
            flow.edge()
        } else {
            ControlFlowGraphEdge::Dead
        };
        self.graph.add_edge(source, target, edge);
    }

    fn is_live(&self, source: NodeIndex, flow: Flow) -> bool {
        let source = &self.graph[source];
        !source.is_dead && (flow.leaves_terminator() || !source.kind.terminates_flow())
    }

    fn close(&mut self, enter: NodeIndex, exit: NodeIndex) {
        self.boundaries.push((enter, exit));
    }

    /// Follows a node that stops normal flow with a dead stub, so the graph stays connected.
    fn stub_after(&mut self, terminator: NodeIndex, level: u32) -> Vec<NodeIndex> {
        let stub = self.add_node(
            CfgNodeKind::Stub,
            ElementId::SYNTHETIC,
            level,
            &[(terminator, Flow::Normal)],
        );
        vec![stub]
    }

    fn connect_code_block(
        &mut self,
        block: &ty::TyCodeBlock,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let enter = self.add_node(
            CfgNodeKind::BlockEnter,
            block.id,
            level,
            &flows(leaves, Flow::Normal),
        );
        let leaves = self.connect_statements(&block.statements, vec![enter], level + 1)?;
        let exit = self.add_node(
            CfgNodeKind::BlockExit,
            block.id,
            level,
            &flows(&leaves, Flow::Normal),
        );
        self.close(enter, exit);
        Ok(vec![exit])
    }

    fn connect_statements(
        &mut self,
        statements: &[ty::TyStatement],
        mut leaves: Vec<NodeIndex>,
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        for statement in statements {
            leaves = match statement {
                ty::TyStatement::VariableDeclaration(declaration) => {
                    self.connect_variable_declaration(declaration, &leaves, level)?
                }
                ty::TyStatement::Expression(expression) => {
                    self.connect_expression(expression, &leaves, level)?
                }
            };
        }
        Ok(leaves)
    }

    fn connect_variable_declaration(
        &mut self,
        declaration: &ty::TyVariableDeclaration,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let leaves = match &declaration.initializer {
            Some(initializer) => self.connect_expression(initializer, leaves, level + 1)?,
            None => leaves.to_vec(),
        };
        let node = self.add_node(
            CfgNodeKind::VariableDeclaration,
            declaration.id,
            level,
            &flows(&leaves, Flow::Normal),
        );
        Ok(vec![node])
    }

    fn connect_expression(
        &mut self,
        expression: &ty::TyExpression,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        use TyExpressionVariant::*;
        match &expression.variant {
            Literal(_) => {
                Ok(vec![self.leaf(CfgNodeKind::Const, expression, leaves, level)])
            }
            VariableExpression { .. } => Ok(vec![self.leaf(
                CfgNodeKind::QualifiedAccess,
                expression,
                leaves,
                level,
            )]),
            CodeBlock(block) => self.connect_code_block(block, leaves, level),
            When { subject, branches } => {
                self.connect_when(expression, subject.as_deref(), branches, leaves, level)
            }
            WhileLoop { condition, body } => {
                self.connect_while_loop(expression, condition, body, leaves, level)
            }
            DoWhileLoop { body, condition } => {
                self.connect_do_while_loop(expression, body, condition, leaves, level)
            }
            TryCatch {
                body,
                catches,
                finally,
            } => self.connect_try(expression, body, catches, finally.as_ref(), leaves, level),
            LogicalOperator { op, lhs, rhs } => {
                self.connect_logical_operator(expression, *op, lhs, rhs, leaves, level)
            }
            TypeOperator { operand, .. } => {
                let leaves = self.connect_expression(operand, leaves, level + 1)?;
                Ok(vec![self.leaf(
                    CfgNodeKind::TypeOperatorCall,
                    expression,
                    &leaves,
                    level,
                )])
            }
            QualifiedAccess { receiver, .. } => {
                let leaves = match receiver {
                    Some(receiver) => self.connect_expression(receiver, leaves, level + 1)?,
                    None => leaves.to_vec(),
                };
                Ok(vec![self.leaf(
                    CfgNodeKind::QualifiedAccess,
                    expression,
                    &leaves,
                    level,
                )])
            }
            FunctionApplication {
                receiver,
                arguments,
                ..
            } => {
                let mut leaves = match receiver {
                    Some(receiver) => self.connect_expression(receiver, leaves, level + 1)?,
                    None => leaves.to_vec(),
                };
                for argument in arguments {
                    leaves = self.connect_expression(argument, &leaves, level + 1)?;
                }
                let call = self.leaf(
                    CfgNodeKind::FunctionCall {
                        returns_nothing: expression.returns_nothing(),
                    },
                    expression,
                    &leaves,
                    level,
                );
                if expression.returns_nothing() {
                    self.route_exception(call);
                    return Ok(self.stub_after(call, level));
                }
                Ok(vec![call])
            }
            Jump { kind, result } => {
                let leaves = match result {
                    Some(result) => self.connect_expression(result, leaves, level + 1)?,
                    None => leaves.to_vec(),
                };
                let jump = self.leaf(CfgNodeKind::Jump { kind: *kind }, expression, &leaves, level);
                self.route_jump(*kind, jump, expression.id)?;
                Ok(self.stub_after(jump, level))
            }
            Throw { exception } => {
                let leaves = self.connect_expression(exception, leaves, level + 1)?;
                let throw = self.leaf(CfgNodeKind::Throw, expression, &leaves, level);
                self.route_exception(throw);
                Ok(self.stub_after(throw, level))
            }
            Reassignment { rhs, .. } => {
                let leaves = self.connect_expression(rhs, leaves, level + 1)?;
                Ok(vec![self.leaf(
                    CfgNodeKind::VariableAssignment,
                    expression,
                    &leaves,
                    level,
                )])
            }
        }
    }

    fn leaf(
        &mut self,
        kind: CfgNodeKind,
        expression: &ty::TyExpression,
        leaves: &[NodeIndex],
        level: u32,
    ) -> NodeIndex {
        self.add_node(kind, expression.id, level, &flows(leaves, Flow::Normal))
    }

    fn connect_when(
        &mut self,
        when: &ty::TyExpression,
        subject: Option<&ty::TyExpression>,
        branches: &[ty::TyWhenBranch],
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let enter = self.add_node(
            CfgNodeKind::WhenEnter,
            when.id,
            level,
            &flows(leaves, Flow::Normal),
        );
        let mut next = match subject {
            Some(subject) => self.connect_expression(subject, &[enter], level + 1)?,
            None => vec![enter],
        };

        let else_position = branches.iter().position(|branch| branch.condition.is_none());
        if let Some(position) = else_position.filter(|position| position + 1 != branches.len()) {
            return Err(CompileError::MisplacedElseBranch {
                element: branches[position].id,
            });
        }

        let mut results = vec![];
        for branch in branches {
            let condition_enter = self.add_node(
                CfgNodeKind::WhenBranchConditionEnter,
                branch.id,
                level + 1,
                &flows(&next, Flow::Normal),
            );
            let (condition_leaves, condition_element) = match &branch.condition {
                Some(condition) => (
                    self.connect_expression(condition, &[condition_enter], level + 2)?,
                    condition.id,
                ),
                None => (vec![condition_enter], branch.id),
            };
            let condition_exit = self.add_node(
                CfgNodeKind::WhenBranchConditionExit {
                    on_true: BranchCondition {
                        element: condition_element,
                        expected: true,
                    },
                    on_false: BranchCondition {
                        element: condition_element,
                        expected: false,
                    },
                },
                branch.id,
                level + 1,
                &flows(&condition_leaves, Flow::Normal),
            );
            self.close(condition_enter, condition_exit);

            let result_enter = self.add_node(
                CfgNodeKind::WhenBranchResultEnter,
                branch.id,
                level + 1,
                &[(condition_exit, Flow::Normal)],
            );
            let result_leaves =
                self.connect_statements(&branch.result.statements, vec![result_enter], level + 2)?;
            let result_exit = self.add_node(
                CfgNodeKind::WhenBranchResultExit,
                branch.id,
                level + 1,
                &flows(&result_leaves, Flow::Normal),
            );
            self.close(result_enter, result_exit);
            results.push(result_exit);
            next = vec![condition_exit];
        }

        let mut incoming = flows(&results, Flow::Normal);
        if else_position.is_none() {
            let synthetic_else = self.add_node(
                CfgNodeKind::WhenSyntheticElseBranch,
                when.id,
                level + 1,
                &flows(&next, Flow::Normal),
            );
            incoming.push((synthetic_else, Flow::Normal));
        }
        let exit = self.add_node(CfgNodeKind::WhenExit, when.id, level, &incoming);
        self.close(enter, exit);
        Ok(vec![exit])
    }

    fn connect_while_loop(
        &mut self,
        lp: &ty::TyExpression,
        condition: &ty::TyExpression,
        body: &ty::TyCodeBlock,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let enter = self.add_node(
            CfgNodeKind::LoopEnter,
            lp.id,
            level,
            &flows(leaves, Flow::Normal),
        );
        let condition_enter = self.add_node(
            CfgNodeKind::LoopConditionEnter,
            condition.id,
            level + 1,
            &[(enter, Flow::Normal)],
        );
        let condition_leaves = self.connect_expression(condition, &[condition_enter], level + 2)?;
        let condition_exit = self.add_node(
            CfgNodeKind::LoopConditionExit,
            condition.id,
            level + 1,
            &flows(&condition_leaves, Flow::Normal),
        );
        self.close(condition_enter, condition_exit);

        self.frames.push(Frame::Loop {
            condition_enter: Some(condition_enter),
            breaks: vec![],
            continues: vec![],
        });
        let block_enter = self.add_node(
            CfgNodeKind::LoopBlockEnter,
            body.id,
            level + 1,
            &[(condition_exit, Flow::Normal)],
        );
        let body_leaves = self.connect_statements(&body.statements, vec![block_enter], level + 2)?;
        let block_exit = self.add_node(
            CfgNodeKind::LoopBlockExit,
            body.id,
            level + 1,
            &flows(&body_leaves, Flow::Normal),
        );
        self.close(block_enter, block_exit);
        self.add_edge(block_exit, condition_enter, Flow::Back);
        let breaks = self.pop_loop_frame();

        let mut incoming = vec![(condition_exit, Flow::Normal)];
        incoming.extend(flows(&breaks, Flow::Jump));
        let exit = self.add_node(CfgNodeKind::LoopExit, lp.id, level, &incoming);
        self.close(enter, exit);
        Ok(vec![exit])
    }

    fn connect_do_while_loop(
        &mut self,
        lp: &ty::TyExpression,
        body: &ty::TyCodeBlock,
        condition: &ty::TyExpression,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let enter = self.add_node(
            CfgNodeKind::LoopEnter,
            lp.id,
            level,
            &flows(leaves, Flow::Normal),
        );

        self.frames.push(Frame::Loop {
            condition_enter: None,
            breaks: vec![],
            continues: vec![],
        });
        let block_enter = self.add_node(
            CfgNodeKind::LoopBlockEnter,
            body.id,
            level + 1,
            &[(enter, Flow::Normal)],
        );
        let body_leaves = self.connect_statements(&body.statements, vec![block_enter], level + 2)?;
        let block_exit = self.add_node(
            CfgNodeKind::LoopBlockExit,
            body.id,
            level + 1,
            &flows(&body_leaves, Flow::Normal),
        );
        self.close(block_enter, block_exit);

        let mut incoming = vec![(block_exit, Flow::Normal)];
        if let Some(Frame::Loop { continues, .. }) = self.frames.last_mut() {
            incoming.extend(flows(&std::mem::take(continues), Flow::Jump));
        }
        let condition_enter = self.add_node(
            CfgNodeKind::LoopConditionEnter,
            condition.id,
            level + 1,
            &incoming,
        );
        let breaks = self.pop_loop_frame();

        let condition_leaves = self.connect_expression(condition, &[condition_enter], level + 2)?;
        let condition_exit = self.add_node(
            CfgNodeKind::LoopConditionExit,
            condition.id,
            level + 1,
            &flows(&condition_leaves, Flow::Normal),
        );
        self.close(condition_enter, condition_exit);
        self.add_edge(condition_exit, block_enter, Flow::Back);

        let mut incoming = vec![(condition_exit, Flow::Normal)];
        incoming.extend(flows(&breaks, Flow::Jump));
        let exit = self.add_node(CfgNodeKind::LoopExit, lp.id, level, &incoming);
        self.close(enter, exit);
        Ok(vec![exit])
    }

    fn pop_loop_frame(&mut self) -> Vec<NodeIndex> {
        match self.frames.pop() {
            Some(Frame::Loop { breaks, .. }) => breaks,
            _ => vec![],
        }
    }

    fn connect_try(
        &mut self,
        try_expression: &ty::TyExpression,
        body: &ty::TyCodeBlock,
        catches: &[ty::TyCatchClause],
        finally: Option<&ty::TyCodeBlock>,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let enter = self.add_node(
            CfgNodeKind::TryExpressionEnter,
            try_expression.id,
            level,
            &flows(leaves, Flow::Normal),
        );

        self.frames.push(Frame::Try {
            phase: TryPhase::Main,
            has_catches: !catches.is_empty(),
            has_finally: finally.is_some(),
            throws: vec![],
        });
        let main_enter = self.add_node(
            CfgNodeKind::TryMainBlockEnter,
            body.id,
            level + 1,
            &[(enter, Flow::Normal)],
        );
        let main_leaves = self.connect_statements(&body.statements, vec![main_enter], level + 2)?;
        let main_exit = self.add_node(
            CfgNodeKind::TryMainBlockExit,
            body.id,
            level + 1,
            &flows(&main_leaves, Flow::Normal),
        );
        self.close(main_enter, main_exit);

        // Anything in the main block may throw before its first node completes.
        let mut main_throws = vec![(main_enter, Flow::Exceptional)];
        main_throws.extend(flows(&self.enter_try_phase(TryPhase::Catch), Flow::Exceptional));

        let mut completions = vec![main_exit];
        for catch in catches {
            let catch_enter = self.add_node(
                CfgNodeKind::CatchClauseEnter,
                catch.id,
                level + 1,
                &main_throws,
            );
            let parameter = self.add_node(
                CfgNodeKind::VariableDeclaration,
                catch.parameter.id,
                level + 2,
                &[(catch_enter, Flow::Normal)],
            );
            let catch_leaves =
                self.connect_statements(&catch.body.statements, vec![parameter], level + 2)?;
            let catch_exit = self.add_node(
                CfgNodeKind::CatchClauseExit,
                catch.id,
                level + 1,
                &flows(&catch_leaves, Flow::Normal),
            );
            self.close(catch_enter, catch_exit);
            completions.push(catch_exit);
        }

        let Some(finally) = finally else {
            self.frames.pop();
            let exit = self.add_node(
                CfgNodeKind::TryExpressionExit,
                try_expression.id,
                level,
                &flows(&completions, Flow::Normal),
            );
            self.close(enter, exit);
            return Ok(vec![exit]);
        };

        let mut incoming = flows(&completions, Flow::Normal);
        incoming.extend(main_throws);
        incoming.extend(flows(
            &self.enter_try_phase(TryPhase::Finally),
            Flow::Exceptional,
        ));
        let proxy_enter = self.add_node(
            CfgNodeKind::FinallyProxyEnter,
            finally.id,
            level + 1,
            &incoming,
        );
        let finally_enter = self.add_node(
            CfgNodeKind::FinallyBlockEnter,
            finally.id,
            level + 2,
            &[(proxy_enter, Flow::Normal)],
        );
        let finally_leaves =
            self.connect_statements(&finally.statements, vec![finally_enter], level + 3)?;
        let finally_exit = self.add_node(
            CfgNodeKind::FinallyBlockExit,
            finally.id,
            level + 2,
            &flows(&finally_leaves, Flow::Normal),
        );
        self.close(finally_enter, finally_exit);
        let proxy_exit = self.add_node(
            CfgNodeKind::FinallyProxyExit,
            finally.id,
            level + 1,
            &[(finally_exit, Flow::Normal)],
        );
        self.close(proxy_enter, proxy_exit);
        self.frames.pop();

        // Leaving the proxy either resumes after the try or rethrows what entered it.
        self.route_exception(proxy_exit);
        let exit = self.add_node(
            CfgNodeKind::TryExpressionExit,
            try_expression.id,
            level,
            &[(proxy_exit, Flow::Normal)],
        );
        self.close(enter, exit);
        Ok(vec![exit])
    }

    /// Moves the innermost try frame to `phase`, returning the throws recorded so far.
    fn enter_try_phase(&mut self, next: TryPhase) -> Vec<NodeIndex> {
        match self.frames.last_mut() {
            Some(Frame::Try { phase, throws, .. }) => {
                *phase = next;
                std::mem::take(throws)
            }
            _ => vec![],
        }
    }

    fn connect_logical_operator(
        &mut self,
        expression: &ty::TyExpression,
        op: ty::LogicalOperator,
        lhs: &ty::TyExpression,
        rhs: &ty::TyExpression,
        leaves: &[NodeIndex],
        level: u32,
    ) -> Result<Vec<NodeIndex>, CompileError> {
        let (enter_kind, exit_left_kind, enter_right_kind, exit_kind) = match op {
            ty::LogicalOperator::And => (
                CfgNodeKind::BinaryAndEnter,
                CfgNodeKind::BinaryAndExitLeftOperand,
                CfgNodeKind::BinaryAndEnterRightOperand,
                CfgNodeKind::BinaryAndExit,
            ),
            ty::LogicalOperator::Or => (
                CfgNodeKind::BinaryOrEnter,
                CfgNodeKind::BinaryOrExitLeftOperand,
                CfgNodeKind::BinaryOrEnterRightOperand,
                CfgNodeKind::BinaryOrExit,
            ),
        };

        let enter = self.add_node(enter_kind, expression.id, level, &flows(leaves, Flow::Normal));
        let lhs_leaves = self.connect_expression(lhs, &[enter], level + 1)?;
        let exit_left = self.add_node(
            exit_left_kind,
            lhs.id,
            level + 1,
            &flows(&lhs_leaves, Flow::Normal),
        );
        let enter_right = self.add_node(
            enter_right_kind,
            rhs.id,
            level + 1,
            &[(exit_left, Flow::Normal)],
        );
        let rhs_leaves = self.connect_expression(rhs, &[enter_right], level + 1)?;

        // The right operand is skipped when the left one already decides the result.
        let mut incoming = flows(&rhs_leaves, Flow::Normal);
        incoming.push((exit_left, Flow::Normal));
        let exit = self.add_node(exit_kind, expression.id, level, &incoming);
        self.close(enter, exit);
        Ok(vec![exit])
    }

    fn route_jump(
        &mut self,
        kind: JumpKind,
        jump: NodeIndex,
        element: ElementId,
    ) -> Result<(), CompileError> {
        if kind == JumpKind::Return {
            self.pending_exit.push((jump, Flow::Jump));
            return Ok(());
        }

        let innermost_loop = self
            .frames
            .iter()
            .rposition(|frame| matches!(frame, Frame::Loop { .. }));
        let Some(position) = innermost_loop else {
            return Err(CompileError::JumpOutsideOfLoop {
                kind: kind.as_str(),
                element,
            });
        };

        let mut back_edge = None;
        if let Frame::Loop {
            condition_enter,
            breaks,
            continues,
        } = &mut self.frames[position]
        {
            match (kind, *condition_enter) {
                (JumpKind::Break, _) => breaks.push(jump),
                (_, Some(condition_enter)) => back_edge = Some(condition_enter),
                (_, None) => continues.push(jump),
            }
        }
        if let Some(condition_enter) = back_edge {
            self.add_edge(jump, condition_enter, Flow::JumpBack);
        }
        Ok(())
    }

    /// Sends an exception raised at `source` to the innermost construct that observes it.
    fn route_exception(&mut self, source: NodeIndex) {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Try {
                phase,
                has_catches,
                has_finally,
                throws,
            } = frame
            {
                let observed = match phase {
                    TryPhase::Main => *has_catches || *has_finally,
                    TryPhase::Catch => *has_finally,
                    TryPhase::Finally => false,
                };
                if observed {
                    throws.push(source);
                    return;
                }
            }
        }
        self.pending_exit.push((source, Flow::Exceptional));
    }
}
