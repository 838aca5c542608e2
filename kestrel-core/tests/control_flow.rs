use kestrel_core::{
    language::ty::{JumpKind, TyStatement, TyTreeBuilder},
    BuildConfig, CfgNodeKind, ControlFlowGraph, ControlFlowGraphBuilder, ControlFlowGraphEdge,
    GraphKind,
};
use kestrel_error::{CompileError, ErrorCategory};
use kestrel_types::TypeInfo;
use petgraph::prelude::NodeIndex;
use pretty_assertions::assert_eq;

fn find(cfg: &ControlFlowGraph, kind: CfgNodeKind) -> NodeIndex {
    find_all(cfg, kind).into_iter().next().unwrap()
}

fn find_all(cfg: &ControlFlowGraph, kind: CfgNodeKind) -> Vec<NodeIndex> {
    cfg.nodes()
        .filter(|(_, node)| node.kind == kind)
        .map(|(index, _)| index)
        .collect()
}

fn kinds(cfg: &ControlFlowGraph) -> Vec<&'static str> {
    cfg.nodes().map(|(_, node)| node.kind.name()).collect()
}

fn assert_well_formed(cfg: &ControlFlowGraph) {
    cfg.verify().unwrap();
    assert!(cfg.previous_nodes(cfg.enter_node()).is_empty());
    assert!(cfg.following_nodes(cfg.exit_node()).is_empty());
    for (index, node) in cfg.nodes() {
        assert_eq!(node.owner, cfg.id());
        if index != cfg.enter_node() {
            assert!(node.is_dead || !cfg.previous_nodes(index).is_empty());
        }
    }
    for (enter, exit) in cfg.boundaries() {
        assert_eq!(cfg.node(*enter).level, cfg.node(*exit).level);
        assert_eq!(cfg.matching_exit(*enter), Some(*exit));
    }
}

#[test]
fn code_after_throw_is_dead() {
    // fun f() { throw E(); x() }
    let mut tree = TyTreeBuilder::new();
    let e = tree.symbol();
    let x = tree.symbol();
    let exception = tree.call("E", e, TypeInfo::class("E"), vec![]);
    let throw = tree.throw(exception);
    let call = tree.call("x", x, TypeInfo::Unit, vec![]);
    let call_id = call.id;
    let body = tree.block_of(vec![throw, call]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);
    assert_eq!(cfg.kind(), GraphKind::Function);

    let call_nodes = cfg.nodes_for_element(call_id);
    assert_eq!(call_nodes.len(), 1);
    assert!(cfg.node(call_nodes[0]).is_dead);

    let stub = find(&cfg, CfgNodeKind::Stub);
    assert!(cfg.node(stub).is_dead);
    assert_eq!(cfg.following_nodes(stub), call_nodes);
    assert_eq!(
        cfg.incoming_edges(stub),
        vec![(find(&cfg, CfgNodeKind::Throw), ControlFlowGraphEdge::Dead)]
    );

    // The exception still leaves the function.
    let exit = cfg.exit_node();
    assert!(!cfg.node(exit).is_dead);
    assert!(cfg
        .incoming_edges(exit)
        .contains(&(find(&cfg, CfgNodeKind::Throw), ControlFlowGraphEdge::Exceptional)));
    assert!(cfg.node(find(&cfg, CfgNodeKind::BlockExit)).is_dead);
    assert_eq!(cfg.useful_previous_nodes(exit), vec![find(&cfg, CfgNodeKind::Throw)]);
}

#[test]
fn call_returning_nothing_stops_flow() {
    // fun f() { fail(); x() }
    let mut tree = TyTreeBuilder::new();
    let fail = tree.symbol();
    let x = tree.symbol();
    let failing = tree.call("fail", fail, TypeInfo::Nothing, vec![]);
    let call = tree.call("x", x, TypeInfo::Unit, vec![]);
    let call_id = call.id;
    let body = tree.block_of(vec![failing, call]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let failing = find(
        &cfg,
        CfgNodeKind::FunctionCall {
            returns_nothing: true,
        },
    );
    assert_eq!(cfg.node(failing).returns_nothing(), Some(true));
    assert!(cfg.node(cfg.nodes_for_element(call_id)[0]).is_dead);
    assert_eq!(find_all(&cfg, CfgNodeKind::Stub).len(), 1);
}

#[test]
fn and_operator_shape() {
    // fun f() { false && g() }
    let mut tree = TyTreeBuilder::new();
    let g = tree.symbol();
    let lhs = tree.bool(false);
    let rhs = tree.call("g", g, TypeInfo::Boolean, vec![]);
    let rhs_id = rhs.id;
    let and = tree.and(lhs, rhs);
    let body = tree.block_of(vec![and]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let mut cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);
    assert_eq!(
        kinds(&cfg),
        vec![
            "FunctionEnter",
            "BlockEnter",
            "BinaryAndEnter",
            "Const",
            "BinaryAndExitLeftOperand",
            "BinaryAndEnterRightOperand",
            "FunctionCall",
            "BinaryAndExit",
            "BlockExit",
            "FunctionExit",
        ]
    );

    let exit_left = find(&cfg, CfgNodeKind::BinaryAndExitLeftOperand);
    let enter_right = find(&cfg, CfgNodeKind::BinaryAndEnterRightOperand);
    let exit = find(&cfg, CfgNodeKind::BinaryAndExit);
    let call = find(
        &cfg,
        CfgNodeKind::FunctionCall {
            returns_nothing: false,
        },
    );
    assert_eq!(cfg.following_nodes(exit_left), vec![enter_right, exit]);
    assert_eq!(cfg.nodes_for_element(rhs_id), vec![enter_right, call]);
    assert_eq!(cfg.dead_nodes().count(), 0);

    // Once a liveness pass decides the right operand is skipped, the views hide it.
    cfg.mark_dead(enter_right);
    assert_eq!(cfg.useful_following_nodes(exit_left), vec![exit]);
    assert_eq!(cfg.useful_previous_nodes(enter_right), vec![exit_left]);
}

#[test]
fn or_operator_levels() {
    // val v = a || (b || c)
    let mut tree = TyTreeBuilder::new();
    let a = tree.bool(true);
    let b = tree.bool(false);
    let c = tree.bool(false);
    let inner = tree.or(b, c);
    let outer = tree.or(a, inner);
    let declaration = tree.variable("v", TypeInfo::Boolean, false, Some(outer));

    let cfg = ControlFlowGraphBuilder::default()
        .build_initializer(&declaration)
        .unwrap();
    assert_well_formed(&cfg);
    assert_eq!(cfg.kind(), GraphKind::Initializer);
    assert_eq!(cfg.node(cfg.enter_node()).kind, CfgNodeKind::InitializerEnter);

    let enters = find_all(&cfg, CfgNodeKind::BinaryOrEnter);
    let exits = find_all(&cfg, CfgNodeKind::BinaryOrExit);
    assert_eq!(enters.len(), 2);
    assert_eq!(cfg.matching_exit(enters[0]), Some(exits[1]));
    assert_eq!(cfg.matching_exit(enters[1]), Some(exits[0]));
    assert_eq!(cfg.node(enters[0]).level + 1, cfg.node(enters[1]).level);
}

#[test]
fn while_loop_shape() {
    // fun f(c: Boolean) { while (c) { g() } }
    let mut tree = TyTreeBuilder::new();
    let g = tree.symbol();
    let parameter = tree.parameter("c", TypeInfo::Boolean);
    let condition = tree.read_parameter(&parameter);
    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let body = tree.block_of(vec![call]);
    let lp = tree.while_loop(condition, body);
    let body = tree.block_of(vec![lp]);
    let function = tree.function("f", vec![parameter], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);
    assert_eq!(
        kinds(&cfg)[2..10].to_vec(),
        vec![
            "LoopEnter",
            "LoopConditionEnter",
            "QualifiedAccess",
            "LoopConditionExit",
            "LoopBlockEnter",
            "FunctionCall",
            "LoopBlockExit",
            "LoopExit",
        ]
    );

    let loop_enter = find(&cfg, CfgNodeKind::LoopEnter);
    let condition_enter = find(&cfg, CfgNodeKind::LoopConditionEnter);
    let condition_exit = find(&cfg, CfgNodeKind::LoopConditionExit);
    let block_enter = find(&cfg, CfgNodeKind::LoopBlockEnter);
    let block_exit = find(&cfg, CfgNodeKind::LoopBlockExit);
    let loop_exit = find(&cfg, CfgNodeKind::LoopExit);

    assert_eq!(cfg.following_nodes(condition_exit), vec![block_enter, loop_exit]);
    assert_eq!(
        cfg.outgoing_edges(block_exit),
        vec![(condition_enter, ControlFlowGraphEdge::Back)]
    );
    assert_eq!(cfg.matching_exit(loop_enter), Some(loop_exit));
    assert_eq!(cfg.node(loop_enter).level, cfg.node(loop_exit).level);
    assert_eq!(cfg.node(loop_enter).level + 1, cfg.node(block_enter).level);
}

#[test]
fn do_while_with_jumps() {
    // fun f(c: Boolean) { do { if (c) { continue }; if (c) { break }; g() } while (c) }
    let mut tree = TyTreeBuilder::new();
    let g = tree.symbol();
    let parameter = tree.parameter("c", TypeInfo::Boolean);

    let read = tree.read_parameter(&parameter);
    let jump = tree.jump(JumpKind::Continue, None);
    let then = tree.block_of(vec![jump]);
    let skip = tree.if_else(read, then, None);

    let read = tree.read_parameter(&parameter);
    let jump = tree.jump(JumpKind::Break, None);
    let then = tree.block_of(vec![jump]);
    let leave = tree.if_else(read, then, None);

    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let body = tree.block_of(vec![skip, leave, call]);
    let condition = tree.read_parameter(&parameter);
    let lp = tree.do_while_loop(body, condition);
    let body = tree.block_of(vec![lp]);
    let function = tree.function("f", vec![parameter], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let jumps: Vec<_> = cfg
        .nodes()
        .filter(|(_, node)| matches!(node.kind, CfgNodeKind::Jump { .. }))
        .map(|(index, _)| index)
        .collect();
    let block_enter = find(&cfg, CfgNodeKind::LoopBlockEnter);
    let block_exit = find(&cfg, CfgNodeKind::LoopBlockExit);
    let condition_enter = find(&cfg, CfgNodeKind::LoopConditionEnter);
    let condition_exit = find(&cfg, CfgNodeKind::LoopConditionExit);
    let loop_exit = find(&cfg, CfgNodeKind::LoopExit);

    assert_eq!(cfg.previous_nodes(condition_enter), vec![block_exit, jumps[0]]);
    assert_eq!(
        cfg.outgoing_edges(condition_exit),
        vec![
            (block_enter, ControlFlowGraphEdge::Back),
            (loop_exit, ControlFlowGraphEdge::Forward),
        ]
    );
    assert_eq!(cfg.previous_nodes(loop_exit), vec![condition_exit, jumps[1]]);
    // Both `if`s have an implicit else, so the rest of the body stays reachable.
    assert_eq!(find_all(&cfg, CfgNodeKind::WhenSyntheticElseBranch).len(), 2);
    assert!(!cfg.node(block_exit).is_dead);
}

#[test]
fn return_in_one_branch() {
    // fun f(c: Boolean): Int { if (c) { return 1 } else { g() }; 2 }
    let mut tree = TyTreeBuilder::new();
    let g = tree.symbol();
    let parameter = tree.parameter("c", TypeInfo::Boolean);
    let read = tree.read_parameter(&parameter);
    let one = tree.int(1);
    let ret = tree.jump(JumpKind::Return, Some(one));
    let then = tree.block_of(vec![ret]);
    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let otherwise = tree.block_of(vec![call]);
    let branch = tree.if_else(read, then, Some(otherwise));
    let two = tree.int(2);
    let body = tree.block_of(vec![branch, two]);
    let function = tree.function("f", vec![parameter], TypeInfo::Int, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let condition_exits: Vec<_> = cfg
        .nodes()
        .filter(|(_, node)| matches!(node.kind, CfgNodeKind::WhenBranchConditionExit { .. }))
        .map(|(index, _)| index)
        .collect();
    assert_eq!(condition_exits.len(), 2);
    let result_enters = find_all(&cfg, CfgNodeKind::WhenBranchResultEnter);
    let condition_enters = find_all(&cfg, CfgNodeKind::WhenBranchConditionEnter);
    assert_eq!(
        cfg.following_nodes(condition_exits[0]),
        vec![result_enters[0], condition_enters[1]]
    );
    // The else branch only ever flows into its result.
    assert_eq!(cfg.following_nodes(condition_exits[1]), vec![result_enters[1]]);
    assert!(find_all(&cfg, CfgNodeKind::WhenSyntheticElseBranch).is_empty());

    let result_exits = find_all(&cfg, CfgNodeKind::WhenBranchResultExit);
    assert!(cfg.node(result_exits[0]).is_dead);
    assert!(!cfg.node(result_exits[1]).is_dead);
    assert!(!cfg.node(find(&cfg, CfgNodeKind::WhenExit)).is_dead);

    let jump = find(&cfg, CfgNodeKind::Jump { kind: JumpKind::Return });
    assert!(cfg
        .incoming_edges(cfg.exit_node())
        .contains(&(jump, ControlFlowGraphEdge::Forward)));
}

#[test]
fn try_catch_finally_shape() {
    // fun f() { try { throw E() } catch (e: E) { h() } finally { k() } }
    let mut tree = TyTreeBuilder::new();
    let e = tree.symbol();
    let h = tree.symbol();
    let k = tree.symbol();
    let exception = tree.call("E", e, TypeInfo::class("E"), vec![]);
    let throw = tree.throw(exception);
    let main = tree.block_of(vec![throw]);
    let handler = tree.call("h", h, TypeInfo::Unit, vec![]);
    let handler = tree.block_of(vec![handler]);
    let catch = tree.catch("e", TypeInfo::class("E"), handler);
    let cleanup = tree.call("k", k, TypeInfo::Unit, vec![]);
    let cleanup = tree.block_of(vec![cleanup]);
    let try_expression = tree.try_catch(main, vec![catch], Some(cleanup));
    let body = tree.block_of(vec![try_expression]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let throw = find(&cfg, CfgNodeKind::Throw);
    let main_enter = find(&cfg, CfgNodeKind::TryMainBlockEnter);
    let main_exit = find(&cfg, CfgNodeKind::TryMainBlockExit);
    let catch_enter = find(&cfg, CfgNodeKind::CatchClauseEnter);
    let catch_exit = find(&cfg, CfgNodeKind::CatchClauseExit);
    let proxy_enter = find(&cfg, CfgNodeKind::FinallyProxyEnter);
    let finally_enter = find(&cfg, CfgNodeKind::FinallyBlockEnter);
    let proxy_exit = find(&cfg, CfgNodeKind::FinallyProxyExit);
    let try_exit = find(&cfg, CfgNodeKind::TryExpressionExit);

    assert!(cfg.node(main_exit).is_dead);
    assert!(!cfg.node(catch_enter).is_dead);
    assert_eq!(
        cfg.incoming_edges(catch_enter),
        vec![
            (main_enter, ControlFlowGraphEdge::Exceptional),
            (throw, ControlFlowGraphEdge::Exceptional),
        ]
    );
    assert_eq!(
        cfg.previous_nodes(proxy_enter),
        vec![main_exit, catch_exit, main_enter, throw]
    );
    assert_eq!(cfg.following_nodes(proxy_enter), vec![finally_enter]);
    assert_eq!(
        cfg.outgoing_edges(proxy_exit),
        vec![
            (try_exit, ControlFlowGraphEdge::Forward),
            (cfg.exit_node(), ControlFlowGraphEdge::Exceptional),
        ]
    );
    assert_eq!(cfg.node(finally_enter).level, cfg.node(proxy_enter).level + 1);
}

#[test]
fn throw_in_catch_goes_through_finally() {
    // fun f() { try { g() } catch (e: E) { throw E() } finally { k() } }
    let mut tree = TyTreeBuilder::new();
    let e = tree.symbol();
    let g = tree.symbol();
    let k = tree.symbol();
    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let main = tree.block_of(vec![call]);
    let exception = tree.call("E", e, TypeInfo::class("E"), vec![]);
    let throw = tree.throw(exception);
    let handler = tree.block_of(vec![throw]);
    let catch = tree.catch("e", TypeInfo::class("E"), handler);
    let cleanup = tree.call("k", k, TypeInfo::Unit, vec![]);
    let cleanup = tree.block_of(vec![cleanup]);
    let try_expression = tree.try_catch(main, vec![catch], Some(cleanup));
    let body = tree.block_of(vec![try_expression]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let throw = find(&cfg, CfgNodeKind::Throw);
    let main_enter = find(&cfg, CfgNodeKind::TryMainBlockEnter);
    let main_exit = find(&cfg, CfgNodeKind::TryMainBlockExit);
    let catch_exit = find(&cfg, CfgNodeKind::CatchClauseExit);
    let proxy_enter = find(&cfg, CfgNodeKind::FinallyProxyEnter);
    let proxy_exit = find(&cfg, CfgNodeKind::FinallyProxyExit);

    assert!(cfg.node(catch_exit).is_dead);
    assert_eq!(
        cfg.incoming_edges(proxy_enter),
        vec![
            (main_exit, ControlFlowGraphEdge::Forward),
            (catch_exit, ControlFlowGraphEdge::Dead),
            (main_enter, ControlFlowGraphEdge::Exceptional),
            (throw, ControlFlowGraphEdge::Exceptional),
        ]
    );
    // The exception only leaves the function after the finally block ran.
    let exit = cfg.exit_node();
    assert!(!cfg.previous_nodes(exit).contains(&throw));
    assert!(cfg
        .incoming_edges(exit)
        .contains(&(proxy_exit, ControlFlowGraphEdge::Exceptional)));
}

#[test]
fn throw_in_finally_reaches_outer_catch() {
    // fun f() { try { try { g() } finally { throw E() } } catch (e: E) { h() } }
    let mut tree = TyTreeBuilder::new();
    let e = tree.symbol();
    let g = tree.symbol();
    let h = tree.symbol();
    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let inner_main = tree.block_of(vec![call]);
    let exception = tree.call("E", e, TypeInfo::class("E"), vec![]);
    let throw = tree.throw(exception);
    let cleanup = tree.block_of(vec![throw]);
    let inner = tree.try_catch(inner_main, vec![], Some(cleanup));
    let outer_main = tree.block_of(vec![inner]);
    let handler = tree.call("h", h, TypeInfo::Unit, vec![]);
    let handler = tree.block_of(vec![handler]);
    let catch = tree.catch("e", TypeInfo::class("E"), handler);
    let outer = tree.try_catch(outer_main, vec![catch], None);
    let body = tree.block_of(vec![outer]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let throw = find(&cfg, CfgNodeKind::Throw);
    let main_enters = find_all(&cfg, CfgNodeKind::TryMainBlockEnter);
    let inner_proxy_exit = find(&cfg, CfgNodeKind::FinallyProxyExit);
    let catch_enter = find(&cfg, CfgNodeKind::CatchClauseEnter);

    // The inner try does not see its own finally throwing; the outer catch does.
    assert_eq!(
        cfg.incoming_edges(catch_enter),
        vec![
            (main_enters[0], ControlFlowGraphEdge::Exceptional),
            (throw, ControlFlowGraphEdge::Exceptional),
            (inner_proxy_exit, ControlFlowGraphEdge::Dead),
        ]
    );
    assert!(!cfg.node(catch_enter).is_dead);
    assert!(!cfg.previous_nodes(cfg.exit_node()).contains(&throw));
}

#[test]
fn throw_in_finally_leaves_function() {
    // fun f() { try { g() } finally { throw E() } }
    let mut tree = TyTreeBuilder::new();
    let e = tree.symbol();
    let g = tree.symbol();
    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let main = tree.block_of(vec![call]);
    let exception = tree.call("E", e, TypeInfo::class("E"), vec![]);
    let throw = tree.throw(exception);
    let cleanup = tree.block_of(vec![throw]);
    let try_expression = tree.try_catch(main, vec![], Some(cleanup));
    let body = tree.block_of(vec![try_expression]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let throw = find(&cfg, CfgNodeKind::Throw);
    let proxy_enter = find(&cfg, CfgNodeKind::FinallyProxyEnter);
    let exit = cfg.exit_node();
    assert!(!cfg.following_nodes(throw).contains(&proxy_enter));
    assert!(cfg
        .incoming_edges(exit)
        .contains(&(throw, ControlFlowGraphEdge::Exceptional)));
    assert!(cfg.node(find(&cfg, CfgNodeKind::TryExpressionExit)).is_dead);
    assert!(!cfg.node(exit).is_dead);
}

#[test]
fn break_leaves_only_the_inner_loop() {
    // fun f(c: Boolean) { while (c) { while (c) { break }; g() } }
    let mut tree = TyTreeBuilder::new();
    let g = tree.symbol();
    let parameter = tree.parameter("c", TypeInfo::Boolean);
    let jump = tree.jump(JumpKind::Break, None);
    let inner_body = tree.block_of(vec![jump]);
    let condition = tree.read_parameter(&parameter);
    let inner = tree.while_loop(condition, inner_body);
    let call = tree.call("g", g, TypeInfo::Unit, vec![]);
    let call_id = call.id;
    let outer_body = tree.block_of(vec![inner, call]);
    let condition = tree.read_parameter(&parameter);
    let outer = tree.while_loop(condition, outer_body);
    let body = tree.block_of(vec![outer]);
    let function = tree.function("f", vec![parameter], TypeInfo::Unit, body);

    let cfg = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap();
    assert_well_formed(&cfg);

    let jump = find(&cfg, CfgNodeKind::Jump { kind: JumpKind::Break });
    let loop_enters = find_all(&cfg, CfgNodeKind::LoopEnter);
    let loop_exits = find_all(&cfg, CfgNodeKind::LoopExit);
    let condition_enters = find_all(&cfg, CfgNodeKind::LoopConditionEnter);
    let condition_exits = find_all(&cfg, CfgNodeKind::LoopConditionExit);
    let block_exits = find_all(&cfg, CfgNodeKind::LoopBlockExit);
    let (outer_exit, inner_exit) = (loop_exits[1], loop_exits[0]);

    assert_eq!(cfg.matching_exit(loop_enters[0]), Some(outer_exit));
    assert_eq!(cfg.matching_exit(loop_enters[1]), Some(inner_exit));
    assert_eq!(
        cfg.incoming_edges(inner_exit),
        vec![
            (condition_exits[1], ControlFlowGraphEdge::Forward),
            (jump, ControlFlowGraphEdge::Forward),
        ]
    );
    assert_eq!(
        cfg.incoming_edges(outer_exit),
        vec![(condition_exits[0], ControlFlowGraphEdge::Forward)]
    );

    // The inner body never completes, the outer one does.
    assert!(cfg.node(block_exits[0]).is_dead);
    assert_eq!(
        cfg.outgoing_edges(block_exits[0]),
        vec![(condition_enters[1], ControlFlowGraphEdge::Dead)]
    );
    assert!(!cfg.node(cfg.nodes_for_element(call_id)[0]).is_dead);
    assert_eq!(
        cfg.outgoing_edges(block_exits[1]),
        vec![(condition_enters[0], ControlFlowGraphEdge::Back)]
    );
}

#[test]
fn else_branch_must_come_last() {
    // when { else -> a(); c -> b() }
    let mut tree = TyTreeBuilder::new();
    let a = tree.symbol();
    let b = tree.symbol();
    let parameter = tree.parameter("c", TypeInfo::Boolean);
    let call = tree.call("a", a, TypeInfo::Unit, vec![]);
    let result = tree.block_of(vec![call]);
    let otherwise = tree.branch(None, result);
    let otherwise_id = otherwise.id;
    let condition = tree.read_parameter(&parameter);
    let call = tree.call("b", b, TypeInfo::Unit, vec![]);
    let result = tree.block_of(vec![call]);
    let branch = tree.branch(Some(condition), result);
    let when = tree.when(None, vec![otherwise, branch], TypeInfo::Unit);
    let body = tree.block_of(vec![when]);
    let function = tree.function("f", vec![parameter], TypeInfo::Unit, body);

    let err = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UnsupportedInput);
    assert_eq!(
        err,
        CompileError::MisplacedElseBranch {
            element: otherwise_id,
        }
    );
}

#[test]
fn jump_outside_of_loop_is_rejected() {
    let mut tree = TyTreeBuilder::new();
    let jump = tree.jump(JumpKind::Break, None);
    let jump_id = jump.id;
    let body = tree.block(vec![TyStatement::Expression(jump)]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let err = ControlFlowGraphBuilder::default()
        .build_function(&function)
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::JumpOutsideOfLoop {
            kind: "break",
            element: jump_id,
        }
    );
}

#[test]
fn graphs_get_distinct_ids() {
    let mut tree = TyTreeBuilder::new();
    let value = tree.int(1);
    let declaration = tree.variable("x", TypeInfo::Int, false, Some(value));
    let body = tree.block(vec![TyStatement::VariableDeclaration(declaration.clone())]);
    let function = tree.function("f", vec![], TypeInfo::Unit, body);

    let mut builder =
        ControlFlowGraphBuilder::new(BuildConfig::default().print_cfg(true).verify_graphs(true));
    let first = builder.build_function(&function).unwrap();
    let second = builder.build_initializer(&declaration).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(first.name(), "f");
    assert_eq!(second.name(), "x");
    assert_eq!(
        kinds(&second),
        vec!["InitializerEnter", "Const", "InitializerExit"]
    );
}
