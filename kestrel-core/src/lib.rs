pub mod build_config;
pub mod control_flow_analysis;
pub mod data_flow;
pub mod language;

pub use build_config::BuildConfig;
pub use control_flow_analysis::{
    CfgNode, CfgNodeKind, ControlFlowGraph, ControlFlowGraphBuilder, ControlFlowGraphEdge,
    GraphId, GraphKind,
};
pub use data_flow::{DataFlowVariable, DataFlowVariableStorage, FlowElement};
