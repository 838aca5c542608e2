//! Identities for the values flow-sensitive narrowing reasons about.
//!
//! A [`DataFlowVariable`] stands for "the value of" a declaration (a *real* variable, shared by
//! the declaration and every reference to it) or of one compound expression (a *synthetic*
//! variable). The [`DataFlowVariableStorage`] owns every variable of one function body.

mod element;
mod storage;
mod variable;

pub use element::FlowElement;
pub use storage::DataFlowVariableStorage;
pub use variable::DataFlowVariable;
