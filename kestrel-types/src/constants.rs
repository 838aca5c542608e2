//! Configurable yet non-changing constants for the compiler.

/// Offset used for compiler-synthesized elements which have no position in any source file.
pub const UNDEFINED_OFFSET: i32 = -1;

/// Prefix of every generated dataflow variable name, e.g. `d0`, `d1`.
pub const DATA_FLOW_VARIABLE_PREFIX: &str = "d";

/// Suffix appended to a file name to form the name of its facade class, e.g. `Utils.kt` -> `UtilsKt`.
pub const FILE_FACADE_SUFFIX: &str = "Kt";

/// Name given to the placeholder element of stub nodes.
pub const STUB_ELEMENT_NAME: &str = "<stub>";
