pub mod error;

pub use error::{CompileError, ErrorCategory};
