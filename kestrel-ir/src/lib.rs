// The whole IR is exported flat, the same way every consumer reaches for it.

pub mod config;
pub use config::*;
pub mod context;
pub use context::*;
pub mod declaration;
pub use declaration::*;
pub mod deep_copy;
pub use deep_copy::*;
pub mod expression;
pub use expression::*;
pub mod external_references;
pub use external_references::*;
pub mod mangle;
pub use mangle::*;
pub mod module;
pub use module::*;
pub mod serialize;
pub use serialize::*;
