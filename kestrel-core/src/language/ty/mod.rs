mod builder;
mod code_block;
mod declaration;
mod expression;

pub use builder::*;
pub use code_block::*;
pub use declaration::*;
pub use expression::*;
