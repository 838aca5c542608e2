//! The resolved, typed tree handed to the middle-end.

pub mod ty;

pub use ty::*;
