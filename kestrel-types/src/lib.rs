use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

pub mod constants;
pub mod fq_name;
pub mod ident;
pub mod ids;
pub mod span;
pub mod type_info;

pub use fq_name::FqName;
pub use ident::Ident;
pub use ids::{ElementId, IdGenerator, SymbolId};
pub use span::{Span, Spanned};
pub use type_info::TypeInfo;

pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FxIndexSet<K> = IndexSet<K, BuildHasherDefault<FxHasher>>;
