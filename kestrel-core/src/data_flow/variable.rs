use std::fmt;

use kestrel_types::TypeInfo;

/// A value tracked by flow analysis.
///
/// Variables compare by name, and names are never reused by the storage that created them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataFlowVariable {
    pub(crate) name: String,
    pub(crate) ty: TypeInfo,
    pub(crate) is_synthetic: bool,
}

impl DataFlowVariable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeInfo {
        &self.ty
    }

    /// True for variables standing for a compound expression rather than a declaration.
    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }
}

impl fmt::Display for DataFlowVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}
