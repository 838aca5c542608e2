use serde::{Deserialize, Serialize};
use std::fmt;

/// A dotted fully-qualified name such as `kotlin.collections.List`.
///
/// The root (empty) name stands for the default package.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FqName {
    segments: Vec<String>,
}

impl FqName {
    pub fn root() -> FqName {
        FqName::default()
    }

    /// Parses a dotted name. Empty segments are skipped, so `""` is the root.
    pub fn parse(dotted: &str) -> FqName {
        FqName {
            segments: dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn child(&self, name: &str) -> FqName {
        let mut segments = self.segments.clone();
        segments.push(name.to_owned());
        FqName { segments }
    }

    pub fn parent(&self) -> Option<FqName> {
        let (_, init) = self.segments.split_last()?;
        Some(FqName {
            segments: init.to_vec(),
        })
    }

    /// The last segment, or the empty string for the root.
    pub fn short_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_string(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.as_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_and_child() {
        let list = FqName::parse("kotlin.collections").child("List");
        assert_eq!(list.as_string(), "kotlin.collections.List");
        assert_eq!(list.short_name(), "List");
        assert_eq!(list.parent(), Some(FqName::parse("kotlin.collections")));
        assert!(FqName::parse("").is_root());
        assert_eq!(FqName::root().parent(), None);
    }
}
