use crate::span::{Span, Spanned};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A name together with the span it was written at.
///
/// Equality, ordering and hashing only look at the name.
#[derive(Clone, Serialize, Deserialize)]
pub struct Ident {
    name: Arc<str>,
    span: Span,
}

impl Ident {
    pub fn new(name: impl AsRef<str>, span: Span) -> Ident {
        Ident {
            name: Arc::from(name.as_ref()),
            span,
        }
    }

    /// An identifier for a compiler-synthesized element.
    pub fn new_no_span(name: impl AsRef<str>) -> Ident {
        Ident::new(name, Span::UNDEFINED)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn with_span(&self, span: Span) -> Ident {
        Ident {
            name: self.name.clone(),
            span,
        }
    }
}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Ident {}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new_no_span(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_keeps_its_span_through_serde() {
        let ident = Ident::new("join", Span::new(4, 8));
        let json = serde_json::to_string(&ident).unwrap();
        let decoded: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.as_str(), "join");
        assert_eq!(decoded.span(), Span::new(4, 8));
    }
}
