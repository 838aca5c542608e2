use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::UNDEFINED_OFFSET;

/// A pair of start/end offsets into a source file.
///
/// Compiler-synthesized elements carry [`Span::UNDEFINED`] rather than a made-up position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    start: i32,
    end: i32,
}

impl Span {
    pub const UNDEFINED: Span = Span {
        start: UNDEFINED_OFFSET,
        end: UNDEFINED_OFFSET,
    };

    pub fn new(start: i32, end: i32) -> Span {
        assert!(
            start <= end,
            "span start ({start}) must not be after its end ({end})"
        );
        Span { start, end }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn is_undefined(&self) -> bool {
        self.start == UNDEFINED_OFFSET && self.end == UNDEFINED_OFFSET
    }

    /// Returns the smallest span covering both `self` and `other`.
    ///
    /// Undefined spans are absorbed by defined ones.
    pub fn join(self, other: Span) -> Span {
        match (self.is_undefined(), other.is_undefined()) {
            (true, _) => other,
            (_, true) => self,
            _ => Span {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            },
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::UNDEFINED
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            f.write_str("<undefined>")
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

pub trait Spanned {
    fn span(&self) -> Span;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_absorbs_undefined() {
        let defined = Span::new(3, 7);
        assert_eq!(Span::UNDEFINED.join(defined), defined);
        assert_eq!(defined.join(Span::UNDEFINED), defined);
        assert_eq!(Span::new(1, 4).join(defined), Span::new(1, 7));
    }
}
