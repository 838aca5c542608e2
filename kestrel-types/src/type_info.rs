use serde::{Deserialize, Serialize};
use std::fmt;

use crate::FqName;

/// A resolved type as handed to the middle-end by type inference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeInfo {
    Unit,
    /// The bottom type: an expression of this type never completes normally.
    Nothing,
    Boolean,
    Int,
    Long,
    Double,
    String,
    Any {
        nullable: bool,
    },
    Class {
        fq_name: FqName,
        arguments: Vec<TypeInfo>,
        nullable: bool,
    },
    TypeParameter {
        name: String,
        nullable: bool,
    },
    /// A type which could not be resolved.
    Error,
}

impl TypeInfo {
    pub fn class(fq_name: &str) -> TypeInfo {
        TypeInfo::Class {
            fq_name: FqName::parse(fq_name),
            arguments: vec![],
            nullable: false,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, TypeInfo::Nothing)
    }

    /// True if this type, or any type argument nested within it, failed to resolve.
    pub fn is_error(&self) -> bool {
        match self {
            TypeInfo::Error => true,
            TypeInfo::Class { arguments, .. } => arguments.iter().any(TypeInfo::is_error),
            _ => false,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeInfo::Any { nullable }
            | TypeInfo::Class { nullable, .. }
            | TypeInfo::TypeParameter { nullable, .. } => *nullable,
            _ => false,
        }
    }

    /// Returns a copy of this type with the given nullability.
    ///
    /// Types without a nullable form are returned unchanged.
    pub fn with_nullability(&self, is_nullable: bool) -> TypeInfo {
        match self {
            TypeInfo::Any { .. } => TypeInfo::Any {
                nullable: is_nullable,
            },
            TypeInfo::Class {
                fq_name, arguments, ..
            } => TypeInfo::Class {
                fq_name: fq_name.clone(),
                arguments: arguments.clone(),
                nullable: is_nullable,
            },
            TypeInfo::TypeParameter { name, .. } => TypeInfo::TypeParameter {
                name: name.clone(),
                nullable: is_nullable,
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let question = |nullable: bool| if nullable { "?" } else { "" };
        match self {
            TypeInfo::Unit => f.write_str("Unit"),
            TypeInfo::Nothing => f.write_str("Nothing"),
            TypeInfo::Boolean => f.write_str("Boolean"),
            TypeInfo::Int => f.write_str("Int"),
            TypeInfo::Long => f.write_str("Long"),
            TypeInfo::Double => f.write_str("Double"),
            TypeInfo::String => f.write_str("String"),
            TypeInfo::Any { nullable } => write!(f, "Any{}", question(*nullable)),
            TypeInfo::Class {
                fq_name,
                arguments,
                nullable,
            } => {
                write!(f, "{}", fq_name.as_string())?;
                if !arguments.is_empty() {
                    let args = arguments
                        .iter()
                        .map(|arg| arg.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "<{args}>")?;
                }
                f.write_str(question(*nullable))
            }
            TypeInfo::TypeParameter { name, nullable } => {
                write!(f, "{name}{}", question(*nullable))
            }
            TypeInfo::Error => f.write_str("<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_found_in_arguments() {
        let list_of_error = TypeInfo::Class {
            fq_name: FqName::parse("kotlin.collections.List"),
            arguments: vec![TypeInfo::Error],
            nullable: false,
        };
        assert!(list_of_error.is_error());
        assert!(!TypeInfo::class("kotlin.String").is_error());
    }

    #[test]
    fn nullability_round_trip() {
        let ty = TypeInfo::class("a.B").with_nullability(true);
        assert!(ty.is_nullable());
        assert_eq!(ty.to_string(), "a.B?");
        assert!(!TypeInfo::Int.with_nullability(true).is_nullable());
    }
}
