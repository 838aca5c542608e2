use kestrel_error::CompileError;
use kestrel_types::Span;
use serde::Deserialize;

/// Options for serializing one unit.
///
/// ```toml
/// externally-visible-only = true
/// synthetic-offsets = { start = -1, end = -1 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SerializationConfig {
    /// Leave the unit's private declarations out of its own declaration section.
    pub externally_visible_only: bool,
    /// Offsets stamped on every declaration synthesized while serializing.
    pub synthetic_offsets: Span,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            externally_visible_only: false,
            synthetic_offsets: Span::UNDEFINED,
        }
    }
}

impl SerializationConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, CompileError> {
        toml::from_str(source).map_err(|err| CompileError::Encoding(err.to_string()))
    }

    pub fn externally_visible_only(self, a: bool) -> Self {
        Self {
            externally_visible_only: a,
            ..self
        }
    }

    pub fn synthetic_offsets(self, a: Span) -> Self {
        Self {
            synthetic_offsets: a,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_toml() {
        let config = SerializationConfig::from_toml_str(
            r#"
            externally-visible-only = true
            synthetic-offsets = { start = 3, end = 9 }
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            SerializationConfig::default()
                .externally_visible_only(true)
                .synthetic_offsets(Span::new(3, 9))
        );
    }

    #[test]
    fn defaults() {
        let config = SerializationConfig::from_toml_str("").unwrap();
        assert!(!config.externally_visible_only);
        assert!(config.synthetic_offsets.is_undefined());
        assert!(SerializationConfig::from_toml_str("unknown = 1").is_err());
    }
}
