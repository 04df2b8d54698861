//! The token tree produced by parsing.

use crate::SourceInfo;
use yaml_rust2::Yaml;

/// A parsed document: the root token (if any content was present) plus the
/// document's own leading comment block.
///
/// A comment block at the very top of the file, separated from the first
/// content line by a blank line, belongs to the document rather than to the
/// first node.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub root: Option<YamlToken>,
    pub comments: Vec<String>,
}

/// One node of the token tree.
///
/// Tokens are produced once per parse and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct YamlToken {
    pub value: TokenValue,
    pub source: SourceInfo,
    /// The contiguous run of `#` comment lines immediately preceding this
    /// node in the source, with the `#` marker stripped. For a mapping
    /// entry's value, the key's comments come first.
    pub comments: Vec<String>,
}

/// The structural kind of a token.
#[derive(Debug, Clone)]
pub enum TokenValue {
    /// Ordered key/value entries.
    Mapping(Vec<MapEntry>),
    /// Ordered elements.
    Sequence(Vec<YamlToken>),
    /// A primitive value.
    Scalar(Yaml),
}

/// A key/value entry of a mapping token.
#[derive(Debug, Clone)]
pub struct MapEntry {
    pub key: String,
    pub key_source: SourceInfo,
    pub value: YamlToken,
}

impl YamlToken {
    pub fn is_mapping(&self) -> bool {
        matches!(self.value, TokenValue::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.value, TokenValue::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, TokenValue::Scalar(_))
    }

    pub fn as_mapping(&self) -> Option<&[MapEntry]> {
        match &self.value {
            TokenValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[YamlToken]> {
        match &self.value {
            TokenValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Yaml> {
        match &self.value {
            TokenValue::Scalar(yaml) => Some(yaml),
            _ => None,
        }
    }

    /// Look up a mapping entry's value by key.
    pub fn get(&self, key: &str) -> Option<&YamlToken> {
        match &self.value {
            TokenValue::Mapping(entries) => entries
                .iter()
                .find(|entry| entry.key == key)
                .map(|entry| &entry.value),
            _ => None,
        }
    }

    /// Number of children (entries or elements); 0 for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            TokenValue::Mapping(entries) => entries.len(),
            TokenValue::Sequence(items) => items.len(),
            TokenValue::Scalar(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render a scalar value as text, the way it is substituted into
/// interpolated strings.
pub fn scalar_to_string(yaml: &Yaml) -> String {
    match yaml {
        Yaml::String(s) => s.clone(),
        Yaml::Integer(i) => i.to_string(),
        Yaml::Real(r) => r.clone(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(value: &str) -> YamlToken {
        YamlToken {
            value: TokenValue::Scalar(Yaml::String(value.into())),
            source: SourceInfo::default(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_mapping_lookup() {
        let token = YamlToken {
            value: TokenValue::Mapping(vec![MapEntry {
                key: "name".into(),
                key_source: SourceInfo::default(),
                value: scalar("value"),
            }]),
            source: SourceInfo::default(),
            comments: Vec::new(),
        };

        assert!(token.is_mapping());
        assert_eq!(token.len(), 1);
        assert_eq!(
            token.get("name").unwrap().as_scalar().unwrap().as_str(),
            Some("value")
        );
        assert!(token.get("missing").is_none());
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&Yaml::Integer(42)), "42");
        assert_eq!(scalar_to_string(&Yaml::Boolean(true)), "true");
        assert_eq!(scalar_to_string(&Yaml::Null), "null");
        assert_eq!(scalar_to_string(&Yaml::String("x".into())), "x");
    }
}
