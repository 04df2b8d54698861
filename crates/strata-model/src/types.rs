//! Core type definitions for resolved parameters.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_yaml::SourceInfo;
use yaml_rust2::Yaml;

/// Whether a document is a composable class or a concrete node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Node,
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Node => "node",
        }
    }
}

/// How a contribution combined with what was already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// First contribution seen for this parameter.
    Origin,
    /// Map or sequence combination.
    Merged,
    /// Scalar or cross-type overwrite.
    Replaced,
}

/// One contribution to a resolved parameter.
///
/// Immutable once created except for `outcome`, which is stamped on the
/// newest record of a merge once the merge direction is known.
#[derive(Debug, Clone)]
pub struct ParamSource {
    /// Id of the class or node the value was declared in.
    pub class_id: String,
    pub class_kind: ClassKind,
    /// Position of the declaration in its document.
    pub source: SourceInfo,
    /// Structural type declared at the origin ("mapping", "sequence", "scalar").
    pub declared_type: &'static str,
    pub outcome: MergeOutcome,
    /// Short textual rendering for display; container nodes get a marker.
    pub preview: String,
    /// Comment lines attached to the declaration.
    pub comments: Vec<String>,
}

/// The structural value of a resolved parameter.
#[derive(Debug, Clone)]
pub enum ParamValue {
    Mapping(IndexMap<String, ResolvedParam>),
    Sequence(Vec<ResolvedParam>),
    Scalar(Yaml),
    /// An interpolated leaf whose target was a mapping or sequence; holds the
    /// normalized colon-delimited path instead of inlining the subtree.
    Reference(String),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Mapping(_) => "mapping",
            ParamValue::Sequence(_) => "sequence",
            ParamValue::Scalar(_) => "scalar",
            ParamValue::Reference(_) => "reference",
        }
    }
}

/// A node of a resolved parameter tree.
#[derive(Debug, Clone)]
pub struct ResolvedParam {
    pub value: ParamValue,

    /// Provenance, oldest first. Append-only: the final entry's `outcome`
    /// describes the net effect of the last merge applied to this node.
    pub sources: Vec<ParamSource>,

    /// Raw `${...}` expressions consumed on this leaf during interpolation.
    pub references: Vec<String>,

    /// Comment groups gathered across contributions.
    pub comments: Vec<Vec<String>>,
}

impl ResolvedParam {
    /// An empty mapping with no provenance, used as a merge accumulator.
    pub fn new_mapping() -> Self {
        Self {
            value: ParamValue::Mapping(IndexMap::new()),
            sources: Vec::new(),
            references: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.value, ParamValue::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.value, ParamValue::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, ParamValue::Scalar(_))
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ResolvedParam>> {
        match &self.value {
            ParamValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ResolvedParam]> {
        match &self.value {
            ParamValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Yaml> {
        match &self.value {
            ParamValue::Scalar(yaml) => Some(yaml),
            _ => None,
        }
    }

    /// Navigate to a child by key.
    pub fn get(&self, key: &str) -> Option<&ResolvedParam> {
        self.as_mapping()?.get(key)
    }

    /// The net effect of the last merge applied to this node.
    pub fn last_outcome(&self) -> Option<MergeOutcome> {
        self.sources.last().map(|s| s.outcome)
    }

    /// Id of the class that last contributed to this node.
    pub fn last_origin(&self) -> Option<&str> {
        self.sources.last().map(|s| s.class_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_kind_names() {
        assert_eq!(ClassKind::Class.as_str(), "class");
        assert_eq!(ClassKind::Node.as_str(), "node");
    }

    #[test]
    fn test_new_mapping_is_empty() {
        let param = ResolvedParam::new_mapping();
        assert!(param.is_mapping());
        assert!(param.as_mapping().unwrap().is_empty());
        assert!(param.sources.is_empty());
        assert!(param.last_outcome().is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ParamValue::Scalar(Yaml::Null).type_name(), "scalar");
        assert_eq!(
            ParamValue::Reference("a:b".into()).type_name(),
            "reference"
        );
    }
}
