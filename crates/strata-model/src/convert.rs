//! Conversion from token trees to resolved parameters.

use crate::types::{ClassKind, MergeOutcome, ParamSource, ParamValue, ResolvedParam};
use indexmap::IndexMap;
use strata_yaml::{TokenValue, YamlToken, scalar_to_string};

/// Markers used as container previews in provenance records.
const MAPPING_PREVIEW: &str = "{…}";
const SEQUENCE_PREVIEW: &str = "[…]";

/// Build the initial `ResolvedParam` tree for one document's parameters.
///
/// Every node is seeded with exactly one provenance record marked
/// [`MergeOutcome::Origin`]; container nodes get a human-readable marker as
/// their preview instead of a value rendering.
pub fn param_from_token(token: &YamlToken, class_id: &str, kind: ClassKind) -> ResolvedParam {
    let (value, declared_type, preview) = match &token.value {
        TokenValue::Mapping(entries) => {
            let children: IndexMap<String, ResolvedParam> = entries
                .iter()
                .map(|entry| {
                    (
                        entry.key.clone(),
                        param_from_token(&entry.value, class_id, kind),
                    )
                })
                .collect();
            (ParamValue::Mapping(children), "mapping", MAPPING_PREVIEW.to_string())
        }
        TokenValue::Sequence(items) => {
            let children: Vec<ResolvedParam> = items
                .iter()
                .map(|item| param_from_token(item, class_id, kind))
                .collect();
            (ParamValue::Sequence(children), "sequence", SEQUENCE_PREVIEW.to_string())
        }
        TokenValue::Scalar(yaml) => (
            ParamValue::Scalar(yaml.clone()),
            "scalar",
            scalar_to_string(yaml),
        ),
    };

    let origin = ParamSource {
        class_id: class_id.to_string(),
        class_kind: kind,
        source: token.source.clone(),
        declared_type,
        outcome: MergeOutcome::Origin,
        preview,
        comments: token.comments.clone(),
    };

    let comments = if token.comments.is_empty() {
        Vec::new()
    } else {
        vec![token.comments.clone()]
    };

    ResolvedParam {
        value,
        sources: vec![origin],
        references: Vec::new(),
        comments,
    }
}
