//! The deep-merge engine.

use crate::types::{MergeOutcome, ParamValue, ResolvedParam};

/// Merge `source` into `target` in place.
///
/// `target` is mutated; `source` never is, and everything taken from it is
/// cloned. The rules:
///
/// - mapping into mapping: recurse into shared keys, clone new keys in
///   verbatim; no existing key is ever dropped
/// - sequence into sequence: clones of the incoming elements are appended
///   after the existing ones
/// - any other pairing: full replace of value and type, but the accumulated
///   provenance history survives and is extended
///
/// Provenance transfer: every entry of `source.sources` except the newest is
/// appended to `target.sources` verbatim; the newest is cloned and stamped
/// with the outcome of the branch taken before being appended.
pub fn merge_into(target: &mut ResolvedParam, source: &ResolvedParam) {
    let (newest, earlier) = match source.sources.split_last() {
        Some((last, init)) => (Some(last.clone()), init),
        None => (None, &[][..]),
    };
    target.sources.extend(earlier.iter().cloned());

    // Comment groups accumulate, skipping empties and immediate repeats.
    for group in &source.comments {
        if group.is_empty() || target.comments.last() == Some(group) {
            continue;
        }
        target.comments.push(group.clone());
    }

    let outcome = match (&mut target.value, &source.value) {
        (ParamValue::Mapping(existing), ParamValue::Mapping(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(key) {
                    Some(child) => merge_into(child, value),
                    None => {
                        existing.insert(key.clone(), value.clone());
                    }
                }
            }
            MergeOutcome::Merged
        }
        (ParamValue::Sequence(existing), ParamValue::Sequence(incoming)) => {
            existing.extend(incoming.iter().cloned());
            MergeOutcome::Merged
        }
        _ => {
            target.value = source.value.clone();
            MergeOutcome::Replaced
        }
    };

    if let Some(mut newest) = newest {
        newest.outcome = outcome;
        target.sources.push(newest);
    }
}
