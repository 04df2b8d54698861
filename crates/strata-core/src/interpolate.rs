//! Reference interpolation.
//!
//! Expands `${a:b:c}` expressions inside a resolved tree against that same
//! tree, to fixpoint. Expansion never crosses nodes: a node's references
//! resolve only against its own merged parameters.

use once_cell::sync::Lazy;
use regex::Regex;
use strata_model::{ParamValue, ResolvedParam};
use strata_yaml::{Yaml, scalar_to_string};
use tracing::{debug, warn};

use crate::class::ResolvedClass;
use crate::error::{ResolveError, Result};

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("reference pattern compiles"));

/// Pass cap for the fixpoint loop. A well-formed tree settles in a handful
/// of passes; hitting the cap with substitutions still being produced means
/// a reference chain loops back on itself.
const MAX_PASSES: usize = 64;

/// Expand references in a resolved class's parameter tree.
///
/// Returns a new class sharing everything with the input except `params`,
/// which is deep-cloned and rewritten; the input is never mutated.
///
/// Substitution rules per match:
/// - a path resolving to a scalar is substituted textually; when the match
///   spans the whole string and occurs once, the leaf takes the raw scalar
///   (keeping its type)
/// - a path resolving to a mapping or sequence turns the leaf into a typed
///   [`ParamValue::Reference`] holding the normalized path, never inlined
/// - an unresolvable path substitutes null, not an error
///
/// # Errors
///
/// [`ResolveError::InterpolationCycle`] when the fixpoint loop exceeds its
/// pass cap, which only happens for self-referencing expression chains.
pub fn interpolate(class: &ResolvedClass) -> Result<ResolvedClass> {
    let mut params = class.params.clone();

    for pass in 0..MAX_PASSES {
        let mut edits = Vec::new();
        let mut path = Vec::new();
        collect_edits(&params, &params, &mut path, &mut edits);

        if edits.is_empty() {
            if pass > 0 {
                debug!(class_id = %class.id, passes = pass, "interpolation settled");
            }
            let mut interpolated = class.clone();
            interpolated.params = params;
            return Ok(interpolated);
        }

        for edit in edits {
            apply_edit(&mut params, edit);
        }
    }

    Err(ResolveError::InterpolationCycle {
        class_id: class.id.clone(),
        passes: MAX_PASSES,
    })
}

/// One path segment leading to a leaf.
#[derive(Debug, Clone)]
enum Seg {
    Key(String),
    Index(usize),
}

/// A pending rewrite of one leaf, gathered during an immutable scan.
struct Edit {
    path: Vec<Seg>,
    value: ParamValue,
    exprs: Vec<String>,
}

fn collect_edits(root: &ResolvedParam, node: &ResolvedParam, path: &mut Vec<Seg>, edits: &mut Vec<Edit>) {
    match &node.value {
        ParamValue::Mapping(entries) => {
            for (key, child) in entries {
                path.push(Seg::Key(key.clone()));
                collect_edits(root, child, path, edits);
                path.pop();
            }
        }
        ParamValue::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(Seg::Index(index));
                collect_edits(root, child, path, edits);
                path.pop();
            }
        }
        ParamValue::Scalar(Yaml::String(text)) if REFERENCE.is_match(text) => {
            if let Some(edit) = plan_edit(root, text, path) {
                edits.push(edit);
            }
        }
        ParamValue::Scalar(_) | ParamValue::Reference(_) => {}
    }
}

/// Decide how one reference-bearing string leaf is rewritten.
fn plan_edit(root: &ResolvedParam, text: &str, path: &[Seg]) -> Option<Edit> {
    let matches: Vec<(std::ops::Range<usize>, String)> = REFERENCE
        .captures_iter(text)
        .map(|cap| {
            let whole = cap.get(0).expect("match 0 always present");
            (whole.range(), cap[1].to_string())
        })
        .collect();

    let exprs: Vec<String> = matches
        .iter()
        .map(|(range, _)| text[range.clone()].to_string())
        .collect();

    // A whole-string single match keeps the target's type.
    if matches.len() == 1 && matches[0].0 == (0..text.len()) {
        let target_path = normalize_path(&matches[0].1);
        let value = match lookup(root, &target_path) {
            None => ParamValue::Scalar(Yaml::Null),
            Some(target) => match &target.value {
                ParamValue::Scalar(yaml) => ParamValue::Scalar(yaml.clone()),
                ParamValue::Reference(existing) => ParamValue::Reference(existing.clone()),
                ParamValue::Mapping(_) | ParamValue::Sequence(_) => {
                    ParamValue::Reference(target_path)
                }
            },
        };
        return Some(Edit {
            path: path.to_vec(),
            value,
            exprs,
        });
    }

    // Embedded or repeated matches combine into one string.
    let mut result = String::new();
    let mut cursor = 0;
    for (range, expr) in &matches {
        result.push_str(&text[cursor..range.start]);
        let target_path = normalize_path(expr);
        match lookup(root, &target_path).map(|t| &t.value) {
            Some(ParamValue::Scalar(yaml)) => result.push_str(&scalar_to_string(yaml)),
            Some(ParamValue::Mapping(_) | ParamValue::Sequence(_) | ParamValue::Reference(_)) => {
                // Non-scalar targets are never flattened into a string.
                warn!(expr = %expr, "embedded reference to non-scalar value, dropping");
            }
            None => {}
        }
        cursor = range.end;
    }
    result.push_str(&text[cursor..]);

    Some(Edit {
        path: path.to_vec(),
        value: ParamValue::Scalar(Yaml::String(result)),
        exprs,
    })
}

/// Resolve a colon-delimited path from the tree root. Sequence elements are
/// addressable by numeric segment.
fn lookup<'a>(root: &'a ResolvedParam, path: &str) -> Option<&'a ResolvedParam> {
    let mut current = root;
    for segment in path.split(':') {
        current = match &current.value {
            ParamValue::Mapping(entries) => entries.get(segment)?,
            ParamValue::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn normalize_path(expr: &str) -> String {
    expr.split(':').map(str::trim).collect::<Vec<_>>().join(":")
}

fn apply_edit(root: &mut ResolvedParam, edit: Edit) {
    let mut current = root;
    for seg in &edit.path {
        current = match (seg, &mut current.value) {
            (Seg::Key(key), ParamValue::Mapping(entries)) => match entries.get_mut(key) {
                Some(child) => child,
                None => return,
            },
            (Seg::Index(index), ParamValue::Sequence(items)) => match items.get_mut(*index) {
                Some(child) => child,
                None => return,
            },
            _ => return,
        };
    }
    current.value = edit.value;
    current.references.extend(edit.exprs);
}
