//! # strata-model
//!
//! Resolved parameter trees with per-leaf provenance, and the deep-merge
//! engine that combines them.
//!
//! A [`ResolvedParam`] is a mapping/sequence/scalar tree where every node
//! carries an ordered list of [`ParamSource`] records: which class
//! contributed it, from what source position, and whether the contribution
//! was the first one seen ([`MergeOutcome::Origin`]), combined into an
//! existing container ([`MergeOutcome::Merged`]) or a full overwrite
//! ([`MergeOutcome::Replaced`]).
//!
//! Merging never aliases: incoming values are structurally cloned so each
//! resolved class owns its tree outright and can later be rewritten in place
//! (e.g. by reference interpolation).

mod convert;
mod merge;
mod types;

pub use convert::param_from_token;
pub use merge::merge_into;
pub use types::{ClassKind, MergeOutcome, ParamSource, ParamValue, ResolvedParam};
