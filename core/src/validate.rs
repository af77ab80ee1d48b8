//! Match document validation.
//!
//! Checks the cross-field invariants get5 relies on once a document has been
//! normalized. Every check runs; the caller receives the complete ordered
//! list of issues rather than the first one.
//!
//! # Examples
//!
//! ```
//! use get5_config_core::*;
//!
//! let mut doc = Match::default();
//! doc.map_list = vec!["de_nuke".into(), "de_inferno".into()];
//! normalize_match(&mut doc);
//! assert_eq!(
//!     collect_issues(&doc),
//!     vec![ValidationIssue::EvenMapList(2)]
//! );
//!
//! doc.skip_veto = Some(true);
//! assert!(collect_issues(&doc).is_empty());
//! ```

use thiserror::Error;

use crate::error::MatchError;
use crate::types::{MapSide, Match};

/// A single invariant violation.
///
/// The `Display` impl gives the line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// The map list has no maps.
    #[error("map list cannot be empty")]
    EmptyMapList,
    /// The map list has an even number of maps and the veto is not skipped.
    #[error("map list has {0} maps; an odd number is required unless the veto is skipped")]
    EvenMapList(usize),
    /// An explicitly provided `num_maps` is not a positive odd number.
    #[error("num_maps must be a positive odd number, got {0}")]
    InvalidNumberOfMaps(i64),
    /// A `map_sides` entry is not a known side.
    #[error("map_sides[{index}] is {value:?}; expected one of team1_ct, team1_t, knife")]
    UnknownMapSide {
        /// Position of the entry in `map_sides`.
        index: usize,
        /// The rejected entry.
        value: String,
    },
}

/// Collects every invariant violation in a normalized match, in check order.
///
/// An empty result means the document can be handed to the game server.
/// `veto_first` and `side_type` are not checked here; the normalizer has
/// already replaced unknown values with defaults.
pub fn collect_issues(doc: &Match) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let map_count = doc.map_list.len();
    if map_count == 0 {
        issues.push(ValidationIssue::EmptyMapList);
    } else if map_count % 2 == 0 && !doc.skips_veto() {
        issues.push(ValidationIssue::EvenMapList(map_count));
    }

    if !doc.num_maps_derived() {
        if let Some(num_maps) = doc.num_maps {
            if num_maps < 1 || num_maps % 2 == 0 {
                issues.push(ValidationIssue::InvalidNumberOfMaps(num_maps));
            }
        }
    }

    for (index, side) in doc.map_sides.iter().flatten().enumerate() {
        if side.parse::<MapSide>().is_err() {
            issues.push(ValidationIssue::UnknownMapSide {
                index,
                value: side.clone(),
            });
        }
    }

    issues
}

/// Validates a normalized match.
///
/// # Errors
///
/// Returns [`MatchError::Invalid`] carrying every issue found by
/// [`collect_issues`].
pub fn validate_match(doc: &Match) -> Result<(), MatchError> {
    let issues = collect_issues(doc);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(MatchError::Invalid(issues))
    }
}
