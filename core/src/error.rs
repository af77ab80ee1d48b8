//! Error types for decoding, preparing and validating match documents.

use thiserror::Error;

use crate::validate::ValidationIssue;

/// A roster value matched neither the list nor the object shape.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The raw bytes could not be decoded as a roster.
    #[error("malformed roster {raw:?}: {source}")]
    Malformed {
        /// The offending input, lossily decoded as UTF-8.
        raw: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// The override set contradicts itself before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// The map list override has no non-blank entries.
    #[error("map list override has no maps")]
    EmptyMapList,
    /// The map list override has an even number of maps and the veto is not
    /// skipped.
    #[error("map list override has {0} maps; an odd number is required unless the veto is skipped")]
    EvenMapList(usize),
    /// The map count override is not a positive odd number.
    #[error("number of maps override must be a positive odd number, got {0}")]
    InvalidNumberOfMaps(i64),
}

/// Errors produced while turning input into a usable match document.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The input is not a valid match document (bad JSON, wrong field types
    /// or a malformed roster).
    #[error("malformed match document at line {line}, column {column} near {fragment:?}: {source}")]
    Malformed {
        /// Input text around the failure point.
        fragment: String,
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be encoded as JSON.
    #[error("couldn't encode match document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The override set was rejected.
    #[error("invalid overrides: {0}")]
    Override(#[from] OverrideError),

    /// The normalized document violates one or more invariants.
    #[error("match document has {} validation issue(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),
}

impl MatchError {
    /// Returns the validation issues when this is [`MatchError::Invalid`].
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            MatchError::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

/// Convenience alias for results with [`MatchError`].
pub type Result<T> = std::result::Result<T, MatchError>;
