//! The decode → override → normalize → validate pipeline.
//!
//! Every function here is synchronous and works on its own [`Match`]
//! value; callers that share an on-disk document between requests must
//! serialize access to it themselves.

use tracing::{debug, info};

use crate::error::{MatchError, Result};
use crate::normalize::normalize_match;
use crate::overrides::MatchOverrides;
use crate::types::Match;
use crate::validate::validate_match;

/// Maximum number of characters quoted around a decoding failure.
const FRAGMENT_RADIUS: usize = 24;

/// Decodes a match document from JSON bytes.
///
/// The result is not normalized.
///
/// # Errors
///
/// Returns [`MatchError::Malformed`] with the text around the failure when
/// the bytes are not a valid match document, including when a roster field
/// matches neither accepted shape.
///
/// # Examples
///
/// ```
/// use get5_config_core::{MatchError, decode_match};
///
/// let doc = decode_match(br#"{"maplist": ["de_nuke"]}"#).unwrap();
/// assert_eq!(doc.map_list, ["de_nuke"]);
///
/// let err = decode_match(br#"{"maplist": [], "team1": {"players": true}}"#).unwrap_err();
/// assert!(matches!(err, MatchError::Malformed { .. }));
/// ```
pub fn decode_match(raw: &[u8]) -> Result<Match> {
    serde_json::from_slice(raw).map_err(|source| {
        let (line, column) = (source.line(), source.column());
        MatchError::Malformed {
            fragment: fragment_at(raw, line, column),
            line,
            column,
            source,
        }
    })
}

/// Encodes a match document as pretty-printed JSON.
///
/// Output is deterministic: fields are emitted in declaration order and maps
/// in key order.
///
/// # Errors
///
/// Returns [`MatchError::Encode`] if serialization fails.
pub fn encode_match(doc: &Match) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(doc).map_err(MatchError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Applies overrides to a base document, normalizes it and validates it.
///
/// # Errors
///
/// Returns [`MatchError::Override`] when the override set contradicts
/// itself or the base document's veto setting, or [`MatchError::Invalid`]
/// with every issue found in the normalized document.
///
/// # Examples
///
/// ```
/// use get5_config_core::{Match, MatchOverrides, prepare_match};
///
/// let overrides = MatchOverrides {
///     map_list: Some(vec!["de_nuke".into()]),
///     ..MatchOverrides::default()
/// };
/// let doc = prepare_match(Match::default(), &overrides).unwrap();
/// assert_eq!(doc.num_maps, Some(1));
/// ```
pub fn prepare_match(base: Match, overrides: &MatchOverrides) -> Result<Match> {
    overrides.check_against(&base)?;

    let mut doc = base;
    if !overrides.is_empty() {
        debug!(?overrides, "applying overrides");
        overrides.apply(&mut doc);
    }

    normalize_match(&mut doc);
    validate_match(&doc)?;

    info!(
        match_id = doc.match_id.as_deref().unwrap_or_default(),
        maps = doc.map_list.len(),
        "match document prepared"
    );
    Ok(doc)
}

/// Decodes raw bytes and runs [`prepare_match`] on the result.
///
/// # Errors
///
/// Any error from [`decode_match`] or [`prepare_match`].
pub fn process_match(raw: &[u8], overrides: &MatchOverrides) -> Result<Match> {
    let base = decode_match(raw)?;
    prepare_match(base, overrides)
}

/// Quotes the input around a 1-based line and column.
fn fragment_at(raw: &[u8], line: usize, column: usize) -> String {
    let text = String::from_utf8_lossy(raw);
    let Some(source_line) = text.lines().nth(line.saturating_sub(1)) else {
        return String::new();
    };

    let chars: Vec<char> = source_line.chars().collect();
    let at = column.saturating_sub(1).min(chars.len());
    let start = at.saturating_sub(FRAGMENT_RADIUS);
    let end = (at + FRAGMENT_RADIUS).min(chars.len());
    chars[start..end].iter().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use crate::types::VetoFirst;

    use super::*;

    #[test]
    fn test_process_match_end_to_end() {
        let raw = br#"{
            "matchid": " final ",
            "maplist": ["de_nuke", "", "de_inferno", "de_mirage"],
            "team1": {"name": "Alpha", "players": ["steam_1:0:1"]},
            "team2": {"name": "Bravo", "players": {"steam_1:0:2": "Bee"}}
        }"#;
        let overrides = MatchOverrides {
            veto_first: Some(VetoFirst::Team2),
            ..MatchOverrides::default()
        };

        let doc = process_match(raw, &overrides).unwrap();
        assert_eq!(doc.match_id.as_deref(), Some("final"));
        assert_eq!(doc.num_maps, Some(3));
        assert_eq!(doc.veto_first, Some(VetoFirst::Team2));
        assert!(doc.team1.unwrap().players.contains("STEAM_1:0:1"));
        assert_eq!(doc.team2.unwrap().players.get("STEAM_1:0:2"), Some("Bee"));
    }

    #[test]
    fn test_process_match_reports_every_issue() {
        let raw = br#"{"maplist": ["a", "b"], "num_maps": 2}"#;
        let err = process_match(raw, &MatchOverrides::default()).unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_override_error_stops_before_normalizing() {
        let overrides = MatchOverrides {
            map_list: Some(vec!["a".into(), "b".into()]),
            ..MatchOverrides::default()
        };
        let err = prepare_match(Match::default(), &overrides).unwrap_err();
        assert!(matches!(err, MatchError::Override(_)));
    }

    #[test]
    fn test_even_map_override_over_skipping_base() {
        let base = decode_match(br#"{"maplist": ["a"], "skip_veto": true}"#).unwrap();
        let overrides = MatchOverrides {
            map_list: Some(vec!["de_nuke".into(), "de_inferno".into()]),
            ..MatchOverrides::default()
        };
        let doc = prepare_match(base, &overrides).unwrap();
        assert_eq!(doc.map_list.len(), 2);
        assert!(doc.skips_veto());
    }

    #[test]
    fn test_malformed_document_quotes_fragment() {
        let raw = br#"{"maplist": [], "team1": {"players": 42}}"#;
        match decode_match(raw).unwrap_err() {
            MatchError::Malformed { fragment, line, .. } => {
                assert_eq!(line, 1);
                assert!(fragment.contains("42"), "fragment was {fragment:?}");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            decode_match(b"not json").unwrap_err(),
            MatchError::Malformed { .. }
        ));
    }

    #[test]
    fn test_encode_is_deterministic_and_decodable() {
        let raw = br#"{"maplist": ["b"], "cvars": {"z": "1", "a": "2"}, "spectators": {"players": ["s"]}}"#;
        let doc = process_match(raw, &MatchOverrides::default()).unwrap();
        let first = encode_match(&doc).unwrap();
        let second = encode_match(&doc).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first.clone()).unwrap();
        assert!(text.find("\"a\"").unwrap() < text.find("\"z\"").unwrap());

        let reread = process_match(&first, &MatchOverrides::default()).unwrap();
        assert_eq!(encode_match(&reread).unwrap(), first);
    }
}
