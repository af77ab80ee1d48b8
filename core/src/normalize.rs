//! Match normalization.
//!
//! [`normalize_match`] brings a decoded [`Match`] into canonical form. It
//! never rejects input: text is sanitized, counts outside their range are
//! reset to defaults, enumerations are defaulted and collections are
//! filtered. Rejection is left to the validator.
//!
//! Normalization is idempotent; normalizing an already normalized document
//! leaves it unchanged.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::printable::sanitize_printable;
use crate::types::{
    MAX_MATCH_TITLE_LEN, MAX_TEAM_FLAG_LEN, MAX_TEAM_NAME_LEN, Match, MatchTeam, SideType,
    VetoFirst,
};

/// Default for `players_per_team`.
pub const DEFAULT_PLAYERS_PER_TEAM: i64 = 5;
/// Default for `coaches_per_team`.
pub const DEFAULT_COACHES_PER_TEAM: i64 = 2;
/// Default for `min_players_to_ready`.
pub const DEFAULT_MIN_PLAYERS_TO_READY: i64 = 1;
/// Default for `min_spectators_to_ready`.
pub const DEFAULT_MIN_SPECTATORS_TO_READY: i64 = 0;
/// Largest accepted `min_players_to_ready`.
pub const MAX_MIN_PLAYERS_TO_READY: i64 = 48;
/// Head-count values at or above this are treated as unbounded and reset.
pub const PLAYER_COUNT_SENTINEL: i64 = u8::MAX as i64 - 1;

/// Normalizes a match document in place.
///
/// # Examples
///
/// ```
/// use get5_config_core::{Match, SideType, VetoFirst, normalize_match};
///
/// let mut doc: Match = serde_json::from_str(r#"{
///     "match_title": "  Grand   Final ",
///     "maplist": ["", "  de_nuke  ", "", "de_inferno\t", "de_vertigo"],
///     "side_type": "BOGUS",
///     "players_per_team": 0
/// }"#).unwrap();
///
/// normalize_match(&mut doc);
///
/// assert_eq!(doc.match_title.as_deref(), Some("Grand_Final"));
/// assert_eq!(doc.map_list, ["de_nuke", "de_inferno", "de_vertigo"]);
/// assert_eq!(doc.num_maps, Some(3));
/// assert_eq!(doc.side_type, Some(SideType::Standard));
/// assert_eq!(doc.veto_first, Some(VetoFirst::Team1));
/// assert_eq!(doc.players_per_team, Some(5));
/// ```
pub fn normalize_match(doc: &mut Match) {
    sanitize_field(&mut doc.match_id, 0);
    sanitize_field(&mut doc.match_title, MAX_MATCH_TITLE_LEN);
    sanitize_field(&mut doc.favored_percentage_text, 0);

    if doc.veto_first.is_none() {
        doc.veto_first = Some(VetoFirst::default());
    }
    if doc.side_type.is_none() {
        doc.side_type = Some(SideType::default());
    }
    if let Some(sides) = doc.map_sides.as_mut() {
        for side in sides.iter_mut() {
            *side = side.trim().to_lowercase();
        }
    }

    doc.players_per_team = Some(reset_unless(
        "players_per_team",
        doc.players_per_team,
        |n| (1..PLAYER_COUNT_SENTINEL).contains(&n),
        DEFAULT_PLAYERS_PER_TEAM,
    ));
    doc.min_players_to_ready = Some(reset_unless(
        "min_players_to_ready",
        doc.min_players_to_ready,
        |n| (1..=MAX_MIN_PLAYERS_TO_READY).contains(&n),
        DEFAULT_MIN_PLAYERS_TO_READY,
    ));
    if doc.coaches_per_team.is_some() {
        doc.coaches_per_team = Some(reset_unless(
            "coaches_per_team",
            doc.coaches_per_team,
            |n| (0..PLAYER_COUNT_SENTINEL).contains(&n),
            DEFAULT_COACHES_PER_TEAM,
        ));
    }
    if doc.min_spectators_to_ready.is_some() {
        doc.min_spectators_to_ready = Some(reset_unless(
            "min_spectators_to_ready",
            doc.min_spectators_to_ready,
            |n| (0..PLAYER_COUNT_SENTINEL).contains(&n),
            DEFAULT_MIN_SPECTATORS_TO_READY,
        ));
    }
    if let Some(pct) = doc.favored_percentage_team1.as_mut() {
        *pct = (*pct).clamp(0, 100);
    }

    doc.map_list = std::mem::take(&mut doc.map_list)
        .into_iter()
        .filter_map(|map| {
            let map = map.trim();
            (!map.is_empty()).then(|| map.to_string())
        })
        .collect();

    // A skipped veto plays the whole list, so a stored count equal to the
    // list length is the one derived on an earlier pass.
    let plays_whole_list =
        doc.skips_veto() && doc.num_maps == Some(doc.map_list.len() as i64);
    if doc.num_maps_derived || plays_whole_list || doc.num_maps.is_none_or(|n| n < 1) {
        debug!(maps = doc.map_list.len(), "deriving num_maps from the map list");
        doc.num_maps = Some(doc.map_list.len() as i64);
        doc.num_maps_derived = true;
    }

    if let Some(spectators) = doc.spectators.as_mut() {
        spectators.players = dedup_first_seen(std::mem::take(&mut spectators.players));
    }
    if doc.spectators.as_ref().is_some_and(|s| s.players.is_empty()) {
        debug!("dropping empty spectator list");
        doc.spectators = None;
    }

    if let Some(cvars) = doc.cvars.as_mut() {
        *cvars = filter_cvars(std::mem::take(cvars));
    }

    if let Some(team) = doc.team1.as_mut() {
        normalize_team(team);
    }
    if let Some(team) = doc.team2.as_mut() {
        normalize_team(team);
    }
}

/// Normalizes one team in place.
pub fn normalize_team(team: &mut MatchTeam) {
    team.name = sanitize_printable(&team.name, MAX_TEAM_NAME_LEN);
    team.tag = sanitize_printable(&team.tag, 0);
    team.flag = sanitize_printable(&team.flag, MAX_TEAM_FLAG_LEN);
    team.logo = sanitize_printable(&team.logo, 0);
    team.match_text = sanitize_printable(&team.match_text, 0);

    if team.series_score < 0 {
        debug!(score = team.series_score, "clamping negative series score");
        team.series_score = 0;
    }

    team.players.canonicalize();
    if let Some(coaches) = team.coaches.as_mut() {
        coaches.canonicalize();
    }
}

fn sanitize_field(field: &mut Option<String>, max_len: usize) {
    if let Some(value) = field.as_mut() {
        *value = sanitize_printable(value, max_len);
    }
}

fn reset_unless(
    field: &str,
    value: Option<i64>,
    accept: impl Fn(i64) -> bool,
    default: i64,
) -> i64 {
    match value {
        Some(n) if accept(n) => n,
        Some(n) => {
            debug!(field, value = n, default, "resetting out of range value");
            default
        }
        None => default,
    }
}

/// Trims entries, drops blanks and keeps the first occurrence of each.
fn dedup_first_seen(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.trim();
            (!entry.is_empty() && seen.insert(entry.to_string())).then(|| entry.to_string())
        })
        .collect()
}

/// Trims names and values, drops entries with either blank, and keeps the
/// first entry for names that collide after trimming.
fn filter_cvars(cvars: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut kept = BTreeMap::new();
    for (name, value) in &cvars {
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            debug!(name, "dropping blank cvar");
            continue;
        }
        kept.entry(name.to_string()).or_insert_with(|| value.to_string());
    }
    kept
}

#[cfg(test)]
mod tests {
    use crate::roster::{Players, Spectators, decode_players};

    use super::*;

    fn normalized(json: &str) -> Match {
        let mut doc: Match = serde_json::from_str(json).unwrap();
        normalize_match(&mut doc);
        doc
    }

    #[test]
    fn test_map_list_filtering_preserves_order_and_duplicates() {
        let doc = normalized(r#"{"maplist": ["", "  one  ", "", "two\t", "", "one"]}"#);
        assert_eq!(doc.map_list, vec!["one", "two", "one"]);
    }

    #[test]
    fn test_enum_fallbacks() {
        let doc = normalized(r#"{"maplist": [], "side_type": "BOGUS", "veto_first": ""}"#);
        assert_eq!(doc.side_type, Some(SideType::Standard));
        assert_eq!(doc.veto_first, Some(VetoFirst::Team1));

        let doc = normalized(r#"{"maplist": [], "side_type": " Never_Knife ", "veto_first": "RANDOM"}"#);
        assert_eq!(doc.side_type, Some(SideType::NeverKnife));
        assert_eq!(doc.veto_first, Some(VetoFirst::Random));
    }

    #[test]
    fn test_map_sides_are_canonicalized_not_defaulted() {
        let doc = normalized(r#"{"maplist": ["a"], "map_sides": [" KNIFE ", "bogus"]}"#);
        assert_eq!(doc.map_sides, Some(vec!["knife".to_string(), "bogus".to_string()]));
    }

    #[test]
    fn test_numeric_clamps() {
        let doc = normalized(
            r#"{"maplist": [], "players_per_team": 254, "min_players_to_ready": 49,
                "coaches_per_team": -1, "min_spectators_to_ready": 3,
                "favored_percentage_team1": 140,
                "team1": {"series_score": -2}, "team2": {"series_score": 1}}"#,
        );
        assert_eq!(doc.players_per_team, Some(DEFAULT_PLAYERS_PER_TEAM));
        assert_eq!(doc.min_players_to_ready, Some(DEFAULT_MIN_PLAYERS_TO_READY));
        assert_eq!(doc.coaches_per_team, Some(DEFAULT_COACHES_PER_TEAM));
        assert_eq!(doc.min_spectators_to_ready, Some(3));
        assert_eq!(doc.favored_percentage_team1, Some(100));
        assert_eq!(doc.team1.unwrap().series_score, 0);
        assert_eq!(doc.team2.unwrap().series_score, 1);

        let doc = normalized(r#"{"maplist": [], "players_per_team": 253, "min_players_to_ready": 48}"#);
        assert_eq!(doc.players_per_team, Some(253));
        assert_eq!(doc.min_players_to_ready, Some(48));
        assert_eq!(doc.coaches_per_team, None);
    }

    #[test]
    fn test_num_maps_derivation() {
        let doc = normalized(r#"{"maplist": ["a", "b", "c"]}"#);
        assert_eq!(doc.num_maps, Some(3));
        assert!(doc.num_maps_derived());

        let doc = normalized(r#"{"maplist": ["a", "b", "c"], "num_maps": -4}"#);
        assert_eq!(doc.num_maps, Some(3));
        assert!(doc.num_maps_derived());

        let doc = normalized(r#"{"maplist": ["a", "b", "c"], "num_maps": 1}"#);
        assert_eq!(doc.num_maps, Some(1));
        assert!(!doc.num_maps_derived());
    }

    #[test]
    fn test_stored_count_of_skipped_veto_list_counts_as_derived() {
        let doc = normalized(r#"{"maplist": ["a", "b"], "num_maps": 2, "skip_veto": true}"#);
        assert_eq!(doc.num_maps, Some(2));
        assert!(doc.num_maps_derived());

        let doc = normalized(r#"{"maplist": ["a", "b"], "num_maps": 2}"#);
        assert!(!doc.num_maps_derived());
    }

    #[test]
    fn test_blank_spectator_list_is_dropped() {
        let doc = normalized(r#"{"maplist": ["a"], "spectators": {"players": ["", "  "]}}"#);
        assert_eq!(doc.spectators, None);

        let doc = normalized(r#"{"maplist": ["a"], "spectators": {}}"#);
        assert_eq!(doc.spectators, None);
    }

    #[test]
    fn test_spectators_dedup_without_case_folding() {
        let mut doc = Match {
            spectators: Some(Spectators::new(["", " x ", "x", "X"])),
            ..Match::default()
        };
        normalize_match(&mut doc);
        assert_eq!(doc.spectators.unwrap().players, vec!["x", "X"]);
    }

    #[test]
    fn test_cvars_drop_blank_entries() {
        let doc = normalized(
            r#"{"maplist": [], "cvars": {"hostname": " LAN Final ", " ": "x", "mp_warmup": "  ", " sv_cheats ": "0"}}"#,
        );
        let cvars = doc.cvars.unwrap();
        assert_eq!(cvars.len(), 2);
        assert_eq!(cvars["hostname"], "LAN Final");
        assert_eq!(cvars["sv_cheats"], "0");
    }

    #[test]
    fn test_team_text_fields() {
        let doc = normalized(
            r#"{"maplist": [], "team1": {
                "name": "  The   Extremely  Long Team Name Of Champions  ",
                "tag": " A B ", "flag": " USA ", "logo": "lo\u0007go",
                "matchtext": " map  point "
            }}"#,
        );
        let team = doc.team1.unwrap();
        assert_eq!(team.name, "The_Extremely_Long_Team_Name_O");
        assert_eq!(team.name.chars().count(), MAX_TEAM_NAME_LEN);
        assert_eq!(team.tag, "A_B");
        assert_eq!(team.flag, "US");
        assert_eq!(team.logo, "logo");
        assert_eq!(team.match_text, "map_point");
    }

    #[test]
    fn test_short_team_name_is_not_truncated() {
        let mut team = MatchTeam::named("  Alpha   Squad   Nine  ");
        normalize_team(&mut team);
        assert_eq!(team.name, "Alpha_Squad_Nine");
    }

    #[test]
    fn test_team_rosters_are_canonical() {
        let mut team = MatchTeam {
            players: decode_players(br#"["a", "b", "A"]"#).unwrap(),
            coaches: Some(Players::new()),
            ..MatchTeam::default()
        };
        normalize_team(&mut team);
        assert_eq!(team.players.len(), 2);
        assert!(team.players.contains("a"));
        assert_eq!(team.coaches, Some(Players::new()));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut doc = normalized(
            r#"{
                "matchid": " id with spaces ",
                "match_title": "A title that is much much longer than thirty six characters",
                "maplist": [" a ", "", "b"],
                "skip_veto": true,
                "spectators": {"players": ["s", "s ", " S"]},
                "cvars": {" k ": " v "},
                "team1": {"name": "x", "players": {"p1": " Name "}},
                "team2": {"players": ["p2", "P2"]}
            }"#,
        );
        let once = doc.clone();
        normalize_match(&mut doc);
        assert_eq!(doc, once);
    }
}
