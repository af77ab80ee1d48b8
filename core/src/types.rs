//! Match document model.
//!
//! This module defines the entities of a get5 match configuration and their
//! JSON shape. Field names follow the keys the get5 plugin reads; optional
//! fields are omitted from the output when unset, except `maplist` which is
//! always emitted.
//!
//! The model carries no normalization logic. A freshly decoded [`Match`] may
//! contain untrimmed text, out-of-range counts and duplicate spectators; see
//! [`normalize_match`](crate::normalize_match) and
//! [`validate_match`](crate::validate_match).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::roster::{Players, Spectators};

/// Maximum length of [`Match::match_title`] after sanitizing.
pub const MAX_MATCH_TITLE_LEN: usize = 36;
/// Maximum length of [`MatchTeam::name`] after sanitizing.
pub const MAX_TEAM_NAME_LEN: usize = 30;
/// Maximum length of [`MatchTeam::flag`] (a two letter country code).
pub const MAX_TEAM_FLAG_LEN: usize = 2;

/// Which team starts the map veto.
///
/// Parsing is case-insensitive and ignores surrounding whitespace. Unknown
/// values are not an error when decoding a document; they decode as unset
/// and the normalizer fills in [`VetoFirst::Team1`].
///
/// # Examples
///
/// ```
/// use get5_config_core::VetoFirst;
///
/// assert_eq!(" TEAM2 ".parse::<VetoFirst>(), Ok(VetoFirst::Team2));
/// assert_eq!(VetoFirst::default(), VetoFirst::Team1);
/// assert!("coin".parse::<VetoFirst>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VetoFirst {
    /// Team 1 vetoes first (the default).
    #[default]
    Team1,
    /// Team 2 vetoes first.
    Team2,
    /// The server picks at random.
    Random,
}

impl VetoFirst {
    /// Returns the JSON spelling of this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team1 => "team1",
            Self::Team2 => "team2",
            Self::Random => "random",
        }
    }
}

/// How starting sides are decided on each map.
///
/// # Examples
///
/// ```
/// use get5_config_core::SideType;
///
/// assert_eq!("Always_Knife".parse::<SideType>(), Ok(SideType::AlwaysKnife));
/// assert_eq!(SideType::default(), SideType::Standard);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SideType {
    /// The team that did not pick the map chooses its side (the default).
    #[default]
    Standard,
    /// A knife round is always played.
    AlwaysKnife,
    /// Team 1 always starts on CT.
    NeverKnife,
}

impl SideType {
    /// Returns the JSON spelling of this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::AlwaysKnife => "always_knife",
            Self::NeverKnife => "never_knife",
        }
    }
}

/// Starting side for a single map in `map_sides`.
///
/// Unlike [`VetoFirst`] and [`SideType`], an unknown map side is never
/// replaced with a default: it decides which team plays which side, so the
/// validator rejects the document instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSide {
    /// Team 1 starts as Counter-Terrorists.
    Team1Ct,
    /// Team 1 starts as Terrorists.
    Team1T,
    /// A knife round decides.
    Knife,
}

impl MapSide {
    /// All accepted map sides, in documentation order.
    pub const ALL: [MapSide; 3] = [MapSide::Team1Ct, MapSide::Team1T, MapSide::Knife];

    /// Returns the JSON spelling of this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team1Ct => "team1_ct",
            Self::Team1T => "team1_t",
            Self::Knife => "knife",
        }
    }
}

/// Error returned when a string is not a member of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value {value:?}")]
pub struct UnknownVariant {
    /// Field the value was intended for.
    pub field: &'static str,
    /// The rejected value, as given.
    pub value: String,
}

macro_rules! impl_token_enum {
    ($ty:ident, $field:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let token = raw.trim().to_lowercase();
                $(
                    if token == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )+
                Err(UnknownVariant {
                    field: $field,
                    value: raw.to_string(),
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_token_enum!(VetoFirst, "veto_first", [Team1, Team2, Random]);
impl_token_enum!(SideType, "side_type", [Standard, AlwaysKnife, NeverKnife]);
impl_token_enum!(MapSide, "map_sides", [Team1Ct, Team1T, Knife]);

/// One side of a match.
///
/// Both teams share this shape; team 1 starts as Counter-Terrorists and
/// team 2 as Terrorists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTeam {
    /// Team name (wraps `mp_teamname_#`), at most [`MAX_TEAM_NAME_LEN`]
    /// characters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Short name that replaces client clan tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    /// Two letter country code (wraps `mp_teamflag_#`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub flag: String,
    /// Team logo (wraps `mp_teamlogo_#`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub logo: String,
    /// Steam ids of the players on the team, optionally with forced names.
    #[serde(default)]
    pub players: Players,
    /// Steam ids of the team's coaches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coaches: Option<Players>,
    /// Maps already won in the series; used to give a team a head start.
    #[serde(default, deserialize_with = "null_as_default")]
    pub series_score: i64,
    /// Text shown for the team in the scoreboard (wraps `mp_teammatchstat_#`).
    #[serde(
        rename = "matchtext",
        alias = "match_text",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub match_text: String,
}

impl MatchTeam {
    /// Creates a team with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A get5 match configuration document.
///
/// # Examples
///
/// ```
/// use get5_config_core::{Match, VetoFirst};
///
/// let doc: Match = serde_json::from_str(r#"{
///     "matchid": "lan-final",
///     "maplist": ["de_inferno", "de_nuke", "de_mirage"],
///     "vetofirst": "TEAM2"
/// }"#).unwrap();
///
/// assert_eq!(doc.match_id.as_deref(), Some("lan-final"));
/// assert_eq!(doc.map_list.len(), 3);
/// assert_eq!(doc.veto_first, Some(VetoFirst::Team2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Title shown in game, at most [`MAX_MATCH_TITLE_LEN`] characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_title: Option<String>,
    /// Unique identifier of the match.
    #[serde(rename = "matchid", default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    /// Whether the series ends once a team has won a majority of maps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinch_series: Option<bool>,
    /// Number of maps in the series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_maps: Option<i64>,
    /// Maximum players per team, not counting coaches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players_per_team: Option<i64>,
    /// Maximum coaches per team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coaches_per_team: Option<i64>,
    /// Players a team needs before it can ready up.
    #[serde(
        alias = "min_player_to_ready",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_players_to_ready: Option<i64>,
    /// Spectators that must ready up before the match starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_spectators_to_ready: Option<i64>,
    /// Play the map list in order instead of running a veto.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_veto: Option<bool>,
    /// Which team starts the veto.
    #[serde(
        alias = "vetofirst",
        default,
        deserialize_with = "lenient_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub veto_first: Option<VetoFirst>,
    /// How starting sides are decided.
    #[serde(
        default,
        deserialize_with = "lenient_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub side_type: Option<SideType>,
    /// Starting side per map, as given. Checked by the validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_sides: Option<Vec<String>>,
    /// Players allowed to spectate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectators: Option<Spectators>,
    /// Maps in play (or in the veto pool).
    #[serde(rename = "maplist", default, deserialize_with = "null_as_default")]
    pub map_list: Vec<String>,
    /// Predicted win percentage for team 1 (wraps `mp_teamprediction_pct`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favored_percentage_team1: Option<i64>,
    /// Text shown with the prediction (wraps `mp_teamprediction_txt`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favored_percentage_text: Option<String>,
    /// Team starting as Counter-Terrorists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<MatchTeam>,
    /// Team starting as Terrorists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<MatchTeam>,
    /// Console variables executed during warmup, knife round and live play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvars: Option<BTreeMap<String, String>>,
    /// Set when `num_maps` was filled in from the map list rather than
    /// provided by the caller.
    #[serde(skip)]
    pub(crate) num_maps_derived: bool,
}

impl Match {
    /// Returns `true` when the veto is skipped.
    pub fn skips_veto(&self) -> bool {
        self.skip_veto.unwrap_or(false)
    }

    /// Returns the veto starter, or the default when unset.
    pub fn veto_first(&self) -> VetoFirst {
        self.veto_first.unwrap_or_default()
    }

    /// Returns the side type, or the default when unset.
    pub fn side_type(&self) -> SideType {
        self.side_type.unwrap_or_default()
    }

    /// Parses `map_sides`, failing on the first unknown entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use get5_config_core::{MapSide, Match};
    ///
    /// let mut doc = Match::default();
    /// doc.map_sides = Some(vec!["team1_ct".into(), "knife".into()]);
    /// assert_eq!(doc.map_sides().unwrap(), vec![MapSide::Team1Ct, MapSide::Knife]);
    ///
    /// doc.map_sides = Some(vec!["team2_ct".into()]);
    /// assert!(doc.map_sides().is_err());
    /// ```
    pub fn map_sides(&self) -> Result<Vec<MapSide>, UnknownVariant> {
        self.map_sides
            .iter()
            .flatten()
            .map(|side| side.parse())
            .collect()
    }

    /// Sets `num_maps` as an explicit, caller-provided value.
    pub fn set_num_maps(&mut self, num_maps: i64) {
        self.num_maps = Some(num_maps);
        self.num_maps_derived = false;
    }

    /// Returns `true` when `num_maps` was derived from the map list during
    /// normalization rather than provided by the caller.
    pub fn num_maps_derived(&self) -> bool {
        self.num_maps_derived
    }
}

/// Decodes an enumerated field, treating unknown values of any JSON type
/// as unset.
fn lenient_token<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = UnknownVariant>,
{
    let token = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(raw) => match raw.parse() {
            Ok(token) => Some(token),
            Err(err) => {
                debug!(%err, "ignoring unrecognized value");
                None
            }
        },
        other => {
            debug!(value = %other, "ignoring non-string enumerated value");
            None
        }
    };
    Ok(token)
}

/// Decodes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("Team1".parse::<VetoFirst>(), Ok(VetoFirst::Team1));
        assert_eq!(" random\t".parse::<VetoFirst>(), Ok(VetoFirst::Random));
        assert_eq!("NEVER_KNIFE".parse::<SideType>(), Ok(SideType::NeverKnife));
        assert_eq!("Team1_T".parse::<MapSide>(), Ok(MapSide::Team1T));
    }

    #[test]
    fn test_unknown_enum_value_decodes_as_unset() {
        let doc: Match =
            serde_json::from_str(r#"{"maplist": [], "side_type": "BOGUS", "veto_first": ""}"#)
                .unwrap();
        assert_eq!(doc.side_type, None);
        assert_eq!(doc.veto_first, None);
        assert_eq!(doc.side_type(), SideType::Standard);
        assert_eq!(doc.veto_first(), VetoFirst::Team1);
    }

    #[test]
    fn test_non_string_enum_value_decodes_as_unset() {
        let doc: Match = serde_json::from_str(
            r#"{"maplist": ["a"], "veto_first": 2, "side_type": true}"#,
        )
        .unwrap_or_else(|err| panic!("should decode: {err}"));
        assert_eq!(doc.veto_first, None);
        assert_eq!(doc.side_type, None);

        let doc: Match =
            serde_json::from_str(r#"{"maplist": [], "side_type": {"kind": "knife"}, "veto_first": ["team2"]}"#)
                .unwrap();
        assert_eq!(doc.side_type(), SideType::Standard);
        assert_eq!(doc.veto_first(), VetoFirst::Team1);
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let doc: Match = serde_json::from_str(
            r#"{"vetofirst": "team2", "min_player_to_ready": 3, "maplist": ["de_dust2"]}"#,
        )
        .unwrap();
        assert_eq!(doc.veto_first, Some(VetoFirst::Team2));
        assert_eq!(doc.min_players_to_ready, Some(3));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["veto_first"], "team2");
        assert_eq!(json["min_players_to_ready"], 3);
        assert!(json.get("vetofirst").is_none());
    }

    #[test]
    fn test_unset_optionals_are_omitted_but_maplist_is_not() {
        let json = serde_json::to_value(Match::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(json["maplist"], serde_json::json!([]));
    }

    #[test]
    fn test_null_maplist_decodes_as_empty() {
        let doc: Match = serde_json::from_str(r#"{"maplist": null}"#).unwrap();
        assert!(doc.map_list.is_empty());
    }

    #[test]
    fn test_set_num_maps_clears_derived_flag() {
        let mut doc = Match {
            num_maps_derived: true,
            ..Match::default()
        };
        doc.set_num_maps(3);
        assert_eq!(doc.num_maps, Some(3));
        assert!(!doc.num_maps_derived());
    }
}
