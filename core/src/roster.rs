//! Roster decoding for `players`, `coaches` and `spectators`.
//!
//! get5 accepts a roster either as a list of Steam ids or as an object
//! mapping Steam ids to forced display names:
//!
//! ```json
//! ["STEAM_1:0:12345678", "STEAM_1:1:12345678"]
//! {"STEAM_1:0:12345678": "Ava", "STEAM_1:1:12345678": ""}
//! ```
//!
//! Decoding dispatches on the shape of the JSON value: an object is read as
//! named entries, an array as bare identifiers, and `null` as an empty
//! roster. Anything else is malformed. Each shape is collected into its own
//! buffer so a failed object decode never leaks into the list decode.
//!
//! When two entries collide after canonicalization, the first one in
//! document order is kept. The normalizer applies the same rule when it
//! re-canonicalizes a roster.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RosterError;

/// Player identifiers mapped to optional display names.
///
/// Identifiers are trimmed and upper-cased; names are trimmed. An empty name
/// means the player keeps their own name in game. Serializes as a JSON
/// object with keys in sorted order.
///
/// # Examples
///
/// ```
/// use get5_config_core::Players;
///
/// let players: Players = serde_json::from_str(r#"["steam_1:0:1", " STEAM_1:0:1 "]"#).unwrap();
/// assert_eq!(players.len(), 1);
/// assert_eq!(players.get("STEAM_1:0:1"), Some(""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Players(BTreeMap<String, String>);

impl Players {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry unless its canonical identifier is empty or already
    /// present.
    ///
    /// Returns `true` if the entry was inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use get5_config_core::Players;
    ///
    /// let mut players = Players::new();
    /// assert!(players.insert_first(" steam_1:0:7 ", " Mia "));
    /// assert!(!players.insert_first("STEAM_1:0:7", "Mason"));
    /// assert!(!players.insert_first("   ", "nobody"));
    /// assert_eq!(players.get("STEAM_1:0:7"), Some("Mia"));
    /// ```
    pub fn insert_first(&mut self, id: &str, name: &str) -> bool {
        let key = canonical_id(id);
        if key.is_empty() {
            return false;
        }
        match self.0.entry(key) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(name.trim().to_string());
                true
            }
        }
    }

    /// Looks up the display name for an identifier in canonical form.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Returns `true` if the canonical form of `id` is in the roster.
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(&canonical_id(id))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the roster has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(identifier, name)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Rebuilds the roster with every key and name re-canonicalized.
    ///
    /// Entries are revisited in identifier order and the first occurrence of
    /// each canonical identifier wins.
    pub fn canonicalize(&mut self) {
        let entries = std::mem::take(&mut self.0);
        for (id, name) in &entries {
            self.insert_first(id, name);
        }
    }
}

impl Players {
    fn from_raw(raw: RawRoster) -> Self {
        let mut players = Players::new();
        match raw {
            RawRoster::Named(entries) => {
                for (id, name) in &entries {
                    players.insert_first(id, name);
                }
            }
            RawRoster::Listed(ids) => {
                for id in &ids {
                    players.insert_first(id, "");
                }
            }
        }
        players
    }
}

impl<'de> Deserialize<'de> for Players {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawRoster::deserialize(deserializer).map(Players::from_raw)
    }
}

/// Players allowed to spectate the match.
///
/// Spectator identifiers are kept as given, in document order. They are not
/// case-folded; trimming and de-duplication happen during normalization.
/// The `players` field accepts the same list-or-object shapes as a team
/// roster, but only the identifiers are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spectators {
    /// Spectator identifiers.
    #[serde(
        default,
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub players: Vec<String>,
}

impl Spectators {
    /// Creates a spectator list from identifiers.
    pub fn new<I, S>(players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            players: players.into_iter().map(Into::into).collect(),
        }
    }
}

/// Decodes a roster from raw JSON bytes.
///
/// Empty and whitespace-only input decodes to an empty roster, as do `null`,
/// `[]` and `{}`.
///
/// # Errors
///
/// Returns [`RosterError::Malformed`] with the offending bytes when the input
/// is neither an object of strings nor an array of strings.
///
/// # Examples
///
/// ```
/// use get5_config_core::decode_players;
///
/// let players = decode_players(br#"["A", "b", "A"]"#).unwrap();
/// assert_eq!(players.iter().collect::<Vec<_>>(), vec![("A", ""), ("B", "")]);
///
/// assert!(decode_players(b"  ").unwrap().is_empty());
/// assert!(decode_players(b"true").is_err());
/// ```
pub fn decode_players(raw: &[u8]) -> Result<Players, RosterError> {
    let trimmed = trim_whitespace(raw);
    if trimmed.is_empty() {
        return Ok(Players::new());
    }

    serde_json::from_slice(trimmed).map_err(|source| RosterError::Malformed {
        raw: String::from_utf8_lossy(raw).into_owned(),
        source,
    })
}

/// Trims ASCII whitespace, including vertical tab, from both ends.
fn trim_whitespace(raw: &[u8]) -> &[u8] {
    let is_space = |b: &u8| b.is_ascii_whitespace() || *b == 0x0b;
    let start = raw.iter().position(|b| !is_space(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &raw[start..end]
}

/// Canonical form of a player identifier.
pub(crate) fn canonical_id(id: &str) -> String {
    id.trim().to_uppercase()
}

/// A roster as it appeared in the document, before canonicalization.
enum RawRoster {
    /// Object form: identifier and display name, in document order.
    Named(Vec<(String, String)>),
    /// Array form: identifiers in document order.
    Listed(Vec<String>),
}

impl RawRoster {
    fn into_ids(self) -> Vec<String> {
        match self {
            RawRoster::Named(entries) => entries.into_iter().map(|(id, _)| id).collect(),
            RawRoster::Listed(ids) => ids,
        }
    }
}

impl<'de> Deserialize<'de> for RawRoster {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawRosterVisitor)
    }
}

struct RawRosterVisitor;

impl<'de> Visitor<'de> for RawRosterVisitor {
    type Value = RawRoster;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a list of identifiers or a map of identifier to display name")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawRoster::Listed(Vec::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawRoster::Listed(Vec::new()))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((id, name)) = map.next_entry::<String, Option<String>>()? {
            entries.push((id, name.unwrap_or_default()));
        }
        Ok(RawRoster::Named(entries))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut ids = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(id) = seq.next_element::<String>()? {
            ids.push(id);
        }
        Ok(RawRoster::Listed(ids))
    }
}

fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    RawRoster::deserialize(deserializer).map(RawRoster::into_ids)
}
