//! Match configuration model, normalization and validation for get5.
//!
//! This crate turns loosely written get5 match documents into canonical,
//! safe-to-display JSON:
//!
//! - [`Match`]: the root document, with [`MatchTeam`], [`Players`] and
//!   [`Spectators`].
//! - [`decode_players`]: decodes a roster that may be a list of identifiers
//!   or a map of identifier to display name.
//! - [`normalize_match`]: trims, truncates, clamps, defaults and
//!   de-duplicates. Never fails.
//! - [`collect_issues`] / [`validate_match`]: checks cross-field invariants
//!   and reports every violation at once.
//! - [`MatchOverrides`] and [`prepare_match`]: apply caller overrides and
//!   run the whole pipeline.
//!
//! # Example
//!
//! ```
//! use get5_config_core::*;
//!
//! let raw = br#"{
//!     "matchid": "lan-2024",
//!     "maplist": ["de_nuke", "  ", "de_inferno", "de_mirage"],
//!     "side_type": "ALWAYS_KNIFE",
//!     "team1": {"name": "Alpha   Squad", "players": ["steam_1:0:1", "STEAM_1:0:1"]},
//!     "team2": {"name": "Bravo", "players": {"steam_1:0:2": " Bee "}}
//! }"#;
//!
//! let doc = process_match(raw, &MatchOverrides::default()).unwrap();
//! assert_eq!(doc.num_maps, Some(3));
//! assert_eq!(doc.side_type(), SideType::AlwaysKnife);
//!
//! let team1 = doc.team1.as_ref().unwrap();
//! assert_eq!(team1.name, "Alpha_Squad");
//! assert_eq!(team1.players.len(), 1);
//! assert!(encode_match(&doc).is_ok());
//! ```

mod engine;
mod error;
mod normalize;
mod overrides;
mod printable;
mod roster;
mod types;
mod validate;

pub use engine::{decode_match, encode_match, prepare_match, process_match};
pub use error::{MatchError, OverrideError, Result, RosterError};
pub use normalize::{
    DEFAULT_COACHES_PER_TEAM, DEFAULT_MIN_PLAYERS_TO_READY, DEFAULT_MIN_SPECTATORS_TO_READY,
    DEFAULT_PLAYERS_PER_TEAM, MAX_MIN_PLAYERS_TO_READY, PLAYER_COUNT_SENTINEL, normalize_match,
    normalize_team,
};
pub use overrides::{MatchOverrides, TeamOverrides};
pub use printable::sanitize_printable;
pub use roster::{Players, Spectators, decode_players};
pub use types::*;
pub use validate::{ValidationIssue, collect_issues, validate_match};
