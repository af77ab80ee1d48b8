//! Caller-supplied field overrides.
//!
//! An override set is a partial match document: every field that is `Some`
//! replaces the corresponding field of the base document. Overrides are
//! applied before normalization, so they go through the same sanitizing as
//! the base document.

use crate::error::OverrideError;
use crate::types::{Match, MatchTeam, SideType, VetoFirst};

/// Overrides for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamOverrides {
    /// Replaces the team name.
    pub name: Option<String>,
    /// Replaces the team tag.
    pub tag: Option<String>,
    /// Replaces the team flag.
    pub flag: Option<String>,
    /// Replaces the series score.
    pub series_score: Option<i64>,
}

impl TeamOverrides {
    /// Returns `true` if no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, team: &mut Option<MatchTeam>) {
        if self.is_empty() {
            return;
        }
        let team = team.get_or_insert_with(MatchTeam::default);
        if let Some(name) = &self.name {
            team.name = name.clone();
        }
        if let Some(tag) = &self.tag {
            team.tag = tag.clone();
        }
        if let Some(flag) = &self.flag {
            team.flag = flag.clone();
        }
        if let Some(score) = self.series_score {
            team.series_score = score;
        }
    }
}

/// A partial match document applied onto a base document.
///
/// # Examples
///
/// ```
/// use get5_config_core::{Match, MatchOverrides};
///
/// let overrides = MatchOverrides {
///     match_id: Some("scrim-42".into()),
///     map_list: Some(vec!["de_nuke".into(), "de_ancient".into(), "de_anubis".into()]),
///     ..MatchOverrides::default()
/// };
/// overrides.check().unwrap();
///
/// let mut doc = Match::default();
/// overrides.apply(&mut doc);
/// assert_eq!(doc.match_id.as_deref(), Some("scrim-42"));
/// assert_eq!(doc.map_list.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOverrides {
    /// Replaces `matchid`.
    pub match_id: Option<String>,
    /// Replaces `match_title`.
    pub match_title: Option<String>,
    /// Replaces `maplist`.
    pub map_list: Option<Vec<String>>,
    /// Replaces `num_maps`, marking it as explicitly provided.
    pub num_maps: Option<i64>,
    /// Replaces `skip_veto`.
    pub skip_veto: Option<bool>,
    /// Replaces `veto_first`.
    pub veto_first: Option<VetoFirst>,
    /// Replaces `side_type`.
    pub side_type: Option<SideType>,
    /// Replaces `players_per_team`.
    pub players_per_team: Option<i64>,
    /// Replaces `min_players_to_ready`.
    pub min_players_to_ready: Option<i64>,
    /// Replaces `min_spectators_to_ready`.
    pub min_spectators_to_ready: Option<i64>,
    /// Overrides for team 1.
    pub team1: TeamOverrides,
    /// Overrides for team 2.
    pub team2: TeamOverrides,
}

impl MatchOverrides {
    /// Returns `true` if no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Rejects override sets that contradict themselves.
    ///
    /// A map list override must name at least one map and, unless the same
    /// override set skips the veto, an odd number of maps. A map count
    /// override must be a positive odd number.
    ///
    /// # Errors
    ///
    /// Returns the first [`OverrideError`] found.
    pub fn check(&self) -> Result<(), OverrideError> {
        self.check_skipping_veto(false)
    }

    /// Like [`check`](Self::check), but an even map list is also accepted
    /// when `base` skips the veto and the overrides leave `skip_veto` alone.
    ///
    /// # Errors
    ///
    /// Returns the first [`OverrideError`] found.
    pub fn check_against(&self, base: &Match) -> Result<(), OverrideError> {
        self.check_skipping_veto(base.skips_veto())
    }

    fn check_skipping_veto(&self, base_skips_veto: bool) -> Result<(), OverrideError> {
        if let Some(maps) = &self.map_list {
            let count = maps.iter().filter(|map| !map.trim().is_empty()).count();
            if count == 0 {
                return Err(OverrideError::EmptyMapList);
            }
            let skips_veto = self.skip_veto.unwrap_or(base_skips_veto);
            if count % 2 == 0 && !skips_veto {
                return Err(OverrideError::EvenMapList(count));
            }
        }

        if let Some(num_maps) = self.num_maps {
            if num_maps < 1 || num_maps % 2 == 0 {
                return Err(OverrideError::InvalidNumberOfMaps(num_maps));
            }
        }

        Ok(())
    }

    /// Overwrites every overridden field of `doc`.
    pub fn apply(&self, doc: &mut Match) {
        if let Some(match_id) = &self.match_id {
            doc.match_id = Some(match_id.clone());
        }
        if let Some(title) = &self.match_title {
            doc.match_title = Some(title.clone());
        }
        if let Some(maps) = &self.map_list {
            doc.map_list = maps.clone();
        }
        if let Some(num_maps) = self.num_maps {
            doc.set_num_maps(num_maps);
        }
        if let Some(skip_veto) = self.skip_veto {
            doc.skip_veto = Some(skip_veto);
        }
        if let Some(veto_first) = self.veto_first {
            doc.veto_first = Some(veto_first);
        }
        if let Some(side_type) = self.side_type {
            doc.side_type = Some(side_type);
        }
        if let Some(count) = self.players_per_team {
            doc.players_per_team = Some(count);
        }
        if let Some(count) = self.min_players_to_ready {
            doc.min_players_to_ready = Some(count);
        }
        if let Some(count) = self.min_spectators_to_ready {
            doc.min_spectators_to_ready = Some(count);
        }
        self.team1.apply(&mut doc.team1);
        self.team2.apply(&mut doc.team2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps(names: &[&str]) -> Option<Vec<String>> {
        Some(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn test_check_rejects_even_map_list() {
        let overrides = MatchOverrides {
            map_list: maps(&["a", "b", " "]),
            ..MatchOverrides::default()
        };
        assert_eq!(overrides.check(), Err(OverrideError::EvenMapList(2)));

        let overrides = MatchOverrides {
            skip_veto: Some(true),
            ..overrides
        };
        assert_eq!(overrides.check(), Ok(()));
    }

    #[test]
    fn test_check_against_honours_base_skip_veto() {
        let overrides = MatchOverrides {
            map_list: maps(&["a", "b"]),
            ..MatchOverrides::default()
        };
        let skipping = Match {
            skip_veto: Some(true),
            ..Match::default()
        };
        assert_eq!(overrides.check_against(&skipping), Ok(()));
        assert_eq!(
            overrides.check_against(&Match::default()),
            Err(OverrideError::EvenMapList(2))
        );

        let overrides = MatchOverrides {
            skip_veto: Some(false),
            ..overrides
        };
        assert_eq!(
            overrides.check_against(&skipping),
            Err(OverrideError::EvenMapList(2))
        );
    }

    #[test]
    fn test_check_rejects_empty_map_list_and_bad_count() {
        let overrides = MatchOverrides {
            map_list: maps(&["", "  "]),
            ..MatchOverrides::default()
        };
        assert_eq!(overrides.check(), Err(OverrideError::EmptyMapList));

        let overrides = MatchOverrides {
            num_maps: Some(0),
            ..MatchOverrides::default()
        };
        assert_eq!(
            overrides.check(),
            Err(OverrideError::InvalidNumberOfMaps(0))
        );
    }

    #[test]
    fn test_apply_overwrites_only_given_fields() {
        let mut doc = Match {
            match_id: Some("base".into()),
            match_title: Some("Base Title".into()),
            team2: Some(MatchTeam::named("Bravo")),
            ..Match::default()
        };
        let overrides = MatchOverrides {
            match_title: Some("Override".into()),
            num_maps: Some(3),
            veto_first: Some(VetoFirst::Team2),
            team1: TeamOverrides {
                name: Some("Alpha".into()),
                series_score: Some(1),
                ..TeamOverrides::default()
            },
            ..MatchOverrides::default()
        };

        overrides.apply(&mut doc);

        assert_eq!(doc.match_id.as_deref(), Some("base"));
        assert_eq!(doc.match_title.as_deref(), Some("Override"));
        assert_eq!(doc.num_maps, Some(3));
        assert!(!doc.num_maps_derived());
        assert_eq!(doc.veto_first, Some(VetoFirst::Team2));
        let team1 = doc.team1.as_ref().unwrap();
        assert_eq!(team1.name, "Alpha");
        assert_eq!(team1.series_score, 1);
        assert_eq!(doc.team2.as_ref().unwrap().name, "Bravo");
    }

    #[test]
    fn test_empty_team_overrides_do_not_create_team() {
        let mut doc = Match::default();
        MatchOverrides::default().apply(&mut doc);
        assert!(doc.team1.is_none());
        assert!(MatchOverrides::default().is_empty());
    }
}
