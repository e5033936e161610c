use std::collections::HashMap;

use crate::espn_fetch::{RawMatchup, RawTeam};

/// One side of a normalized matchup, fully resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
    pub logo_url: String,
}

/// A single week's head-to-head pairing. Both scores exactly zero means the
/// matchup has not been played yet; one nonzero side is enough to count it.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyMatchup {
    pub week: u32,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_score: f64,
    pub away_score: f64,
}

impl WeeklyMatchup {
    pub fn is_played(&self) -> bool {
        self.home_score != 0.0 || self.away_score != 0.0
    }

    /// Sides in home-then-away order: (team, own score, opponent score).
    pub fn sides(&self) -> [(&TeamRef, f64, f64); 2] {
        [
            (&self.home, self.home_score, self.away_score),
            (&self.away, self.away_score, self.home_score),
        ]
    }
}

/// Team id to display data, resolved once per run before the week fetches.
/// Names and logos can change between runs, so nothing caches across runs.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    names: HashMap<u32, String>,
    logos: HashMap<u32, String>,
}

impl TeamDirectory {
    pub fn from_raw(teams: &[RawTeam]) -> Self {
        let mut directory = Self::default();
        for team in teams {
            let name = team
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .or_else(|| team.location.clone().filter(|l| !l.trim().is_empty()));
            if let Some(name) = name {
                directory.names.insert(team.id, name);
            }
            if let Some(logo) = team.logo.clone() {
                directory.logos.insert(team.id, logo);
            }
        }
        directory
    }

    /// Unresolved ids get a synthetic name rather than failing the run.
    pub fn name_of(&self, id: u32) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Team {id}"))
    }

    pub fn logo_of(&self, id: u32) -> String {
        self.logos.get(&id).cloned().unwrap_or_default()
    }

    pub fn team_ref(&self, id: u32) -> TeamRef {
        TeamRef {
            id,
            name: self.name_of(id),
            logo_url: self.logo_of(id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Upstream scores arrive with float noise; the league reads them to one
/// decimal place.
pub fn normalize_score(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Turn one fetched week into normalized matchups in upstream order. A week
/// that failed to fetch contributes an empty slice upstream of this call.
pub fn normalize_week(directory: &TeamDirectory, week: u32, raw: &[RawMatchup]) -> Vec<WeeklyMatchup> {
    raw.iter()
        .map(|m| WeeklyMatchup {
            week,
            home: directory.team_ref(m.home_team_id),
            away: directory.team_ref(m.away_team_id),
            home_score: normalize_score(m.home_score.unwrap_or(0.0)),
            away_score: normalize_score(m.away_score.unwrap_or(0.0)),
        })
        .collect()
}
