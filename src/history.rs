use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::espn_fetch::RosterEntry;

/// Top-N rule for the weekly positional cutoff.
pub const TOP_POSITIONAL_SLOTS: usize = 24;

/// One historical season as fetched by the crawler, ready for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSnapshot {
    pub season_id: u32,
    pub has_roster_data: bool,
    pub teams: Vec<SeasonTeam>,
    #[serde(default)]
    pub draft_picks: Vec<i64>,
    pub weeks: Vec<SeasonWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTeam {
    pub team_id: u32,
    pub team_name: String,
    pub owner_name: String,
    #[serde(rename = "logoURL", default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonWeek {
    pub week: u32,
    pub matchups: Vec<HistoryMatchup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMatchup {
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_score: f64,
    pub away_score: f64,
    #[serde(default)]
    pub home_roster: Vec<RosterEntry>,
    #[serde(default)]
    pub away_roster: Vec<RosterEntry>,
}

impl HistoryMatchup {
    fn is_played(&self) -> bool {
        self.home_score != 0.0 || self.away_score != 0.0
    }
}

/// One owner's career line across every season they appear in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub owner_key: String,
    pub owner_name: String,
    pub latest_team_name: String,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_ties: u32,
    pub total_points_for: f64,
    pub total_points_against: f64,
    pub total_waiver_points: f64,
    pub win_pct: f64,
    pub seasons_participated: usize,
}

/// Slug for grouping the same owner across seasons: lowercase, runs of
/// non-alphanumerics collapse to a single dash, trimmed at both ends. A name
/// with nothing usable falls back to the hex of its bytes.
pub fn owner_key(value: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        let hex: String = value.bytes().map(|b| format!("{b:02x}")).collect();
        format!("owner-{hex}")
    } else {
        slug
    }
}

/// Career table over every season, newest first. The newest sighting of an
/// owner fixes their display name and latest team name; records, points and
/// waiver value accumulate over all played matchups.
pub fn build_owner_summaries(seasons: &[SeasonSnapshot]) -> Vec<OwnerSummary> {
    let mut ordered: Vec<&SeasonSnapshot> = seasons.iter().collect();
    ordered.sort_by(|a, b| b.season_id.cmp(&a.season_id));

    let mut owners: BTreeMap<String, OwnerAccumulator> = BTreeMap::new();

    for season in &ordered {
        for team in &season.teams {
            let key = owner_key(&team.owner_name);
            let acc = owners.entry(key.clone()).or_insert_with(|| {
                OwnerAccumulator::new(key, team.owner_name.clone(), team.team_name.clone())
            });
            acc.seasons.insert(season.season_id);
        }
    }

    for season in &ordered {
        let meta: HashMap<u32, &SeasonTeam> =
            season.teams.iter().map(|t| (t.team_id, t)).collect();
        let waiver = if season.has_roster_data {
            season_waiver_points(season)
        } else {
            HashMap::new()
        };

        for week in &season.weeks {
            for matchup in &week.matchups {
                if !matchup.is_played() {
                    continue;
                }
                let (Some(home), Some(away)) = (
                    meta.get(&matchup.home_team_id),
                    meta.get(&matchup.away_team_id),
                ) else {
                    continue;
                };
                let sides = [
                    (home, matchup.home_score, matchup.away_score),
                    (away, matchup.away_score, matchup.home_score),
                ];
                for (team, own, opponent) in sides {
                    let Some(acc) = owners.get_mut(&owner_key(&team.owner_name)) else {
                        continue;
                    };
                    acc.points_for += own;
                    acc.points_against += opponent;
                    match own.partial_cmp(&opponent) {
                        Some(Ordering::Greater) => acc.wins += 1,
                        Some(Ordering::Less) => acc.losses += 1,
                        _ => acc.ties += 1,
                    }
                }
            }
        }

        for (team_id, points) in waiver {
            let Some(team) = meta.get(&team_id) else {
                continue;
            };
            if let Some(acc) = owners.get_mut(&owner_key(&team.owner_name)) {
                acc.waiver_points += points;
            }
        }
    }

    let mut summaries: Vec<OwnerSummary> =
        owners.into_values().map(OwnerAccumulator::finish).collect();
    summaries.sort_by(|a, b| {
        b.win_pct
            .partial_cmp(&a.win_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_wins.cmp(&a.total_wins))
            .then_with(|| a.owner_name.cmp(&b.owner_name))
    });
    summaries
}

#[derive(Debug)]
struct OwnerAccumulator {
    owner_key: String,
    owner_name: String,
    latest_team_name: String,
    wins: u32,
    losses: u32,
    ties: u32,
    points_for: f64,
    points_against: f64,
    waiver_points: f64,
    seasons: BTreeSet<u32>,
}

impl OwnerAccumulator {
    fn new(owner_key: String, owner_name: String, latest_team_name: String) -> Self {
        Self {
            owner_key,
            owner_name,
            latest_team_name,
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            waiver_points: 0.0,
            seasons: BTreeSet::new(),
        }
    }

    fn finish(self) -> OwnerSummary {
        let games = (self.wins + self.losses + self.ties).max(1);
        let win_pct = (f64::from(self.wins) + 0.5 * f64::from(self.ties)) / f64::from(games);
        OwnerSummary {
            owner_key: self.owner_key,
            owner_name: self.owner_name,
            latest_team_name: self.latest_team_name,
            total_wins: self.wins,
            total_losses: self.losses,
            total_ties: self.ties,
            total_points_for: self.points_for,
            total_points_against: self.points_against,
            total_waiver_points: self.waiver_points,
            win_pct: round3(win_pct),
            seasons_participated: self.seasons.len(),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Weekly cutoff for one position: sort descending and take the score at the
/// top-24 boundary, or the last score when fewer than 24 players posted one.
pub fn positional_cutoff(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    sorted[sorted.len().min(TOP_POSITIONAL_SLOTS) - 1]
}

/// Season-long waiver value per team id, weeks applied in ascending order.
pub fn season_waiver_points(season: &SeasonSnapshot) -> HashMap<u32, f64> {
    let mut weeks: Vec<&SeasonWeek> = season.weeks.iter().collect();
    weeks.sort_by_key(|w| w.week);

    let mut tracker = WaiverTracker::new(&season.draft_picks);
    let mut totals: HashMap<u32, f64> = HashMap::new();
    for week in weeks {
        for (team_id, points) in tracker.score_week(&week.matchups) {
            *totals.entry(team_id).or_insert(0.0) += points;
        }
    }
    totals
}

/// Tracks which team gets credit for each undrafted pickup. A player is
/// claimed by the first team seen rostering them; a direct transfer between
/// rosters is a trade and the claim stays put, while a drop that clears
/// waivers moves the claim to whoever picks the player back up.
#[derive(Debug, Clone, Default)]
pub struct WaiverTracker {
    drafted: HashSet<i64>,
    claims: HashMap<i64, u32>,
    last_week_rosters: HashMap<i64, u32>,
    bootstrapped: bool,
}

impl WaiverTracker {
    pub fn new(draft_picks: &[i64]) -> Self {
        Self {
            drafted: draft_picks.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn claimed_by(&self, player_id: i64) -> Option<u32> {
        self.claims.get(&player_id).copied()
    }

    /// Scan one week's rosters, update the claim state, and return each
    /// team's waiver points. Weeks must arrive in ascending order because
    /// drop detection compares against the previous week's rosters. Claims
    /// and cutoffs come from every roster in the week; points only accrue
    /// for played matchups.
    pub fn score_week(&mut self, matchups: &[HistoryMatchup]) -> HashMap<u32, f64> {
        let mut current_rosters: HashMap<i64, u32> = HashMap::new();
        let mut positional_scores: HashMap<&str, Vec<f64>> = HashMap::new();

        for matchup in matchups {
            for (team_id, roster) in [
                (matchup.home_team_id, &matchup.home_roster),
                (matchup.away_team_id, &matchup.away_roster),
            ] {
                for entry in roster {
                    if let Some(position) = entry.position.as_deref() {
                        let table = tabled_position(position);
                        if !table.is_empty() && entry.points > 0.0 {
                            positional_scores.entry(table).or_default().push(entry.points);
                        }
                    }
                    if self.drafted.contains(&entry.player_id) {
                        continue;
                    }
                    current_rosters.insert(entry.player_id, team_id);
                    match self.claims.get(&entry.player_id).copied() {
                        None => {
                            self.claims.insert(entry.player_id, team_id);
                        }
                        Some(claimed_by) => {
                            match self.last_week_rosters.get(&entry.player_id).copied() {
                                // Transfer while rostered: a trade, claim stays.
                                Some(owner) if owner != team_id => {}
                                // Off every roster last week: cleared waivers.
                                None if claimed_by != team_id => {
                                    self.claims.insert(entry.player_id, team_id);
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
        }

        // Offline drafts leave the pick list empty. The first rosters seen
        // stand in for the drafted pool so opening-day starters do not
        // register as pickups.
        if !self.bootstrapped && self.drafted.is_empty() && !current_rosters.is_empty() {
            for player_id in current_rosters.keys() {
                self.drafted.insert(*player_id);
                self.claims.remove(player_id);
            }
            self.bootstrapped = true;
        }

        let cutoffs: HashMap<&str, f64> = positional_scores
            .iter()
            .map(|(position, scores)| (*position, positional_cutoff(scores)))
            .collect();

        let mut totals: HashMap<u32, f64> = HashMap::new();
        for matchup in matchups {
            if !matchup.is_played() {
                continue;
            }
            for (team_id, roster) in [
                (matchup.home_team_id, &matchup.home_roster),
                (matchup.away_team_id, &matchup.away_roster),
            ] {
                let total = totals.entry(team_id).or_insert(0.0);
                for entry in roster {
                    if matches!(entry.slot.as_str(), "BN" | "IR" | "K") {
                        continue;
                    }
                    if self.drafted.contains(&entry.player_id) {
                        continue;
                    }
                    if self.claims.get(&entry.player_id) != Some(&team_id) {
                        continue;
                    }
                    if let Some(position) = entry.position.as_deref() {
                        let cutoff = cutoffs
                            .get(tabled_position(position))
                            .copied()
                            .unwrap_or(0.0);
                        if entry.points < cutoff {
                            continue;
                        }
                    }
                    *total += entry.points;
                }
            }
        }

        self.last_week_rosters = current_rosters;
        totals
    }
}

/// The six positions with a weekly cutoff pool; anything else has no pool
/// and therefore no cutoff.
fn tabled_position(position: &str) -> &'static str {
    match position {
        "QB" => "QB",
        "RB" => "RB",
        "WR" => "WR",
        "TE" => "TE",
        "K" => "K",
        "D/ST" => "D/ST",
        _ => "",
    }
}
