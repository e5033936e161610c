use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TrackerConfig;
use crate::http_client::http_client;

const API_BASE: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";
const FETCH_ATTEMPTS: u32 = 3;
const RETRY_PAUSE_MS: u64 = 300;

/// NFL pro team abbreviations indexed by ESPN `proTeamId`.
const PRO_TEAM_ABBREVS: [&str; 35] = [
    "", "ATL", "BUF", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "TEN", "IND", "KC", "LV",
    "LAR", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI", "ARI", "PIT", "LAC", "SF", "SEA", "TB",
    "WSH", "CAR", "JAX", "", "", "BAL", "HOU",
];

/// League coordinates plus the private-league cookie pair.
#[derive(Debug, Clone)]
pub struct LeagueSource {
    pub league_id: u64,
    pub season: u32,
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
}

impl LeagueSource {
    pub fn from_config(cfg: &TrackerConfig) -> Self {
        Self {
            league_id: cfg.league_id,
            season: cfg.season,
            espn_s2: cfg.espn_s2.clone(),
            swid: cfg.swid.clone(),
        }
    }

    fn league_url(&self) -> String {
        format!(
            "{API_BASE}/seasons/{}/segments/0/leagues/{}",
            self.season, self.league_id
        )
    }

    fn cookie_header(&self) -> Option<String> {
        match (&self.espn_s2, &self.swid) {
            (Some(s2), Some(swid)) => Some(format!("espn_s2={s2}; SWID={swid}")),
            (Some(s2), None) => Some(format!("espn_s2={s2}")),
            (None, Some(swid)) => Some(format!("SWID={swid}")),
            (None, None) => None,
        }
    }
}

/// One team row from the `mTeam` view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTeam {
    pub id: u32,
    pub name: Option<String>,
    pub location: Option<String>,
    pub logo: Option<String>,
}

/// One schedule row from the `mMatchupScore` view for a single week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMatchup {
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_score: Option<f64>,
    pub away_score: Option<f64>,
}

/// One lineup slot from the `mBoxscore` view, resolved to display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub player_id: i64,
    pub name: String,
    pub slot: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub pro_team: Option<String>,
    pub points: f64,
}

pub fn fetch_teams(source: &LeagueSource) -> Result<Vec<RawTeam>> {
    let url = format!("{}?view=mTeam&scoringPeriodId=1", source.league_url());
    let body = get_with_retry(source, &url).context("team list fetch failed")?;
    parse_teams_json(&body)
}

pub fn fetch_week_matchups(source: &LeagueSource, week: u32) -> Result<Vec<RawMatchup>> {
    let url = format!(
        "{}?view=mMatchupScore&scoringPeriodId={week}",
        source.league_url()
    );
    let body =
        get_with_retry(source, &url).with_context(|| format!("week {week} matchup fetch failed"))?;
    parse_week_matchups_json(&body, week)
}

pub fn fetch_week_rosters(
    source: &LeagueSource,
    week: u32,
) -> Result<HashMap<u32, Vec<RosterEntry>>> {
    let url = format!(
        "{}?view=mBoxscore&scoringPeriodId={week}",
        source.league_url()
    );
    let body =
        get_with_retry(source, &url).with_context(|| format!("week {week} roster fetch failed"))?;
    parse_week_rosters_json(&body, week)
}

fn get_with_retry(source: &LeagueSource, url: &str) -> Result<String> {
    let client = http_client()?;
    let mut last_err: Option<anyhow::Error> = None;
    for attempt in 0..FETCH_ATTEMPTS {
        if attempt > 0 {
            debug!(url, attempt, "retrying espn fetch");
            thread::sleep(Duration::from_millis(RETRY_PAUSE_MS));
        }
        let mut request = client.get(url).header(header::ACCEPT, "application/json");
        if let Some(cookie) = source.cookie_header() {
            request = request.header(header::COOKIE, cookie);
        }
        match request.send().and_then(|resp| resp.error_for_status()) {
            Ok(resp) => match resp.text() {
                Ok(body) => return Ok(body),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("no response from {url}")))
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<TeamNode>,
}

#[derive(Debug, Deserialize)]
struct TeamNode {
    id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    schedule: Vec<ScheduleNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleNode {
    #[serde(default)]
    matchup_period_id: u32,
    #[serde(default)]
    home: Option<ScheduleSide>,
    #[serde(default)]
    away: Option<ScheduleSide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleSide {
    team_id: u32,
    #[serde(default)]
    total_points: Option<f64>,
    #[serde(default, rename = "rosterForCurrentScoringPeriod")]
    roster: Option<RosterBlock>,
}

#[derive(Debug, Deserialize)]
struct RosterBlock {
    #[serde(default)]
    entries: Vec<RosterNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterNode {
    #[serde(default)]
    lineup_slot_id: i32,
    #[serde(default)]
    player_pool_entry: Option<PlayerPoolEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerPoolEntry {
    #[serde(default)]
    applied_stat_total: Option<f64>,
    #[serde(default)]
    player: Option<PlayerNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerNode {
    id: i64,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    default_position_id: Option<i32>,
    #[serde(default)]
    pro_team_id: Option<usize>,
}

pub fn parse_teams_json(body: &str) -> Result<Vec<RawTeam>> {
    let response: TeamsResponse =
        serde_json::from_str(body).context("malformed mTeam response")?;
    Ok(response
        .teams
        .into_iter()
        .map(|node| {
            let name = display_name(&node);
            RawTeam {
                id: node.id,
                name,
                location: node.location,
                logo: node.logo,
            }
        })
        .collect())
}

/// Newer payloads carry a full `name`; older ones split it into location
/// plus nickname.
fn display_name(node: &TeamNode) -> Option<String> {
    if let Some(name) = node.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    match (node.location.as_deref(), node.nickname.as_deref()) {
        (Some(location), Some(nickname))
            if !location.trim().is_empty() && !nickname.trim().is_empty() =>
        {
            Some(format!("{} {}", location.trim(), nickname.trim()))
        }
        _ => None,
    }
}

/// Schedule rows for one week. Rows from other matchup periods and byes
/// (rows missing a side) are dropped.
pub fn parse_week_matchups_json(body: &str, week: u32) -> Result<Vec<RawMatchup>> {
    let response: ScheduleResponse =
        serde_json::from_str(body).context("malformed mMatchupScore response")?;
    Ok(response
        .schedule
        .into_iter()
        .filter(|node| node.matchup_period_id == week)
        .filter_map(|node| {
            let home = node.home?;
            let away = node.away?;
            Some(RawMatchup {
                home_team_id: home.team_id,
                away_team_id: away.team_id,
                home_score: home.total_points,
                away_score: away.total_points,
            })
        })
        .collect())
}

/// Rosters keyed by team id for one week's boxscore view.
pub fn parse_week_rosters_json(body: &str, week: u32) -> Result<HashMap<u32, Vec<RosterEntry>>> {
    let response: ScheduleResponse =
        serde_json::from_str(body).context("malformed mBoxscore response")?;
    let mut rosters: HashMap<u32, Vec<RosterEntry>> = HashMap::new();
    for node in response
        .schedule
        .into_iter()
        .filter(|node| node.matchup_period_id == week)
    {
        for side in [node.home, node.away].into_iter().flatten() {
            let Some(block) = side.roster else { continue };
            let entries = rosters.entry(side.team_id).or_default();
            for slot in block.entries {
                let Some(pool) = slot.player_pool_entry else {
                    continue;
                };
                let Some(player) = pool.player else { continue };
                entries.push(RosterEntry {
                    player_id: player.id,
                    name: player
                        .full_name
                        .unwrap_or_else(|| format!("Player {}", player.id)),
                    slot: slot_name(slot.lineup_slot_id),
                    position: position_name(player.default_position_id),
                    pro_team: pro_team_abbrev(player.pro_team_id),
                    points: pool.applied_stat_total.unwrap_or(0.0),
                });
            }
        }
    }
    Ok(rosters)
}

pub fn slot_name(slot_id: i32) -> String {
    let name = match slot_id {
        0 => "QB",
        2 => "RB",
        4 => "WR",
        6 => "TE",
        3 | 5 | 23 => "FLEX",
        7 => "OP",
        16 => "D/ST",
        17 => "K",
        20 => "BN",
        21 => "IR",
        other => return format!("SLOT{other}"),
    };
    name.to_string()
}

pub fn position_name(position_id: Option<i32>) -> Option<String> {
    let name = match position_id? {
        1 => "QB",
        2 => "RB",
        3 => "WR",
        4 => "TE",
        5 => "K",
        16 => "D/ST",
        _ => return None,
    };
    Some(name.to_string())
}

pub fn pro_team_abbrev(pro_team_id: Option<usize>) -> Option<String> {
    let id = pro_team_id?;
    PRO_TEAM_ABBREVS
        .get(id)
        .filter(|abbrev| !abbrev.is_empty())
        .map(|abbrev| abbrev.to_string())
}
