use serde::{Deserialize, Serialize};

/// A contributing player on the season-high card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayer {
    pub name: String,
    pub position: String,
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_team: Option<String>,
}

/// The single best score of the season. Only a strictly greater score ever
/// replaces the holder, so the first team to a number keeps it through ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonHighScore {
    pub team_id: u32,
    pub team_name: String,
    pub score: f64,
    pub week: u32,
    #[serde(rename = "logoURL", default)]
    pub logo_url: String,
    #[serde(default)]
    pub top_players: Vec<TopPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWinner {
    pub week: u32,
    pub team_name: String,
    pub score: f64,
    #[serde(rename = "logoURL", default)]
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminatedTeam {
    pub week: u32,
    pub team_name: String,
    pub score: f64,
    #[serde(rename = "logoURL", default)]
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnluckyTeam {
    pub team_name: String,
    pub points_against: f64,
    pub rank: u32,
    #[serde(rename = "logoURL", default)]
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_id: u32,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    #[serde(rename = "logoURL", default)]
    pub logo_url: String,
    #[serde(default)]
    pub playoff_odds: f64,
    #[serde(default)]
    pub bye_odds: f64,
    #[serde(default)]
    pub clinched_playoffs: bool,
    #[serde(default)]
    pub clinched_bye: bool,
}

impl TeamStanding {
    /// Games recorded in the ledger of win-equivalents. Under median scoring
    /// every played week adds two results, one head-to-head and one against
    /// the median.
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Ranking key used wherever a final order matters.
    pub fn win_equivalents(&self) -> f64 {
        f64::from(self.wins) + 0.5 * f64::from(self.ties)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueMedianStats {
    pub wins_above_median: u32,
    pub total_wins: u32,
    pub percentage: f64,
}

impl LeagueMedianStats {
    /// Empirical probability that a matchup winner also beat the median.
    /// Falls back to a coin flip before any result exists.
    pub fn win_probability(&self) -> f64 {
        if self.total_wins == 0 {
            0.5
        } else {
            f64::from(self.wins_above_median) / f64::from(self.total_wins)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub team_name: String,
    pub amount: i64,
    pub hits: u32,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_name: String,
    pub min_payout: i64,
    pub max_payout: i64,
}

/// The published artifact: everything the presentation layer renders, built
/// from scratch on every run and swapped in wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeDashboard {
    pub season: u32,
    pub league_id: u64,
    pub season_high_score: Option<SeasonHighScore>,
    pub weekly_high_scores: Vec<WeeklyWinner>,
    pub survivor_eliminations: Vec<EliminatedTeam>,
    pub unlucky_teams: Vec<UnluckyTeam>,
    pub standings: Vec<TeamStanding>,
    pub league_median_stats: LeagueMedianStats,
    pub ledger: Vec<LedgerRow>,
    pub team_summaries: Vec<TeamSummary>,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub errors: Vec<String>,
}
