use std::collections::{BTreeSet, HashMap, HashSet};

use crate::dashboard::{LedgerRow, PrizeDashboard, TeamSummary};

pub const WEEKLY_PAYOUT: i64 = 10;
pub const SEASON_PAYOUT: i64 = 25;
pub const UNLUCKY_PAYOUT: i64 = 10;
pub const SURVIVOR_PAYOUT: i64 = 10;
pub const LONGEST_QB_TD_PAYOUT: i64 = 15;
pub const LONGEST_REC_TD_PAYOUT: i64 = 15;
pub const LONGEST_RUSH_TD_PAYOUT: i64 = 15;
pub const FIRST_PLACE_PAYOUT: i64 = 210;
pub const REGULAR_SEASON_WEEKS: u32 = 14;

/// Money already banked, keyed by team name, plus the set of weeks whose
/// weekly prize has been handed out.
#[derive(Debug, Clone, Default)]
pub struct LedgerBook {
    entries: HashMap<String, Entry>,
    paid_weeks: HashSet<u32>,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    amount: i64,
    hits: u32,
    notes: Vec<String>,
}

impl LedgerBook {
    fn add_cash(&mut self, team: &str, amount: i64, note: String) {
        if team.is_empty() {
            return;
        }
        let entry = self.entries.entry(team.to_string()).or_default();
        entry.amount += amount;
        entry.hits += 1;
        entry.notes.push(note);
    }

    pub fn earnings(&self, team: &str) -> i64 {
        self.entries.get(team).map_or(0, |entry| entry.amount)
    }

    pub fn paid_week_count(&self) -> u32 {
        self.paid_weeks.len() as u32
    }
}

/// Scan the award outputs into banked cash: a fixed amount per weekly win
/// and a one-time bonus for the season high, one note per hit.
pub fn build_ledger(dashboard: &PrizeDashboard) -> LedgerBook {
    let mut book = LedgerBook::default();
    for winner in &dashboard.weekly_high_scores {
        book.paid_weeks.insert(winner.week);
        book.add_cash(
            &winner.team_name,
            WEEKLY_PAYOUT,
            format!("Week {}", winner.week),
        );
    }
    if let Some(high) = &dashboard.season_high_score {
        book.add_cash(&high.team_name, SEASON_PAYOUT, "Season Apex".to_string());
    }
    book
}

/// Ledger rows for display, richest first, names ascending on equal money.
pub fn claimed_rows(book: &LedgerBook) -> Vec<LedgerRow> {
    let mut rows: Vec<LedgerRow> = book
        .entries
        .iter()
        .map(|(name, entry)| LedgerRow {
            team_name: name.clone(),
            amount: entry.amount,
            hits: entry.hits,
            notes: entry.notes.clone(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    rows
}

/// Every team that appears anywhere in the award data, name-ascending.
fn award_universe(dashboard: &PrizeDashboard) -> BTreeSet<String> {
    let mut teams = BTreeSet::new();
    for winner in &dashboard.weekly_high_scores {
        teams.insert(winner.team_name.clone());
    }
    for team in &dashboard.unlucky_teams {
        teams.insert(team.team_name.clone());
    }
    for team in &dashboard.survivor_eliminations {
        teams.insert(team.team_name.clone());
    }
    if let Some(high) = &dashboard.season_high_score {
        teams.insert(high.team_name.clone());
    }
    teams
}

/// Floor and ceiling per team. The floor is money already banked. The
/// ceiling adds every prize still reachable: the remaining weekly prizes,
/// the season bonus while unclaimed, the unlucky bonus while this team
/// leads points-against (or nothing has been conceded yet), the three
/// longest-touchdown bonuses, the survivor pot while still alive, and the
/// first-place pot. The floor never shrinks week over week and the ceiling
/// never grows, since prizes only move from reachable to banked or gone.
pub fn team_summaries(
    dashboard: &PrizeDashboard,
    book: &LedgerBook,
    regular_season_weeks: u32,
) -> Vec<TeamSummary> {
    let remaining = i64::from(regular_season_weeks.saturating_sub(book.paid_week_count()));

    let mut summaries: Vec<TeamSummary> = award_universe(dashboard)
        .into_iter()
        .map(|team_name| {
            let earnings = book.earnings(&team_name);
            let mut max_payout = earnings + remaining * WEEKLY_PAYOUT;

            if dashboard.season_high_score.is_none() {
                max_payout += SEASON_PAYOUT;
            }

            let leads_unlucky = dashboard
                .unlucky_teams
                .first()
                .map_or(true, |leader| leader.team_name == team_name);
            if leads_unlucky {
                max_payout += UNLUCKY_PAYOUT;
            }

            max_payout += LONGEST_QB_TD_PAYOUT + LONGEST_REC_TD_PAYOUT + LONGEST_RUSH_TD_PAYOUT;

            let eliminated = dashboard
                .survivor_eliminations
                .iter()
                .any(|e| e.team_name == team_name);
            if !eliminated {
                max_payout += SURVIVOR_PAYOUT;
            }

            max_payout += FIRST_PLACE_PAYOUT;

            TeamSummary {
                team_name,
                min_payout: earnings,
                max_payout,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.min_payout
            .cmp(&a.min_payout)
            .then_with(|| b.max_payout.cmp(&a.max_payout))
    });
    summaries
}

/// Award-universe teams not yet knocked out of the survivor pool.
pub fn surviving_teams(dashboard: &PrizeDashboard) -> Vec<String> {
    let eliminated: HashSet<&str> = dashboard
        .survivor_eliminations
        .iter()
        .map(|e| e.team_name.as_str())
        .collect();
    award_universe(dashboard)
        .into_iter()
        .filter(|team| !eliminated.contains(team.as_str()))
        .collect()
}

/// First non-empty logo for a team across the award cards, checked in
/// weekly, unlucky, survivor, season-high order.
pub fn team_logo<'a>(dashboard: &'a PrizeDashboard, team_name: &str) -> Option<&'a str> {
    let weekly = dashboard
        .weekly_high_scores
        .iter()
        .find(|w| w.team_name == team_name)
        .map(|w| w.logo_url.as_str());
    let unlucky = dashboard
        .unlucky_teams
        .iter()
        .find(|t| t.team_name == team_name)
        .map(|t| t.logo_url.as_str());
    let survivor = dashboard
        .survivor_eliminations
        .iter()
        .find(|t| t.team_name == team_name)
        .map(|t| t.logo_url.as_str());
    let high = dashboard
        .season_high_score
        .as_ref()
        .filter(|h| h.team_name == team_name)
        .map(|h| h.logo_url.as_str());

    [weekly, unlucky, survivor, high]
        .into_iter()
        .flatten()
        .find(|logo| !logo.is_empty())
}

pub fn format_currency(value: i64) -> String {
    format!("${value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{EliminatedTeam, SeasonHighScore, UnluckyTeam, WeeklyWinner};

    fn winner(week: u32, name: &str) -> WeeklyWinner {
        WeeklyWinner {
            week,
            team_name: name.to_string(),
            score: 100.0,
            logo_url: String::new(),
        }
    }

    fn high(name: &str) -> SeasonHighScore {
        SeasonHighScore {
            team_id: 1,
            team_name: name.to_string(),
            score: 150.0,
            week: 1,
            logo_url: String::new(),
            top_players: Vec::new(),
        }
    }

    fn unlucky(name: &str, rank: u32) -> UnluckyTeam {
        UnluckyTeam {
            team_name: name.to_string(),
            points_against: 500.0,
            rank,
            logo_url: String::new(),
        }
    }

    #[test]
    fn weekly_win_and_season_high_both_bank() {
        let dashboard = PrizeDashboard {
            weekly_high_scores: vec![winner(1, "Alpha")],
            season_high_score: Some(high("Alpha")),
            ..PrizeDashboard::default()
        };

        let book = build_ledger(&dashboard);
        assert_eq!(book.earnings("Alpha"), 35);
        assert_eq!(book.paid_week_count(), 1);

        let rows = claimed_rows(&book);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hits, 2);
        assert_eq!(rows[0].notes, vec!["Week 1", "Season Apex"]);
    }

    #[test]
    fn payout_ceiling_matches_the_prize_schedule() {
        // Alpha banked $35, one week left, Bravo leads points-against.
        let dashboard = PrizeDashboard {
            weekly_high_scores: vec![winner(1, "Alpha")],
            season_high_score: Some(high("Alpha")),
            unlucky_teams: vec![unlucky("Bravo", 1)],
            ..PrizeDashboard::default()
        };
        let book = build_ledger(&dashboard);

        let summaries = team_summaries(&dashboard, &book, 2);
        let alpha = summaries
            .iter()
            .find(|s| s.team_name == "Alpha")
            .expect("alpha summary");
        assert_eq!(alpha.min_payout, 35);
        // 35 + 1x10 + 0 season + 0 unlucky + 45 longest + 10 survivor + 210.
        assert_eq!(alpha.max_payout, 310);

        let bravo = summaries
            .iter()
            .find(|s| s.team_name == "Bravo")
            .expect("bravo summary");
        assert_eq!(bravo.min_payout, 0);
        // 0 + 1x10 + 0 season + 10 unlucky + 45 longest + 10 survivor + 210.
        assert_eq!(bravo.max_payout, 285);
    }

    #[test]
    fn claimed_rows_sort_by_amount_then_name() {
        let dashboard = PrizeDashboard {
            weekly_high_scores: vec![winner(1, "Zulu"), winner(2, "Echo"), winner(3, "Zulu")],
            ..PrizeDashboard::default()
        };
        let rows = claimed_rows(&build_ledger(&dashboard));
        let names: Vec<&str> = rows.iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(names, vec!["Zulu", "Echo"]);

        let tied = PrizeDashboard {
            weekly_high_scores: vec![winner(1, "Zulu"), winner(2, "Echo")],
            ..PrizeDashboard::default()
        };
        let rows = claimed_rows(&build_ledger(&tied));
        let names: Vec<&str> = rows.iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(names, vec!["Echo", "Zulu"]);
    }

    #[test]
    fn survivors_exclude_the_eliminated_and_sort_by_name() {
        let dashboard = PrizeDashboard {
            weekly_high_scores: vec![winner(1, "Delta"), winner(2, "Alpha")],
            survivor_eliminations: vec![EliminatedTeam {
                week: 1,
                team_name: "Delta".to_string(),
                score: 60.0,
                logo_url: String::new(),
            }],
            unlucky_teams: vec![unlucky("Charlie", 1)],
            ..PrizeDashboard::default()
        };
        assert_eq!(surviving_teams(&dashboard), vec!["Alpha", "Charlie"]);
    }

    #[test]
    fn logo_lookup_prefers_card_order_and_skips_blanks() {
        let mut dashboard = PrizeDashboard {
            weekly_high_scores: vec![winner(1, "Alpha")],
            unlucky_teams: vec![UnluckyTeam {
                team_name: "Alpha".to_string(),
                points_against: 400.0,
                rank: 1,
                logo_url: "https://img/unlucky.png".to_string(),
            }],
            ..PrizeDashboard::default()
        };
        // Weekly entry has a blank logo, so the unlucky card supplies it.
        assert_eq!(team_logo(&dashboard, "Alpha"), Some("https://img/unlucky.png"));

        dashboard.weekly_high_scores[0].logo_url = "https://img/weekly.png".to_string();
        assert_eq!(team_logo(&dashboard, "Alpha"), Some("https://img/weekly.png"));
        assert_eq!(team_logo(&dashboard, "Nobody"), None);
    }

    #[test]
    fn currency_renders_whole_dollars() {
        assert_eq!(format_currency(350), "$350");
        assert_eq!(format_currency(0), "$0");
    }
}
