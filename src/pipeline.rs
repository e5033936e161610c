use anyhow::{Result, bail};
use chrono::Utc;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, warn};

use crate::awards;
use crate::config::TrackerConfig;
use crate::dashboard::PrizeDashboard;
use crate::espn_fetch::{self, LeagueSource, RawMatchup};
use crate::ledger;
use crate::matchups::{self, TeamDirectory, WeeklyMatchup};
use crate::playoff_sim::{self, SimConfig};
use crate::standings;

/// One week's fetch outcome. A failed week carries its error string and an
/// empty matchup list so the season aggregation can keep going.
#[derive(Debug, Clone, Default)]
pub struct WeekResult {
    pub week: u32,
    pub matchups: Vec<RawMatchup>,
    pub error: Option<String>,
}

pub fn build_fetch_pool(parallelism: usize) -> Option<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .ok()
}

pub fn with_fetch_pool<T: Send>(pool: Option<&ThreadPool>, work: impl FnOnce() -> T + Send) -> T {
    match pool {
        Some(pool) => pool.install(work),
        None => work(),
    }
}

/// Fire every week's fetch across the pool and collect outcomes in week
/// order. Failures never unwind past their own week.
pub fn fetch_all_weeks(
    source: &LeagueSource,
    weeks: u32,
    pool: Option<&ThreadPool>,
) -> Vec<WeekResult> {
    let mut results = with_fetch_pool(pool, || {
        (1..=weeks)
            .into_par_iter()
            .map(|week| match espn_fetch::fetch_week_matchups(source, week) {
                Ok(matchups) => WeekResult {
                    week,
                    matchups,
                    error: None,
                },
                Err(err) => WeekResult {
                    week,
                    matchups: Vec::new(),
                    error: Some(format!("week {week}: {err:#}")),
                },
            })
            .collect::<Vec<_>>()
    });
    results.sort_by_key(|r| r.week);
    results
}

/// Whole-run pipeline: resolve teams, fetch the season, aggregate, simulate,
/// enrich. Only a total fetch washout is fatal; every partial failure
/// degrades into an error string on the dashboard.
pub fn run_tracker(cfg: &TrackerConfig) -> Result<PrizeDashboard> {
    let source = LeagueSource::from_config(cfg);

    let mut errors: Vec<String> = Vec::new();
    let directory = match espn_fetch::fetch_teams(&source) {
        Ok(teams) => TeamDirectory::from_raw(&teams),
        Err(err) => {
            warn!("team resolution failed, using synthetic names: {err:#}");
            errors.push(format!("team resolution: {err:#}"));
            TeamDirectory::default()
        }
    };

    let pool = build_fetch_pool(cfg.fetch_parallelism);
    let week_results = fetch_all_weeks(&source, cfg.regular_season_weeks, pool.as_ref());
    if week_results.iter().all(|r| r.error.is_some()) {
        bail!("all {} week fetches failed", week_results.len());
    }

    let mut dashboard = assemble_dashboard(cfg, &directory, &week_results, errors);
    enrich_season_high(&source, &mut dashboard);
    info!(
        teams = dashboard.standings.len(),
        weeks = dashboard.weekly_high_scores.len(),
        errors = dashboard.errors.len(),
        "dashboard assembled"
    );
    Ok(dashboard)
}

/// Pure assembly over pre-fetched weeks: normalize, run every aggregation,
/// and stitch the published dashboard together.
pub fn assemble_dashboard(
    cfg: &TrackerConfig,
    directory: &TeamDirectory,
    weeks: &[WeekResult],
    mut errors: Vec<String>,
) -> PrizeDashboard {
    let mut all_matchups: Vec<WeeklyMatchup> = Vec::new();
    for result in weeks {
        if let Some(err) = &result.error {
            errors.push(err.clone());
        }
        all_matchups.extend(matchups::normalize_week(
            directory,
            result.week,
            &result.matchups,
        ));
    }

    let bundle = awards::aggregate_awards(&all_matchups);
    let standings_bundle = standings::compute_standings(&all_matchups);

    let mut standings = standings_bundle.standings;
    let odds = playoff_sim::simulate_playoff_odds(
        &standings,
        &standings_bundle.remaining,
        standings_bundle.median_stats.win_probability(),
        &SimConfig::new(cfg.simulations),
    );
    playoff_sim::attach_odds(&mut standings, &odds);

    let mut dashboard = PrizeDashboard {
        season: cfg.season,
        league_id: cfg.league_id,
        season_high_score: bundle.season_high,
        weekly_high_scores: bundle.weekly_winners,
        survivor_eliminations: bundle.eliminations,
        unlucky_teams: bundle.unlucky_teams,
        standings,
        league_median_stats: standings_bundle.median_stats,
        ledger: Vec::new(),
        team_summaries: Vec::new(),
        generated_at: Utc::now().to_rfc3339(),
        errors,
    };

    let book = ledger::build_ledger(&dashboard);
    let summaries = ledger::team_summaries(&dashboard, &book, cfg.regular_season_weeks);
    dashboard.ledger = ledger::claimed_rows(&book);
    dashboard.team_summaries = summaries;
    dashboard
}

/// Fill in the season-high top players with one roster fetch for the
/// record-holding week. A miss leaves the record intact without players.
pub fn enrich_season_high(source: &LeagueSource, dashboard: &mut PrizeDashboard) {
    let Some((team_id, week)) = dashboard
        .season_high_score
        .as_ref()
        .map(|high| (high.team_id, high.week))
    else {
        return;
    };
    match espn_fetch::fetch_week_rosters(source, week) {
        Ok(rosters) => {
            let players = rosters
                .get(&team_id)
                .map(|entries| awards::top_players(entries))
                .unwrap_or_default();
            if let Some(high) = dashboard.season_high_score.as_mut() {
                high.top_players = players;
            }
        }
        Err(err) => {
            warn!("season high roster lookup failed: {err:#}");
            dashboard
                .errors
                .push(format!("season high roster: {err:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::espn_fetch::RawTeam;

    fn test_config() -> TrackerConfig {
        TrackerConfig {
            league_id: 7,
            season: 2025,
            espn_s2: None,
            swid: None,
            regular_season_weeks: 3,
            snapshot_ttl_secs: 0,
            fetch_parallelism: 2,
            simulations: 100,
            export_path: None,
        }
    }

    fn directory() -> TeamDirectory {
        TeamDirectory::from_raw(&[
            RawTeam {
                id: 1,
                name: Some("Alpha".to_string()),
                location: None,
                logo: None,
            },
            RawTeam {
                id: 2,
                name: Some("Bravo".to_string()),
                location: None,
                logo: None,
            },
        ])
    }

    fn week(week: u32, home_score: f64, away_score: f64) -> WeekResult {
        WeekResult {
            week,
            matchups: vec![RawMatchup {
                home_team_id: 1,
                away_team_id: 2,
                home_score: Some(home_score),
                away_score: Some(away_score),
            }],
            error: None,
        }
    }

    #[test]
    fn failed_weeks_surface_as_errors_not_aborts() {
        let weeks = vec![
            week(1, 100.0, 90.0),
            WeekResult {
                week: 2,
                matchups: Vec::new(),
                error: Some("week 2: timed out".to_string()),
            },
            week(3, 0.0, 0.0),
        ];

        let dashboard = assemble_dashboard(&test_config(), &directory(), &weeks, Vec::new());
        assert_eq!(dashboard.errors, vec!["week 2: timed out"]);
        assert_eq!(dashboard.weekly_high_scores.len(), 1);
        assert_eq!(dashboard.standings.len(), 2);
        assert_eq!(dashboard.season, 2025);
        assert_eq!(dashboard.league_id, 7);
    }

    #[test]
    fn assembled_dashboard_wires_awards_through_the_ledger() {
        let weeks = vec![week(1, 100.0, 90.0), week(2, 80.0, 95.0)];
        let dashboard = assemble_dashboard(&test_config(), &directory(), &weeks, Vec::new());

        let high = dashboard.season_high_score.as_ref().expect("season high");
        assert_eq!(high.team_name, "Alpha");
        assert_eq!(high.score, 100.0);

        // Alpha banked week 1 plus the season high, Bravo banked week 2.
        let alpha = dashboard
            .ledger
            .iter()
            .find(|r| r.team_name == "Alpha")
            .expect("alpha ledger row");
        assert_eq!(alpha.amount, 35);
        let bravo = dashboard
            .ledger
            .iter()
            .find(|r| r.team_name == "Bravo")
            .expect("bravo ledger row");
        assert_eq!(bravo.amount, 10);
        assert_eq!(dashboard.team_summaries.len(), 2);
    }
}
