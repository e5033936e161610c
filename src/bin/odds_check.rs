use std::fs;
use std::path::PathBuf;

use prize_tracker::dashboard::TeamStanding;
use prize_tracker::playoff_sim::{self, SimConfig, SIMULATIONS};
use prize_tracker::standings::{compare_rank, RemainingMatchup};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OddsCase {
    #[serde(default)]
    label: Option<String>,
    standings: Vec<TeamStanding>,
    #[serde(default)]
    remaining_matchups: Vec<RemainingMatchup>,
    #[serde(default = "default_median_probability")]
    median_win_probability: f64,
    #[serde(default)]
    trials: Option<usize>,
    #[serde(default)]
    seed: Option<u64>,
}

fn default_median_probability() -> f64 {
    0.5
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/odds_case.json"));

    let raw = fs::read_to_string(&path)?;
    let case: OddsCase = serde_json::from_str(&raw)?;

    let trials = case.trials.unwrap_or(SIMULATIONS);
    let cfg = match case.seed {
        Some(seed) => SimConfig::seeded(trials, seed),
        None => SimConfig::new(trials),
    };
    let odds = playoff_sim::simulate_playoff_odds(
        &case.standings,
        &case.remaining_matchups,
        case.median_win_probability,
        &cfg,
    );

    let mut standings = case.standings;
    playoff_sim::attach_odds(&mut standings, &odds);
    standings.sort_by(|a, b| compare_rank(a, b));

    println!(
        "{} ({} teams, {} remaining, {} trials)",
        case.label.unwrap_or_else(|| "odds check".to_string()),
        standings.len(),
        case.remaining_matchups.len(),
        cfg.trials
    );
    println!(
        "{:<24} {:>3} {:>3} {:>3} {:>8} {:>9} {:>9}",
        "team", "w", "l", "t", "pf", "playoff", "bye"
    );
    for team in &standings {
        let marker = if team.clinched_bye {
            "  clinched bye"
        } else if team.clinched_playoffs {
            "  clinched"
        } else {
            ""
        };
        println!(
            "{:<24} {:>3} {:>3} {:>3} {:>8.1} {:>8.1}% {:>8.1}%{}",
            team.team_name,
            team.wins,
            team.losses,
            team.ties,
            team.points_for,
            team.playoff_odds * 100.0,
            team.bye_odds * 100.0,
            marker
        );
    }

    Ok(())
}
