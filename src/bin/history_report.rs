use std::fs;
use std::path::PathBuf;

use prize_tracker::history::{self, SeasonSnapshot};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/history_case.json"));

    let raw = fs::read_to_string(&path)?;
    let seasons: Vec<SeasonSnapshot> = serde_json::from_str(&raw)?;
    let summaries = history::build_owner_summaries(&seasons);

    println!(
        "{} seasons loaded, {} owners",
        seasons.len(),
        summaries.len()
    );
    println!(
        "{:<20} {:<24} {:>3} {:>3} {:>3} {:>6} {:>9} {:>9} {:>8} {:>4}",
        "owner", "latest team", "w", "l", "t", "win%", "pf", "pa", "waiver", "yrs"
    );
    for owner in &summaries {
        println!(
            "{:<20} {:<24} {:>3} {:>3} {:>3} {:>6.3} {:>9.1} {:>9.1} {:>8.1} {:>4}",
            owner.owner_name,
            owner.latest_team_name,
            owner.total_wins,
            owner.total_losses,
            owner.total_ties,
            owner.win_pct,
            owner.total_points_for,
            owner.total_points_against,
            owner.total_waiver_points,
            owner.seasons_participated
        );
    }

    Ok(())
}
