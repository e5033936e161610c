use anyhow::Result;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use prize_tracker::config::TrackerConfig;
use prize_tracker::dashboard::PrizeDashboard;
use prize_tracker::export;
use prize_tracker::ledger;
use prize_tracker::pipeline;
use prize_tracker::snapshot::SnapshotCache;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let cfg = TrackerConfig::from_env()?;
    let refresh = std::env::args().any(|arg| arg == "--refresh");
    let cache = SnapshotCache::new(
        SnapshotCache::default_path(cfg.league_id, cfg.season),
        cfg.snapshot_ttl_secs,
    );

    let dashboard = resolve_dashboard(&cfg, &cache, refresh)?;
    print_dashboard(&dashboard);

    if let Some(path) = &cfg.export_path {
        export::export_dashboard(&dashboard, path)?;
        println!("\nworkbook written to {}", path.display());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Serve the cached dashboard when it is still fresh, otherwise run the full
/// pipeline. A failed run falls back to a stale snapshot when one exists.
fn resolve_dashboard(
    cfg: &TrackerConfig,
    cache: &SnapshotCache,
    refresh: bool,
) -> Result<PrizeDashboard> {
    if !refresh {
        if let Some(dashboard) = cache.load_fresh() {
            return Ok(dashboard);
        }
    }
    match pipeline::run_tracker(cfg) {
        Ok(dashboard) => {
            if let Err(err) = cache.store(&dashboard) {
                warn!("failed to store snapshot: {err:#}");
            }
            Ok(dashboard)
        }
        Err(err) => match cache.load_any() {
            Some((stale, age)) => {
                warn!("run failed ({err:#}), serving snapshot {age}s old");
                Ok(stale)
            }
            None => Err(err),
        },
    }
}

fn print_dashboard(dashboard: &PrizeDashboard) {
    println!(
        "Prize tracker, season {} league {} (generated {})",
        dashboard.season, dashboard.league_id, dashboard.generated_at
    );

    println!("\nSeason high");
    match &dashboard.season_high_score {
        Some(high) => {
            println!(
                "  {} with {:.1} in week {}",
                high.team_name, high.score, high.week
            );
            for player in &high.top_players {
                println!(
                    "    {:<24} {:<5} {:>6.1}  {}",
                    player.name,
                    player.position,
                    player.points,
                    player.pro_team.as_deref().unwrap_or("-")
                );
            }
        }
        None => println!("  no scores yet"),
    }

    println!("\nWeekly winners");
    for winner in &dashboard.weekly_high_scores {
        println!(
            "  week {:>2}  {:<24} {:>7.1}",
            winner.week, winner.team_name, winner.score
        );
    }

    println!("\nSurvivor ladder");
    for elimination in &dashboard.survivor_eliminations {
        println!(
            "  week {:>2}  {:<24} {:>7.1}  eliminated",
            elimination.week, elimination.team_name, elimination.score
        );
    }
    let alive = ledger::surviving_teams(dashboard);
    if !alive.is_empty() {
        println!("  still alive: {}", alive.join(", "));
    }

    println!("\nUnlucky teams (points against)");
    for team in &dashboard.unlucky_teams {
        println!(
            "  #{}  {:<24} {:>8.1}",
            team.rank, team.team_name, team.points_against
        );
    }

    println!("\nStandings");
    println!(
        "  {:<24} {:>3} {:>3} {:>3} {:>8}  {:>8} {:>7}",
        "team", "w", "l", "t", "pf", "playoff", "bye"
    );
    for team in &dashboard.standings {
        let marker = if team.clinched_bye {
            "  clinched bye"
        } else if team.clinched_playoffs {
            "  clinched"
        } else {
            ""
        };
        println!(
            "  {:<24} {:>3} {:>3} {:>3} {:>8.1}  {:>7.1}% {:>6.1}%{}",
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
    let stats = &dashboard.league_median_stats;
    println!(
        "  median beat by {}/{} matchup winners ({:.1}%)",
        stats.wins_above_median, stats.total_wins, stats.percentage
    );

    println!("\nLedger");
    for entry in &dashboard.ledger {
        println!(
            "  {:<24} {:>6}  {} hit(s)  {}",
            entry.team_name,
            ledger::format_currency(entry.amount),
            entry.hits,
            entry.notes.join(", ")
        );
    }

    println!("\nPayout range");
    for summary in &dashboard.team_summaries {
        println!(
            "  {:<24} {:>6} to {:>6}",
            summary.team_name,
            ledger::format_currency(summary.min_payout),
            ledger::format_currency(summary.max_payout)
        );
    }

    if !dashboard.errors.is_empty() {
        println!("\nWarnings");
        for error in &dashboard.errors {
            println!("  {error}");
        }
    }
}
