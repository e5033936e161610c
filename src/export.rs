use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dashboard::PrizeDashboard;
use crate::ledger;

/// Write the dashboard as a workbook: one sheet each for standings, awards
/// and the money picture.
pub fn export_dashboard(dashboard: &PrizeDashboard, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Standings")?;
    write_rows(sheet, &standings_rows(dashboard))?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Awards")?;
    write_rows(sheet, &awards_rows(dashboard))?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Ledger")?;
    write_rows(sheet, &ledger_rows(dashboard))?;

    workbook
        .save(path)
        .with_context(|| format!("saving workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(sheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (r, cells) in rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            sheet
                .write_string(r as u32, c as u16, cell)
                .with_context(|| format!("writing cell ({r},{c})"))?;
        }
    }
    Ok(())
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn format_pct(odds: f64) -> String {
    format!("{:.1}%", odds * 100.0)
}

fn standings_rows(dashboard: &PrizeDashboard) -> Vec<Vec<String>> {
    let mut rows = vec![row(&[
        "Team",
        "W",
        "L",
        "T",
        "PF",
        "Playoff %",
        "Bye %",
        "Clinched",
    ])];
    for team in &dashboard.standings {
        let clinched = if team.clinched_bye {
            "bye"
        } else if team.clinched_playoffs {
            "playoffs"
        } else {
            ""
        };
        rows.push(vec![
            team.team_name.clone(),
            team.wins.to_string(),
            team.losses.to_string(),
            team.ties.to_string(),
            format!("{:.1}", team.points_for),
            format_pct(team.playoff_odds),
            format_pct(team.bye_odds),
            clinched.to_string(),
        ]);
    }
    rows
}

fn awards_rows(dashboard: &PrizeDashboard) -> Vec<Vec<String>> {
    let mut rows = vec![row(&["Season High"]), row(&["Team", "Score", "Week"])];
    if let Some(high) = &dashboard.season_high_score {
        rows.push(vec![
            high.team_name.clone(),
            format!("{:.1}", high.score),
            high.week.to_string(),
        ]);
        for player in &high.top_players {
            rows.push(vec![
                format!("  {}", player.name),
                format!("{:.1}", player.points),
                player.position.clone(),
            ]);
        }
    }

    rows.push(Vec::new());
    rows.push(row(&["Weekly Winners"]));
    rows.push(row(&["Week", "Team", "Score"]));
    for winner in &dashboard.weekly_high_scores {
        rows.push(vec![
            winner.week.to_string(),
            winner.team_name.clone(),
            format!("{:.1}", winner.score),
        ]);
    }

    rows.push(Vec::new());
    rows.push(row(&["Survivor Eliminations"]));
    rows.push(row(&["Week", "Team", "Score"]));
    for elimination in &dashboard.survivor_eliminations {
        rows.push(vec![
            elimination.week.to_string(),
            elimination.team_name.clone(),
            format!("{:.1}", elimination.score),
        ]);
    }

    rows.push(Vec::new());
    rows.push(row(&["Unlucky Ranking"]));
    rows.push(row(&["Rank", "Team", "Points Against"]));
    for team in &dashboard.unlucky_teams {
        rows.push(vec![
            team.rank.to_string(),
            team.team_name.clone(),
            format!("{:.1}", team.points_against),
        ]);
    }
    rows
}

fn ledger_rows(dashboard: &PrizeDashboard) -> Vec<Vec<String>> {
    let mut rows = vec![row(&["Team", "Banked", "Hits", "Notes"])];
    for entry in &dashboard.ledger {
        rows.push(vec![
            entry.team_name.clone(),
            ledger::format_currency(entry.amount),
            entry.hits.to_string(),
            entry.notes.join(", "),
        ]);
    }

    rows.push(Vec::new());
    rows.push(row(&["Team", "Min Payout", "Max Payout"]));
    for summary in &dashboard.team_summaries {
        rows.push(vec![
            summary.team_name.clone(),
            ledger::format_currency(summary.min_payout),
            ledger::format_currency(summary.max_payout),
        ]);
    }
    rows
}
