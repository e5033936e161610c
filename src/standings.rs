use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dashboard::{LeagueMedianStats, TeamStanding};
use crate::matchups::{TeamRef, WeeklyMatchup};

/// An unplayed pairing, queued for the simulator in schedule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingMatchup {
    pub home_team_id: u32,
    pub away_team_id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct StandingsBundle {
    pub standings: Vec<TeamStanding>,
    pub remaining: Vec<RemainingMatchup>,
    pub median_stats: LeagueMedianStats,
}

/// Median of one week's score pool. Sorted ascending, middle element for an
/// odd count, mean of the two middle elements for an even count.
pub fn week_median(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Win/loss/tie records with the median bonus folded in. Every played side
/// books two results per week: the head-to-head outcome and a win or loss
/// against the week median. A score exactly at the median books a loss.
/// Unplayed matchups book nothing and come back as `remaining`.
pub fn compute_standings(matchups: &[WeeklyMatchup]) -> StandingsBundle {
    let mut weeks: BTreeMap<u32, Vec<&WeeklyMatchup>> = BTreeMap::new();
    for matchup in matchups {
        weeks.entry(matchup.week).or_default().push(matchup);
    }

    let mut rows: HashMap<u32, TeamStanding> = HashMap::new();
    let mut remaining = Vec::new();
    let mut wins_above_median = 0u32;
    let mut total_wins = 0u32;

    for games in weeks.values() {
        let pool: Vec<f64> = games
            .iter()
            .filter(|m| m.is_played())
            .flat_map(|m| [m.home_score, m.away_score])
            .collect();
        let median = week_median(&pool);

        for matchup in games {
            if !matchup.is_played() {
                remaining.push(RemainingMatchup {
                    home_team_id: matchup.home.id,
                    away_team_id: matchup.away.id,
                });
                continue;
            }
            // A played matchup implies a non-empty pool for this week.
            let Some(median) = median else { continue };

            for (team, own, opponent) in matchup.sides() {
                let row = rows.entry(team.id).or_insert_with(|| blank_row(team));
                row.points_for += own;
                match own.partial_cmp(&opponent) {
                    Some(Ordering::Greater) => row.wins += 1,
                    Some(Ordering::Less) => row.losses += 1,
                    _ => row.ties += 1,
                }
                if own > median {
                    row.wins += 1;
                } else {
                    row.losses += 1;
                }
            }

            if matchup.home_score != matchup.away_score {
                total_wins += 1;
                if matchup.home_score.max(matchup.away_score) > median {
                    wins_above_median += 1;
                }
            }
        }
    }

    let mut standings: Vec<TeamStanding> = rows.into_values().collect();
    standings.sort_by(compare_rank);

    let percentage = if total_wins > 0 {
        f64::from(wins_above_median) / f64::from(total_wins) * 100.0
    } else {
        0.0
    };

    StandingsBundle {
        standings,
        remaining,
        median_stats: LeagueMedianStats {
            wins_above_median,
            total_wins,
            percentage,
        },
    }
}

/// Seeding order: win-equivalents descending, points-for descending, then
/// team id ascending so equal records always land the same way.
pub fn compare_rank(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.win_equivalents()
        .partial_cmp(&a.win_equivalents())
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.points_for
                .partial_cmp(&a.points_for)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.team_id.cmp(&b.team_id))
}

fn blank_row(team: &TeamRef) -> TeamStanding {
    TeamStanding {
        team_id: team.id,
        team_name: team.name.clone(),
        wins: 0,
        losses: 0,
        ties: 0,
        points_for: 0.0,
        logo_url: team.logo_url.clone(),
        playoff_odds: 0.0,
        bye_odds: 0.0,
        clinched_playoffs: false,
        clinched_bye: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32) -> TeamRef {
        TeamRef {
            id,
            name: format!("Team {id}"),
            logo_url: String::new(),
        }
    }

    fn game(week: u32, home: u32, home_score: f64, away: u32, away_score: f64) -> WeeklyMatchup {
        WeeklyMatchup {
            week,
            home: team(home),
            away: team(away),
            home_score,
            away_score,
        }
    }

    #[test]
    fn median_of_odd_and_even_pools() {
        assert_eq!(week_median(&[30.0, 10.0, 20.0]), Some(20.0));
        assert_eq!(week_median(&[10.0, 20.0, 30.0, 40.0]), Some(25.0));
        assert_eq!(week_median(&[]), None);
    }

    #[test]
    fn each_played_side_books_two_results() {
        // Pool is [110, 90, 100, 80], median 95.
        let bundle = compute_standings(&[
            game(1, 1, 110.0, 2, 90.0),
            game(1, 3, 100.0, 4, 80.0),
        ]);

        let by_id = |id: u32| {
            bundle
                .standings
                .iter()
                .find(|s| s.team_id == id)
                .expect("team present")
        };
        // Team 1: beat team 2, beat median.
        assert_eq!((by_id(1).wins, by_id(1).losses), (2, 0));
        // Team 3: beat team 4, beat median.
        assert_eq!((by_id(3).wins, by_id(3).losses), (2, 0));
        // Team 2: lost matchup, below median.
        assert_eq!((by_id(2).wins, by_id(2).losses), (0, 2));
        assert_eq!(by_id(1).games_played(), 2);
        assert_eq!(by_id(1).points_for, 110.0);
    }

    #[test]
    fn score_at_the_median_books_a_loss() {
        // Pool is [100, 100, 120, 80], median 100.
        let bundle = compute_standings(&[
            game(1, 1, 100.0, 2, 100.0),
            game(1, 3, 120.0, 4, 80.0),
        ]);

        let team_one = bundle
            .standings
            .iter()
            .find(|s| s.team_id == 1)
            .expect("team present");
        assert_eq!(team_one.ties, 1);
        assert_eq!(team_one.losses, 1);
        assert_eq!(team_one.wins, 0);
        assert_eq!(team_one.win_equivalents(), 0.5);
    }

    #[test]
    fn unplayed_matchups_feed_the_remaining_pool_only() {
        let bundle = compute_standings(&[
            game(1, 1, 100.0, 2, 90.0),
            game(2, 1, 0.0, 2, 0.0),
            game(3, 2, 0.0, 1, 0.0),
        ]);

        assert_eq!(
            bundle.remaining,
            vec![
                RemainingMatchup {
                    home_team_id: 1,
                    away_team_id: 2
                },
                RemainingMatchup {
                    home_team_id: 2,
                    away_team_id: 1
                },
            ]
        );
        let totals: f64 = bundle.standings.iter().map(|s| s.points_for).sum();
        assert_eq!(totals, 190.0);
    }

    #[test]
    fn median_stats_count_matchup_winners_only() {
        // Pool [110, 90, 100, 80], median 95. Winners 110 and 100 both above.
        let bundle = compute_standings(&[
            game(1, 1, 110.0, 2, 90.0),
            game(1, 3, 100.0, 4, 80.0),
        ]);
        assert_eq!(bundle.median_stats.total_wins, 2);
        assert_eq!(bundle.median_stats.wins_above_median, 2);
        assert_eq!(bundle.median_stats.percentage, 100.0);
        assert_eq!(bundle.median_stats.win_probability(), 1.0);

        let empty = compute_standings(&[]);
        assert_eq!(empty.median_stats.win_probability(), 0.5);
        assert_eq!(empty.median_stats.percentage, 0.0);
    }
}
