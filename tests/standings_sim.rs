use prize_tracker::dashboard::TeamStanding;
use prize_tracker::matchups::{TeamRef, WeeklyMatchup};
use prize_tracker::playoff_sim::{simulate_playoff_odds, SimConfig};
use prize_tracker::standings::{compute_standings, week_median, RemainingMatchup};

fn team(id: u32, name: &str) -> TeamRef {
    TeamRef {
        id,
        name: name.to_string(),
        logo_url: String::new(),
    }
}

fn pairing(
    week: u32,
    home: &TeamRef,
    home_score: f64,
    away: &TeamRef,
    away_score: f64,
) -> WeeklyMatchup {
    WeeklyMatchup {
        week,
        home: home.clone(),
        away: away.clone(),
        home_score,
        away_score,
    }
}

fn standing(team_id: u32, wins: u32, losses: u32, points_for: f64) -> TeamStanding {
    TeamStanding {
        team_id,
        team_name: format!("Team {team_id}"),
        wins,
        losses,
        ties: 0,
        points_for,
        logo_url: String::new(),
        playoff_odds: 0.0,
        bye_odds: 0.0,
        clinched_playoffs: false,
        clinched_bye: false,
    }
}

fn eight_team_table() -> Vec<TeamStanding> {
    vec![
        standing(1, 7, 3, 1180.0),
        standing(2, 6, 4, 1141.5),
        standing(3, 5, 5, 1120.0),
        standing(4, 5, 5, 1088.2),
        standing(5, 4, 6, 1056.4),
        standing(6, 3, 7, 1019.9),
        standing(7, 2, 8, 981.3),
        standing(8, 1, 9, 915.8),
    ]
}

#[test]
fn median_of_odd_and_even_pools() {
    assert_eq!(week_median(&[10.0, 20.0, 30.0]), Some(20.0));
    assert_eq!(week_median(&[10.0, 20.0, 30.0, 40.0]), Some(25.0));
    assert_eq!(week_median(&[]), None);
}

#[test]
fn one_week_table_books_two_results_per_side() {
    let alpha = team(1, "Alpha");
    let bravo = team(2, "Bravo");
    let charlie = team(3, "Charlie");
    let delta = team(4, "Delta");
    let season = vec![
        pairing(1, &alpha, 100.0, &bravo, 90.0),
        pairing(1, &charlie, 80.0, &delta, 70.0),
    ];

    let bundle = compute_standings(&season);

    // Pool median is 85: Alpha sweeps, Bravo and Charlie split, Delta loses
    // both results.
    let rows: Vec<(&str, u32, u32, u32)> = bundle
        .standings
        .iter()
        .map(|s| (s.team_name.as_str(), s.wins, s.losses, s.ties))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Alpha", 2, 0, 0),
            ("Bravo", 1, 1, 0),
            ("Charlie", 1, 1, 0),
            ("Delta", 0, 2, 0),
        ]
    );
    assert!(bundle.remaining.is_empty());

    // Matchup winners are Alpha and Charlie. Only Alpha also beat the median.
    assert_eq!(bundle.median_stats.total_wins, 2);
    assert_eq!(bundle.median_stats.wins_above_median, 1);
    assert_eq!(bundle.median_stats.percentage, 50.0);
}

#[test]
fn tied_matchup_ties_both_sides_and_skips_win_tally() {
    let alpha = team(1, "Alpha");
    let bravo = team(2, "Bravo");
    let charlie = team(3, "Charlie");
    let delta = team(4, "Delta");
    let season = vec![
        pairing(1, &alpha, 100.0, &bravo, 100.0),
        pairing(1, &charlie, 80.0, &delta, 60.0),
    ];

    let bundle = compute_standings(&season);

    let alpha_row = &bundle.standings[0];
    assert_eq!(alpha_row.team_name, "Alpha");
    assert_eq!((alpha_row.wins, alpha_row.losses, alpha_row.ties), (1, 0, 1));
    assert_eq!(alpha_row.win_equivalents(), 1.5);

    // The tied pairing produced no matchup winner, and Charlie won without
    // clearing the 90-point median.
    assert_eq!(bundle.median_stats.total_wins, 1);
    assert_eq!(bundle.median_stats.wins_above_median, 0);
    assert_eq!(bundle.median_stats.percentage, 0.0);
}

#[test]
fn unplayed_pairings_feed_the_remaining_pool() {
    let alpha = team(1, "Alpha");
    let bravo = team(2, "Bravo");
    let charlie = team(3, "Charlie");
    let delta = team(4, "Delta");
    let season = vec![
        pairing(1, &alpha, 100.0, &bravo, 90.0),
        pairing(2, &alpha, 0.0, &charlie, 0.0),
        pairing(2, &bravo, 0.0, &delta, 0.0),
    ];

    let bundle = compute_standings(&season);

    assert_eq!(
        bundle.remaining,
        vec![
            RemainingMatchup {
                home_team_id: 1,
                away_team_id: 3,
            },
            RemainingMatchup {
                home_team_id: 2,
                away_team_id: 4,
            },
        ]
    );
    // Unplayed sides book nothing, so only the two week-1 teams have rows.
    assert_eq!(bundle.standings.len(), 2);
}

#[test]
fn playoff_odds_sum_to_the_slot_counts() {
    let standings = eight_team_table();
    let remaining = vec![
        RemainingMatchup {
            home_team_id: 1,
            away_team_id: 8,
        },
        RemainingMatchup {
            home_team_id: 2,
            away_team_id: 7,
        },
        RemainingMatchup {
            home_team_id: 3,
            away_team_id: 6,
        },
        RemainingMatchup {
            home_team_id: 4,
            away_team_id: 5,
        },
    ];

    let odds = simulate_playoff_odds(&standings, &remaining, 0.55, &SimConfig::seeded(2000, 7));

    assert_eq!(odds.len(), standings.len());
    for team in &odds {
        assert!(team.playoff_odds >= 0.0 && team.playoff_odds <= 1.0);
        assert!(team.bye_odds >= 0.0 && team.bye_odds <= 1.0);
        assert!(team.bye_odds <= team.playoff_odds + 1e-9);
    }
    // Six berths and two byes are handed out in every trial.
    let playoff_sum: f64 = odds.iter().map(|o| o.playoff_odds).sum();
    let bye_sum: f64 = odds.iter().map(|o| o.bye_odds).sum();
    assert!((playoff_sum - 6.0).abs() < 1e-9);
    assert!((bye_sum - 2.0).abs() < 1e-9);
}

#[test]
fn settled_season_yields_exact_odds() {
    let standings = eight_team_table();

    let odds = simulate_playoff_odds(&standings, &[], 0.5, &SimConfig::seeded(2000, 7));

    for team in &odds {
        assert!(team.playoff_odds == 0.0 || team.playoff_odds == 1.0);
        assert!(team.bye_odds == 0.0 || team.bye_odds == 1.0);
        assert_eq!(team.clinched_playoffs, team.playoff_odds == 1.0);
        assert_eq!(team.clinched_bye, team.bye_odds == 1.0);
    }
    let berths = odds.iter().filter(|o| o.playoff_odds == 1.0).count();
    let byes = odds.iter().filter(|o| o.bye_odds == 1.0).count();
    assert_eq!(berths, 6);
    assert_eq!(byes, 2);

    // Teams 7 and 8 are the only ones outside the bracket.
    for team in &odds {
        let in_bracket = team.team_id <= 6;
        assert_eq!(team.playoff_odds == 1.0, in_bracket);
    }
}

#[test]
fn identical_seeds_reproduce_the_run() {
    let standings = eight_team_table();
    let remaining = vec![
        RemainingMatchup {
            home_team_id: 1,
            away_team_id: 2,
        },
        RemainingMatchup {
            home_team_id: 3,
            away_team_id: 4,
        },
    ];
    let cfg = SimConfig::seeded(500, 42);

    let first = simulate_playoff_odds(&standings, &remaining, 0.5, &cfg);
    let second = simulate_playoff_odds(&standings, &remaining, 0.5, &cfg);

    assert_eq!(first, second);
}
