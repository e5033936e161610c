use std::cmp::Ordering;
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::dashboard::TeamStanding;
use crate::standings::{RemainingMatchup, compare_rank};

pub const SIMULATIONS: usize = 2000;
pub const PLAYOFF_SLOTS: usize = 6;
pub const BYE_SLOTS: usize = 2;

/// Trial count plus the base seed. Trial N draws from a generator seeded
/// with `seed + N`, so a fixed seed reproduces the whole run exactly.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub trials: usize,
    pub seed: u64,
}

impl SimConfig {
    pub fn new(trials: usize) -> Self {
        Self::seeded(trials, rand::random())
    }

    pub fn seeded(trials: usize, seed: u64) -> Self {
        Self {
            trials: trials.max(1),
            seed,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(SIMULATIONS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamOdds {
    pub team_id: u32,
    pub playoff_odds: f64,
    pub bye_odds: f64,
    pub clinched_playoffs: bool,
    pub clinched_bye: bool,
}

/// Per-trial snapshot of one team. Only the ranking inputs are carried:
/// win-equivalents, the points-for tiebreak, and the per-game projection
/// added to points-for when a future game resolves.
#[derive(Debug, Clone, Copy)]
struct TrialTeam {
    equivalents: f64,
    points_for: f64,
    projection: f64,
}

impl TrialTeam {
    fn from_standing(standing: &TeamStanding) -> Self {
        let games = standing.games_played();
        // Two results accrue per played week, so doubling the per-result
        // average recovers a weekly score projection.
        let projection = if games > 0 {
            2.0 * standing.points_for / f64::from(games)
        } else {
            0.0
        };
        Self {
            equivalents: standing.win_equivalents(),
            points_for: standing.points_for,
            projection,
        }
    }
}

/// Monte-Carlo completion of the season. Each trial resolves every remaining
/// matchup with a fair coin, correlates the median bonus with the matchup
/// result through `median_win_probability`, ranks the finished table, and
/// credits the top six with a playoff berth and the top two with a bye.
pub fn simulate_playoff_odds(
    standings: &[TeamStanding],
    remaining: &[RemainingMatchup],
    median_win_probability: f64,
    cfg: &SimConfig,
) -> Vec<TeamOdds> {
    if standings.is_empty() {
        return Vec::new();
    }
    if remaining.is_empty() {
        return settled_odds(standings);
    }

    let teams: Vec<TrialTeam> = standings.iter().map(TrialTeam::from_standing).collect();
    let index: HashMap<u32, usize> = standings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.team_id, i))
        .collect();
    // Pairings naming a team outside the standings are dropped, not guessed.
    let pairs: Vec<(usize, usize)> = remaining
        .iter()
        .filter_map(|m| Some((*index.get(&m.home_team_id)?, *index.get(&m.away_team_id)?)))
        .collect();
    if pairs.is_empty() {
        return settled_odds(standings);
    }

    let median_p = median_win_probability.clamp(0.0, 1.0);
    let trials = cfg.trials.max(1);

    // First half of the counters is playoff berths, second half is byes.
    let counts = (0..trials as u64)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(trial));
            run_trial(&teams, &pairs, median_p, &mut rng)
        })
        .reduce(
            || vec![0u32; 2 * teams.len()],
            |mut acc, item| {
                for (slot, add) in acc.iter_mut().zip(item) {
                    *slot += add;
                }
                acc
            },
        );

    standings
        .iter()
        .enumerate()
        .map(|(i, s)| TeamOdds {
            team_id: s.team_id,
            playoff_odds: f64::from(counts[i]) / trials as f64,
            bye_odds: f64::from(counts[teams.len() + i]) / trials as f64,
            clinched_playoffs: counts[i] as usize == trials,
            clinched_bye: counts[teams.len() + i] as usize == trials,
        })
        .collect()
}

fn run_trial(
    teams: &[TrialTeam],
    pairs: &[(usize, usize)],
    median_p: f64,
    rng: &mut StdRng,
) -> Vec<u32> {
    let mut equivalents: Vec<f64> = teams.iter().map(|t| t.equivalents).collect();
    let mut points: Vec<f64> = teams.iter().map(|t| t.points_for).collect();

    for &(home, away) in pairs {
        points[home] += teams[home].projection;
        points[away] += teams[away].projection;

        let (winner, loser) = if rng.gen_bool(0.5) {
            (home, away)
        } else {
            (away, home)
        };
        equivalents[winner] += 1.0;
        if rng.gen_bool(median_p) {
            equivalents[winner] += 1.0;
        }
        if rng.gen_bool(1.0 - median_p) {
            equivalents[loser] += 1.0;
        }
    }

    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.sort_by(|&a, &b| {
        equivalents[b]
            .partial_cmp(&equivalents[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| points[b].partial_cmp(&points[a]).unwrap_or(Ordering::Equal))
    });

    let mut counts = vec![0u32; 2 * teams.len()];
    for (rank, &idx) in order.iter().enumerate() {
        if rank < PLAYOFF_SLOTS {
            counts[idx] += 1;
        }
        if rank < BYE_SLOTS {
            counts[teams.len() + idx] += 1;
        }
    }
    counts
}

/// Nothing left to play: one sort of the current table decides everything,
/// and every probability is exactly zero or one.
pub fn settled_odds(standings: &[TeamStanding]) -> Vec<TeamOdds> {
    let mut order: Vec<&TeamStanding> = standings.iter().collect();
    order.sort_by(|a, b| compare_rank(a, b));
    order
        .iter()
        .enumerate()
        .map(|(rank, s)| TeamOdds {
            team_id: s.team_id,
            playoff_odds: if rank < PLAYOFF_SLOTS { 1.0 } else { 0.0 },
            bye_odds: if rank < BYE_SLOTS { 1.0 } else { 0.0 },
            clinched_playoffs: rank < PLAYOFF_SLOTS,
            clinched_bye: rank < BYE_SLOTS,
        })
        .collect()
}

/// Copy simulated odds onto the published standings rows by team id.
pub fn attach_odds(standings: &mut [TeamStanding], odds: &[TeamOdds]) {
    let by_id: HashMap<u32, &TeamOdds> = odds.iter().map(|o| (o.team_id, o)).collect();
    for row in standings.iter_mut() {
        if let Some(odds) = by_id.get(&row.team_id) {
            row.playoff_odds = odds.playoff_odds;
            row.bye_odds = odds.bye_odds;
            row.clinched_playoffs = odds.clinched_playoffs;
            row.clinched_bye = odds.clinched_bye;
        }
    }
}
