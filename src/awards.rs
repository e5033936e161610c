use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::dashboard::{EliminatedTeam, SeasonHighScore, TopPlayer, UnluckyTeam, WeeklyWinner};
use crate::espn_fetch::RosterEntry;
use crate::matchups::{TeamRef, WeeklyMatchup};

pub const TOP_PLAYER_COUNT: usize = 4;
pub const UNLUCKY_RANKS: usize = 3;

/// Everything the award pass produces in one sweep over the season.
#[derive(Debug, Clone, Default)]
pub struct AwardBundle {
    pub season_high: Option<SeasonHighScore>,
    pub weekly_winners: Vec<WeeklyWinner>,
    pub eliminations: Vec<EliminatedTeam>,
    pub unlucky_teams: Vec<UnluckyTeam>,
    /// Full season points-against per team id, not just the ranked top 3.
    pub points_against: HashMap<u32, f64>,
}

/// Single pass over a season of matchups. Weeks are processed in ascending
/// order no matter how the input is arranged, because the survivor ladder is
/// sequential: a team eliminated in week N is out of candidacy from week N+1
/// on. Within a week the upstream order is kept, home side before away, and
/// ties keep the earlier holder.
pub fn aggregate_awards(matchups: &[WeeklyMatchup]) -> AwardBundle {
    let mut weeks: BTreeMap<u32, Vec<&WeeklyMatchup>> = BTreeMap::new();
    for matchup in matchups {
        weeks.entry(matchup.week).or_default().push(matchup);
    }

    let mut bundle = AwardBundle::default();
    let mut eliminated: HashSet<u32> = HashSet::new();
    let mut season_best: Option<(TeamRef, f64, u32)> = None;
    let mut refs: HashMap<u32, TeamRef> = HashMap::new();

    for (&week, games) in &weeks {
        let mut week_high: Option<(TeamRef, f64)> = None;
        let mut week_low: Option<(TeamRef, f64)> = None;

        for matchup in games {
            if !matchup.is_played() {
                continue;
            }
            for (team, own, opponent) in matchup.sides() {
                if own > season_best.as_ref().map_or(0.0, |best| best.1) {
                    season_best = Some((team.clone(), own, week));
                }
                if own > week_high.as_ref().map_or(0.0, |high| high.1) {
                    week_high = Some((team.clone(), own));
                }
                if own > 0.0
                    && !eliminated.contains(&team.id)
                    && week_low.as_ref().map_or(true, |low| own < low.1)
                {
                    week_low = Some((team.clone(), own));
                }
                *bundle.points_against.entry(team.id).or_insert(0.0) += opponent;
                refs.entry(team.id).or_insert_with(|| team.clone());
            }
        }

        if let Some((team, score)) = week_high {
            bundle.weekly_winners.push(WeeklyWinner {
                week,
                team_name: team.name,
                score,
                logo_url: team.logo_url,
            });
        }
        if let Some((team, score)) = week_low {
            eliminated.insert(team.id);
            bundle.eliminations.push(EliminatedTeam {
                week,
                team_name: team.name,
                score,
                logo_url: team.logo_url,
            });
        }
    }

    let mut ranked: Vec<(u32, f64)> = bundle
        .points_against
        .iter()
        .map(|(&id, &against)| (id, against))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    bundle.unlucky_teams = ranked
        .into_iter()
        .take(UNLUCKY_RANKS)
        .filter_map(|(id, points_against)| refs.get(&id).map(|team| (team, points_against)))
        .enumerate()
        .map(|(idx, (team, points_against))| UnluckyTeam {
            team_name: team.name.clone(),
            points_against,
            rank: idx as u32 + 1,
            logo_url: team.logo_url.clone(),
        })
        .collect();

    bundle.season_high = season_best.map(|(team, score, week)| SeasonHighScore {
        team_id: team.id,
        team_name: team.name,
        score,
        week,
        logo_url: team.logo_url,
        top_players: Vec::new(),
    });

    bundle
}

/// Top scorers on one roster: positive totals only, descending by points.
/// The sort is stable so equal totals keep their roster order.
pub fn top_players(entries: &[RosterEntry]) -> Vec<TopPlayer> {
    let mut scorers: Vec<&RosterEntry> = entries.iter().filter(|e| e.points > 0.0).collect();
    scorers.sort_by(|a, b| b.points.partial_cmp(&a.points).unwrap_or(Ordering::Equal));
    scorers
        .into_iter()
        .take(TOP_PLAYER_COUNT)
        .map(|entry| TopPlayer {
            name: entry.name.clone(),
            position: entry.slot.clone(),
            points: entry.points,
            pro_team: entry.pro_team.clone(),
        })
        .collect()
}
