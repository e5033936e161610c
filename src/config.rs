use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};

use crate::{ledger, playoff_sim};

/// Runner configuration, resolved once at startup from the environment
/// (after dotenvy has had a chance to load `.env`).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub league_id: u64,
    pub season: u32,
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
    pub regular_season_weeks: u32,
    pub snapshot_ttl_secs: u64,
    pub fetch_parallelism: usize,
    pub simulations: usize,
    pub export_path: Option<PathBuf>,
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self> {
        let league_id = env::var("LEAGUE_ID")
            .context("LEAGUE_ID is not set")?
            .trim()
            .parse::<u64>()
            .context("LEAGUE_ID is not a number")?;

        Ok(Self {
            league_id,
            season: season_from_env(),
            espn_s2: non_empty_var("ESPN_S2"),
            swid: non_empty_var("SWID"),
            regular_season_weeks: parse_var("REGULAR_SEASON_WEEKS", ledger::REGULAR_SEASON_WEEKS)
                .clamp(1, 18),
            snapshot_ttl_secs: parse_var("SNAPSHOT_TTL_SECS", 300u64),
            fetch_parallelism: parse_var("FETCH_PARALLELISM", 6usize).clamp(2, 32),
            simulations: parse_var("SIMULATIONS", playoff_sim::SIMULATIONS),
            export_path: non_empty_var("EXPORT_XLSX").map(PathBuf::from),
        })
    }
}

/// `SEASON` overrides; otherwise the calendar year, which is what ESPN keys
/// the current fantasy season by.
fn season_from_env() -> u32 {
    env::var("SEASON")
        .ok()
        .and_then(|val| val.parse::<u32>().ok())
        .filter(|year| *year > 0)
        .unwrap_or_else(|| Utc::now().year() as u32)
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    env::var(name)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty_var(name: &str) -> Option<String> {
    let val = env::var(name).ok()?;
    let trimmed = val.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
