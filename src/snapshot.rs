use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dashboard::PrizeDashboard;

/// Bump when the stored layout changes; older files read as a cold cache.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    stored_at: u64,
    dashboard: PrizeDashboard,
}

/// Published-result cache with a TTL. Exactly one run writes at a time and
/// readers keep getting the previous snapshot until the new one lands, which
/// is what makes failed runs non-events for the caller.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    ttl_secs: u64,
}

impl SnapshotCache {
    pub fn new(path: PathBuf, ttl_secs: u64) -> Self {
        Self { path, ttl_secs }
    }

    pub fn default_path(league_id: u64, season: u32) -> PathBuf {
        cache_dir().join(format!("prize_tracker_{league_id}_{season}.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// The snapshot, only while younger than the TTL.
    pub fn load_fresh(&self) -> Option<PrizeDashboard> {
        let (dashboard, age) = self.load()?;
        if age < self.ttl_secs {
            Some(dashboard)
        } else {
            None
        }
    }

    /// The snapshot regardless of age, with its age in seconds. This is the
    /// stale fallback when a fresh run fails.
    pub fn load_any(&self) -> Option<(PrizeDashboard, u64)> {
        self.load()
    }

    fn load(&self) -> Option<(PrizeDashboard, u64)> {
        let body = fs::read_to_string(&self.path).ok()?;
        let file: SnapshotFile = serde_json::from_str(&body).ok()?;
        if file.version != SNAPSHOT_VERSION {
            return None;
        }
        let age = unix_now().saturating_sub(file.stored_at);
        Some((file.dashboard, age))
    }

    /// Replace the snapshot wholesale. The write goes to a sibling `.tmp`
    /// first and renames into place so readers never see a partial file.
    pub fn store(&self, dashboard: &PrizeDashboard) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache dir {}", parent.display()))?;
        }
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            stored_at: unix_now(),
            dashboard: dashboard.clone(),
        };
        let body = serde_json::to_vec(&file).context("serializing snapshot")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("moving snapshot into {}", self.path.display()))?;
        Ok(())
    }
}

fn cache_dir() -> PathBuf {
    if let Some(dir) = env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(dir);
    }
    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".cache");
    }
    PathBuf::from(".")
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
