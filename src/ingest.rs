use anyhow::Result;
use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::archive_fetch::{get_archives, get_games_from_archive};
use crate::normalize::{NormalizedGameRecord, normalize_game};
use crate::persist;

/// Whether a query may serve from and write through the sqlite cache.
/// One ingestion path for both modes, instead of a live path and a
/// persisting near-duplicate.
pub enum CachePolicy<'a> {
    Bypass,
    ReadWrite(&'a mut Connection),
}

/// Fetches every monthly archive for `username` and normalizes the lot.
///
/// Archives are independent and read-only, so the fetch fans out; results
/// are flattened back in archive order, and nothing downstream depends on
/// record order anyway. A month that fails comes back empty rather than
/// aborting the rest.
pub fn fetch_player_games(username: &str) -> Vec<NormalizedGameRecord> {
    let archives = get_archives(username);
    info!(%username, archives = archives.len(), "fetching monthly archives");
    let monthly: Vec<Vec<NormalizedGameRecord>> = archives
        .par_iter()
        .map(|url| {
            get_games_from_archive(url)
                .iter()
                .map(normalize_game)
                .collect()
        })
        .collect();
    let records: Vec<NormalizedGameRecord> = monthly.into_iter().flatten().collect();
    info!(%username, games = records.len(), "normalized game records");
    records
}

/// The consolidated ingestion entry point: the player's full normalized
/// record table, served from the cache when the policy allows and the player
/// has been ingested before.
pub fn player_games(
    username: &str,
    policy: CachePolicy<'_>,
) -> Result<Vec<NormalizedGameRecord>> {
    match policy {
        CachePolicy::Bypass => Ok(fetch_player_games(username)),
        CachePolicy::ReadWrite(conn) => {
            let cached = persist::load_player_games(conn, username)?;
            if !cached.is_empty() {
                debug!(%username, games = cached.len(), "serving records from sqlite cache");
                return Ok(cached);
            }
            let fresh = fetch_player_games(username);
            persist::save_player_games(conn, username, &fresh)?;
            Ok(fresh)
        }
    }
}
