use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use chesscom_stats::ingest::fetch_player_games;
use chesscom_stats::{persist, roster};

/// Pre-populates the sqlite cache: for a list of usernames, for every
/// tracked player (`--roster`), or refreshing every player already cached
/// (`--refresh-all`): drop the stale rows, then refetch from the live API.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut refresh_all = false;
    let mut usernames: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--refresh-all" => refresh_all = true,
            "--roster" => usernames.extend(
                roster::known_players()
                    .iter()
                    .map(|bio| bio.username.clone()),
            ),
            other if other.starts_with('-') => return Err(anyhow!("unknown flag: {other}")),
            other => usernames.push(other.to_string()),
        }
    }

    let db_path = persist::default_db_path()
        .ok_or_else(|| anyhow!("unable to resolve sqlite cache path"))?;
    let mut conn = persist::open_db(&db_path)?;

    if refresh_all {
        if !usernames.is_empty() {
            return Err(anyhow!("--refresh-all takes no usernames"));
        }
        usernames = persist::cached_players(&conn)?;
        if usernames.is_empty() {
            println!("cache at {} is empty, nothing to refresh", db_path.display());
            return Ok(());
        }
        for username in &usernames {
            persist::delete_player_games(&conn, username)?;
        }
    } else if usernames.is_empty() {
        return Err(anyhow!(
            "usage: cache_ingest <username>... | cache_ingest --roster | cache_ingest --refresh-all"
        ));
    }

    println!("cache: {}", db_path.display());
    for username in &usernames {
        let records = fetch_player_games(username);
        let written = persist::save_player_games(&mut conn, username, &records)?;
        println!("{username}: {} games fetched, {written} cached", records.len());
    }
    Ok(())
}
