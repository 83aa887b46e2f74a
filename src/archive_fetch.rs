use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::normalize::RawGame;

pub const DEFAULT_API_BASE: &str = "https://api.chess.com/pub";

fn api_base() -> String {
    std::env::var("CHESSCOM_API_BASE")
        .ok()
        .filter(|base| !base.trim().is_empty())
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

#[derive(Debug, Default, Deserialize)]
struct ArchivesResponse {
    #[serde(default)]
    archives: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArchiveGamesResponse {
    #[serde(default)]
    games: Vec<RawGame>,
}

/// Monthly archive URLs for one player. Any failure — network, non-200,
/// bad body — degrades to an empty list with a warn log; the caller never
/// sees an error for a player that simply has no retrievable history.
pub fn get_archives(username: &str) -> Vec<String> {
    let url = format!("{}/player/{}/games/archives", api_base(), username);
    match fetch_body(&url).and_then(|body| parse_archives_json(&body)) {
        Ok(archives) => archives,
        Err(err) => {
            warn!(%url, "archive list fetch failed: {err:#}");
            Vec::new()
        }
    }
}

/// Raw games inside one monthly archive. A failed month yields zero records
/// and must never abort retrieval of the other months.
pub fn get_games_from_archive(archive_url: &str) -> Vec<RawGame> {
    match fetch_body(archive_url).and_then(|body| parse_archive_games_json(&body)) {
        Ok(games) => games,
        Err(err) => {
            warn!(url = %archive_url, "archive fetch failed: {err:#}");
            Vec::new()
        }
    }
}

pub fn parse_archives_json(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let resp: ArchivesResponse =
        serde_json::from_str(trimmed).context("invalid archives json")?;
    Ok(resp.archives)
}

pub fn parse_archive_games_json(raw: &str) -> Result<Vec<RawGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let resp: ArchiveGamesResponse =
        serde_json::from_str(trimmed).context("invalid archive games json")?;
    Ok(resp.games)
}

/// Public profile as echoed by the service; feeds the profile card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub joined: Option<i64>,
    #[serde(default)]
    pub last_online: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_streamer: bool,
    #[serde(default)]
    pub verified: bool,
}

impl PlayerProfile {
    /// The `country` field is a URL; the trailing path segment is the
    /// ISO code.
    pub fn country_code(&self) -> Option<&str> {
        self.country.as_deref()?.rsplit('/').next()
    }
}

pub fn get_player_profile(username: &str) -> Option<PlayerProfile> {
    let url = format!("{}/player/{}", api_base(), username);
    match fetch_body(&url).and_then(|body| parse_player_profile_json(&body)) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(%url, "profile fetch failed: {err:#}");
            None
        }
    }
}

pub fn parse_player_profile_json(raw: &str) -> Result<Option<PlayerProfile>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let profile: PlayerProfile =
        serde_json::from_str(trimmed).context("invalid profile json")?;
    Ok(Some(profile))
}

fn fetch_body(url: &str) -> Result<String> {
    let client = http_client()?;
    fetch_json_cached(client, url).context("request failed")
}
