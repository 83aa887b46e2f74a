use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::warn;

/// Static reference tables shipped with the app: biographical fields for the
/// tracked top players, and a separate avatar URL table. Both are fixed
/// external input keyed by lower-cased username, loaded once per process.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerBio {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub joined: Option<String>,
    #[serde(default)]
    pub followers: Option<u64>,
}

static BIOS: OnceCell<HashMap<String, PlayerBio>> = OnceCell::new();
static AVATARS: OnceCell<HashMap<String, String>> = OnceCell::new();

pub fn player_bio(username: &str) -> Option<&'static PlayerBio> {
    BIOS.get_or_init(load_bios).get(&username.to_lowercase())
}

pub fn avatar_url(username: &str) -> Option<&'static str> {
    AVATARS
        .get_or_init(load_avatars)
        .get(&username.to_lowercase())
        .map(String::as_str)
}

/// Every tracked player, sorted by username.
pub fn known_players() -> Vec<&'static PlayerBio> {
    let mut bios: Vec<&'static PlayerBio> = BIOS.get_or_init(load_bios).values().collect();
    bios.sort_by(|a, b| a.username.cmp(&b.username));
    bios
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHESSCOM_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from("data")
}

fn load_bios() -> HashMap<String, PlayerBio> {
    let path = data_dir().join("top_players.json");
    let Ok(raw) = fs::read_to_string(&path) else {
        warn!(path = %path.display(), "top players table missing, bios unavailable");
        return HashMap::new();
    };
    match serde_json::from_str::<Vec<PlayerBio>>(&raw) {
        Ok(bios) => bios
            .into_iter()
            .map(|bio| (bio.username.to_lowercase(), bio))
            .collect(),
        Err(err) => {
            warn!(path = %path.display(), "top players table unreadable: {err}");
            HashMap::new()
        }
    }
}

fn load_avatars() -> HashMap<String, String> {
    let path = data_dir().join("avatars.json");
    let Ok(raw) = fs::read_to_string(&path) else {
        warn!(path = %path.display(), "avatar table missing");
        return HashMap::new();
    };
    match serde_json::from_str::<HashMap<String, String>>(&raw) {
        Ok(avatars) => avatars
            .into_iter()
            .map(|(user, url)| (user.to_lowercase(), url))
            .collect(),
        Err(err) => {
            warn!(path = %path.display(), "avatar table unreadable: {err}");
            HashMap::new()
        }
    }
}
