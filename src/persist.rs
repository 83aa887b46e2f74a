use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::http_cache::app_cache_dir;
use crate::normalize::{NormalizedGameRecord, ResultCode, SidePlayer, TimeClass};

/// Optional sqlite cache: one row per (player, game). Not required for
/// correctness — every aggregate recomputes from the record table — it only
/// spares refetching a player's full history on repeat queries.
///
/// The schema is fixed-width: accuracy is `REAL NOT NULL` with 0.0 standing
/// in for "not reviewed". Loading maps 0.0 back to `None` so the in-memory
/// invariant (no accuracy != zero accuracy) survives a round trip.
const DATE_FMT: &str = "%Y-%m-%d";

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHESSCOM_DB_PATH") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    app_cache_dir().map(|dir| dir.join("player_games.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS player_game_data (
            player_name TEXT NOT NULL,
            game_url TEXT NOT NULL,
            game_date TEXT NULL,
            game_time_control TEXT NULL,
            game_time_class TEXT NOT NULL,
            game_variant TEXT NULL,
            opening TEXT NULL,
            white_rating INTEGER NULL,
            white_result TEXT NOT NULL,
            white_username TEXT NOT NULL,
            white_accuracy REAL NOT NULL DEFAULT 0.0,
            black_rating INTEGER NULL,
            black_result TEXT NOT NULL,
            black_username TEXT NOT NULL,
            black_accuracy REAL NOT NULL DEFAULT 0.0,
            last_updated TEXT NOT NULL,
            PRIMARY KEY (player_name, game_url)
        );
        CREATE INDEX IF NOT EXISTS idx_player_game_data_player
            ON player_game_data(player_name);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Upserts the player's records in one transaction. Records without a game
/// URL cannot be keyed and are skipped. Idempotent per (player, game_url).
pub fn save_player_games(
    conn: &mut Connection,
    username: &str,
    records: &[NormalizedGameRecord],
) -> Result<usize> {
    let player_key = username.to_lowercase();
    let last_updated = Utc::now().format(DATE_FMT).to_string();
    let tx = conn.transaction().context("begin cache transaction")?;
    let mut written = 0usize;
    {
        let mut stmt = tx
            .prepare(
                r#"
                INSERT OR REPLACE INTO player_game_data (
                    player_name, game_url, game_date, game_time_control,
                    game_time_class, game_variant, opening,
                    white_rating, white_result, white_username, white_accuracy,
                    black_rating, black_result, black_username, black_accuracy,
                    last_updated
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
            )
            .context("prepare cache insert")?;
        for rec in records {
            let Some(game_url) = rec.game_url.as_deref() else {
                debug!(player = %player_key, "skipping record without game url");
                continue;
            };
            stmt.execute(params![
                player_key,
                game_url,
                rec.game_date.map(|d| d.format(DATE_FMT).to_string()),
                rec.time_control,
                rec.time_class.as_str(),
                rec.variant,
                rec.opening,
                rec.white.rating,
                rec.white.result.as_code(),
                rec.white.username,
                rec.white.accuracy.unwrap_or(0.0),
                rec.black.rating,
                rec.black.result.as_code(),
                rec.black.username,
                rec.black.accuracy.unwrap_or(0.0),
                last_updated,
            ])
            .context("insert cached game row")?;
            written += 1;
        }
    }
    tx.commit().context("commit cache transaction")?;
    Ok(written)
}

pub fn load_player_games(conn: &Connection, username: &str) -> Result<Vec<NormalizedGameRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                game_url, game_date, game_time_control, game_time_class,
                game_variant, opening,
                white_rating, white_result, white_username, white_accuracy,
                black_rating, black_result, black_username, black_accuracy
            FROM player_game_data
            WHERE player_name = ?1
            ORDER BY rowid ASC
            "#,
        )
        .context("prepare cache load query")?;

    let rows = stmt
        .query_map(params![username.to_lowercase()], |row| {
            Ok(NormalizedGameRecord {
                game_url: Some(row.get::<_, String>(0)?),
                game_date: row
                    .get::<_, Option<String>>(1)?
                    .and_then(|raw| NaiveDate::parse_from_str(&raw, DATE_FMT).ok()),
                time_control: row.get(2)?,
                time_class: TimeClass::parse(&row.get::<_, String>(3)?),
                variant: row.get(4)?,
                opening: row.get(5)?,
                white: SidePlayer {
                    rating: row.get(6)?,
                    result: ResultCode::parse(&row.get::<_, String>(7)?),
                    username: row.get(8)?,
                    accuracy: stored_accuracy(row.get(9)?),
                },
                black: SidePlayer {
                    rating: row.get(10)?,
                    result: ResultCode::parse(&row.get::<_, String>(11)?),
                    username: row.get(12)?,
                    accuracy: stored_accuracy(row.get(13)?),
                },
            })
        })
        .context("query cached games")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode cached game row")?);
    }
    Ok(out)
}

pub fn cached_players(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT player_name FROM player_game_data ORDER BY player_name")
        .context("prepare player list query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query cached players")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player name")?);
    }
    Ok(out)
}

pub fn delete_player_games(conn: &Connection, username: &str) -> Result<usize> {
    let deleted = conn
        .execute(
            "DELETE FROM player_game_data WHERE player_name = ?1",
            params![username.to_lowercase()],
        )
        .context("delete cached games")?;
    Ok(deleted)
}

fn stored_accuracy(value: f64) -> Option<f64> {
    if value == 0.0 { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ResultCode;

    fn record(url: &str, accuracy: Option<f64>) -> NormalizedGameRecord {
        NormalizedGameRecord {
            game_url: Some(url.to_string()),
            game_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            time_control: Some("600".to_string()),
            time_class: TimeClass::Rapid,
            variant: Some("chess".to_string()),
            opening: Some("Queens-Gambit-Declined".to_string()),
            white: SidePlayer {
                username: "Alice".to_string(),
                rating: Some(1500),
                result: ResultCode::Win,
                accuracy,
            },
            black: SidePlayer {
                username: "Bob".to_string(),
                rating: Some(1480),
                result: ResultCode::Resigned,
                accuracy: None,
            },
        }
    }

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory sqlite");
        init_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn round_trip_keeps_record_fields() {
        let mut conn = test_db();
        let records = vec![record("https://example.test/game/1", Some(91.4))];
        let written = save_player_games(&mut conn, "Alice", &records).unwrap();
        assert_eq!(written, 1);

        let loaded = load_player_games(&conn, "alice").unwrap();
        assert_eq!(loaded.len(), 1);
        let rec = &loaded[0];
        assert_eq!(rec.game_date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(rec.time_class, TimeClass::Rapid);
        assert_eq!(rec.opening.as_deref(), Some("Queens-Gambit-Declined"));
        assert_eq!(rec.white.result, ResultCode::Win);
        assert_eq!(rec.white.accuracy, Some(91.4));
    }

    #[test]
    fn zero_accuracy_loads_as_none() {
        let mut conn = test_db();
        let records = vec![record("https://example.test/game/2", None)];
        save_player_games(&mut conn, "alice", &records).unwrap();
        let loaded = load_player_games(&conn, "ALICE").unwrap();
        assert_eq!(loaded[0].white.accuracy, None);
        assert_eq!(loaded[0].black.accuracy, None);
    }

    #[test]
    fn saving_twice_is_idempotent() {
        let mut conn = test_db();
        let records = vec![record("https://example.test/game/3", Some(80.0))];
        save_player_games(&mut conn, "alice", &records).unwrap();
        save_player_games(&mut conn, "alice", &records).unwrap();
        assert_eq!(load_player_games(&conn, "alice").unwrap().len(), 1);
    }

    #[test]
    fn urlless_records_are_skipped() {
        let mut conn = test_db();
        let mut rec = record("unused", Some(80.0));
        rec.game_url = None;
        assert_eq!(save_player_games(&mut conn, "alice", &[rec]).unwrap(), 0);
    }

    #[test]
    fn delete_and_list_players() {
        let mut conn = test_db();
        save_player_games(&mut conn, "alice", &[record("u1", None)]).unwrap();
        save_player_games(&mut conn, "bob", &[record("u1", None)]).unwrap();
        assert_eq!(cached_players(&conn).unwrap(), vec!["alice", "bob"]);
        assert_eq!(delete_player_games(&conn, "alice").unwrap(), 1);
        assert_eq!(cached_players(&conn).unwrap(), vec!["bob"]);
    }
}
