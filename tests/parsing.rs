use std::fs;
use std::path::PathBuf;

use chesscom_stats::archive_fetch::{
    parse_archive_games_json, parse_archives_json, parse_player_profile_json,
};
use chesscom_stats::normalize::{Outcome, ResultCode, TimeClass, normalize_game};
use chrono::NaiveDate;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_archive_games_fixture() {
    let raw = read_fixture("archive_games.json");
    let games = parse_archive_games_json(&raw).expect("fixture should parse");
    assert_eq!(games.len(), 3);
    assert_eq!(games[0].white.username, "Alice");
    assert_eq!(games[0].white.rating, Some(1612));
    assert_eq!(games[1].accuracies.as_ref().and_then(|a| a.white), None);
    assert_eq!(
        games[2].accuracies.as_ref().and_then(|a| a.white),
        Some(61.5)
    );
}

#[test]
fn normalizes_fixture_games() {
    let raw = read_fixture("archive_games.json");
    let games = parse_archive_games_json(&raw).expect("fixture should parse");

    let first = normalize_game(&games[0]);
    assert_eq!(first.game_date, NaiveDate::from_ymd_opt(2024, 2, 11));
    assert_eq!(first.opening.as_deref(), Some("Italian-Game-Giuoco-Piano"));
    assert_eq!(first.time_class, TimeClass::Rapid);
    assert_eq!(first.white.result, ResultCode::Win);
    assert_eq!(first.black.result.outcome(), Outcome::Loss);
    assert_eq!(first.white.accuracy, Some(92.3));

    // Placeholder date and missing ECO marker degrade to None, record kept.
    let second = normalize_game(&games[1]);
    assert_eq!(second.game_date, None);
    assert_eq!(second.opening, None);
    assert_eq!(second.white.accuracy, None);

    let third = normalize_game(&games[2]);
    assert_eq!(third.opening.as_deref(), Some("Sicilian-Defense-Open"));
    assert_eq!(third.white.accuracy, Some(61.5));
    assert_eq!(third.black.accuracy, None);
}

#[test]
fn normalization_is_idempotent() {
    let raw = read_fixture("archive_games.json");
    let games = parse_archive_games_json(&raw).expect("fixture should parse");
    for game in &games {
        let once = normalize_game(game);
        let twice = normalize_game(game);
        assert_eq!(once.game_url, twice.game_url);
        assert_eq!(once.game_date, twice.game_date);
        assert_eq!(once.opening, twice.opening);
        assert_eq!(once.time_class, twice.time_class);
        assert_eq!(once.white.result, twice.white.result);
        assert_eq!(once.white.accuracy, twice.white.accuracy);
        assert_eq!(once.black.result, twice.black.result);
        assert_eq!(once.black.accuracy, twice.black.accuracy);
    }
}

#[test]
fn fully_empty_game_still_normalizes() {
    let games = parse_archive_games_json(r#"{"games":[{}]}"#).expect("empty object should parse");
    assert_eq!(games.len(), 1);
    let rec = normalize_game(&games[0]);
    assert_eq!(rec.game_url, None);
    assert_eq!(rec.game_date, None);
    assert_eq!(rec.opening, None);
    assert_eq!(rec.white.result.outcome(), Outcome::Unclassified);
}

#[test]
fn null_and_empty_bodies_are_empty_lists() {
    assert!(parse_archives_json("null").expect("null should parse").is_empty());
    assert!(parse_archives_json("  ").expect("blank should parse").is_empty());
    assert!(
        parse_archive_games_json("null")
            .expect("null should parse")
            .is_empty()
    );
    assert!(parse_archive_games_json("{}").expect("no games key").is_empty());
}

#[test]
fn parses_archives_list() {
    let raw = r#"{"archives":["https://api.chess.com/pub/player/hikaru/games/2024/01","https://api.chess.com/pub/player/hikaru/games/2024/02"]}"#;
    let archives = parse_archives_json(raw).expect("archives should parse");
    assert_eq!(archives.len(), 2);
    assert!(archives[0].ends_with("2024/01"));
}

#[test]
fn parses_player_profile_fixture() {
    let raw = read_fixture("player_profile.json");
    let profile = parse_player_profile_json(&raw)
        .expect("fixture should parse")
        .expect("profile should be present");
    assert_eq!(profile.username.as_deref(), Some("hikaru"));
    assert_eq!(profile.title.as_deref(), Some("GM"));
    assert_eq!(profile.country_code(), Some("US"));
    assert!(profile.is_streamer);

    assert!(parse_player_profile_json("null").expect("null should parse").is_none());
}
