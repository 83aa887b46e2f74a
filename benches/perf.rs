use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chesscom_stats::archive_fetch::parse_archive_games_json;
use chesscom_stats::normalize::{NormalizedGameRecord, RawGame, normalize_game};
use chesscom_stats::stats::compute_bundle;

fn synthetic_pgn(day: u32, opening_idx: usize) -> String {
    const OPENINGS: [&str; 6] = [
        "Italian-Game-Giuoco-Piano",
        "Sicilian-Defense-Open",
        "Caro-Kann-Defense",
        "Queens-Gambit-Declined",
        "Kings-Indian-Defense",
        "London-System",
    ];
    format!(
        "[Event \"Live Chess\"]\n[Date \"2024.{:02}.{:02}\"]\n[ECOUrl \"https://www.chess.com/openings/{}-3.Nc3\"]\n1. e4 c5 1-0",
        day / 28 + 1,
        day % 28 + 1,
        OPENINGS[opening_idx % OPENINGS.len()]
    )
}

fn synthetic_raw_games(n: usize) -> Vec<RawGame> {
    (0..n)
        .map(|i| {
            let json = format!(
                r#"{{
                    "url": "https://www.chess.com/game/live/{i}",
                    "pgn": {pgn},
                    "time_control": "600",
                    "time_class": "{class}",
                    "rules": "chess",
                    "white": {{"username": "alice", "rating": {wr}, "result": "{wres}"}},
                    "black": {{"username": "opponent{opp}", "rating": {br}, "result": "{bres}"}},
                    "accuracies": {{"white": 82.5, "black": 77.25}}
                }}"#,
                pgn = serde_json::to_string(&synthetic_pgn((i % 300) as u32, i)).unwrap(),
                class = ["rapid", "blitz", "bullet"][i % 3],
                wr = 1500 + (i % 200),
                br = 1480 + (i % 230),
                wres = if i % 3 == 0 { "win" } else { "resigned" },
                bres = if i % 3 == 0 { "resigned" } else { "win" },
                opp = i % 40,
            );
            serde_json::from_str(&json).expect("valid synthetic game")
        })
        .collect()
}

fn synthetic_records(n: usize) -> Vec<NormalizedGameRecord> {
    synthetic_raw_games(n).iter().map(normalize_game).collect()
}

fn bench_archive_parse(c: &mut Criterion) {
    // Build a realistic month body once outside the hot loop.
    let games: Vec<serde_json::Value> = (0..200)
        .map(|i| {
            serde_json::json!({
                "url": format!("https://www.chess.com/game/live/{i}"),
                "pgn": synthetic_pgn((i % 28) as u32, i),
                "time_class": "blitz",
                "rules": "chess",
                "white": {"username": "alice", "rating": 1500, "result": "win"},
                "black": {"username": "bob", "rating": 1490, "result": "resigned"}
            })
        })
        .collect();
    let month_body = serde_json::json!({ "games": games }).to_string();

    c.bench_function("archive_parse_200_games", |b| {
        b.iter(|| {
            let games = parse_archive_games_json(black_box(&month_body)).unwrap();
            black_box(games.len());
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let raw = synthetic_raw_games(1000);
    c.bench_function("normalize_1000_games", |b| {
        b.iter(|| {
            let records: Vec<NormalizedGameRecord> =
                black_box(&raw).iter().map(normalize_game).collect();
            black_box(records.len());
        })
    });
}

fn bench_compute_bundle(c: &mut Criterion) {
    let records = synthetic_records(5000);
    c.bench_function("compute_bundle_5000_games", |b| {
        b.iter(|| {
            let bundle = compute_bundle(black_box(&records), "alice");
            black_box(bundle.total_games);
        })
    });
}

criterion_group!(
    perf,
    bench_archive_parse,
    bench_normalize,
    bench_compute_bundle
);
criterion_main!(perf);
