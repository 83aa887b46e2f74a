use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use chesscom_stats::archive_fetch;
use chesscom_stats::ingest::{CachePolicy, player_games};
use chesscom_stats::persist;
use chesscom_stats::rating_series::{RatingSeries, RatingWindow};
use chesscom_stats::roster;
use chesscom_stats::stats::{PlayerStatsBundle, compute_bundle};

struct CliArgs {
    username: String,
    no_cache: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let records = if args.no_cache {
        player_games(&args.username, CachePolicy::Bypass)?
    } else {
        let db_path = persist::default_db_path()
            .ok_or_else(|| anyhow!("unable to resolve sqlite cache path"))?;
        let mut conn = persist::open_db(&db_path)?;
        player_games(&args.username, CachePolicy::ReadWrite(&mut conn))?
    };

    let bundle = compute_bundle(&records, &args.username);
    print_bundle(&bundle);
    Ok(())
}

fn parse_args() -> Result<CliArgs> {
    let mut username: Option<String> = None;
    let mut no_cache = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-cache" => no_cache = true,
            "--help" | "-h" => {
                println!("usage: chesscom_stats <username> [--no-cache]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(anyhow!("unknown flag: {other}"));
            }
            other => {
                if username.replace(other.to_string()).is_some() {
                    return Err(anyhow!("expected exactly one username"));
                }
            }
        }
    }
    let username = username.ok_or_else(|| anyhow!("usage: chesscom_stats <username> [--no-cache]"))?;
    Ok(CliArgs { username, no_cache })
}

fn print_bundle(bundle: &PlayerStatsBundle) {
    println!("== {} ==", bundle.username);
    if let Some(bio) = roster::player_bio(&bundle.username) {
        let name = bio.name.as_deref().unwrap_or("-");
        let title = bio.title.as_deref().unwrap_or("-");
        let country = bio.country.as_deref().unwrap_or("-");
        println!("{name} ({title}, {country})");
        if let Some(followers) = bio.followers {
            let joined = bio.joined.as_deref().unwrap_or("-");
            println!("joined {joined}, {followers} followers");
        }
        if let Some(avatar) = roster::avatar_url(&bundle.username) {
            println!("avatar: {avatar}");
        }
    } else if let Some(profile) = archive_fetch::get_player_profile(&bundle.username) {
        // Players outside the tracked roster get their live public profile.
        let name = profile.name.as_deref().unwrap_or("-");
        let title = profile.title.as_deref().unwrap_or("-");
        let country = profile.country_code().unwrap_or("-");
        println!("{name} ({title}, {country})");
        if let Some(followers) = profile.followers {
            println!("{followers} followers");
        }
        if let Some(avatar) = profile.avatar.as_deref() {
            println!("avatar: {avatar}");
        }
    }

    println!("total games: {}", bundle.total_games);
    println!(
        "accuracy  white {}  black {}",
        fmt_opt_f64(bundle.white_accuracy),
        fmt_opt_f64(bundle.black_accuracy)
    );
    println!("distinct openings: {}", bundle.opening_lines);

    for (label, breakdown) in [("white", &bundle.white), ("black", &bundle.black)] {
        println!(
            "as {label}: {} games | W {} ({}) D {} ({}) L {} ({}) | unclassified {}",
            breakdown.total,
            breakdown.wins,
            fmt_pct(breakdown.win_ratio),
            breakdown.draws,
            fmt_pct(breakdown.draw_ratio),
            breakdown.losses,
            fmt_pct(breakdown.loss_ratio),
            breakdown.unclassified,
        );
    }

    println!(
        "avg opponent: {}  (wins {}, draws {}, losses {})",
        fmt_opt_i64(bundle.avg_opponent_rating),
        fmt_opt_i64(bundle.avg_opponent_rating_wins),
        fmt_opt_i64(bundle.avg_opponent_rating_draws),
        fmt_opt_i64(bundle.avg_opponent_rating_losses),
    );
    match &bundle.best_win {
        Some(win) => println!("best win: {} ({})", win.opponent, win.rating),
        None => println!("best win: -"),
    }
    println!(
        "peak ratings  rapid {}  blitz {}  bullet {}",
        fmt_opt_u32(bundle.rapid_peak),
        fmt_opt_u32(bundle.blitz_peak),
        fmt_opt_u32(bundle.bullet_peak),
    );

    for (label, rankings) in [
        ("white", &bundle.white_openings),
        ("black", &bundle.black_openings),
    ] {
        println!("most played as {label}:");
        for entry in &rankings.most_played {
            println!("  {:>4}x {}", entry.games, entry.opening);
        }
        println!("most accurate as {label}:");
        for entry in &rankings.most_accurate {
            println!("  {:>6.2} {}", entry.mean_accuracy, entry.opening);
        }
    }

    print_series(RatingWindow::LastYear, &bundle.rating_last_year);
    print_series(RatingWindow::Last3Years, &bundle.rating_last_3_years);
    print_series(RatingWindow::AllTime, &bundle.rating_all_time);

    for (label, shares) in [
        ("won by", &bundle.win_terminations),
        ("drew by", &bundle.draw_terminations),
        ("lost by", &bundle.loss_terminations),
    ] {
        if shares.is_empty() {
            continue;
        }
        let parts: Vec<String> = shares
            .iter()
            .map(|s| format!("{} {:.2}%", s.reason, s.share))
            .collect();
        println!("{label}: {}", parts.join(", "));
    }
}

fn print_series(window: RatingWindow, series: &RatingSeries) {
    let label = window.label();
    match series.peak {
        Some(peak) => println!(
            "rating ({label}): {} smoothed points, peak {} on {}",
            series.points.len(),
            peak.rating,
            peak.date
        ),
        None => println!("rating ({label}): no dated games"),
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}%"))
}

fn fmt_opt_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn fmt_opt_i64(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn fmt_opt_u32(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
