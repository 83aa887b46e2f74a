use crate::classify::{
    ColorBreakdown, TerminationShare, classify_color, draw_terminations, loss_terminations,
    round2, win_terminations,
};
use crate::normalize::{Color, NormalizedGameRecord, Outcome, TimeClass, same_user};
use crate::openings::{OpeningRankings, analyze, distinct_openings};
use crate::opponents::{BestWin, avg_opponent_rating, best_win};
use crate::rating_series::{RatingSeries, RatingWindow, build};

/// Everything the presentation layer needs for one player, derived fresh
/// from the normalized record table on every query. Scalars and small lists
/// only; no handles back into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PlayerStatsBundle {
    pub username: String,
    pub total_games: usize,

    pub white: ColorBreakdown,
    pub black: ColorBreakdown,
    pub white_accuracy: Option<f64>,
    pub black_accuracy: Option<f64>,

    pub opening_lines: usize,
    pub white_openings: OpeningRankings,
    pub black_openings: OpeningRankings,

    pub avg_opponent_rating: Option<i64>,
    pub avg_opponent_rating_wins: Option<i64>,
    pub avg_opponent_rating_draws: Option<i64>,
    pub avg_opponent_rating_losses: Option<i64>,
    pub best_win: Option<BestWin>,

    pub rapid_peak: Option<u32>,
    pub blitz_peak: Option<u32>,
    pub bullet_peak: Option<u32>,

    pub rating_last_year: RatingSeries,
    pub rating_last_3_years: RatingSeries,
    pub rating_all_time: RatingSeries,

    pub win_terminations: Vec<TerminationShare>,
    pub draw_terminations: Vec<TerminationShare>,
    pub loss_terminations: Vec<TerminationShare>,
}

/// Pure orchestration over the record table: no I/O, no shared state, and an
/// empty input yields an all-zero/`None` bundle rather than an error.
pub fn compute_bundle(records: &[NormalizedGameRecord], player: &str) -> PlayerStatsBundle {
    let by_outcome = |wanted: Outcome| {
        records
            .iter()
            .filter(move |rec| rec.seat_of(player).is_some_and(|(seat, _)| seat.result.outcome() == wanted))
    };

    PlayerStatsBundle {
        username: player.to_string(),
        total_games: records.iter().filter(|rec| rec.involves(player)).count(),

        white: classify_color(records, player, Color::White),
        black: classify_color(records, player, Color::Black),
        white_accuracy: accuracy_mean(records, player, Color::White),
        black_accuracy: accuracy_mean(records, player, Color::Black),

        opening_lines: distinct_openings(records, player),
        white_openings: analyze(records, player, Color::White),
        black_openings: analyze(records, player, Color::Black),

        avg_opponent_rating: avg_opponent_rating(records, player),
        avg_opponent_rating_wins: avg_opponent_rating(by_outcome(Outcome::Win), player),
        avg_opponent_rating_draws: avg_opponent_rating(by_outcome(Outcome::Draw), player),
        avg_opponent_rating_losses: avg_opponent_rating(by_outcome(Outcome::Loss), player),
        best_win: best_win(records, player),

        rapid_peak: time_class_peak(records, player, &TimeClass::Rapid),
        blitz_peak: time_class_peak(records, player, &TimeClass::Blitz),
        bullet_peak: time_class_peak(records, player, &TimeClass::Bullet),

        rating_last_year: build(records, player, RatingWindow::LastYear),
        rating_last_3_years: build(records, player, RatingWindow::Last3Years),
        rating_all_time: build(records, player, RatingWindow::AllTime),

        win_terminations: win_terminations(records, player),
        draw_terminations: draw_terminations(records, player),
        loss_terminations: loss_terminations(records, player),
    }
}

/// Mean engine accuracy for the player's games in one color, over reviewed
/// games only. `None` when no game in that color carries an accuracy.
fn accuracy_mean(records: &[NormalizedGameRecord], player: &str, color: Color) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for rec in records {
        let side = rec.side(color);
        if !same_user(&side.username, player) {
            continue;
        }
        if let Some(acc) = side.accuracy {
            sum += acc;
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    Some(round2(sum / n as f64))
}

/// Highest rating seen in the player's games of one time class. Like the
/// rating series, both seats feed the max.
fn time_class_peak(
    records: &[NormalizedGameRecord],
    player: &str,
    time_class: &TimeClass,
) -> Option<u32> {
    let mut max: Option<u32> = None;
    for rec in records {
        if rec.time_class != *time_class || !rec.involves(player) {
            continue;
        }
        for rating in [rec.white.rating, rec.black.rating].into_iter().flatten() {
            if max.is_none_or(|m| rating > m) {
                max = Some(rating);
            }
        }
    }
    max
}
