use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

use crate::normalize::NormalizedGameRecord;

/// Trailing moving-average window, in distinct dates rather than calendar
/// days. Below this many dates there is nothing to smooth.
pub const SMOOTHING_WINDOW: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingWindow {
    LastYear,
    Last3Years,
    AllTime,
}

impl RatingWindow {
    pub fn label(self) -> &'static str {
        match self {
            RatingWindow::LastYear => "Last 1 Year",
            RatingWindow::Last3Years => "Last 3 Years",
            RatingWindow::AllTime => "All Time",
        }
    }

    fn months_back(self) -> Option<u32> {
        match self {
            RatingWindow::LastYear => Some(12),
            RatingWindow::Last3Years => Some(36),
            RatingWindow::AllTime => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingPoint {
    pub date: NaiveDate,
    pub smoothed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakRating {
    pub date: NaiveDate,
    pub rating: u32,
}

/// Smoothed trajectory plus the unsmoothed peak. `points` is empty when the
/// window holds fewer than [`SMOOTHING_WINDOW`] distinct dates; `peak` is
/// reported whenever the windowed series is non-empty at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSeries {
    pub points: Vec<RatingPoint>,
    pub peak: Option<PeakRating>,
}

/// Builds the per-day-max rating series for `player` within `window`.
///
/// Windows are anchored to the newest date present in the player's dated
/// records, not to the wall clock, so an inactive player still gets a
/// meaningful "last year". Undated records are skipped. Both seats' ratings
/// feed the daily max, matching how the rating chart has always been drawn.
pub fn build(
    records: &[NormalizedGameRecord],
    player: &str,
    window: RatingWindow,
) -> RatingSeries {
    let mut daily_max: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for rec in records {
        if !rec.involves(player) {
            continue;
        }
        let Some(date) = rec.game_date else {
            continue;
        };
        for rating in [rec.white.rating, rec.black.rating].into_iter().flatten() {
            let entry = daily_max.entry(date).or_insert(rating);
            if rating > *entry {
                *entry = rating;
            }
        }
    }

    let Some((&max_date, _)) = daily_max.iter().next_back() else {
        return RatingSeries::default();
    };
    if let Some(months) = window.months_back() {
        let cutoff = max_date
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        daily_max.retain(|date, _| *date >= cutoff);
    }

    let series: Vec<(NaiveDate, u32)> = daily_max.into_iter().collect();

    // Unsmoothed peak over the per-day-max series; first occurrence wins.
    let mut peak: Option<PeakRating> = None;
    for &(date, rating) in &series {
        if peak.is_none_or(|p| rating > p.rating) {
            peak = Some(PeakRating { date, rating });
        }
    }

    let mut points = Vec::new();
    if series.len() >= SMOOTHING_WINDOW {
        for i in (SMOOTHING_WINDOW - 1)..series.len() {
            let window_slice = &series[i + 1 - SMOOTHING_WINDOW..=i];
            let sum: u64 = window_slice.iter().map(|&(_, r)| u64::from(r)).sum();
            points.push(RatingPoint {
                date: series[i].0,
                smoothed: sum as f64 / SMOOTHING_WINDOW as f64,
            });
        }
    }

    RatingSeries { points, peak }
}
