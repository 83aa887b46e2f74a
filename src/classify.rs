use std::collections::HashMap;

use crate::normalize::{Color, NormalizedGameRecord, Outcome, same_user};

/// Win/draw/loss partition for one player in one color. Counts always sum to
/// `total` because unclassified result codes get their own bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorBreakdown {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub unclassified: usize,
    pub total: usize,
    pub win_ratio: Option<f64>,
    pub loss_ratio: Option<f64>,
    pub draw_ratio: Option<f64>,
}

pub fn classify_color(
    records: &[NormalizedGameRecord],
    player: &str,
    color: Color,
) -> ColorBreakdown {
    let mut out = ColorBreakdown::default();
    for rec in records {
        let side = rec.side(color);
        if !same_user(&side.username, player) {
            continue;
        }
        out.total += 1;
        match side.result.outcome() {
            Outcome::Win => out.wins += 1,
            Outcome::Loss => out.losses += 1,
            Outcome::Draw => out.draws += 1,
            Outcome::Unclassified => out.unclassified += 1,
        }
    }
    if out.total > 0 {
        out.win_ratio = Some(ratio_pct(out.wins, out.total));
        out.loss_ratio = Some(ratio_pct(out.losses, out.total));
        out.draw_ratio = Some(ratio_pct(out.draws, out.total));
    }
    out
}

/// Percentage share of one terminal condition within an outcome bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationShare {
    pub reason: String,
    pub games: usize,
    pub share: f64,
}

/// How the player won: the opponent's loss reason across the player's wins,
/// in either color. Reasons outside the loss vocabulary collapse to "other".
pub fn win_terminations(records: &[NormalizedGameRecord], player: &str) -> Vec<TerminationShare> {
    reason_shares(records, player, |seat, opponent| {
        if seat.result.outcome() != Outcome::Win {
            return None;
        }
        Some(labelled(&opponent.result, Outcome::Loss))
    })
}

/// How the player drew: the player's own draw reason.
pub fn draw_terminations(records: &[NormalizedGameRecord], player: &str) -> Vec<TerminationShare> {
    reason_shares(records, player, |seat, _opponent| {
        if seat.result.outcome() != Outcome::Draw {
            return None;
        }
        Some(labelled(&seat.result, Outcome::Draw))
    })
}

/// How the player lost: the player's own loss reason.
pub fn loss_terminations(records: &[NormalizedGameRecord], player: &str) -> Vec<TerminationShare> {
    reason_shares(records, player, |seat, _opponent| {
        if seat.result.outcome() != Outcome::Loss {
            return None;
        }
        Some(labelled(&seat.result, Outcome::Loss))
    })
}

fn labelled(code: &crate::normalize::ResultCode, expected: Outcome) -> String {
    if code.outcome() == expected {
        code.as_code().to_string()
    } else {
        "other".to_string()
    }
}

fn reason_shares<F>(records: &[NormalizedGameRecord], player: &str, pick: F) -> Vec<TerminationShare>
where
    F: Fn(&crate::normalize::SidePlayer, &crate::normalize::SidePlayer) -> Option<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;
    for rec in records {
        let Some((seat, opponent)) = rec.seat_of(player) else {
            continue;
        };
        let Some(reason) = pick(seat, opponent) else {
            continue;
        };
        *counts.entry(reason).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return Vec::new();
    }
    let mut shares: Vec<TerminationShare> = counts
        .into_iter()
        .map(|(reason, games)| TerminationShare {
            share: ratio_pct(games, total),
            reason,
            games,
        })
        .collect();
    // Deterministic output: biggest bucket first, name breaks ties.
    shares.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.reason.cmp(&b.reason)));
    shares
}

pub(crate) fn ratio_pct(count: usize, total: usize) -> f64 {
    round2((count as f64 / total as f64) * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_is_two_decimals() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
    }
}
