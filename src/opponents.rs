use crate::normalize::{NormalizedGameRecord, Outcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestWin {
    pub opponent: String,
    pub rating: u32,
}

/// Mean rating of whichever seat is not `player`, rounded to the nearest
/// integer. `None` when no qualifying records exist — an average of zero
/// would falsely suggest games were played.
///
/// Takes any iterator of records so callers can condition it on an outcome
/// subset (wins only, draws only, ...) without a dedicated variant.
pub fn avg_opponent_rating<'a, I>(records: I, player: &str) -> Option<i64>
where
    I: IntoIterator<Item = &'a NormalizedGameRecord>,
{
    let mut sum: u64 = 0;
    let mut n: u64 = 0;
    for rec in records {
        let Some((_, opponent)) = rec.seat_of(player) else {
            continue;
        };
        let Some(rating) = opponent.rating else {
            continue;
        };
        sum += u64::from(rating);
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some((sum as f64 / n as f64).round() as i64)
}

/// The single highest-rated opponent the player beat. `None` when the player
/// has no classified wins.
pub fn best_win(records: &[NormalizedGameRecord], player: &str) -> Option<BestWin> {
    let mut best: Option<BestWin> = None;
    for rec in records {
        let Some((seat, opponent)) = rec.seat_of(player) else {
            continue;
        };
        if seat.result.outcome() != Outcome::Win {
            continue;
        }
        let Some(rating) = opponent.rating else {
            continue;
        };
        if best.as_ref().is_none_or(|b| rating > b.rating) {
            best = Some(BestWin {
                opponent: capitalize(&opponent.username),
                rating,
            });
        }
    }
    best
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
