use std::collections::HashMap;

use crate::normalize::{Color, NormalizedGameRecord, same_user};

#[derive(Debug, Clone, PartialEq)]
pub struct OpeningCount {
    pub opening: String,
    pub games: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpeningAccuracy {
    pub opening: String,
    pub games: usize,
    pub mean_accuracy: f64,
}

/// Top-5 rankings for one (player, color). Either list can hold fewer than
/// five entries; consumers bounds-check instead of assuming a fixed shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpeningRankings {
    pub most_played: Vec<OpeningCount>,
    pub most_accurate: Vec<OpeningAccuracy>,
}

const TOP_N: usize = 5;

#[derive(Debug, Default)]
struct OpeningGroup {
    games: usize,
    accuracy_sum: f64,
    accuracy_n: usize,
}

/// Ranks openings by play count and by mean accuracy for games where the
/// player held `color`. Grouping keys on the opening name, so input order
/// never changes the result; first-seen order breaks count ties.
pub fn analyze(records: &[NormalizedGameRecord], player: &str, color: Color) -> OpeningRankings {
    // First-seen insertion order kept alongside the index for stable ties.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, OpeningGroup> = HashMap::new();

    for rec in records {
        let side = rec.side(color);
        if !same_user(&side.username, player) {
            continue;
        }
        // Records with no recognizable opening carry no ranking signal.
        let Some(opening) = rec.opening.as_ref() else {
            continue;
        };
        let group = groups.entry(opening.clone()).or_insert_with(|| {
            order.push(opening.clone());
            OpeningGroup::default()
        });
        group.games += 1;
        if let Some(acc) = side.accuracy {
            group.accuracy_sum += acc;
            group.accuracy_n += 1;
        }
    }

    let mut most_played: Vec<OpeningCount> = order
        .iter()
        .map(|name| OpeningCount {
            opening: name.clone(),
            games: groups[name].games,
        })
        .collect();
    most_played.sort_by(|a, b| b.games.cmp(&a.games));
    most_played.truncate(TOP_N);

    let mut most_accurate: Vec<OpeningAccuracy> = order
        .iter()
        .filter_map(|name| {
            let group = &groups[name];
            if group.accuracy_n == 0 {
                return None;
            }
            Some(OpeningAccuracy {
                opening: name.clone(),
                games: group.games,
                mean_accuracy: group.accuracy_sum / group.accuracy_n as f64,
            })
        })
        .collect();
    most_accurate.sort_by(|a, b| {
        b.mean_accuracy
            .partial_cmp(&a.mean_accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    most_accurate.truncate(TOP_N);

    OpeningRankings {
        most_played,
        most_accurate,
    }
}

/// Number of distinct named openings across all of the player's games,
/// both colors combined.
pub fn distinct_openings(records: &[NormalizedGameRecord], player: &str) -> usize {
    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for rec in records {
        if !rec.involves(player) {
            continue;
        }
        if let Some(opening) = rec.opening.as_deref() {
            seen.insert(opening);
        }
    }
    seen.len()
}
