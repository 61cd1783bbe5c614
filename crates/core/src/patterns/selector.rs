//! Picking a player's top highlights

use std::collections::HashSet;

use super::types::{HighlightCandidate, HighlightKind};

pub const MAX_HIGHLIGHTS: usize = 3;

/// A repeated kind still gets in when it scores at least this share of the best pick
const REPEAT_THRESHOLD: f64 = 0.8;

/// Chooses up to [`MAX_HIGHLIGHTS`] candidates, best score first, preferring
/// kinds not already chosen.
pub fn select_highlights(mut candidates: Vec<HighlightCandidate>) -> Vec<HighlightCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.priority_tier.cmp(&b.priority_tier))
    });

    let mut selected: Vec<HighlightCandidate> = Vec::with_capacity(MAX_HIGHLIGHTS);
    let mut kinds: HashSet<HighlightKind> = HashSet::new();

    for candidate in candidates {
        if selected.len() == MAX_HIGHLIGHTS {
            break;
        }
        if kinds.contains(&candidate.kind) {
            let best = selected.first().map(|c| c.score).unwrap_or(0.0);
            if candidate.score < best * REPEAT_THRESHOLD {
                continue;
            }
        }
        kinds.insert(candidate.kind);
        selected.push(candidate);
    }

    selected
}
