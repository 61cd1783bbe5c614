//! Folding engine readings onto one signed scale, and the win-probability curve

use crate::engine::{PositionEvaluation, ScoreKind};

/// Magnitude of a mate-in-1 on the normalized scale
pub const MATE_SCORE: i32 = 10_000;

/// Mate distances beyond this stop shortening the score
const MATE_DISTANCE_CAP: i32 = 1000;

/// No mate score is ever closer to zero than this, so mates dominate centipawns
pub const MATE_FLOOR: i32 = 9_000;

/// Signed centipawn-equivalent score from White's perspective
pub type NormalizedScore = i32;

/// Converts an engine reading into a [`NormalizedScore`].
///
/// Centipawns pass through; mate-in-N becomes
/// `sign(N) * (10000 - min(|N|, 1000) * 10)`, never smaller in magnitude than
/// [`MATE_FLOOR`]. Unknown kinds fall back to 0.
pub fn normalize(eval: &PositionEvaluation) -> NormalizedScore {
    match eval.kind {
        ScoreKind::Centipawn => eval.value,
        ScoreKind::Mate => {
            let distance = eval.value.abs().min(MATE_DISTANCE_CAP);
            let magnitude = (MATE_SCORE - distance * 10).max(MATE_FLOOR);
            eval.value.signum() * magnitude
        }
        ScoreKind::Unknown => 0,
    }
}

/// Win probability in `[0, 100]` for White, given a White-perspective score
pub fn win_probability(score: NormalizedScore) -> f64 {
    let magnitude = score.unsigned_abs() as f64;
    let chances = 2.0 / (1.0 + 10f64.powf(-magnitude / 400.0)) - 1.0;
    50.0 + 50.0 * chances * f64::from(score.signum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centipawns_pass_through() {
        assert_eq!(normalize(&PositionEvaluation::centipawns(-137)), -137);
    }

    #[test]
    fn test_mate_scale() {
        assert_eq!(normalize(&PositionEvaluation::mate(1)), 9_990);
        assert_eq!(normalize(&PositionEvaluation::mate(-1)), -9_990);
        assert_eq!(normalize(&PositionEvaluation::mate(5)), 9_950);
        assert!(normalize(&PositionEvaluation::mate(2)) < normalize(&PositionEvaluation::mate(1)));
    }

    #[test]
    fn test_mate_floor() {
        assert_eq!(normalize(&PositionEvaluation::mate(250)), MATE_FLOOR);
        assert_eq!(normalize(&PositionEvaluation::mate(-5000)), -MATE_FLOOR);
        assert_eq!(normalize(&PositionEvaluation::mate(999)), MATE_FLOOR);
    }

    #[test]
    fn test_unknown_is_neutral() {
        assert_eq!(normalize(&PositionEvaluation::unknown()), 0);
    }

    #[test]
    fn test_win_probability_midpoint() {
        assert!((win_probability(0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_win_probability_symmetry() {
        for s in (-12_000..=12_000).step_by(37) {
            let sum = win_probability(s) + win_probability(-s);
            assert!((sum - 100.0).abs() < 1e-9, "asymmetric at {}", s);
        }
    }

    #[test]
    fn test_win_probability_monotonic() {
        let mut previous = win_probability(-12_000);
        for s in -11_999..=12_000 {
            let p = win_probability(s);
            assert!(p >= previous, "decreasing at {}", s);
            assert!((0.0..=100.0).contains(&p));
            previous = p;
        }
    }

    #[test]
    fn test_win_probability_known_points() {
        // 400cp is ten-to-one odds on the logistic curve
        assert!((win_probability(400) - (50.0 + 50.0 * (2.0 / 1.1 - 1.0))).abs() < 1e-9);
        assert!(win_probability(-900) < 1.0);
    }
}
