//! Accuracy and ACPL aggregation

/// Accuracy in `[0, 100]` from a side's win-probability losses.
///
/// `103.1668 * e^(-0.04354 * mean)`, clamped. No moves means nothing to
/// penalize, so an empty list is 100.
pub fn accuracy(losses: &[f64]) -> f64 {
    if losses.is_empty() {
        return 100.0;
    }
    let mean = losses.iter().sum::<f64>() / losses.len() as f64;
    (103.1668 * (-0.04354 * mean).exp()).clamp(0.0, 100.0)
}

/// Mean centipawn loss, 0 when there were no finite readings
pub fn acpl(cp_losses: &[i32]) -> f64 {
    if cp_losses.is_empty() {
        return 0.0;
    }
    cp_losses.iter().map(|&l| f64::from(l)).sum::<f64>() / cp_losses.len() as f64
}

/// Rounds to one decimal place for reporting
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
