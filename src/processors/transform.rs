//! Pure score transformations shared by both cascade stages.

/// Applies softmax to a slice of raw logits.
///
/// Uses the max-subtraction form so large logits do not overflow. An empty
/// input returns an empty vector.
///
/// # Arguments
///
/// * `logits` - Raw unnormalized model outputs
///
/// # Returns
///
/// A vector of probabilities in `[0, 1]` summing to 1.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

/// Converts probabilities in `[0, 1]` into percentages in `[0, 100]`.
pub fn to_percentages(probabilities: &[f32]) -> Vec<f32> {
    probabilities.iter().map(|&p| p * 100.0).collect()
}

/// Returns the index of the maximum score, or `None` for an empty slice.
///
/// Ties resolve to the lowest index: later scores only win with a strictly
/// greater value.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
