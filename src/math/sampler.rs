//! Weighted index selection driven by an externally supplied uniform draw

/// Pick an index from a nonnegative weight vector given a uniform `[0,1)` draw
///
/// The weights are normalized in place, so callers pass a scratch buffer. A
/// zero total is treated as a uniform distribution over all indices, which
/// keeps selection meaningful when every permitted entry carries zero weight.
/// The cumulative walk returns the first index whose prefix sum reaches `r`;
/// if floating-point rounding leaves the total just short of `r`, index 0 is
/// returned.
pub fn weighted_index(weights: &mut [f64], r: f64) -> usize {
    let mut sum: f64 = weights.iter().sum();

    if sum <= 0.0 {
        weights.fill(1.0);
        sum = weights.len() as f64;
    }

    for weight in weights.iter_mut() {
        *weight /= sum;
    }

    let mut cumulative = 0.0;
    for (i, &weight) in weights.iter().enumerate() {
        cumulative += weight;
        if r <= cumulative {
            return i;
        }
    }

    0
}
