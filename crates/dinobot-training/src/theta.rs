//! Parameter vector operations for SPSA.
//!
//! These are the vector steps [`SpsaOptimizer`](crate::spsa::SpsaOptimizer) is built from:
//!
//! - **Direction**: [`perturbation`] draws a random ±1 vector
//! - **Probing**: [`offset`] moves theta along that direction
//! - **Gradient**: [`gradient_estimate`] turns two costs into a per-component gradient
//! - **Update**: [`descend`] steps against the gradient in place
//!
//! # Why ±1
//!
//! Every component of a perturbation is drawn independently from `{+1, -1}` with equal
//! probability. The gradient estimate divides by each component, so a distribution that can
//! produce zero (or values near it) would blow up the estimate.

use rand::Rng;

/// Draws a perturbation direction with every component uniformly `+1.0` or `-1.0`.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `len` - Number of components, matching the parameter vector
pub fn perturbation<R>(rng: &mut R, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    (0..len)
        .map(|_| if rng.random_bool(0.5) { 1.0 } else { -1.0 })
        .collect()
}

/// Returns `theta + scale * direction`.
///
/// # Panics
///
/// Panics if `theta` and `direction` have different lengths.
#[must_use]
pub fn offset(theta: &[f32], direction: &[f32], scale: f32) -> Vec<f32> {
    assert_eq!(theta.len(), direction.len());
    theta
        .iter()
        .zip(direction)
        .map(|(t, d)| t + scale * d)
        .collect()
}

/// Estimates the gradient from the costs on both sides of theta.
///
/// ```text
/// gᵢ = (cost_plus - cost_minus) / (2 · c · Δᵢ)
/// ```
///
/// # Arguments
///
/// * `cost_plus` - Cost at `theta + c · Δ`
/// * `cost_minus` - Cost at `theta - c · Δ`
/// * `c` - Perturbation size used for both probes
/// * `direction` - The perturbation `Δ`
#[must_use]
pub fn gradient_estimate(cost_plus: f32, cost_minus: f32, c: f32, direction: &[f32]) -> Vec<f32> {
    let diff = cost_plus - cost_minus;
    direction.iter().map(|d| diff / (2.0 * c * d)).collect()
}

/// Applies `theta ← theta - step · gradient` in place.
///
/// # Panics
///
/// Panics if `theta` and `gradient` have different lengths.
pub fn descend(theta: &mut [f32], gradient: &[f32], step: f32) {
    assert_eq!(theta.len(), gradient.len());
    for (t, g) in theta.iter_mut().zip(gradient) {
        *t -= step * g;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_perturbation_is_plus_or_minus_one() {
        let mut rng = Pcg32::seed_from_u64(42);
        let delta = perturbation(&mut rng, 1000);
        assert_eq!(delta.len(), 1000);
        assert!(delta.iter().all(|d| *d == 1.0 || *d == -1.0));

        let positives = delta.iter().filter(|d| **d > 0.0).count();
        assert!((400..600).contains(&positives), "positives = {positives}");
    }

    #[test]
    fn test_perturbation_is_seeded() {
        let a = perturbation(&mut Pcg32::seed_from_u64(5), 16);
        let b = perturbation(&mut Pcg32::seed_from_u64(5), 16);
        assert_eq!(a, b);
        assert!(perturbation(&mut Pcg32::seed_from_u64(5), 0).is_empty());
    }

    #[test]
    fn test_offset_both_sides() {
        let theta = [1.0, 2.0, 3.0];
        let delta = [1.0, -1.0, 1.0];
        assert_eq!(offset(&theta, &delta, 0.5), vec![1.5, 1.5, 3.5]);
        assert_eq!(offset(&theta, &delta, -0.5), vec![0.5, 2.5, 2.5]);
    }

    #[test]
    fn test_gradient_sign_follows_direction() {
        let gradient = gradient_estimate(3.0, 1.0, 0.5, &[1.0, -1.0]);
        assert_eq!(gradient, vec![2.0, -2.0]);
        assert_eq!(gradient_estimate(1.0, 1.0, 0.5, &[1.0, -1.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_descend() {
        let mut theta = vec![1.0, -1.0];
        descend(&mut theta, &[2.0, -4.0], 0.25);
        assert_eq!(theta, vec![0.5, 0.0]);
    }
}
