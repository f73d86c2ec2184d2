//! Weighted choice among a cell's remaining options.

use crate::guidance::Guidance;
use crate::rng::WfcRng;
use crate::variant::Variant;
use bitvec::slice::BitSlice;

/// Guidance scores are floored here so a zero score still leaves a tiny chance.
pub const MIN_GUIDANCE: f64 = 0.0001;

/// Pick one option from `options` at cell `(x, y, z)`.
///
/// Each option weighs `variant.weight * max(MIN_GUIDANCE, guidance)`; a
/// non-finite guidance score counts as 1.0. When the total is not a positive
/// finite number every option gets the same weight. Returns `None` only when
/// `options` is empty.
pub fn choose_variant(
    variants: &[Variant],
    options: &BitSlice,
    guidance: &dyn Guidance,
    (x, y, z): (usize, usize, usize),
    rng: &mut dyn WfcRng,
) -> Option<usize> {
    let mut candidates: Vec<(usize, f64)> = options
        .iter_ones()
        .map(|v| {
            let score = guidance.weight(x, y, z, v);
            let score = if score.is_finite() { score } else { 1.0 };
            (v, variants[v].weight * score.max(MIN_GUIDANCE))
        })
        .collect();

    let sum: f64 = candidates.iter().map(|(_, w)| w).sum();
    if !(sum.is_finite() && sum > 0.0) {
        for (_, w) in candidates.iter_mut() {
            *w = 1.0;
        }
    }
    weighted_random(&candidates, rng)
}

/// Draw one entry with probability proportional to its weight.
pub fn weighted_random(weights: &[(usize, f64)], rng: &mut dyn WfcRng) -> Option<usize> {
    let (last, _) = *weights.last()?;
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    let threshold = rng.next_double() * sum;

    let mut partial = 0.0;
    for &(v, w) in weights {
        partial += w;
        if partial > threshold {
            return Some(v);
        }
    }
    Some(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::Unguided;
    use crate::rng::StdRandom;
    use crate::tile::Tile;
    use crate::variant::generate_variants;
    use bitvec::prelude::*;

    fn variants(weights: &[f64]) -> Vec<Variant> {
        let tiles: Vec<Tile> = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Tile::new(format!("t{i}")).with_rotation(false).with_weight(w))
            .collect();
        generate_variants(&tiles)
    }

    struct Fixed(f64);

    impl WfcRng for Fixed {
        fn next_double(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_weighted_random_thresholds() {
        let weights = [(0, 1.0), (1, 3.0)];
        assert_eq!(weighted_random(&weights, &mut Fixed(0.0)), Some(0));
        assert_eq!(weighted_random(&weights, &mut Fixed(0.24)), Some(0));
        assert_eq!(weighted_random(&weights, &mut Fixed(0.26)), Some(1));
        assert_eq!(weighted_random(&weights, &mut Fixed(0.999)), Some(1));
        assert_eq!(weighted_random(&[], &mut Fixed(0.5)), None);
    }

    #[test]
    fn test_only_remaining_options_are_chosen() {
        let vs = variants(&[1.0, 1.0, 1.0]);
        let options = bitvec![0, 1, 0];
        let mut rng = StdRandom::from_seed(7);
        for _ in 0..20 {
            assert_eq!(
                choose_variant(&vs, &options, &Unguided, (0, 0, 0), &mut rng),
                Some(1)
            );
        }
    }

    #[test]
    fn test_guidance_shifts_distribution() {
        let vs = variants(&[1.0, 1.0]);
        let options = bitvec![1, 1];
        let favour_one = |_x: usize, _y: usize, _z: usize, v: usize| if v == 1 { 100.0 } else { 0.0 };
        let mut rng = StdRandom::from_seed(3);
        let ones = (0..200)
            .filter(|_| choose_variant(&vs, &options, &favour_one, (0, 0, 0), &mut rng) == Some(1))
            .count();
        assert!(ones > 190, "picked variant 1 only {ones} times");
    }

    #[test]
    fn test_non_finite_guidance_counts_as_one() {
        let vs = variants(&[1.0, 1.0]);
        let options = bitvec![1, 1];
        let nan = |_x: usize, _y: usize, _z: usize, _v: usize| f64::NAN;
        // Both options weigh 1.0, so the lower half of the roll picks the first.
        assert_eq!(choose_variant(&vs, &options, &nan, (0, 0, 0), &mut Fixed(0.4)), Some(0));
        assert_eq!(choose_variant(&vs, &options, &nan, (0, 0, 0), &mut Fixed(0.6)), Some(1));
    }

    #[test]
    fn test_overflowing_weights_fall_back_to_uniform() {
        let vs = variants(&[10.0, 1.0]);
        let options = bitvec![1, 1];
        // 10 * f64::MAX overflows to infinity.
        let huge = |_x: usize, _y: usize, _z: usize, v: usize| if v == 0 { f64::MAX } else { 1.0 };
        assert_eq!(choose_variant(&vs, &options, &huge, (0, 0, 0), &mut Fixed(0.4)), Some(0));
        assert_eq!(choose_variant(&vs, &options, &huge, (0, 0, 0), &mut Fixed(0.6)), Some(1));
    }

    #[test]
    fn test_negative_guidance_is_floored() {
        let vs = variants(&[1.0, 1.0]);
        let options = bitvec![1, 1];
        let negative = |_x: usize, _y: usize, _z: usize, v: usize| if v == 0 { -5.0 } else { 1.0 };
        // Variant 0 weighs 0.0001, so almost every roll lands on variant 1.
        assert_eq!(
            choose_variant(&vs, &options, &negative, (0, 0, 0), &mut Fixed(0.01)),
            Some(1)
        );
    }
}
