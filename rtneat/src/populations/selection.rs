use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Picks an index with probability proportional to
/// its weight. Negative and non-finite weights count
/// as zero; if every weight is zero the pick is uniform.
/// Returns `None` only for an empty slice.
pub(super) fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let sanitized = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 });
    match WeightedIndex::new(sanitized) {
        Ok(distribution) => Some(distribution.sample(rng)),
        Err(_) => Some(rng.gen_range(0..weights.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;

    #[test]
    fn empty() {
        let mut rng = StepRng::new(0, 1);
        assert_eq!(roulette(&[], &mut rng), None);
    }

    #[test]
    fn zero_weights_are_never_picked() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(roulette(&[0.0, 2.0, -1.0, f64::NAN], &mut rng), Some(1));
        }
    }

    #[test]
    fn all_zero_falls_back_to_uniform() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[roulette(&[0.0, 0.0, 0.0], &mut rng).unwrap()] = true;
        }
        assert_eq!(seen, [true; 3]);
    }
}
