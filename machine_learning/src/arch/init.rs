use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{MlErr, Result};

/// Fills `out` with samples of the Xavier (Glorot) uniform distribution,
/// `U(-r, r)` with `r = sqrt(6 / (fan_in + fan_out))`.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `fan_in` - The number of input units in the weight tensor.
/// * `fan_out` - The number of output units in the weight tensor.
/// * `out` - The weights to initialize.
///
/// # Returns
/// An error if the calculated range is invalid.
pub fn xavier_uniform<R: Rng>(
    rng: &mut R,
    fan_in: usize,
    fan_out: usize,
    out: &mut [f32],
) -> Result<()> {
    let range = (6. / (fan_in + fan_out) as f32).sqrt();
    let distribution =
        Uniform::new(-range, range).map_err(|e| MlErr::InvalidInit(e.to_string()))?;

    out.iter_mut()
        .for_each(|w| *w = distribution.sample(rng));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn samples_stay_within_the_glorot_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut w = [0.0; 64];
        xavier_uniform(&mut rng, 4, 2, &mut w).unwrap();

        let range = 1.0f32;
        assert!(w.iter().all(|v| v.abs() <= range));
        assert!(w.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn empty_fans_are_rejected() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(xavier_uniform(&mut rng, 0, 0, &mut [0.0; 1]).is_err());
    }
}
