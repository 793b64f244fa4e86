//! Distribution helpers for population draws

use rand::Rng;

/// Draw a standard-normal deviate via the Box-Muller transform.
pub fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    // u1 must be strictly positive for the log
    let mut u1: f64 = rng.gen();
    while u1 <= f64::MIN_POSITIVE {
        u1 = rng.gen();
    }
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Location parameter of a log-normal with the given untransformed mean/stdev
pub fn lognormal_mu(mean: f64, stdev: f64) -> f64 {
    mean.ln() - 0.5 * (1.0 + (stdev * stdev) / (mean * mean)).ln()
}

/// Scale parameter of a log-normal with the given untransformed mean/stdev
pub fn lognormal_sigma(mean: f64, stdev: f64) -> f64 {
    ((stdev * stdev) / (mean * mean) + 1.0).ln().sqrt()
}

/// Convert a standard-normal deviate to a log-normal one
pub fn normal_to_lognormal(mu: f64, sigma: f64, normal_val: f64) -> f64 {
    (mu + sigma * normal_val).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_gaussian_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance {var}");
    }

    #[test]
    fn test_lognormal_mean_is_recovered() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (mean, stdev) = (3.55, 1.61);
        let mu = lognormal_mu(mean, stdev);
        let sigma = lognormal_sigma(mean, stdev);
        let n = 50_000;
        let sum: f64 = (0..n)
            .map(|_| normal_to_lognormal(mu, sigma, gaussian(&mut rng)))
            .sum();
        let sample_mean = sum / n as f64;
        assert!(
            (sample_mean - mean).abs() < 0.1,
            "sample mean {sample_mean} vs {mean}"
        );
    }
}
