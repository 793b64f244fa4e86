//! Income draws from a Lorenz-curve wealth model
//!
//! A resident's monthly income is the marginal income at a uniformly drawn
//! population percentile of a piecewise-linear Lorenz curve, scaled by the
//! mean income of their employment stream. Residents outside the labor force
//! earn nothing.

use rand::Rng;

use crate::core::config::Parameters;
use crate::world::resident::Employment;

/// Cumulative population share at each knot of the income Lorenz curve
const LORENZ_P: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
/// Cumulative income share held by the poorest LORENZ_P fraction
const LORENZ_L: [f64; 6] = [0.0, 0.036, 0.102, 0.206, 0.382, 1.0];

/// Income multiplier (relative to the stream mean) at percentile `p`
fn marginal_share(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    for i in 0..LORENZ_P.len() - 1 {
        if p <= LORENZ_P[i + 1] {
            return (LORENZ_L[i + 1] - LORENZ_L[i]) / (LORENZ_P[i + 1] - LORENZ_P[i]);
        }
    }
    (LORENZ_L[5] - LORENZ_L[4]) / (LORENZ_P[5] - LORENZ_P[4])
}

/// Monthly income for a resident with the given employment status
pub fn determine_income<R: Rng>(employment: Employment, params: &Parameters, rng: &mut R) -> f64 {
    let mean = match employment {
        Employment::Formal => params.formal_mean_income,
        Employment::Informal => params.informal_mean_income,
        Employment::Searching | Employment::Inactive => return 0.0,
    };
    let percentile: f64 = rng.gen();
    mean * marginal_share(percentile)
}
