// src/services/simulation.rs
use rand::Rng;
use rand_distr::StandardNormal;
use std::collections::BTreeMap;

use crate::models::{HorizonOutcome, ModelParameters};

/// Default number of simulated terminal values per horizon.
pub const DEFAULT_PATHS: usize = 10_000;

const BEST_CASE_PERCENTILE: f64 = 95.0;
const WORST_CASE_PERCENTILE: f64 = 5.0;

/// Simulate geometric Brownian motion terminal values for each horizon.
/// Horizons are independent draws, not steps along one path; only the
/// terminal distribution matters here.
pub fn simulate_horizons(
    initial_investment: f64,
    params: &ModelParameters,
    horizons: &[u32],
    paths: usize,
) -> BTreeMap<u32, HorizonOutcome> {
    simulate_horizons_with_rng(
        &mut rand::thread_rng(),
        initial_investment,
        params,
        horizons,
        paths,
    )
}

pub fn simulate_horizons_with_rng<R: Rng>(
    rng: &mut R,
    initial_investment: f64,
    params: &ModelParameters,
    horizons: &[u32],
    paths: usize,
) -> BTreeMap<u32, HorizonOutcome> {
    let mut results = BTreeMap::new();

    for &horizon in horizons {
        let years = f64::from(horizon);
        let drift = (params.mu - 0.5 * params.sigma.powi(2)) * years;
        let diffusion_scale = params.sigma * years.sqrt();

        let mut terminal: Vec<f64> = (0..paths)
            .map(|_| {
                let z: f64 = rng.sample(StandardNormal);
                initial_investment * (drift + diffusion_scale * z).exp()
            })
            .collect();
        terminal.sort_by(f64::total_cmp);

        results.insert(
            horizon,
            HorizonOutcome {
                expected_value: mean(&terminal),
                best_case: percentile(&terminal, BEST_CASE_PERCENTILE),
                worst_case: percentile(&terminal, WORST_CASE_PERCENTILE),
            },
        );
    }

    results
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linearly interpolated percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - lo as f64;
    sorted[lo] + weight * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HORIZONS: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((percentile(&sorted, 50.0) - 30.0).abs() < 1e-12);
        assert!((percentile(&sorted, 95.0) - 48.0).abs() < 1e-12);
        assert!((percentile(&sorted, 5.0) - 12.0).abs() < 1e-12);
        assert!((percentile(&sorted, 0.0) - 10.0).abs() < 1e-12);
        assert!((percentile(&sorted, 100.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn outcomes_are_ordered_for_every_horizon() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = ModelParameters { mu: 0.06, sigma: 0.30 };
        let results = simulate_horizons_with_rng(&mut rng, 1_000.0, &params, &HORIZONS, 2_000);

        assert_eq!(results.len(), HORIZONS.len());
        for (horizon, outcome) in &results {
            assert!(
                outcome.worst_case <= outcome.expected_value
                    && outcome.expected_value <= outcome.best_case,
                "horizon {} out of order: {:?}",
                horizon,
                outcome
            );
            assert!(outcome.worst_case > 0.0);
        }
    }

    #[test]
    fn seeded_mean_tracks_the_closed_form() {
        // E[S_T] = S_0 * exp(mu * T); 10,000 paths keep the sampling error
        // well inside 5%.
        let mut rng = StdRng::seed_from_u64(42);
        let params = ModelParameters { mu: 0.08, sigma: 0.15 };
        let results = simulate_horizons_with_rng(&mut rng, 10_000.0, &params, &[5], 10_000);

        let outcome = results[&5];
        let analytic = 10_000.0 * (0.08_f64 * 5.0).exp();
        let relative_err = (outcome.expected_value - analytic).abs() / analytic;
        assert!(
            relative_err < 0.05,
            "expected ~{:.0}, simulated {:.0}",
            analytic,
            outcome.expected_value
        );
    }

    #[test]
    fn zero_volatility_collapses_to_deterministic_growth() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = ModelParameters { mu: 0.05, sigma: 0.0 };
        let results = simulate_horizons_with_rng(&mut rng, 1_000.0, &params, &[10], 500);

        let outcome = results[&10];
        let analytic = 1_000.0 * (0.05_f64 * 10.0).exp();
        assert!((outcome.expected_value - analytic).abs() / analytic < 1e-9);
        assert!((outcome.best_case - analytic).abs() / analytic < 1e-9);
        assert!((outcome.worst_case - analytic).abs() / analytic < 1e-9);
    }

    #[test]
    fn same_seed_reproduces_the_projection() {
        let params = ModelParameters { mu: 0.07, sigma: 0.20 };

        let mut rng_a = StdRng::seed_from_u64(123);
        let a = simulate_horizons_with_rng(&mut rng_a, 5_000.0, &params, &[1, 5], 1_000);

        let mut rng_b = StdRng::seed_from_u64(123);
        let b = simulate_horizons_with_rng(&mut rng_b, 5_000.0, &params, &[1, 5], 1_000);

        assert_eq!(a, b);
    }
}
