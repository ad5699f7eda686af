use super::combinations::ParameterVariations;
use super::{ParamField, ParameterSet, ParameterSpace};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashSet;

impl ParameterSpace {
    /// Generate random parameter sets (Monte Carlo sampling).
    ///
    /// Samples up to `count` distinct parameter sets from the defined space.
    /// The same seed always yields the same sets in the same order. Fewer than
    /// `count` sets are returned when the space is smaller than requested.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        const MAX_ATTEMPTS: usize = 10_000;

        let variations = ParameterVariations::from_space(self);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut parameter_sets = Vec::new();
        let mut seen = HashSet::new();
        let mut attempts = 0;

        while parameter_sets.len() < count && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let mut params = variations.base();

            for field in ParamField::ALL {
                let candidates = variations.candidates(field);
                if let Some(&value) = candidates.get(rng.gen_range(0..candidates.len().max(1))) {
                    params.set(field, value);
                }
            }

            if !self.accepts(&params) || !seen.insert(params) {
                continue;
            }

            let index = parameter_sets.len();
            parameter_sets.push(ParameterSet::with_id(
                params,
                index,
                format!("sample_{index}"),
            ));
        }

        parameter_sets
    }
}
