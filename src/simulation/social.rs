//! Weighted social ties between residents
//!
//! Ties form and strengthen when residents are co-located at their goal
//! activity; weights feed socializing-partner choice and rebel influence.

use ahash::AHashMap;

use crate::core::types::ResidentId;

#[derive(Debug, Clone, Default)]
pub struct SocialNetwork {
    adjacency: AHashMap<ResidentId, AHashMap<ResidentId, f64>>,
}

impl SocialNetwork {
    pub fn weight(&self, a: ResidentId, b: ResidentId) -> Option<f64> {
        self.adjacency.get(&a).and_then(|n| n.get(&b)).copied()
    }

    /// Add `delta` to the tie between a and b, creating it at `delta` if absent
    pub fn strengthen(&mut self, a: ResidentId, b: ResidentId, delta: f64) {
        if a == b {
            return;
        }
        *self.adjacency.entry(a).or_default().entry(b).or_insert(0.0) += delta;
        *self.adjacency.entry(b).or_default().entry(a).or_insert(0.0) += delta;
    }

    pub fn set(&mut self, a: ResidentId, b: ResidentId, weight: f64) {
        if a == b {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b, weight);
        self.adjacency.entry(b).or_default().insert(a, weight);
    }

    /// Contacts of a resident with tie weights, in unspecified order
    pub fn contacts(&self, a: ResidentId) -> Vec<(ResidentId, f64)> {
        self.adjacency
            .get(&a)
            .map(|n| n.iter().map(|(&r, &w)| (r, w)).collect())
            .unwrap_or_default()
    }

    pub fn contact_count(&self, a: ResidentId) -> usize {
        self.adjacency.get(&a).map(|n| n.len()).unwrap_or(0)
    }
}
