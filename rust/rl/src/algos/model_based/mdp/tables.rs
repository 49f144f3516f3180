//! Empirical model and value estimates learnt from observed transitions.
//!
//! Every table reads as zero for entries that were never written.

use gymnasium::{Continous, Discrete};
use std::collections::{BTreeMap, HashMap};

/// Last observed reward per `(state, action, next_state)`.
///
/// Repeated observations overwrite each other instead of being averaged,
/// which is only exact for environments with deterministic rewards.
#[derive(Debug, Clone, Default)]
pub struct RewardTable {
    rewards: HashMap<(Discrete, Discrete, Discrete), Continous>,
}

impl RewardTable {
    pub fn get(&self, s: Discrete, a: Discrete, s_next: Discrete) -> Continous {
        self.rewards.get(&(s, a, s_next)).copied().unwrap_or(0.)
    }

    pub fn record(&mut self, s: Discrete, a: Discrete, s_next: Discrete, r: Continous) {
        self.rewards.insert((s, a, s_next), r);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Next state visit counts per `(state, action)`. Counts only ever grow.
#[derive(Debug, Clone, Default)]
pub struct TransitionCounts {
    counts: HashMap<(Discrete, Discrete), BTreeMap<Discrete, usize>>,
}

impl TransitionCounts {
    pub fn record(&mut self, s: Discrete, a: Discrete, s_next: Discrete) {
        *self
            .counts
            .entry((s, a))
            .or_default()
            .entry(s_next)
            .or_default() += 1;
    }

    /// Next state counts observed after taking `a` in `s`, empty if never tried.
    pub fn targets(&self, s: Discrete, a: Discrete) -> impl Iterator<Item = (Discrete, usize)> + '_ {
        self.counts
            .get(&(s, a))
            .into_iter()
            .flat_map(|ts| ts.iter().map(|(&s_next, &n)| (s_next, n)))
    }

    pub fn count(&self, s: Discrete, a: Discrete, s_next: Discrete) -> usize {
        self.counts
            .get(&(s, a))
            .and_then(|ts| ts.get(&s_next))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self, s: Discrete, a: Discrete) -> usize {
        self.targets(s, a).map(|(_, n)| n).sum()
    }

    /// Number of transitions recorded over all pairs.
    pub fn grand_total(&self) -> usize {
        self.counts.values().flat_map(BTreeMap::values).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    values: HashMap<Discrete, Continous>,
}

impl ValueTable {
    pub fn get(&self, s: Discrete) -> Continous {
        self.values.get(&s).copied().unwrap_or(0.)
    }

    pub fn set(&mut self, s: Discrete, v: Continous) {
        self.values.insert(s, v);
    }
}
