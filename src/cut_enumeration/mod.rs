// SPDX-License-Identifier: Apache-2.0

//! Bottom-up enumeration of K-feasible cuts.
//!
//! Every node receives a bounded list of cuts. The list is ordered best
//! first according to the configured `CutRanking` and always ends with the
//! trivial cut `{node}`.

pub mod cut;
pub mod cut_set;
pub mod enumerate;

use serde::{Deserialize, Serialize};

use crate::lutmap_error::LutMapError;
use crate::truth_table::{TruthTable, MAX_VARS};
use crate::truth_table_cache::TruthTableCache;

pub use cut::{Cut, CutData, CutRanking};
pub use enumerate::cut_enumeration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutEnumerationParams {
    /// Maximum number of leaves in a cut (K).
    pub cut_size: usize,
    /// Maximum number of cuts kept per node, including the trivial cut.
    pub cut_limit: usize,
    /// Whether to compute the function of every cut.
    pub compute_truth: bool,
    pub ranking: CutRanking,
}

impl Default for CutEnumerationParams {
    fn default() -> Self {
        Self {
            cut_size: 4,
            cut_limit: 12,
            compute_truth: false,
            ranking: CutRanking::AreaFlow,
        }
    }
}

impl CutEnumerationParams {
    pub fn validate(&self) -> Result<(), LutMapError> {
        if self.cut_size == 0 || self.cut_size > MAX_VARS {
            return Err(LutMapError::InvalidParams(format!(
                "cut_size must be in 1..={}; got {}",
                MAX_VARS, self.cut_size
            )));
        }
        if self.cut_limit < 2 {
            return Err(LutMapError::InvalidParams(format!(
                "cut_limit must leave room for one cut besides the trivial cut; got {}",
                self.cut_limit
            )));
        }
        Ok(())
    }
}

/// The cuts of every node of a network, indexed by `node_to_index`.
pub struct NetworkCuts {
    pub(crate) cut_sets: Vec<Vec<Cut>>,
    pub(crate) cache: TruthTableCache,
    pub(crate) params: CutEnumerationParams,
}

impl NetworkCuts {
    pub fn cuts(&self, node_index: usize) -> &[Cut] {
        &self.cut_sets[node_index]
    }

    /// Best-ranked cut of the node; for nodes without a non-trivial cut this
    /// is the trivial cut.
    pub fn best_cut(&self, node_index: usize) -> &Cut {
        &self.cut_sets[node_index][0]
    }

    pub fn total_cuts(&self) -> usize {
        self.cut_sets.iter().map(|s| s.len()).sum()
    }

    pub fn num_nodes(&self) -> usize {
        self.cut_sets.len()
    }

    /// Function of `cut` over its leaves (leaf `i` is variable `i`), if
    /// functions were computed.
    pub fn truth_table(&self, cut: &Cut) -> Option<TruthTable> {
        cut.function().map(|h| self.cache.get(h))
    }

    pub fn params(&self) -> &CutEnumerationParams {
        &self.params
    }

    pub fn cache(&self) -> &TruthTableCache {
        &self.cache
    }
}
