// SPDX-License-Identifier: Apache-2.0

use crate::cut_enumeration::cut::{Cut, CutRanking};

/// The cuts kept for one node while its candidates are being generated.
///
/// Candidates are kept free of dominated cuts as they are inserted; a cut is
/// dominated when another cut uses a subset of its leaves at a cost that is
/// not worse.
pub struct CutSet {
    cuts: Vec<Cut>,
    ranking: CutRanking,
}

impl CutSet {
    pub fn new(ranking: CutRanking) -> Self {
        CutSet {
            cuts: Vec::new(),
            ranking,
        }
    }

    fn dominates(&self, a: &Cut, b: &Cut) -> bool {
        a.is_subset_of(b) && self.ranking.compare(a, b) != std::cmp::Ordering::Greater
    }

    /// Inserts `cut` unless an existing cut dominates it, dropping every
    /// existing cut it dominates. Returns whether the cut was kept.
    pub fn insert(&mut self, cut: Cut) -> bool {
        if self.cuts.iter().any(|c| self.dominates(c, &cut)) {
            return false;
        }
        let ranking = self.ranking;
        self.cuts.retain(|c| {
            !(cut.is_subset_of(c) && ranking.compare(&cut, c) != std::cmp::Ordering::Greater)
        });
        self.cuts.push(cut);
        true
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Ranks the surviving cuts, keeps the best `limit - 1` of them, and
    /// appends `trivial` last.
    ///
    /// Ranking is stable: among equal-cost cuts the one generated first wins.
    pub fn finalize(mut self, limit: usize, trivial: Cut) -> Vec<Cut> {
        let ranking = self.ranking;
        self.cuts.sort_by(|a, b| ranking.compare(a, b));
        self.cuts.truncate(limit.saturating_sub(1));
        self.cuts.push(trivial);
        self.cuts
    }
}
