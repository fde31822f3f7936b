// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::truth_table_cache::TtHandle;

/// Cost estimate attached to every cut.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CutData {
    /// LUT levels needed to realize the node through this cut.
    pub delay: u32,
    /// Area flow: the LUT area of the cone, shared among the node's fanouts.
    pub flow: f32,
}

/// A set of leaf nodes (by `node_to_index`) that bounds a cone ending at the
/// cut's root node.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    /// Sorted, duplicate-free node indices.
    leaves: Vec<usize>,
    function: Option<TtHandle>,
    data: CutData,
}

impl Cut {
    pub fn new(leaves: Vec<usize>, function: Option<TtHandle>, data: CutData) -> Self {
        debug_assert!(
            leaves.windows(2).all(|w| w[0] < w[1]),
            "cut leaves must be sorted and unique: {:?}",
            leaves
        );
        Cut {
            leaves,
            function,
            data,
        }
    }

    /// The cut `{index}` consisting of the node itself.
    pub fn trivial(index: usize, function: Option<TtHandle>, data: CutData) -> Self {
        Cut::new(vec![index], function, data)
    }

    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    pub fn size(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_trivial_for(&self, index: usize) -> bool {
        self.leaves.len() == 1 && self.leaves[0] == index
    }

    /// Handle of the cut function in the enumeration's cache; `None` when
    /// functions were not computed.
    pub fn function(&self) -> Option<TtHandle> {
        self.function
    }

    pub fn data(&self) -> CutData {
        self.data
    }

    pub(crate) fn set_data(&mut self, data: CutData) {
        self.data = data;
    }

    /// Whether every leaf of `self` is also a leaf of `other`.
    pub fn is_subset_of(&self, other: &Cut) -> bool {
        if self.leaves.len() > other.leaves.len() {
            return false;
        }
        let mut j = 0;
        for leaf in &self.leaves {
            while j < other.leaves.len() && other.leaves[j] < *leaf {
                j += 1;
            }
            if j == other.leaves.len() || other.leaves[j] != *leaf {
                return false;
            }
            j += 1;
        }
        true
    }
}

/// Merges two sorted leaf lists; returns `None` as soon as the union would
/// exceed `max_size` leaves.
pub fn merge_leaves(a: &[usize], b: &[usize], max_size: usize) -> Option<Vec<usize>> {
    let mut out = Vec::with_capacity(std::cmp::min(a.len() + b.len(), max_size));
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = if j == b.len() || (i < a.len() && a[i] < b[j]) {
            i += 1;
            a[i - 1]
        } else if i == a.len() || b[j] < a[i] {
            j += 1;
            b[j - 1]
        } else {
            i += 1;
            j += 1;
            a[i - 1]
        };
        if out.len() == max_size {
            return None;
        }
        out.push(next);
    }
    Some(out)
}

/// Order in which surviving cuts are ranked; the best cut comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CutRanking {
    /// Fewest leaves, then area flow, then delay.
    Size,
    /// Smallest area flow, then fewest leaves, then delay.
    #[default]
    AreaFlow,
    /// Smallest delay, then fewest leaves, then area flow.
    Delay,
}

/// Flow values are compared at a fixed resolution so that nearly equal
/// floating-point sums rank as ties.
fn flow_key(flow: f32) -> i64 {
    (flow as f64 * 1024.0).round() as i64
}

impl CutRanking {
    pub fn compare(self, a: &Cut, b: &Cut) -> Ordering {
        let size = a.size().cmp(&b.size());
        let flow = flow_key(a.data.flow).cmp(&flow_key(b.data.flow));
        let delay = a.data.delay.cmp(&b.data.delay);
        match self {
            CutRanking::Size => size.then(flow).then(delay),
            CutRanking::AreaFlow => flow.then(size).then(delay),
            CutRanking::Delay => delay.then(size).then(flow),
        }
    }
}
