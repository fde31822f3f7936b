// SPDX-License-Identifier: Apache-2.0

//! Cut-based LUT mapping.
//!
//! The mapper enumerates cuts, then selects one cut per node over several
//! rounds:
//! - a depth round picks, per node, the cut with the smallest arrival time;
//!   the resulting depth becomes the bound for every later round;
//! - area-flow rounds pick the cut with the smallest area flow whose arrival
//!   time still meets the node's required time;
//! - exact-area rounds pick the cut that adds the fewest LUTs to the current
//!   cover, measured by referencing and dereferencing its cone.
//!
//! Only nodes reachable from a primary output through the selected cuts end
//! up in the cover; the cover is written into the network through
//! `MappedNetwork`.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cut_enumeration::{cut_enumeration, CutEnumerationParams, CutRanking, NetworkCuts};
use crate::lutmap_error::LutMapError;
use crate::network::{MappedNetwork, Network, NodeRef};
use crate::topo::topo_sort_nodes;
use crate::truth_table::TruthTable;
use crate::use_count::fanout_counts;

const FLOW_EPSILON: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LutMappingParams {
    /// Cut enumeration settings; `cut_size` is the LUT input count.
    pub cut_enumeration: CutEnumerationParams,
    /// Run the depth round and keep later rounds within its depth.
    pub optimize_depth: bool,
    pub area_flow_rounds: u32,
    pub exact_area_rounds: u32,
}

impl Default for LutMappingParams {
    fn default() -> Self {
        Self {
            cut_enumeration: CutEnumerationParams {
                cut_size: 6,
                cut_limit: 8,
                compute_truth: false,
                ranking: CutRanking::AreaFlow,
            },
            optimize_depth: true,
            area_flow_rounds: 1,
            exact_area_rounds: 2,
        }
    }
}

impl LutMappingParams {
    pub fn validate(&self) -> Result<(), LutMapError> {
        self.cut_enumeration.validate()
    }

    /// Parses parameters from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, LutMapError> {
        let params: LutMappingParams = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LutMappingStats {
    pub luts: u32,
    pub depth: u32,
    /// Selection rounds that were run, including the initial one.
    pub rounds: u32,
}

/// One LUT of the final cover.
struct MappedLut {
    node: NodeRef,
    leaves: Vec<NodeRef>,
    function: Option<TruthTable>,
}

/// Leaves of candidate `choice` of node `index`.
///
/// A node whose only cut is the trivial one has a single candidate: its
/// structural fanins.
fn candidate_leaves<'c>(
    cuts: &'c NetworkCuts,
    structural: &'c [Vec<usize>],
    index: usize,
    choice: usize,
) -> &'c [usize] {
    let node_cuts = cuts.cuts(index);
    if node_cuts.len() > 1 {
        node_cuts[choice].leaves()
    } else {
        &structural[index]
    }
}

struct LutMapper<'a, N: Network> {
    ntk: &'a N,
    cuts: &'a NetworkCuts,
    params: &'a LutMappingParams,
    order: Vec<NodeRef>,
    terminal: Vec<bool>,
    structural: Vec<Vec<usize>>,
    best: Vec<usize>,
    map_refs: Vec<u32>,
    flow_refs: Vec<f32>,
    flows: Vec<f32>,
    delays: Vec<u32>,
    required: Vec<u32>,
    target_depth: Option<u32>,
    iteration: u32,
    area: u32,
    depth: u32,
}

impl<'a, N: Network> LutMapper<'a, N> {
    fn new(ntk: &'a N, cuts: &'a NetworkCuts, params: &'a LutMappingParams) -> Self {
        let size = ntk.size();
        let order = topo_sort_nodes(ntk);
        let mut terminal = vec![false; size];
        let mut structural = vec![Vec::new(); size];
        for node in &order {
            let index = ntk.node_to_index(*node);
            if ntk.is_constant(*node) || ntk.is_pi(*node) {
                terminal[index] = true;
            } else if cuts.cuts(index).len() == 1 {
                let mut leaves: Vec<usize> = ntk
                    .fanins(*node)
                    .iter()
                    .map(|s| ntk.node_to_index(ntk.get_node(*s)))
                    .collect();
                leaves.sort_unstable();
                leaves.dedup();
                structural[index] = leaves;
            }
        }
        let fanouts = fanout_counts(ntk);
        LutMapper {
            ntk,
            cuts,
            params,
            order,
            terminal,
            structural,
            best: vec![0; size],
            map_refs: fanouts.clone(),
            flow_refs: fanouts.iter().map(|f| std::cmp::max(1, *f) as f32).collect(),
            flows: vec![0.0; size],
            delays: vec![0; size],
            required: vec![u32::MAX; size],
            target_depth: None,
            iteration: 0,
            area: 0,
            depth: 0,
        }
    }

    fn candidate_count(&self, index: usize) -> usize {
        std::cmp::max(1, self.cuts.cuts(index).len() - 1)
    }

    fn cut_delay_and_flow(&self, leaves: &[usize]) -> (u32, f32) {
        let mut delay = 0;
        let mut flow = 1.0f32;
        for leaf in leaves {
            delay = std::cmp::max(delay, self.delays[*leaf]);
            flow += self.flows[*leaf];
        }
        (delay + 1, flow)
    }

    /// Area-flow or delay oriented selection for every gate.
    fn compute_mapping(&mut self, area_oriented: bool) {
        let cuts = self.cuts;
        for i in 0..self.order.len() {
            let index = self.ntk.node_to_index(self.order[i]);
            if self.terminal[index] {
                continue;
            }
            // (choice, delay, flow, size)
            let mut chosen: Option<(usize, u32, f32, usize)> = None;
            for choice in 0..self.candidate_count(index) {
                let leaves = candidate_leaves(cuts, &self.structural, index, choice);
                let (delay, flow) = self.cut_delay_and_flow(leaves);
                if area_oriented && delay > self.required[index] {
                    continue;
                }
                let size = leaves.len();
                let better = match chosen {
                    None => true,
                    Some((_, best_delay, best_flow, best_size)) => {
                        let flow_tie = (flow - best_flow).abs() <= FLOW_EPSILON;
                        if area_oriented {
                            flow < best_flow - FLOW_EPSILON
                                || (flow_tie
                                    && (delay < best_delay
                                        || (delay == best_delay && size < best_size)))
                        } else {
                            delay < best_delay
                                || (delay == best_delay
                                    && (flow < best_flow - FLOW_EPSILON
                                        || (flow_tie && size < best_size)))
                        }
                    }
                };
                if better {
                    chosen = Some((choice, delay, flow, size));
                }
            }
            let (choice, delay, flow) = match chosen {
                Some((choice, delay, flow, _)) => (choice, delay, flow),
                None => {
                    // Nothing meets the required time; keep the current choice.
                    let current = self.best[index];
                    let leaves = candidate_leaves(cuts, &self.structural, index, current);
                    let (delay, flow) = self.cut_delay_and_flow(leaves);
                    (current, delay, flow)
                }
            };
            self.best[index] = choice;
            self.delays[index] = delay;
            self.flows[index] = flow / self.flow_refs[index];
        }
    }

    /// References the cone of candidate `choice` of `root` and returns the
    /// number of LUTs that became referenced, counting `root` itself.
    fn cut_ref(&mut self, root: usize, choice: usize) -> u32 {
        let cuts = self.cuts;
        let mut count = 0;
        let mut stack = vec![(root, choice)];
        while let Some((index, choice)) = stack.pop() {
            count += 1;
            for leaf in candidate_leaves(cuts, &self.structural, index, choice) {
                if self.terminal[*leaf] {
                    continue;
                }
                self.map_refs[*leaf] += 1;
                if self.map_refs[*leaf] == 1 {
                    stack.push((*leaf, self.best[*leaf]));
                }
            }
        }
        count
    }

    /// Inverse of `cut_ref`.
    fn cut_deref(&mut self, root: usize, choice: usize) -> u32 {
        let cuts = self.cuts;
        let mut count = 0;
        let mut stack = vec![(root, choice)];
        while let Some((index, choice)) = stack.pop() {
            count += 1;
            for leaf in candidate_leaves(cuts, &self.structural, index, choice) {
                if self.terminal[*leaf] {
                    continue;
                }
                self.map_refs[*leaf] -= 1;
                if self.map_refs[*leaf] == 0 {
                    stack.push((*leaf, self.best[*leaf]));
                }
            }
        }
        count
    }

    fn compute_mapping_exact(&mut self) {
        let cuts = self.cuts;
        for i in 0..self.order.len() {
            let index = self.ntk.node_to_index(self.order[i]);
            if self.terminal[index] {
                continue;
            }
            let referenced = self.map_refs[index] > 0;
            if referenced {
                self.cut_deref(index, self.best[index]);
            }
            // (choice, area, delay, size)
            let mut chosen: Option<(usize, u32, u32, usize)> = None;
            for choice in 0..self.candidate_count(index) {
                let leaves = candidate_leaves(cuts, &self.structural, index, choice);
                let (delay, _) = self.cut_delay_and_flow(leaves);
                if delay > self.required[index] {
                    continue;
                }
                let size = leaves.len();
                let area = self.cut_ref(index, choice);
                self.cut_deref(index, choice);
                let better = match chosen {
                    None => true,
                    Some((_, best_area, best_delay, best_size)) => {
                        area < best_area
                            || (area == best_area
                                && (delay < best_delay
                                    || (delay == best_delay && size < best_size)))
                    }
                };
                if better {
                    chosen = Some((choice, area, delay, size));
                }
            }
            let choice = match chosen {
                Some((choice, ..)) => choice,
                None => self.best[index],
            };
            let leaves = candidate_leaves(cuts, &self.structural, index, choice);
            let (delay, flow) = self.cut_delay_and_flow(leaves);
            self.best[index] = choice;
            self.delays[index] = delay;
            self.flows[index] = flow / self.flow_refs[index];
            if referenced {
                self.cut_ref(index, choice);
            }
        }
    }

    /// Recounts which nodes the current selection covers, blends the flow
    /// reference estimates, and derives required times.
    fn set_mapping_refs(&mut self, exact: bool) {
        let ntk = self.ntk;
        let cuts = self.cuts;
        if !exact {
            self.map_refs.iter_mut().for_each(|r| *r = 0);
            ntk.foreach_po(|s| self.map_refs[ntk.node_to_index(ntk.get_node(s))] += 1);
        }
        self.area = 0;
        for i in (0..self.order.len()).rev() {
            let index = ntk.node_to_index(self.order[i]);
            if self.terminal[index] || self.map_refs[index] == 0 {
                continue;
            }
            if !exact {
                for leaf in candidate_leaves(cuts, &self.structural, index, self.best[index]) {
                    self.map_refs[*leaf] += 1;
                }
            }
            self.area += 1;
        }

        let iteration = (self.iteration + 1) as f32;
        let coef = 1.0 / (1.0 + iteration * iteration);
        for (flow_ref, map_ref) in self.flow_refs.iter_mut().zip(self.map_refs.iter()) {
            *flow_ref = coef * *flow_ref + (1.0 - coef) * std::cmp::max(1, *map_ref) as f32;
        }

        let mut depth = 0;
        ntk.foreach_po(|s| {
            depth = std::cmp::max(depth, self.delays[ntk.node_to_index(ntk.get_node(s))]);
        });
        self.depth = depth;
        if self.params.optimize_depth && self.target_depth.is_none() {
            self.target_depth = Some(depth);
        }
        self.compute_required();
        self.iteration += 1;
    }

    fn compute_required(&mut self) {
        self.required.iter_mut().for_each(|r| *r = u32::MAX);
        let target = match self.target_depth {
            Some(target) => target,
            None => return,
        };
        let ntk = self.ntk;
        let cuts = self.cuts;
        ntk.foreach_po(|s| {
            let index = ntk.node_to_index(ntk.get_node(s));
            self.required[index] = std::cmp::min(self.required[index], target);
        });
        for i in (0..self.order.len()).rev() {
            let index = ntk.node_to_index(self.order[i]);
            if self.terminal[index] || self.map_refs[index] == 0 {
                continue;
            }
            let leaf_required = self.required[index].saturating_sub(1);
            for leaf in candidate_leaves(cuts, &self.structural, index, self.best[index]) {
                self.required[*leaf] = std::cmp::min(self.required[*leaf], leaf_required);
            }
        }
    }

    fn run(&mut self) -> Vec<MappedLut> {
        if self.params.optimize_depth {
            self.compute_mapping(false);
        } else {
            self.compute_mapping(true);
        }
        self.set_mapping_refs(false);
        log::info!(
            "lut_mapping: {} round: luts={} depth={}",
            if self.params.optimize_depth {
                "depth"
            } else {
                "initial area-flow"
            },
            self.area,
            self.depth
        );

        for round in 0..self.params.area_flow_rounds {
            let previous = self.area;
            self.compute_mapping(true);
            self.set_mapping_refs(false);
            log::info!(
                "lut_mapping: area-flow round {}: luts={} depth={}",
                round,
                self.area,
                self.depth
            );
            if self.area == previous {
                break;
            }
        }

        for round in 0..self.params.exact_area_rounds {
            let previous = self.area;
            self.compute_mapping_exact();
            self.set_mapping_refs(true);
            log::info!(
                "lut_mapping: exact-area round {}: luts={} depth={}",
                round,
                self.area,
                self.depth
            );
            if self.area == previous {
                break;
            }
        }

        self.derive_mapping()
    }

    fn derive_mapping(&self) -> Vec<MappedLut> {
        let compute_truth = self.cuts.params().compute_truth;
        let mut luts = Vec::with_capacity(self.area as usize);
        for node in &self.order {
            let index = self.ntk.node_to_index(*node);
            if self.terminal[index] || self.map_refs[index] == 0 {
                continue;
            }
            let choice = self.best[index];
            let leaves = candidate_leaves(self.cuts, &self.structural, index, choice);
            let structural = self.cuts.cuts(index).len() == 1;
            if structural {
                log::warn!(
                    "lut_mapping: %{} has no {}-feasible cut; mapping it onto its {} fanins",
                    index,
                    self.cuts.params().cut_size,
                    leaves.len()
                );
            }
            let function = if !compute_truth {
                None
            } else if structural {
                Some(self.structural_function(*node, leaves))
            } else {
                self.cuts.truth_table(&self.cuts.cuts(index)[choice])
            };
            luts.push(MappedLut {
                node: *node,
                leaves: leaves.iter().map(|l| self.ntk.index_to_node(*l)).collect(),
                function,
            });
        }
        luts
    }

    /// Function of `node` over its deduplicated structural fanins.
    fn structural_function(&self, node: NodeRef, leaves: &[usize]) -> TruthTable {
        let operands: Vec<TruthTable> = self
            .ntk
            .fanins(node)
            .iter()
            .map(|s| {
                let index = self.ntk.node_to_index(self.ntk.get_node(*s));
                TruthTable::nth_var(leaves.len(), leaves.partition_point(|l| *l < index))
            })
            .collect();
        self.ntk.compute(node, &operands)
    }
}

/// Maps `ntk` onto LUTs of at most `params.cut_enumeration.cut_size` inputs
/// and records the cover in `ntk`, replacing any previous mapping.
///
/// Networks that store LUT functions always get cut functions computed.
/// Panics if `params` do not validate or if the network has a cycle.
pub fn lut_mapping<N: MappedNetwork>(ntk: &mut N, params: &LutMappingParams) -> LutMappingStats {
    if let Err(e) = params.validate() {
        panic!("lut_mapping: {}", e);
    }
    let start = Instant::now();
    if let Some(depth) = ntk.precomputed_depth() {
        log::info!("lut_mapping: input network depth {}", depth);
    }
    let mut cut_params = params.cut_enumeration;
    if ntk.stores_functions() {
        cut_params.compute_truth = true;
    }

    let (luts, stats) = {
        let network: &N = ntk;
        let cuts = cut_enumeration(network, &cut_params);
        let mut mapper = LutMapper::new(network, &cuts, params);
        let luts = mapper.run();
        let stats = LutMappingStats {
            luts: mapper.area,
            depth: mapper.depth,
            rounds: mapper.iteration,
        };
        (luts, stats)
    };

    ntk.clear_mapping();
    for lut in &luts {
        ntk.add_to_mapping(lut.node, &lut.leaves);
        if let Some(function) = &lut.function {
            ntk.store_lut_function(lut.node, function);
        }
    }
    log::info!(
        "lut_mapping: done: luts={} depth={} rounds={} elapsed_ms={}",
        stats.luts,
        stats.depth,
        stats.rounds,
        start.elapsed().as_millis()
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth_view::DepthView;
    use crate::mapping_view::MappingView;
    use crate::test_utils::{setup_adder_chain, setup_wide_and_network, setup_xor3_network};
    use pretty_assertions::assert_eq;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_xor3_maps_to_single_lut() {
        init_logger();
        let t = setup_xor3_network();
        let mut view = MappingView::with_functions(&t.ntk);
        let params = LutMappingParams {
            cut_enumeration: CutEnumerationParams {
                cut_size: 4,
                ..LutMappingParams::default().cut_enumeration
            },
            ..Default::default()
        };
        let stats = lut_mapping(&mut view, &params);
        assert_eq!(stats.luts, 1);
        assert_eq!(stats.depth, 1);
        assert_eq!(view.num_luts(), 1);
        let root = t.out.node;
        assert!(view.is_mapped(root));
        assert_eq!(
            view.lut_fanins(root).collect::<Vec<_>>(),
            vec![t.a.node, t.b.node, t.c.node]
        );
        assert_eq!(view.lut_function(root), TruthTable::from_hex(3, "96").unwrap());
    }

    #[test]
    fn test_lut_count_matches_scan() {
        init_logger();
        let t = setup_adder_chain(4);
        let mut view = MappingView::new(&t.ntk);
        let stats = lut_mapping(&mut view, &LutMappingParams::default());
        assert_eq!(stats.luts, view.num_luts());
        assert_eq!(view.count_mapped_by_scan(), view.num_luts());
        for po in t.ntk.po_signals() {
            if t.ntk.is_gate(po.node) {
                assert!(view.is_mapped(po.node));
            }
        }
    }

    #[test]
    fn test_area_rounds_respect_depth_bound() {
        init_logger();
        let t = setup_adder_chain(6);
        let depth_only = LutMappingParams {
            area_flow_rounds: 0,
            exact_area_rounds: 0,
            ..Default::default()
        };
        let mut view = MappingView::new(&t.ntk);
        let depth_stats = lut_mapping(&mut view, &depth_only);
        let full_stats = lut_mapping(&mut view, &LutMappingParams::default());
        assert_eq!(full_stats.depth, depth_stats.depth);
        assert_eq!(depth_stats.rounds, 1);
        assert!(full_stats.rounds > 1);
        assert_eq!(view.num_luts(), full_stats.luts);
    }

    #[test]
    fn test_wide_gate_uses_structural_fanins() {
        init_logger();
        let t = setup_wide_and_network(6);
        let mut view = MappingView::with_functions(&t.ntk);
        let params = LutMappingParams {
            cut_enumeration: CutEnumerationParams {
                cut_size: 4,
                ..LutMappingParams::default().cut_enumeration
            },
            ..Default::default()
        };
        let stats = lut_mapping(&mut view, &params);
        assert_eq!(stats.luts, 1);
        assert_eq!(view.lut_size(t.wide.node), 6);
        let function = view.lut_function(t.wide.node);
        assert_eq!(function.count_ones(), 1);
        assert!(function.get_bit(63));
    }

    #[test]
    fn test_mapping_over_depth_view() {
        init_logger();
        let t = setup_adder_chain(3);
        let depth = DepthView::new(&t.ntk);
        let mut view = MappingView::new(&depth);
        let stats = lut_mapping(&mut view, &LutMappingParams::default());
        assert!(stats.depth <= depth.depth());
        assert!(view.has_mapping());
    }

    #[test]
    fn test_params_from_json() {
        let params = LutMappingParams::from_json(
            r#"{"cut_enumeration": {"cut_size": 5, "cut_limit": 10}, "exact_area_rounds": 0}"#,
        )
        .unwrap();
        assert_eq!(params.cut_enumeration.cut_size, 5);
        assert_eq!(params.cut_enumeration.cut_limit, 10);
        assert_eq!(params.exact_area_rounds, 0);
        assert_eq!(params.area_flow_rounds, 1);
        assert!(params.optimize_depth);

        let err = LutMappingParams::from_json(r#"{"cut_enumeration": {"cut_size": 0}}"#);
        assert!(matches!(err, Err(LutMapError::InvalidParams(_))));
        let err = LutMappingParams::from_json("{not json");
        assert!(matches!(err, Err(LutMapError::Config(_))));
    }
}
