// SPDX-License-Identifier: Apache-2.0

use std::time::Instant;

use crate::cut_enumeration::cut::{merge_leaves, Cut, CutData};
use crate::cut_enumeration::cut_set::CutSet;
use crate::cut_enumeration::{CutEnumerationParams, NetworkCuts};
use crate::network::Network;
use crate::topo::topo_sort_nodes;
use crate::truth_table::TruthTable;
use crate::truth_table_cache::TruthTableCache;
use crate::use_count::fanout_counts;

/// Calls `visit(chosen, leaves)` for every combination that picks one cut
/// per fanin and whose leaf union stays within `max_size`. `chosen[i]` is the
/// position of the cut picked from `fanin_cuts[i]`.
fn for_each_product(
    fanin_cuts: &[&[Cut]],
    max_size: usize,
    chosen: &mut Vec<usize>,
    leaves: &[usize],
    visit: &mut dyn FnMut(&[usize], &[usize]),
) {
    let pos = chosen.len();
    if pos == fanin_cuts.len() {
        visit(chosen, leaves);
        return;
    }
    for (i, cut) in fanin_cuts[pos].iter().enumerate() {
        if let Some(merged) = merge_leaves(leaves, cut.leaves(), max_size) {
            chosen.push(i);
            for_each_product(fanin_cuts, max_size, chosen, &merged, visit);
            chosen.pop();
        }
    }
}

fn cut_function(cache: &TruthTableCache, cut: &Cut) -> TruthTable {
    debug_assert!(cut.function().is_some(), "cut function was not computed");
    cut.function().map_or_else(|| TruthTable::const0(cut.size()), |h| cache.get(h))
}

/// Estimates `{delay, flow}` of a cut with the given leaves rooted at a node
/// with `fanout` references, from the leaves' best cuts.
fn leaf_cost(cut_sets: &[Vec<Cut>], leaves: &[usize], fanout: u32) -> CutData {
    let mut delay = 0;
    let mut flow = 1.0f32;
    for leaf in leaves {
        let best = cut_sets[*leaf][0].data();
        delay = std::cmp::max(delay, best.delay);
        flow += best.flow;
    }
    CutData {
        delay: delay + 1,
        flow: flow / std::cmp::max(1, fanout) as f32,
    }
}

/// Enumerates the cuts of every node of `ntk`.
///
/// Primary inputs and constants get only their trivial cut. Every other node
/// gets the non-dominated K-feasible cuts obtained by combining one cut of
/// each fanin, ranked by `params.ranking` and truncated to
/// `params.cut_limit`, followed by its trivial cut.
///
/// Panics if `params` do not validate or if the network has a cycle.
pub fn cut_enumeration<N: Network>(ntk: &N, params: &CutEnumerationParams) -> NetworkCuts {
    if let Err(e) = params.validate() {
        panic!("cut_enumeration: {}", e);
    }
    let start = Instant::now();
    let fanouts = fanout_counts(ntk);
    let mut cache = TruthTableCache::new();
    let identity = params
        .compute_truth
        .then(|| cache.insert(&TruthTable::nth_var(1, 0)));

    let mut cut_sets: Vec<Vec<Cut>> = vec![Vec::new(); ntk.size()];
    let mut truncated_nodes = 0usize;
    let mut fallback_nodes = 0usize;

    for node in topo_sort_nodes(ntk) {
        let index = ntk.node_to_index(node);
        if ntk.is_pi(node) {
            cut_sets[index] = vec![Cut::trivial(index, identity, CutData::default())];
            continue;
        }
        if ntk.is_constant(node) {
            let function = params.compute_truth.then(|| {
                cache.insert(&TruthTable::const0(1).negate_if(ntk.constant_value(node)))
            });
            cut_sets[index] = vec![Cut::trivial(index, function, CutData::default())];
            continue;
        }

        let fanin_indices: Vec<usize> = ntk
            .fanins(node)
            .iter()
            .map(|s| ntk.node_to_index(ntk.get_node(*s)))
            .collect();
        let mut set = CutSet::new(params.ranking);
        {
            let fanin_cuts: Vec<&[Cut]> = fanin_indices
                .iter()
                .map(|i| cut_sets[*i].as_slice())
                .collect();
            let mut visit = |chosen: &[usize], leaves: &[usize]| {
                let (leaves, function) = if params.compute_truth {
                    let operands: Vec<TruthTable> = chosen
                        .iter()
                        .enumerate()
                        .map(|(f, c)| {
                            let cut = &fanin_cuts[f][*c];
                            let positions: Vec<usize> = cut
                                .leaves()
                                .iter()
                                .map(|l| leaves.partition_point(|x| x < l))
                                .collect();
                            cut_function(&cache, cut).expand(&positions, leaves.len())
                        })
                        .collect();
                    let (reduced, support) = ntk.compute(node, &operands).min_base();
                    let kept: Vec<usize> = support.iter().map(|p| leaves[*p]).collect();
                    (kept, Some(cache.insert(&reduced)))
                } else {
                    (leaves.to_vec(), None)
                };
                let data = leaf_cost(&cut_sets, &leaves, fanouts[index]);
                set.insert(Cut::new(leaves, function, data));
            };
            for_each_product(
                &fanin_cuts,
                params.cut_size,
                &mut Vec::with_capacity(fanin_cuts.len()),
                &[],
                &mut visit,
            );
        }

        if set.len() + 1 > params.cut_limit {
            truncated_nodes += 1;
        }
        let trivial = Cut::trivial(index, identity, CutData::default());
        let mut cuts = set.finalize(params.cut_limit, trivial);
        let best_data = if cuts.len() > 1 {
            cuts[0].data()
        } else {
            // No K-feasible cut: cost the node through its structural fanins.
            fallback_nodes += 1;
            let mut structural = fanin_indices.clone();
            structural.sort_unstable();
            structural.dedup();
            leaf_cost(&cut_sets, &structural, fanouts[index])
        };
        if let Some(trivial) = cuts.last_mut() {
            trivial.set_data(best_data);
        }
        cut_sets[index] = cuts;
    }

    let result = NetworkCuts {
        cut_sets,
        cache,
        params: *params,
    };
    log::debug!(
        "cut_enumeration: nodes={} cut_size={} cut_limit={} total_cuts={} truncated_nodes={} fallback_nodes={} cached_functions={} elapsed_ms={}",
        ntk.size(),
        params.cut_size,
        params.cut_limit,
        result.total_cuts(),
        truncated_nodes,
        fallback_nodes,
        result.cache.len(),
        start.elapsed().as_millis()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut_enumeration::CutRanking;
    use crate::network::NodeRef;
    use crate::simulation::simulate_nodes;
    use crate::test_utils::{setup_simple_network, setup_wide_and_network, setup_xor3_network};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inputs_get_only_trivial_cut() {
        let t = setup_simple_network();
        let cuts = cut_enumeration(&t.ntk, &CutEnumerationParams::default());
        for input in [t.a, t.b, t.c] {
            let node_cuts = cuts.cuts(input.node.id);
            assert_eq!(node_cuts.len(), 1);
            assert!(node_cuts[0].is_trivial_for(input.node.id));
        }
    }

    #[test]
    fn test_every_gate_ends_with_trivial_cut() {
        let t = setup_xor3_network();
        let params = CutEnumerationParams {
            cut_size: 3,
            cut_limit: 4,
            ..Default::default()
        };
        let cuts = cut_enumeration(&t.ntk, &params);
        for index in 0..cuts.num_nodes() {
            let node_cuts = cuts.cuts(index);
            assert!(node_cuts.len() <= 4);
            assert!(node_cuts.last().unwrap().is_trivial_for(index));
            assert!(node_cuts.iter().all(|c| c.size() <= 3));
        }
    }

    #[test]
    fn test_xor3_root_has_full_input_cut_with_function() {
        let t = setup_xor3_network();
        let params = CutEnumerationParams {
            compute_truth: true,
            ranking: CutRanking::Size,
            ..Default::default()
        };
        let cuts = cut_enumeration(&t.ntk, &params);
        let root = t.out.node.id;
        let inputs = vec![t.a.node.id, t.b.node.id, t.c.node.id];
        let cut = cuts
            .cuts(root)
            .iter()
            .find(|c| c.leaves() == inputs.as_slice())
            .expect("three-input cut");
        let tt = cuts.truth_table(cut).unwrap();
        let want = TruthTable::from_hex(3, "96").unwrap().negate_if(t.out.negated);
        assert_eq!(tt, want);
    }

    #[test]
    fn test_cut_functions_match_global_simulation() {
        let t = setup_xor3_network();
        let params = CutEnumerationParams {
            compute_truth: true,
            ..Default::default()
        };
        let cuts = cut_enumeration(&t.ntk, &params);
        let globals = simulate_nodes(&t.ntk);
        for index in 0..cuts.num_nodes() {
            if !t.ntk.is_gate(NodeRef { id: index }) {
                continue;
            }
            for cut in cuts.cuts(index) {
                if cut.is_trivial_for(index) {
                    continue;
                }
                let leaf_functions: Vec<TruthTable> =
                    cut.leaves().iter().map(|l| globals[*l].clone()).collect();
                assert_eq!(
                    cuts.truth_table(cut).unwrap().compose(&leaf_functions),
                    globals[index],
                    "node %{} cut {:?}",
                    index,
                    cut.leaves()
                );
            }
        }
    }

    #[test]
    fn test_wide_gate_keeps_only_trivial_cut() {
        let t = setup_wide_and_network(6);
        let params = CutEnumerationParams {
            cut_size: 4,
            ..Default::default()
        };
        let cuts = cut_enumeration(&t.ntk, &params);
        let wide = cuts.cuts(t.wide.node.id);
        assert_eq!(wide.len(), 1);
        assert!(wide[0].is_trivial_for(t.wide.node.id));
        assert_eq!(wide[0].data().delay, 1);
    }

    #[test]
    fn test_constant_fanin_collapses_to_smaller_cut() {
        let mut ntk = crate::logic_network::LogicNetwork::new("t".to_string());
        let a = ntk.add_input("a".to_string());
        let one = ntk.get_constant(true);
        let g = ntk.add_and(a, one);
        ntk.add_output("o".to_string(), g);
        let params = CutEnumerationParams {
            compute_truth: true,
            ..Default::default()
        };
        let cuts = cut_enumeration(&ntk, &params);
        let best = cuts.best_cut(g.node.id);
        assert_eq!(best.leaves(), &[a.node.id]);
        assert_eq!(cuts.truth_table(best).unwrap(), TruthTable::nth_var(1, 0));
    }

    #[test]
    #[should_panic(expected = "cut_size")]
    fn test_invalid_params_panic() {
        let t = setup_simple_network();
        let params = CutEnumerationParams {
            cut_size: 0,
            ..Default::default()
        };
        cut_enumeration(&t.ntk, &params);
    }
}
