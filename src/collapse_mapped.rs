// SPDX-License-Identifier: Apache-2.0

use crate::klut_network::KLutNetwork;
use crate::mapping_view::MappingView;
use crate::network::{Network, NodeRef, Signal};
use crate::topo::topo_sort_nodes;
use crate::truth_table::TruthTable;

/// Builds the LUT network described by a mapping.
///
/// Primary inputs keep their order (named `pi0`, `pi1`, ...), each mapped
/// node becomes one LUT over its recorded leaves with its stored function,
/// and primary outputs keep their polarity.
///
/// Returns `None` if the view has no mapping, or if the mapping is
/// incomplete: an output or a LUT leaf refers to a gate that is not mapped,
/// or a mapped node carries no function of matching arity.
pub fn collapse_mapped<N: Network>(view: &MappingView<N, true>) -> Option<KLutNetwork> {
    if !view.has_mapping() {
        return None;
    }
    let mut klut = KLutNetwork::new("collapsed".to_string());
    let mut node_map: Vec<Option<NodeRef>> = vec![None; view.size()];
    let mut const1: Option<NodeRef> = None;

    let mut pi_count = 0;
    view.foreach_pi(|pi| {
        node_map[view.node_to_index(pi)] = Some(klut.add_input(format!("pi{}", pi_count)));
        pi_count += 1;
    });

    for node in topo_sort_nodes(view) {
        let index = view.node_to_index(node);
        if view.is_constant(node) {
            node_map[index] = Some(if view.constant_value(node) {
                *const1.get_or_insert_with(|| klut.add_lut(Vec::new(), TruthTable::const1(0)))
            } else {
                klut.get_constant(false).node
            });
            continue;
        }
        if view.is_pi(node) || !view.is_mapped(node) {
            continue;
        }
        let mut fanins = Vec::with_capacity(view.lut_size(node));
        for leaf in view.lut_fanins(node) {
            match node_map[view.node_to_index(leaf)] {
                Some(mapped) => fanins.push(mapped),
                None => {
                    log::debug!(
                        "collapse_mapped: leaf %{} of %{} is not mapped",
                        view.node_to_index(leaf),
                        index
                    );
                    return None;
                }
            }
        }
        let function = view.lut_function(node);
        if function.num_vars() != fanins.len() {
            log::debug!(
                "collapse_mapped: %{} has {} leaves but a {}-input function",
                index,
                fanins.len(),
                function.num_vars()
            );
            return None;
        }
        node_map[index] = Some(klut.add_lut(fanins, function));
    }

    let mut outputs = Vec::with_capacity(view.num_pos());
    view.foreach_po(|s| outputs.push(s));
    for (i, po) in outputs.iter().enumerate() {
        let driver = node_map[view.node_to_index(view.get_node(*po))]?;
        klut.add_output(
            format!("po{}", i),
            Signal::new(driver, view.is_complemented(*po)),
        );
    }
    Some(klut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut_mapping::{lut_mapping, LutMappingParams};
    use crate::simulation::simulate_outputs;
    use crate::test_utils::{setup_simple_network, setup_xor3_network};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapse_xor3() {
        let t = setup_xor3_network();
        let mut view = MappingView::with_functions(&t.ntk);
        lut_mapping(&mut view, &LutMappingParams::default());
        let klut = collapse_mapped(&view).unwrap();
        assert_eq!(klut.num_luts(), 1);
        assert_eq!(simulate_outputs(&klut), simulate_outputs(&t.ntk));
    }

    #[test]
    fn test_unmapped_view_collapses_to_none() {
        let t = setup_simple_network();
        let view = MappingView::with_functions(&t.ntk);
        assert!(collapse_mapped(&view).is_none());
    }

    #[test]
    fn test_incomplete_mapping_collapses_to_none() {
        let t = setup_simple_network();
        let mut view = MappingView::with_functions(&t.ntk);
        // Map only the output gate, over a leaf gate that is left unmapped.
        view.add_to_mapping(t.g2.node, &[t.g1.node, t.c.node]);
        let or_not = TruthTable::nth_var(2, 0).or(&TruthTable::nth_var(2, 1).not());
        view.set_lut_function(t.g2.node, &or_not);
        assert!(collapse_mapped(&view).is_none());

        view.add_to_mapping(t.g1.node, &[t.a.node, t.b.node]);
        view.set_lut_function(
            t.g1.node,
            &TruthTable::nth_var(2, 0).and(&TruthTable::nth_var(2, 1)),
        );
        let klut = collapse_mapped(&view).unwrap();
        assert_eq!(klut.num_luts(), 2);
        assert_eq!(simulate_outputs(&klut), simulate_outputs(&t.ntk));
    }
}
