// SPDX-License-Identifier: Apache-2.0

//! Exhaustive simulation of a network over all of its primary inputs.
//!
//! Primary input `i` (in `foreach_pi` order) is variable `i`, so networks
//! with the same input order can be compared table by table.

use crate::network::Network;
use crate::topo::topo_sort_nodes;
use crate::truth_table::{TruthTable, MAX_VARS};

/// Global function of every node, indexed by `node_to_index`.
pub fn simulate_nodes<N: Network>(ntk: &N) -> Vec<TruthTable> {
    let num_vars = ntk.num_pis();
    assert!(
        num_vars <= MAX_VARS,
        "exhaustive simulation supports at most {} primary inputs; got {}",
        MAX_VARS,
        num_vars
    );
    let mut values: Vec<TruthTable> = vec![TruthTable::const0(num_vars); ntk.size()];
    let mut var = 0;
    ntk.foreach_pi(|pi| {
        values[ntk.node_to_index(pi)] = TruthTable::nth_var(num_vars, var);
        var += 1;
    });
    for node in topo_sort_nodes(ntk) {
        let index = ntk.node_to_index(node);
        if ntk.is_pi(node) {
            continue;
        }
        if ntk.is_constant(node) {
            values[index] = TruthTable::const0(num_vars).negate_if(ntk.constant_value(node));
            continue;
        }
        let operands: Vec<TruthTable> = ntk
            .fanins(node)
            .iter()
            .map(|s| values[ntk.node_to_index(ntk.get_node(*s))].clone())
            .collect();
        let value = ntk.compute(node, &operands);
        values[index] = if operands.is_empty() {
            // Zero-input nodes compute a table over no variables.
            TruthTable::const0(num_vars).negate_if(value.get_bit(0))
        } else {
            value
        };
    }
    values
}

/// Function of every primary output, with output complementation applied.
pub fn simulate_outputs<N: Network>(ntk: &N) -> Vec<TruthTable> {
    let values = simulate_nodes(ntk);
    let mut outputs = Vec::with_capacity(ntk.num_pos());
    ntk.foreach_po(|s| {
        let value = &values[ntk.node_to_index(ntk.get_node(s))];
        outputs.push(value.negate_if(ntk.is_complemented(s)));
    });
    outputs
}
