// SPDX-License-Identifier: Apache-2.0

use crate::network::Network;

/// Computes the structural fanout count of every node, indexed by
/// `node_to_index`.
///
/// Each fanin edge counts once, and each primary output driven by a node
/// counts once, so a node feeding two gates and one output has a count of 3.
/// Dangling gates still contribute references to their fanins.
pub fn fanout_counts<N: Network>(ntk: &N) -> Vec<u32> {
    let mut counts = vec![0u32; ntk.size()];
    ntk.foreach_node(|node| {
        ntk.foreach_fanin(node, |s| {
            counts[ntk.node_to_index(ntk.get_node(s))] += 1;
        });
    });
    ntk.foreach_po(|s| {
        counts[ntk.node_to_index(ntk.get_node(s))] += 1;
    });
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic_network::LogicNetwork;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fanout_counts_include_outputs() {
        let mut ntk = LogicNetwork::new("t".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        let g1 = ntk.add_and(a, b);
        let g2 = ntk.add_or(g1, a.negate());
        ntk.add_output("o0".to_string(), g1);
        ntk.add_output("o1".to_string(), g2.negate());
        let counts = fanout_counts(&ntk);
        assert_eq!(counts, vec![0, 2, 1, 2, 1]);
    }
}
