// SPDX-License-Identifier: Apache-2.0

//! Logic level and depth annotations over a network.
//!
//! The level of a constant or primary input is 0; the level of a gate is one
//! more than the largest level among its fanins. The depth of the network is
//! the largest level among the nodes driving a primary output.
//!
//! Levels are computed once at construction and again on `update()`; the
//! view does not observe later changes to the network below it. If the
//! wrapped network already carries levels (for example another `DepthView`)
//! the view delegates to it instead of recomputing, and `update()` refreshes
//! the wrapped levels. A view over a shared borrow cannot refresh what it
//! borrows.

use crate::network::{Network, NodeRef, Signal};
use crate::topo::postorder_from;
use crate::truth_table::TruthTable;

pub struct DepthView<N: Network> {
    ntk: N,
    levels: Vec<u32>,
    depth: u32,
    delegated: bool,
}

impl<N: Network> DepthView<N> {
    pub fn new(ntk: N) -> Self {
        let delegated = ntk.precomputed_depth().is_some();
        let mut view = DepthView {
            ntk,
            levels: Vec::new(),
            depth: 0,
            delegated,
        };
        if delegated {
            log::debug!("DepthView: delegating levels to the wrapped network");
        } else {
            view.update();
        }
        view
    }

    pub fn depth(&self) -> u32 {
        if self.delegated {
            return self.ntk.precomputed_depth().unwrap_or(0);
        }
        self.depth
    }

    pub fn level(&self, node: NodeRef) -> u32 {
        if self.delegated {
            return self.ntk.precomputed_level(node).unwrap_or(0);
        }
        self.levels[self.ntk.node_to_index(node)]
    }

    /// Recomputes every level and the depth from scratch.
    pub fn update(&mut self) {
        if self.delegated {
            self.ntk.update_levels();
            return;
        }
        self.levels.clear();
        self.levels.resize(self.ntk.size(), 0);

        let mut all_nodes = Vec::with_capacity(self.ntk.size());
        self.ntk.foreach_node(|n| all_nodes.push(n));
        for node in postorder_from(&self.ntk, &all_nodes) {
            if self.ntk.is_constant(node) || self.ntk.is_pi(node) {
                continue;
            }
            let mut level = 0;
            self.ntk.foreach_fanin(node, |s| {
                let fanin = self.ntk.node_to_index(self.ntk.get_node(s));
                level = std::cmp::max(level, self.levels[fanin]);
            });
            self.levels[self.ntk.node_to_index(node)] = level + 1;
        }

        let mut depth = 0;
        self.ntk.foreach_po(|s| {
            depth = std::cmp::max(depth, self.levels[self.ntk.node_to_index(s.node)]);
        });
        self.depth = depth;
        log::trace!("DepthView::update: depth {}", depth);
    }

    /// Whether levels come from the wrapped network rather than this view.
    pub fn is_delegated(&self) -> bool {
        self.delegated
    }

    pub fn network(&self) -> &N {
        &self.ntk
    }

    /// Mutable access to the wrapped network; levels go stale until the
    /// next `update()`.
    pub fn network_mut(&mut self) -> &mut N {
        &mut self.ntk
    }

    pub fn into_inner(self) -> N {
        self.ntk
    }
}

impl<N: Network> Network for DepthView<N> {
    fn size(&self) -> usize {
        self.ntk.size()
    }

    fn node_to_index(&self, node: NodeRef) -> usize {
        self.ntk.node_to_index(node)
    }

    fn index_to_node(&self, index: usize) -> NodeRef {
        self.ntk.index_to_node(index)
    }

    fn get_node(&self, signal: Signal) -> NodeRef {
        self.ntk.get_node(signal)
    }

    fn is_complemented(&self, signal: Signal) -> bool {
        self.ntk.is_complemented(signal)
    }

    fn is_constant(&self, node: NodeRef) -> bool {
        self.ntk.is_constant(node)
    }

    fn constant_value(&self, node: NodeRef) -> bool {
        self.ntk.constant_value(node)
    }

    fn is_pi(&self, node: NodeRef) -> bool {
        self.ntk.is_pi(node)
    }

    fn num_pis(&self) -> usize {
        self.ntk.num_pis()
    }

    fn num_pos(&self) -> usize {
        self.ntk.num_pos()
    }

    fn fanin_size(&self, node: NodeRef) -> usize {
        self.ntk.fanin_size(node)
    }

    fn foreach_fanin(&self, node: NodeRef, f: impl FnMut(Signal)) {
        self.ntk.foreach_fanin(node, f)
    }

    fn foreach_po(&self, f: impl FnMut(Signal)) {
        self.ntk.foreach_po(f)
    }

    fn foreach_pi(&self, f: impl FnMut(NodeRef)) {
        self.ntk.foreach_pi(f)
    }

    fn compute(&self, node: NodeRef, operands: &[TruthTable]) -> TruthTable {
        self.ntk.compute(node, operands)
    }

    fn precomputed_level(&self, node: NodeRef) -> Option<u32> {
        Some(self.level(node))
    }

    fn precomputed_depth(&self) -> Option<u32> {
        Some(self.depth())
    }

    fn update_levels(&mut self) {
        self.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic_network::LogicNetwork;
    use crate::test_utils::{setup_adder_chain, setup_xor3_network};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_xor3_levels() {
        let t = setup_xor3_network();
        let view = DepthView::new(&t.ntk);
        assert_eq!(view.level(t.a.node), 0);
        assert_eq!(view.level(t.or_ab.node), 1);
        assert_eq!(view.level(t.xor_ab.node), 2);
        assert_eq!(view.depth(), 4);
    }

    #[test]
    fn test_inputs_only_network_has_zero_depth() {
        let mut ntk = LogicNetwork::new("wires".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        ntk.add_output("a".to_string(), a);
        ntk.add_output("nb".to_string(), b.negate());
        let view = DepthView::new(&ntk);
        assert_eq!(view.depth(), 0);
        assert_eq!(view.level(NodeRef { id: 0 }), 0);
    }

    #[test]
    fn test_stacked_view_delegates() {
        let t = setup_adder_chain(3);
        let inner = DepthView::new(&t.ntk);
        let outer = DepthView::new(&inner);
        assert!(outer.is_delegated());
        assert!(!inner.is_delegated());
        assert_eq!(outer.depth(), inner.depth());
        t.ntk.foreach_node(|n| assert_eq!(outer.level(n), inner.level(n)));
    }

    #[test]
    fn test_stacked_update_refreshes_wrapped_levels() {
        let mut ntk = LogicNetwork::new("t".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        let g = ntk.add_and(a, b);
        ntk.add_output("o".to_string(), g);
        let mut outer = DepthView::new(DepthView::new(ntk));
        assert!(outer.is_delegated());
        assert_eq!(outer.depth(), 1);

        let base = outer.network_mut().network_mut();
        let h = base.add_or(g, a);
        base.outputs[0].signal = h;
        outer.update();
        assert_eq!(outer.depth(), 2);
        assert_eq!(outer.level(h.node), 2);
        assert_eq!(outer.network().depth(), 2);
    }

    #[test]
    fn test_update_sees_new_gates() {
        let mut ntk = LogicNetwork::new("t".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        let g = ntk.add_and(a, b);
        ntk.add_output("o".to_string(), g);
        let mut view = DepthView::new(ntk);
        assert_eq!(view.depth(), 1);

        let h = view.network_mut().add_or(g, a);
        view.network_mut().outputs[0].signal = h;
        assert_eq!(view.depth(), 1);
        view.update();
        assert_eq!(view.depth(), 2);
        assert_eq!(view.level(h.node), 2);
    }
}
