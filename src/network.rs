// SPDX-License-Identifier: Apache-2.0

//! Capability contract between the mapping passes and the networks they run
//! on.
//!
//! Base networks (`LogicNetwork`, `KLutNetwork`) implement `Network`
//! directly. Views (`DepthView`, `MappingView`) hold the network below them
//! and implement `Network` themselves by delegation, so they can be stacked:
//! `MappingView<DepthView<&LogicNetwork>>` answers every base-network query,
//! carries precomputed levels, and records a mapping.

use serde::{Deserialize, Serialize};

use crate::truth_table::TruthTable;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: usize,
}

/// A reference to a node together with a polarity bit.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Signal {
    pub node: NodeRef,
    pub negated: bool,
}

impl Signal {
    pub fn new(node: NodeRef, negated: bool) -> Self {
        Self { node, negated }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            node: self.node,
            negated: !self.negated,
        }
    }
}

impl From<NodeRef> for Signal {
    fn from(node: NodeRef) -> Self {
        Signal {
            node,
            negated: false,
        }
    }
}

/// A named primary output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub name: String,
    pub signal: Signal,
}

/// Read-only queries the mapping passes need from a network.
pub trait Network {
    /// Number of nodes, including the constant and primary inputs.
    fn size(&self) -> usize;

    fn node_to_index(&self, node: NodeRef) -> usize;

    fn index_to_node(&self, index: usize) -> NodeRef;

    fn get_node(&self, signal: Signal) -> NodeRef {
        signal.node
    }

    fn is_complemented(&self, signal: Signal) -> bool {
        signal.negated
    }

    fn is_constant(&self, node: NodeRef) -> bool;

    /// Value of a constant node; only meaningful when `is_constant(node)`.
    fn constant_value(&self, node: NodeRef) -> bool;

    fn is_pi(&self, node: NodeRef) -> bool;

    fn is_gate(&self, node: NodeRef) -> bool {
        !self.is_constant(node) && !self.is_pi(node)
    }

    fn num_pis(&self) -> usize;

    fn num_pos(&self) -> usize;

    fn fanin_size(&self, node: NodeRef) -> usize;

    /// Visits the fanin signals of `node` in order.
    fn foreach_fanin(&self, node: NodeRef, f: impl FnMut(Signal));

    /// Visits the primary-output driving signals in order.
    fn foreach_po(&self, f: impl FnMut(Signal));

    /// Visits the primary inputs in creation order.
    fn foreach_pi(&self, f: impl FnMut(NodeRef));

    fn foreach_node(&self, mut f: impl FnMut(NodeRef)) {
        for index in 0..self.size() {
            f(self.index_to_node(index));
        }
    }

    /// Evaluates the local function of gate `node`.
    ///
    /// `operands[i]` is the function of the node driving fanin `i`; the
    /// network applies the fanin complementation itself.
    fn compute(&self, node: NodeRef, operands: &[TruthTable]) -> TruthTable;

    /// Level of `node` if this network already carries level information.
    fn precomputed_level(&self, _node: NodeRef) -> Option<u32> {
        None
    }

    /// Depth of the network if it already carries level information.
    fn precomputed_depth(&self) -> Option<u32> {
        None
    }

    /// Recomputes the level information this network carries, if any.
    /// Networks without levels, and shared borrows, do nothing.
    fn update_levels(&mut self) {}

    fn fanins(&self, node: NodeRef) -> Vec<Signal> {
        let mut fanins = Vec::with_capacity(self.fanin_size(node));
        self.foreach_fanin(node, |s| fanins.push(s));
        fanins
    }

    fn po_signals(&self) -> Vec<Signal> {
        let mut pos = Vec::with_capacity(self.num_pos());
        self.foreach_po(|s| pos.push(s));
        pos
    }

    fn pi_nodes(&self) -> Vec<NodeRef> {
        let mut pis = Vec::with_capacity(self.num_pis());
        self.foreach_pi(|n| pis.push(n));
        pis
    }
}

/// Write access the LUT mapper needs to record its result.
pub trait MappedNetwork: Network {
    fn clear_mapping(&mut self);

    fn add_to_mapping(&mut self, node: NodeRef, leaves: &[NodeRef]);

    /// Whether `store_lut_function` keeps the functions it is given.
    fn stores_functions(&self) -> bool;

    fn store_lut_function(&mut self, node: NodeRef, function: &TruthTable);
}

impl<T: Network + ?Sized> Network for &T {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn node_to_index(&self, node: NodeRef) -> usize {
        (**self).node_to_index(node)
    }

    fn index_to_node(&self, index: usize) -> NodeRef {
        (**self).index_to_node(index)
    }

    fn get_node(&self, signal: Signal) -> NodeRef {
        (**self).get_node(signal)
    }

    fn is_complemented(&self, signal: Signal) -> bool {
        (**self).is_complemented(signal)
    }

    fn is_constant(&self, node: NodeRef) -> bool {
        (**self).is_constant(node)
    }

    fn constant_value(&self, node: NodeRef) -> bool {
        (**self).constant_value(node)
    }

    fn is_pi(&self, node: NodeRef) -> bool {
        (**self).is_pi(node)
    }

    fn is_gate(&self, node: NodeRef) -> bool {
        (**self).is_gate(node)
    }

    fn num_pis(&self) -> usize {
        (**self).num_pis()
    }

    fn num_pos(&self) -> usize {
        (**self).num_pos()
    }

    fn fanin_size(&self, node: NodeRef) -> usize {
        (**self).fanin_size(node)
    }

    fn foreach_fanin(&self, node: NodeRef, f: impl FnMut(Signal)) {
        (**self).foreach_fanin(node, f)
    }

    fn foreach_po(&self, f: impl FnMut(Signal)) {
        (**self).foreach_po(f)
    }

    fn foreach_pi(&self, f: impl FnMut(NodeRef)) {
        (**self).foreach_pi(f)
    }

    fn compute(&self, node: NodeRef, operands: &[TruthTable]) -> TruthTable {
        (**self).compute(node, operands)
    }

    fn precomputed_level(&self, node: NodeRef) -> Option<u32> {
        (**self).precomputed_level(node)
    }

    fn precomputed_depth(&self) -> Option<u32> {
        (**self).precomputed_depth()
    }
}
