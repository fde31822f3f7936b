// SPDX-License-Identifier: Apache-2.0

//! Records a LUT mapping on top of a network without touching it.
//!
//! Per node the view stores either nothing (unmapped) or the leaves of the
//! cut chosen for that node. Leaf lists live in one shared arena and each
//! mapped node holds an `(offset, count)` range into it. Re-mapping a node
//! appends a fresh range; the old range is left behind as an unused hole.
//!
//! With `STORE_FUNCTION = true` the view also keeps, per mapped node, a
//! handle into a `TruthTableCache` holding the LUT function over its leaves.

use crate::network::{MappedNetwork, Network, NodeRef, Signal};
use crate::truth_table::TruthTable;
use crate::truth_table_cache::{TruthTableCache, TtHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LeafRange {
    offset: u32,
    count: u32,
}

pub struct MappingView<N: Network, const STORE_FUNCTION: bool = false> {
    ntk: N,
    mappings: Vec<Option<LeafRange>>,
    leaf_arena: Vec<usize>,
    mapping_size: u32,
    functions: Vec<TtHandle>,
    cache: TruthTableCache,
}

impl<N: Network> MappingView<N, false> {
    pub fn new(ntk: N) -> Self {
        Self::create(ntk)
    }
}

impl<N: Network> MappingView<N, true> {
    /// Creates a view that also stores a LUT function per mapped node.
    pub fn with_functions(ntk: N) -> Self {
        Self::create(ntk)
    }

    /// The function stored for `node`, over its leaves in insertion order.
    ///
    /// A node that never had a function set reports the zero-variable
    /// constant 0.
    pub fn lut_function(&self, node: NodeRef) -> TruthTable {
        self.cache.get(self.functions[self.ntk.node_to_index(node)])
    }

    pub fn set_lut_function(&mut self, node: NodeRef, function: &TruthTable) {
        let handle = self.cache.insert(function);
        let index = self.ntk.node_to_index(node);
        self.functions[index] = handle;
    }

    pub fn lut_function_handle(&self, node: NodeRef) -> TtHandle {
        self.functions[self.ntk.node_to_index(node)]
    }

    pub fn cache(&self) -> &TruthTableCache {
        &self.cache
    }
}

impl<N: Network, const STORE_FUNCTION: bool> MappingView<N, STORE_FUNCTION> {
    fn create(ntk: N) -> Self {
        let size = ntk.size();
        MappingView {
            mappings: vec![None; size],
            leaf_arena: Vec::new(),
            mapping_size: 0,
            functions: if STORE_FUNCTION {
                vec![TtHandle::CONST0; size]
            } else {
                Vec::new()
            },
            cache: TruthTableCache::new(),
            ntk,
        }
    }

    pub fn has_mapping(&self) -> bool {
        self.mapping_size > 0
    }

    pub fn is_mapped(&self, node: NodeRef) -> bool {
        self.mappings[self.ntk.node_to_index(node)].is_some()
    }

    /// Forgets every recorded cut. Cached functions are kept.
    pub fn clear_mapping(&mut self) {
        self.mappings.clear();
        self.mappings.resize(self.ntk.size(), None);
        self.leaf_arena.clear();
        self.mapping_size = 0;
    }

    pub fn num_luts(&self) -> u32 {
        self.mapping_size
    }

    pub fn add_to_mapping(&mut self, node: NodeRef, leaves: &[NodeRef]) {
        let index = self.ntk.node_to_index(node);
        if self.mappings[index].is_none() {
            self.mapping_size += 1;
        }
        let offset = self.leaf_arena.len() as u32;
        for leaf in leaves {
            self.leaf_arena.push(self.ntk.node_to_index(*leaf));
        }
        self.mappings[index] = Some(LeafRange {
            offset,
            count: leaves.len() as u32,
        });
    }

    pub fn remove_from_mapping(&mut self, node: NodeRef) {
        let index = self.ntk.node_to_index(node);
        if self.mappings[index].take().is_some() {
            self.mapping_size -= 1;
        }
    }

    /// The recorded leaves of `node` in insertion order; empty if unmapped.
    pub fn lut_fanins(&self, node: NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
        let range = match self.mappings[self.ntk.node_to_index(node)] {
            Some(r) => r.offset as usize..(r.offset + r.count) as usize,
            None => 0..0,
        };
        self.leaf_arena[range]
            .iter()
            .map(move |i| self.ntk.index_to_node(*i))
    }

    pub fn foreach_lut_fanin(&self, node: NodeRef, mut f: impl FnMut(NodeRef)) {
        for leaf in self.lut_fanins(node) {
            f(leaf);
        }
    }

    pub fn lut_size(&self, node: NodeRef) -> usize {
        self.mappings[self.ntk.node_to_index(node)].map_or(0, |r| r.count as usize)
    }

    /// Counts mapped nodes by scanning every entry; always equal to
    /// `num_luts()`.
    pub fn count_mapped_by_scan(&self) -> u32 {
        self.mappings.iter().filter(|m| m.is_some()).count() as u32
    }

    /// Entries currently held in the leaf arena, including abandoned ranges.
    pub fn arena_len(&self) -> usize {
        self.leaf_arena.len()
    }

    pub fn network(&self) -> &N {
        &self.ntk
    }

    pub fn into_inner(self) -> N {
        self.ntk
    }
}

impl<N: Network, const STORE_FUNCTION: bool> Network for MappingView<N, STORE_FUNCTION> {
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
        self.ntk.precomputed_level(node)
    }

    fn precomputed_depth(&self) -> Option<u32> {
        self.ntk.precomputed_depth()
    }

    fn update_levels(&mut self) {
        self.ntk.update_levels()
    }
}

impl<N: Network, const STORE_FUNCTION: bool> MappedNetwork for MappingView<N, STORE_FUNCTION> {
    fn clear_mapping(&mut self) {
        MappingView::clear_mapping(self)
    }

    fn add_to_mapping(&mut self, node: NodeRef, leaves: &[NodeRef]) {
        MappingView::add_to_mapping(self, node, leaves)
    }

    fn stores_functions(&self) -> bool {
        STORE_FUNCTION
    }

    fn store_lut_function(&mut self, node: NodeRef, function: &TruthTable) {
        if STORE_FUNCTION {
            let handle = self.cache.insert(function);
            let index = self.ntk.node_to_index(node);
            self.functions[index] = handle;
        }
    }
}
