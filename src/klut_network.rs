// SPDX-License-Identifier: Apache-2.0

//! A network of K-input lookup tables.
//!
//! Every gate carries an explicit truth table over its fanins; fanin `i` is
//! variable `i` of the table. Fanins are plain nodes: polarity is folded into
//! the LUT functions, and only primary outputs carry a complement bit.

use crate::network::{Network, NodeRef, Output, Signal};
use crate::truth_table::TruthTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KLutNode {
    Constant(bool),
    Input {
        name: String,
    },
    Lut {
        fanins: Vec<NodeRef>,
        function: TruthTable,
    },
}

#[derive(Debug, Clone)]
pub struct KLutNetwork {
    pub name: String,
    pub nodes: Vec<KLutNode>,
    pub inputs: Vec<NodeRef>,
    pub outputs: Vec<Output>,
}

impl KLutNetwork {
    pub fn new(name: String) -> Self {
        Self {
            name,
            nodes: vec![KLutNode::Constant(false)],
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn get_constant(&self, value: bool) -> Signal {
        Signal::new(NodeRef { id: 0 }, value)
    }

    pub fn add_input(&mut self, name: String) -> NodeRef {
        let node = NodeRef {
            id: self.nodes.len(),
        };
        self.nodes.push(KLutNode::Input { name });
        self.inputs.push(node);
        node
    }

    pub fn add_lut(&mut self, fanins: Vec<NodeRef>, function: TruthTable) -> NodeRef {
        assert_eq!(
            fanins.len(),
            function.num_vars(),
            "LUT function arity must match its fanin count"
        );
        for fanin in &fanins {
            assert!(
                fanin.id < self.nodes.len(),
                "LUT fanin %{} does not exist yet",
                fanin.id
            );
        }
        let node = NodeRef {
            id: self.nodes.len(),
        };
        self.nodes.push(KLutNode::Lut { fanins, function });
        node
    }

    pub fn add_output(&mut self, name: String, signal: Signal) {
        self.outputs.push(Output { name, signal });
    }

    pub fn num_luts(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, KLutNode::Lut { .. }))
            .count()
    }

    pub fn lut_function(&self, node: NodeRef) -> Option<&TruthTable> {
        match &self.nodes[node.id] {
            KLutNode::Lut { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn lut_fanins(&self, node: NodeRef) -> &[NodeRef] {
        match &self.nodes[node.id] {
            KLutNode::Lut { fanins, .. } => fanins,
            _ => &[],
        }
    }
}

impl Network for KLutNetwork {
    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn node_to_index(&self, node: NodeRef) -> usize {
        node.id
    }

    fn index_to_node(&self, index: usize) -> NodeRef {
        NodeRef { id: index }
    }

    fn is_constant(&self, node: NodeRef) -> bool {
        matches!(self.nodes[node.id], KLutNode::Constant(_))
    }

    fn constant_value(&self, node: NodeRef) -> bool {
        matches!(self.nodes[node.id], KLutNode::Constant(true))
    }

    fn is_pi(&self, node: NodeRef) -> bool {
        matches!(self.nodes[node.id], KLutNode::Input { .. })
    }

    fn num_pis(&self) -> usize {
        self.inputs.len()
    }

    fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    fn fanin_size(&self, node: NodeRef) -> usize {
        self.lut_fanins(node).len()
    }

    fn foreach_fanin(&self, node: NodeRef, mut f: impl FnMut(Signal)) {
        for fanin in self.lut_fanins(node) {
            f(Signal::from(*fanin));
        }
    }

    fn foreach_po(&self, mut f: impl FnMut(Signal)) {
        for output in &self.outputs {
            f(output.signal);
        }
    }

    fn foreach_pi(&self, mut f: impl FnMut(NodeRef)) {
        for input in &self.inputs {
            f(*input);
        }
    }

    fn compute(&self, node: NodeRef, operands: &[TruthTable]) -> TruthTable {
        match &self.nodes[node.id] {
            KLutNode::Constant(value) => {
                let num_vars = operands.first().map_or(0, |t| t.num_vars());
                TruthTable::const0(num_vars).negate_if(*value)
            }
            KLutNode::Input { name } => {
                panic!("compute called on primary input {:?} (%{})", name, node.id)
            }
            KLutNode::Lut { fanins, function } => {
                assert_eq!(operands.len(), fanins.len());
                function.compose(operands)
            }
        }
    }
}
