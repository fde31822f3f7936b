// SPDX-License-Identifier: Apache-2.0

//! A general Boolean network: a constant, primary inputs, and n-ary
//! AND/OR/XOR/MAJ gates whose fanins may be complemented.
//!
//! Node 0 is always the constant-false node; constant true is its complement.
//! Nodes are only ever appended, and gates may only reference existing nodes,
//! so the node order is a topological order.
//!
//! Basic example usage:
//! ```
//! use lutmap::logic_network::LogicNetwork;
//!
//! let mut ntk = LogicNetwork::new("and2".to_string());
//! let a = ntk.add_input("a".to_string());
//! let b = ntk.add_input("b".to_string());
//! let o = ntk.add_and(a, b);
//! ntk.add_output("o".to_string(), o);
//! assert_eq!(ntk.num_gates(), 1);
//! ```

use crate::network::{Network, NodeRef, Output, Signal};
use crate::truth_table::{TruthTable, MAX_VARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Xor,
    /// Majority over an odd number of fanins.
    Maj,
}

impl GateKind {
    fn mnemonic(self) -> &'static str {
        match self {
            GateKind::And => "and",
            GateKind::Or => "or",
            GateKind::Xor => "xor",
            GateKind::Maj => "maj",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicNode {
    Constant(bool),
    Input { name: String },
    Gate { kind: GateKind, fanins: Vec<Signal> },
}

#[derive(Debug, Clone)]
pub struct LogicNetwork {
    pub name: String,
    pub nodes: Vec<LogicNode>,
    pub inputs: Vec<NodeRef>,
    pub outputs: Vec<Output>,
}

impl LogicNetwork {
    pub fn new(name: String) -> Self {
        Self {
            name,
            nodes: vec![LogicNode::Constant(false)],
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn get_constant(&self, value: bool) -> Signal {
        Signal::new(NodeRef { id: 0 }, value)
    }

    pub fn get(&self, node: NodeRef) -> &LogicNode {
        &self.nodes[node.id]
    }

    pub fn add_input(&mut self, name: String) -> Signal {
        let node = NodeRef {
            id: self.nodes.len(),
        };
        self.nodes.push(LogicNode::Input { name });
        self.inputs.push(node);
        node.into()
    }

    pub fn add_output(&mut self, name: String, signal: Signal) {
        self.validate_signal(signal);
        self.outputs.push(Output { name, signal });
    }

    /// Adds a gate of `kind` over `fanins` and returns its (positive) output.
    pub fn add_gate(&mut self, kind: GateKind, fanins: Vec<Signal>) -> Signal {
        assert!(!fanins.is_empty(), "a {:?} gate needs at least one fanin", kind);
        assert!(
            fanins.len() <= MAX_VARS,
            "gates are limited to {} fanins; got {}",
            MAX_VARS,
            fanins.len()
        );
        if kind == GateKind::Maj {
            assert!(
                fanins.len() % 2 == 1,
                "a majority gate needs an odd fanin count; got {}",
                fanins.len()
            );
        }
        for fanin in &fanins {
            self.validate_signal(*fanin);
        }
        let node = NodeRef {
            id: self.nodes.len(),
        };
        self.nodes.push(LogicNode::Gate { kind, fanins });
        node.into()
    }

    pub fn add_and(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_gate(GateKind::And, vec![a, b])
    }

    pub fn add_or(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_gate(GateKind::Or, vec![a, b])
    }

    pub fn add_xor(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_gate(GateKind::Xor, vec![a, b])
    }

    pub fn add_maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.add_gate(GateKind::Maj, vec![a, b, c])
    }

    pub fn add_nand(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_and(a, b).negate()
    }

    pub fn num_gates(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, LogicNode::Gate { .. }))
            .count()
    }

    fn validate_signal(&self, signal: Signal) {
        assert!(
            signal.node.id < self.nodes.len(),
            "signal references node %{} but the network only has {} nodes",
            signal.node.id,
            self.nodes.len()
        );
    }

    pub fn to_string(&self) -> String {
        let signal_str = |s: &Signal| {
            let base = match &self.nodes[s.node.id] {
                LogicNode::Input { name } => name.clone(),
                _ => format!("%{}", s.node.id),
            };
            if s.negated {
                format!("not({})", base)
            } else {
                base
            }
        };
        let inputs = self
            .inputs
            .iter()
            .map(|n| signal_str(&Signal::from(*n)))
            .collect::<Vec<String>>()
            .join(", ");
        let mut s = format!("fn {}({}) {{\n", self.name, inputs);
        for (id, node) in self.nodes.iter().enumerate() {
            if let LogicNode::Gate { kind, fanins } = node {
                let args = fanins.iter().map(&signal_str).collect::<Vec<String>>();
                s.push_str(&format!(
                    "  %{} = {}({})\n",
                    id,
                    kind.mnemonic(),
                    args.join(", ")
                ));
            }
        }
        for output in &self.outputs {
            s.push_str(&format!("  {} = {}\n", output.name, signal_str(&output.signal)));
        }
        s.push('}');
        s
    }
}

fn majority(operands: &[TruthTable]) -> TruthTable {
    if operands.len() == 1 {
        return operands[0].clone();
    }
    if operands.len() == 3 {
        return TruthTable::maj(&operands[0], &operands[1], &operands[2]);
    }
    let num_vars = operands[0].num_vars();
    let threshold = operands.len() / 2;
    let mut out = TruthTable::const0(num_vars);
    for assign in 0..out.num_bits() {
        let ones = operands.iter().filter(|t| t.get_bit(assign)).count();
        if ones > threshold {
            out.set_bit(assign, true);
        }
    }
    out
}

impl Network for LogicNetwork {
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
        matches!(self.nodes[node.id], LogicNode::Constant(_))
    }

    fn constant_value(&self, node: NodeRef) -> bool {
        matches!(self.nodes[node.id], LogicNode::Constant(true))
    }

    fn is_pi(&self, node: NodeRef) -> bool {
        matches!(self.nodes[node.id], LogicNode::Input { .. })
    }

    fn num_pis(&self) -> usize {
        self.inputs.len()
    }

    fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    fn fanin_size(&self, node: NodeRef) -> usize {
        match &self.nodes[node.id] {
            LogicNode::Gate { fanins, .. } => fanins.len(),
            _ => 0,
        }
    }

    fn foreach_fanin(&self, node: NodeRef, mut f: impl FnMut(Signal)) {
        if let LogicNode::Gate { fanins, .. } = &self.nodes[node.id] {
            for fanin in fanins {
                f(*fanin);
            }
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
            LogicNode::Constant(value) => {
                let num_vars = operands.first().map_or(0, |t| t.num_vars());
                TruthTable::const0(num_vars).negate_if(*value)
            }
            LogicNode::Input { name } => {
                panic!("compute called on primary input {:?} (%{})", name, node.id)
            }
            LogicNode::Gate { kind, fanins } => {
                assert_eq!(
                    operands.len(),
                    fanins.len(),
                    "compute on %{} needs one operand per fanin",
                    node.id
                );
                let values: Vec<TruthTable> = operands
                    .iter()
                    .zip(fanins.iter())
                    .map(|(tt, fanin)| tt.negate_if(fanin.negated))
                    .collect();
                match kind {
                    GateKind::And => values[1..]
                        .iter()
                        .fold(values[0].clone(), |acc, v| acc.and(v)),
                    GateKind::Or => values[1..]
                        .iter()
                        .fold(values[0].clone(), |acc, v| acc.or(v)),
                    GateKind::Xor => values[1..]
                        .iter()
                        .fold(values[0].clone(), |acc, v| acc.xor(v)),
                    GateKind::Maj => majority(&values),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compute_applies_fanin_complements() {
        let mut ntk = LogicNetwork::new("t".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        let g = ntk.add_and(a.negate(), b);
        let x = TruthTable::nth_var(2, 0);
        let y = TruthTable::nth_var(2, 1);
        let got = ntk.compute(g.node, &[x.clone(), y.clone()]);
        assert_eq!(got, x.not().and(&y));
    }

    #[test]
    fn test_majority_of_five() {
        let mut ntk = LogicNetwork::new("t".to_string());
        let ins: Vec<Signal> = (0..5)
            .map(|i| ntk.add_input(format!("i{}", i)))
            .collect();
        let m = ntk.add_gate(GateKind::Maj, ins);
        let operands: Vec<TruthTable> = (0..5).map(|i| TruthTable::nth_var(5, i)).collect();
        let got = ntk.compute(m.node, &operands);
        for assign in 0..32usize {
            assert_eq!(got.get_bit(assign), assign.count_ones() >= 3);
        }
    }

    #[test]
    fn test_to_string() {
        let mut ntk = LogicNetwork::new("f".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        let g = ntk.add_or(a, b.negate());
        ntk.add_output("o".to_string(), g.negate());
        assert_eq!(
            ntk.to_string(),
            "fn f(a, b) {\n  %3 = or(a, not(b))\n  o = not(%3)\n}"
        );
    }

    #[test]
    #[should_panic(expected = "odd fanin count")]
    fn test_even_majority_rejected() {
        let mut ntk = LogicNetwork::new("t".to_string());
        let a = ntk.add_input("a".to_string());
        let b = ntk.add_input("b".to_string());
        ntk.add_gate(GateKind::Maj, vec![a, b]);
    }
}
