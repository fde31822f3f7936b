// SPDX-License-Identifier: Apache-2.0

use crate::logic_network::{GateKind, LogicNetwork};
use crate::network::Signal;

pub struct TestNetwork {
    pub ntk: LogicNetwork,
    pub a: Signal,
    pub b: Signal,
    pub c: Signal,
    pub g1: Signal,
    pub g2: Signal,
}

/// Network:
/// a --\
///      AND(g1) --\
/// b --/           OR(g2) -- NOT -- [o]
/// c -- NOT ------/
pub fn setup_simple_network() -> TestNetwork {
    let mut ntk = LogicNetwork::new("simple".to_string());
    let a = ntk.add_input("a".to_string());
    let b = ntk.add_input("b".to_string());
    let c = ntk.add_input("c".to_string());
    let g1 = ntk.add_and(a, b);
    let g2 = ntk.add_or(g1, c.negate());
    ntk.add_output("o".to_string(), g2.negate());
    TestNetwork {
        ntk,
        a,
        b,
        c,
        g1,
        g2,
    }
}

pub struct Xor3Network {
    pub ntk: LogicNetwork,
    pub a: Signal,
    pub b: Signal,
    pub c: Signal,
    pub and_ab: Signal,
    pub or_ab: Signal,
    pub xor_ab: Signal,
    pub and_xc: Signal,
    pub or_xc: Signal,
    pub out: Signal,
}

/// Three-input XOR built from AND/OR gates, each two-input XOR being
/// `AND(OR(x, y), NOT(AND(x, y)))`:
///
/// a, b --> OR(or_ab), AND(and_ab) --> AND(xor_ab)
/// xor_ab, c --> OR(or_xc), AND(and_xc) --> AND(out) [out]
pub fn setup_xor3_network() -> Xor3Network {
    let mut ntk = LogicNetwork::new("xor3".to_string());
    let a = ntk.add_input("a".to_string());
    let b = ntk.add_input("b".to_string());
    let c = ntk.add_input("c".to_string());
    let and_ab = ntk.add_and(a, b);
    let or_ab = ntk.add_or(a, b);
    let xor_ab = ntk.add_and(or_ab, and_ab.negate());
    let and_xc = ntk.add_and(xor_ab, c);
    let or_xc = ntk.add_or(xor_ab, c);
    let out = ntk.add_and(or_xc, and_xc.negate());
    ntk.add_output("out".to_string(), out);
    Xor3Network {
        ntk,
        a,
        b,
        c,
        and_ab,
        or_ab,
        xor_ab,
        and_xc,
        or_xc,
        out,
    }
}

pub struct AdderChain {
    pub ntk: LogicNetwork,
    pub a: Vec<Signal>,
    pub b: Vec<Signal>,
    pub sums: Vec<Signal>,
    pub carry_out: Signal,
}

/// Ripple-carry adder of `bits` bits; sum bits use XOR gates and carries use
/// majority gates (the least significant carry is a plain AND).
pub fn setup_adder_chain(bits: usize) -> AdderChain {
    assert!(bits > 0);
    let mut ntk = LogicNetwork::new(format!("adder{}", bits));
    let a: Vec<Signal> = (0..bits).map(|i| ntk.add_input(format!("a{}", i))).collect();
    let b: Vec<Signal> = (0..bits).map(|i| ntk.add_input(format!("b{}", i))).collect();
    let mut sums = Vec::with_capacity(bits);
    let mut carry: Option<Signal> = None;
    for i in 0..bits {
        let (sum, next) = match carry {
            None => (ntk.add_xor(a[i], b[i]), ntk.add_and(a[i], b[i])),
            Some(cin) => (
                ntk.add_gate(GateKind::Xor, vec![a[i], b[i], cin]),
                ntk.add_maj(a[i], b[i], cin),
            ),
        };
        ntk.add_output(format!("s{}", i), sum);
        sums.push(sum);
        carry = Some(next);
    }
    let carry_out = carry.unwrap_or_else(|| ntk.get_constant(false));
    ntk.add_output("cout".to_string(), carry_out);
    AdderChain {
        ntk,
        a,
        b,
        sums,
        carry_out,
    }
}

pub struct WideAndNetwork {
    pub ntk: LogicNetwork,
    pub inputs: Vec<Signal>,
    pub wide: Signal,
}

/// A single AND gate over `width` primary inputs, driving the only output.
pub fn setup_wide_and_network(width: usize) -> WideAndNetwork {
    let mut ntk = LogicNetwork::new(format!("and{}", width));
    let inputs: Vec<Signal> = (0..width)
        .map(|i| ntk.add_input(format!("i{}", i)))
        .collect();
    let wide = ntk.add_gate(GateKind::And, inputs.clone());
    ntk.add_output("o".to_string(), wide);
    WideAndNetwork { ntk, inputs, wide }
}

/// `count` primary inputs wired straight to outputs, the odd ones inverted.
pub fn setup_wires_network(count: usize) -> LogicNetwork {
    let mut ntk = LogicNetwork::new("wires".to_string());
    for i in 0..count {
        let input = ntk.add_input(format!("i{}", i));
        let output = if i % 2 == 1 { input.negate() } else { input };
        ntk.add_output(format!("o{}", i), output);
    }
    ntk
}
