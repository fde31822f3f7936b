// SPDX-License-Identifier: Apache-2.0

use lutmap::logic_network::{GateKind, LogicNetwork};
use lutmap::network::{NodeRef, Signal};
use rand::Rng;

/// Builds a random acyclic network with `num_inputs` inputs and `num_gates`
/// gates of up to `max_fanin` fanins.
///
/// Fanins are drawn from all earlier nodes (the constant included) with
/// random polarity. The last three gates drive outputs, plus one output per
/// four gates picked at random.
pub fn random_network<R: Rng>(
    rng: &mut R,
    num_inputs: usize,
    num_gates: usize,
    max_fanin: usize,
) -> LogicNetwork {
    assert!(num_inputs > 0 && max_fanin >= 2);
    let mut ntk = LogicNetwork::new("random".to_string());
    for i in 0..num_inputs {
        ntk.add_input(format!("i{}", i));
    }
    let mut gates = Vec::with_capacity(num_gates);
    for _ in 0..num_gates {
        let kind = match rng.gen_range(0..4) {
            0 => GateKind::And,
            1 => GateKind::Or,
            2 => GateKind::Xor,
            _ => GateKind::Maj,
        };
        let fanin_count = match kind {
            GateKind::Maj => {
                if max_fanin >= 5 && rng.gen_bool(0.25) {
                    5
                } else {
                    3
                }
            }
            _ => rng.gen_range(2..=max_fanin),
        };
        let existing = ntk.nodes.len();
        let fanins: Vec<Signal> = (0..fanin_count)
            .map(|_| {
                // Mostly pick non-constant nodes.
                let id = if rng.gen_bool(0.05) {
                    0
                } else {
                    rng.gen_range(1..existing)
                };
                Signal::new(NodeRef { id }, rng.gen_bool(0.5))
            })
            .collect();
        gates.push(ntk.add_gate(kind, fanins));
    }
    for (i, gate) in gates.iter().rev().take(3).enumerate() {
        let signal = if i % 2 == 1 { gate.negate() } else { *gate };
        ntk.add_output(format!("o{}", i), signal);
    }
    for i in 0..num_gates / 4 {
        let gate = gates[rng.gen_range(0..gates.len())];
        let signal = if rng.gen_bool(0.5) { gate.negate() } else { gate };
        ntk.add_output(format!("r{}", i), signal);
    }
    ntk
}
