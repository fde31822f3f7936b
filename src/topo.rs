// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;

use crate::network::{Network, NodeRef};

/// Returns a postorder traversal (fanins before fanouts) of the nodes
/// reachable from the primary outputs, deduplicated by node.
///
/// The traversal owns its visited set, so any number of traversals over the
/// same network may be live at once.
pub fn postorder_from_outputs<N: Network>(ntk: &N) -> Vec<NodeRef> {
    let mut starts = Vec::with_capacity(ntk.num_pos());
    ntk.foreach_po(|s| starts.push(ntk.get_node(s)));
    postorder_from(ntk, &starts)
}

/// Postorder over the transitive fanin of `starts`.
pub fn postorder_from<N: Network>(ntk: &N, starts: &[NodeRef]) -> Vec<NodeRef> {
    let mut visited = vec![false; ntk.size()];
    let mut postorder = Vec::new();
    // Each entry is (node, number of fanins already expanded).
    let mut worklist: Vec<(NodeRef, usize)> = Vec::new();
    for start in starts.iter().rev() {
        worklist.push((*start, 0));
    }
    while let Some((current, next_fanin)) = worklist.pop() {
        let index = ntk.node_to_index(current);
        if visited[index] {
            continue;
        }
        let fanins = ntk.fanins(current);
        let pending = fanins[next_fanin..]
            .iter()
            .position(|f| !visited[ntk.node_to_index(ntk.get_node(*f))]);
        match pending {
            Some(offset) => {
                let fanin_pos = next_fanin + offset;
                worklist.push((current, fanin_pos + 1)); // Revisit after the dependency
                worklist.push((ntk.get_node(fanins[fanin_pos]), 0));
            }
            None => {
                visited[index] = true;
                postorder.push(current);
            }
        }
    }
    postorder
}

/// Kahn-style topological order over every node of the network.
///
/// Returns the order and, if not every node could be ordered, the indices of
/// the nodes left unvisited (which lie on or behind a cycle).
pub fn topo_order_and_cycle_check<N: Network>(ntk: &N) -> (Vec<NodeRef>, Option<Vec<usize>>) {
    let node_count = ntk.size();
    let mut indegree = vec![0usize; node_count];
    let mut fanouts: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    ntk.foreach_node(|node| {
        let index = ntk.node_to_index(node);
        ntk.foreach_fanin(node, |s| {
            indegree[index] += 1;
            fanouts[ntk.node_to_index(ntk.get_node(s))].push(index);
        });
    });
    let mut queue: VecDeque<usize> = (0..node_count).filter(|i| indegree[*i] == 0).collect();
    let mut order = Vec::with_capacity(node_count);
    while let Some(index) = queue.pop_front() {
        order.push(ntk.index_to_node(index));
        for &fanout in &fanouts[index] {
            indegree[fanout] -= 1;
            if indegree[fanout] == 0 {
                queue.push_back(fanout);
            }
        }
    }
    if order.len() != node_count {
        let mut ordered = vec![false; node_count];
        for node in &order {
            ordered[ntk.node_to_index(*node)] = true;
        }
        let not_visited: Vec<usize> = (0..node_count).filter(|i| !ordered[*i]).collect();
        (order, Some(not_visited))
    } else {
        (order, None)
    }
}

/// Returns a topological order (fanins before fanouts) of all nodes.
///
/// Panics if the network contains a cycle.
pub fn topo_sort_nodes<N: Network>(ntk: &N) -> Vec<NodeRef> {
    let (order, cycle) = topo_order_and_cycle_check(ntk);
    if let Some(not_visited) = cycle {
        log::error!("Cycle detected! Not visited: {:?}", not_visited);
        panic!(
            "Cycle detected in network: topological sort visited {} of {} nodes; not visited: {:?}",
            ntk.size() - not_visited.len(),
            ntk.size(),
            not_visited
        );
    }
    order
}
