//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Topology Graph (TG): an in-memory undirected graph of switches and
//! discovered inter-switch links (spec.md §3, §4.1).
//!
//! Nodes are keyed by [`Dpid`] and carry an insertion-ordered `link_to`
//! list of `(local_port, neighbor_dpid)` pairs. Edges carry the timestamp
//! of their last LLDP confirmation. Iteration order over `link_to` is a
//! plain `Vec`, which is what makes `shortest_path`'s tie-breaking
//! deterministic (spec.md §4.1, "implementers must choose a container
//! whose iteration is stable").

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use tracing::{debug, info};

use sdnc_utils::Dpid;

/// A discovered adjacency entry: the local port, and the neighbor it leads
/// to.
pub type LinkTo = (u16, Dpid);

#[derive(Debug, Default)]
struct Node {
    link_to: Vec<LinkTo>,
}

/// Key identifying an edge regardless of endpoint order (invariant E1: at
/// most one edge per unordered dpid pair).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct EdgeKey(Dpid, Dpid);

impl EdgeKey {
    fn new(a: Dpid, b: Dpid) -> EdgeKey {
        if a.0 <= b.0 {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }
}

#[derive(Debug)]
struct Edge {
    timestamp: Instant,
}

/// The shared, process-wide topology singleton. See spec.md §5 for the
/// locking discipline callers are expected to apply: mutators require
/// exclusive access, readers may run concurrently with each other.
#[derive(Debug, Default)]
pub struct Topology {
    nodes: HashMap<Dpid, Node>,
    edges: HashMap<EdgeKey, Edge>,
}

impl Topology {
    pub fn new() -> Topology {
        Topology::default()
    }

    /// Idempotently creates a node with an empty `link_to`.
    pub fn add_node(&mut self, dpid: Dpid) {
        self.nodes.entry(dpid).or_default();
    }

    pub fn has_node(&self, dpid: Dpid) -> bool {
        self.nodes.contains_key(&dpid)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the set of dpids, in no particular order (diagnostics only).
    pub fn nodes(&self) -> impl Iterator<Item = Dpid> + '_ {
        self.nodes.keys().copied()
    }

    /// Creates the edge between `a` and `b` if absent, or refreshes its
    /// timestamp if present. Idempotent with respect to argument order
    /// (invariant E1).
    pub fn add_or_refresh_edge(&mut self, a: Dpid, b: Dpid, now: Instant) {
        if a == b {
            debug!(dpid = %a, "ignoring self-loop edge");
            return;
        }
        self.nodes.entry(a).or_default();
        self.nodes.entry(b).or_default();
        self.edges
            .entry(EdgeKey::new(a, b))
            .and_modify(|edge| edge.timestamp = now)
            .or_insert(Edge { timestamp: now });
    }

    pub fn has_edge(&self, a: Dpid, b: Dpid) -> bool {
        self.edges.contains_key(&EdgeKey::new(a, b))
    }

    /// Last-confirmation timestamp of the edge between `a` and `b`, if any.
    pub fn edge_timestamp(&self, a: Dpid, b: Dpid) -> Option<Instant> {
        self.edges.get(&EdgeKey::new(a, b)).map(|edge| edge.timestamp)
    }

    /// Snapshot of `(a, b, timestamp)` for every edge, used by the link
    /// collector (spec.md §4.3.6: "iterate over a snapshot").
    pub fn edge_snapshot(&self) -> Vec<(Dpid, Dpid, Instant)> {
        self.edges
            .iter()
            .map(|(key, edge)| (key.0, key.1, edge.timestamp))
            .collect()
    }

    /// Appends `(local_port, neighbor_dpid)` to `dpid`'s `link_to` unless
    /// already present (invariant N2: no two entries share a local port).
    pub fn record_port_use(
        &mut self,
        dpid: Dpid,
        local_port: u16,
        neighbor_dpid: Dpid,
    ) {
        let node = self.nodes.entry(dpid).or_default();
        if let Some(existing) =
            node.link_to.iter_mut().find(|(p, _)| *p == local_port)
        {
            existing.1 = neighbor_dpid;
            return;
        }
        node.link_to.push((local_port, neighbor_dpid));
    }

    /// Returns the two local port numbers joining `a` and `b`, in
    /// `(port_on_a, port_on_b)` order, or `None` if either side lacks the
    /// `link_to` entry yet (spec.md §4.1, §8 scenario 1).
    pub fn linking_ports(&self, a: Dpid, b: Dpid) -> Option<(u16, u16)> {
        let port_a = self.remote_port(a, b)?;
        let port_b = self.remote_port(b, a)?;
        Some((port_a, port_b))
    }

    fn remote_port(&self, from: Dpid, to: Dpid) -> Option<u16> {
        self.nodes
            .get(&from)?
            .link_to
            .iter()
            .find(|(_, n)| *n == to)
            .map(|(p, _)| *p)
    }

    /// Returns the neighbor dpid and its local port reached by `local_port`
    /// on `dpid`.
    pub fn remote_endpoint(
        &self,
        dpid: Dpid,
        local_port: u16,
    ) -> Option<(Dpid, u16)> {
        let (_, neighbor) = self
            .nodes
            .get(&dpid)?
            .link_to
            .iter()
            .find(|(p, _)| *p == local_port)?;
        let neighbor_port = self.remote_port(*neighbor, dpid)?;
        Some((*neighbor, neighbor_port))
    }

    /// Removes the adjacency entries from both `link_to` lists and removes
    /// the edge. Tolerant of partial state: a missing port entry or a
    /// missing edge is logged, not an error (spec.md §4.1, §7 taxonomy #2).
    pub fn delete_edge(&mut self, a: Dpid, b: Dpid) {
        let mut removed_any = false;
        if let Some(node) = self.nodes.get_mut(&a) {
            let before = node.link_to.len();
            node.link_to.retain(|(_, n)| *n != b);
            removed_any |= node.link_to.len() != before;
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            let before = node.link_to.len();
            node.link_to.retain(|(_, n)| *n != a);
            removed_any |= node.link_to.len() != before;
        }
        let had_edge = self.edges.remove(&EdgeKey::new(a, b)).is_some();
        if !had_edge && !removed_any {
            debug!(%a, %b, "delete_edge: no such edge, nothing to do");
            return;
        }
        info!(%a, %b, "link removed");
    }

    /// Deletes every incident edge, then removes the node.
    pub fn remove_node(&mut self, dpid: Dpid) {
        let neighbors: Vec<Dpid> = self
            .nodes
            .get(&dpid)
            .map(|node| node.link_to.iter().map(|(_, n)| *n).collect())
            .unwrap_or_default();
        for neighbor in neighbors {
            self.delete_edge(dpid, neighbor);
        }
        self.nodes.remove(&dpid);
    }

    /// Unweighted BFS shortest path between `src` and `dst`, including both
    /// endpoints. `None` if either node is absent or the graph is
    /// disconnected. Ties are broken by the insertion order of each node's
    /// `link_to` list (spec.md §4.1 algorithm notes).
    pub fn shortest_path(&self, src: Dpid, dst: Dpid) -> Option<Vec<Dpid>> {
        if !self.nodes.contains_key(&src) || !self.nodes.contains_key(&dst) {
            return None;
        }
        if src == dst {
            return Some(vec![src]);
        }

        let mut visited = HashMap::new();
        visited.insert(src, src);
        let mut queue = VecDeque::new();
        queue.push_back(src);

        while let Some(current) = queue.pop_front() {
            if current == dst {
                return Some(self.reconstruct_path(&visited, src, dst));
            }
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for (_, neighbor) in &node.link_to {
                if visited.contains_key(neighbor) {
                    continue;
                }
                visited.insert(*neighbor, current);
                queue.push_back(*neighbor);
            }
        }

        None
    }

    fn reconstruct_path(
        &self,
        visited: &HashMap<Dpid, Dpid>,
        src: Dpid,
        dst: Dpid,
    ) -> Vec<Dpid> {
        let mut path = vec![dst];
        let mut current = dst;
        while current != src {
            current = visited[&current];
            path.push(current);
        }
        path.reverse();
        path
    }
}
