//! Topology snapshots of a pull graph, and the checks every attach goes through.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{GraphError, Result};
use crate::node::{AudioNode, SharedNode};

/// Format summary of one node in a [`Topology`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: &'static str,
    pub channels: u8,
    pub sample_rate: u32,
    pub read_size: usize,
}

impl NodeInfo {
    fn of(node: &dyn AudioNode) -> Self {
        Self {
            name: node.name(),
            channels: node.channels(),
            sample_rate: node.sample_rate(),
            read_size: node.read_size(),
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}ch@{}Hz)", self.name, self.channels, self.sample_rate)
    }
}

/// Identity of a node: the address of its shared allocation.
fn address(node: &dyn AudioNode) -> usize {
    node as *const dyn AudioNode as *const () as usize
}

/// A snapshot of everything upstream of a root node.
///
/// Edges follow the audio: from an input to the node that reads it. Nodes
/// shared by several consumers appear once. Taking a snapshot walks
/// [`AudioNode::inputs`], so it belongs on the control thread.
pub struct Topology {
    graph: DiGraph<NodeInfo, ()>,
    root: NodeIndex,
    indices: HashMap<usize, NodeIndex>,
}

impl Topology {
    pub fn of(root: &dyn AudioNode) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        let root_index = graph.add_node(NodeInfo::of(root));
        indices.insert(address(root), root_index);

        let mut pending: Vec<(NodeIndex, SharedNode)> = root
            .inputs()
            .into_iter()
            .map(|input| (root_index, input))
            .collect();

        while let Some((consumer, node)) = pending.pop() {
            let index = match indices.get(&address(&*node)) {
                Some(&index) => index,
                None => {
                    let index = graph.add_node(NodeInfo::of(&*node));
                    indices.insert(address(&*node), index);
                    pending.extend(node.inputs().into_iter().map(|input| (index, input)));
                    index
                }
            };
            graph.update_edge(index, consumer, ());
        }

        Self {
            graph,
            root: root_index,
            indices,
        }
    }

    pub fn root(&self) -> &NodeInfo {
        &self.graph[self.root]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `node` is the root or somewhere upstream of it.
    pub fn contains(&self, node: &dyn AudioNode) -> bool {
        self.indices.contains_key(&address(node))
    }

    pub fn is_acyclic(&self) -> bool {
        !algo::is_cyclic_directed(&self.graph)
    }

    /// Number of nodes on the longest chain ending at the root.
    ///
    /// `None` if the snapshot contains a cycle.
    pub fn depth(&self) -> Option<usize> {
        let order = algo::toposort(&self.graph, None).ok()?;
        let mut depth: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        for index in order {
            let longest = self
                .graph
                .neighbors_directed(index, petgraph::Direction::Incoming)
                .filter_map(|input| depth.get(&input).copied())
                .max()
                .unwrap_or(0);
            depth.insert(index, longest + 1);
        }
        depth.get(&self.root).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeInfo> + '_ {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.edge_count() == 0 {
            return write!(f, "{}", self.root());
        }
        let edges = self
            .graph
            .raw_edges()
            .iter()
            .map(|edge| format!("{} -> {}", self.graph[edge.source()], self.graph[edge.target()]))
            .join(", ");
        f.write_str(&edges)
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("root", self.root())
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

/// Check that `node` may feed `consumer` and bring it to the consumer's read size.
///
/// The consumer must be initialized, `node` must produce `expected_channels`
/// channels at the consumer's sample rate, and the consumer must not already
/// be upstream of `node`. Nothing is modified when a check fails.
pub(crate) fn admit(consumer: &dyn AudioNode, expected_channels: u8, node: &SharedNode) -> Result<()> {
    consumer.core().require_booted()?;
    if !node.core().is_booted() {
        tracing::error!(consumer = consumer.name(), input = node.name(), "input node is not initialized");
        return Err(GraphError::Uninitialized { node: node.name() });
    }

    if node.channels() != expected_channels {
        tracing::error!(
            consumer = consumer.name(),
            input = node.name(),
            expected = expected_channels,
            found = node.channels(),
            "input node has wrong number of channels"
        );
        return Err(GraphError::ChannelMismatch {
            expected: expected_channels,
            found: node.channels(),
        });
    }

    if node.sample_rate() != consumer.sample_rate() {
        tracing::error!(
            consumer = consumer.name(),
            input = node.name(),
            expected = consumer.sample_rate(),
            found = node.sample_rate(),
            "input node has wrong sample rate"
        );
        return Err(GraphError::RateMismatch {
            expected: consumer.sample_rate(),
            found: node.sample_rate(),
        });
    }

    if Topology::of(&**node).contains(consumer) {
        tracing::warn!(consumer = consumer.name(), input = node.name(), "rejecting cyclic attach");
        return Err(GraphError::Cycle { node: node.name() });
    }

    if node.read_size() != consumer.read_size() {
        node.set_read_size(consumer.read_size());
    }
    Ok(())
}
