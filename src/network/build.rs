use crate::{
    layering::{Layering, LayeringError},
    matrix::GraphMatrices,
    network::{Edge, Endpoint, FeedbackChannel, FeedbackTap, Network, Node, NodeKind},
    types::{ChannelId, EdgeId, IndexMap, NodeId},
};
use rustc_hash::FxBuildHasher;
use thiserror::Error;
use tracing::debug;
use unzip3::Unzip3;

/// Error kind for network construction failures.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BuildError {
    /// The boundary node ranges do not fit into the graph.
    #[error("{inputs} input and {outputs} output nodes do not fit into a graph of {size} nodes")]
    BoundaryOverflow {
        inputs: usize,
        outputs: usize,
        size: usize,
    },
    /// The layering is not a valid partition of the graph.
    #[error("invalid layering: {0}")]
    Layering(#[from] LayeringError),
    /// The dedicated worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Materializes the runtime graph from (simplified) matrices and a layering.
///
/// Wiring rules:
/// - `(i, j)` with `i < j` becomes a forward edge from node `i` to node `j`
///   weighted by `costs[(i, j)]`;
/// - `(i, j)` with `i > j` becomes a tap of the feedback channel of node `j`
///   weighted by `costs[(i, j)]`;
/// - the diagonal of `costs` holds the node thresholds and the diagonal of the
///   adjacency matrix is ignored;
/// - every input-boundary node gets one weight-1 edge from the external input
///   vector and every output-boundary node one weight-1 edge to the external
///   output vector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NetworkBuilder {
    inputs: usize,
    outputs: usize,
}

impl NetworkBuilder {
    #[must_use]
    pub const fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }

    /// Fail unless `inputs + outputs <= size`.
    pub(crate) fn check_boundaries(&self, size: usize) -> Result<(), BuildError> {
        match self.inputs.checked_add(self.outputs) {
            Some(boundary) if boundary <= size => Ok(()),
            _ => Err(BuildError::BoundaryOverflow {
                inputs: self.inputs,
                outputs: self.outputs,
                size,
            }),
        }
    }

    /// Build the network.
    ///
    /// # Panics
    /// In case of internal invariant violations. Impossible if there are no
    /// bugs in the code.
    ///
    /// # Errors
    /// If the boundary ranges overflow the graph or `layering` is not a valid
    /// partition of its forward edges.
    pub fn build(&self, matrices: &GraphMatrices, layering: &Layering) -> Result<Network, BuildError> {
        let size = matrices.len();
        self.check_boundaries(size)?;
        layering.check(matrices.adjacency())?;

        let adjacency = matrices.adjacency();
        let costs = matrices.costs();
        let first_output = size - self.outputs;

        // Phase 1: node records and the neighbour lists of every node, split
        // into forward (higher index) and backward (lower index) destinations.
        let (mut nodes, forward, backward): (Vec<Node>, Vec<Vec<usize>>, Vec<Vec<usize>>) = (0..size)
            .map(|index| {
                let kind = if index < first_output {
                    NodeKind::Interior
                } else {
                    NodeKind::OutputBoundary
                };
                let node = Node::new(kind, costs[(index, index)]);
                let forward = (index + 1..size)
                    .filter(|&destination| adjacency[(index, destination)])
                    .collect();
                let backward = (0..index)
                    .filter(|&destination| adjacency[(index, destination)])
                    .collect();
                (node, forward, backward)
            })
            .unzip3();

        // Phase 2: wire forward edges directly and route backward edges through
        // one feedback channel per destination.
        let mut edges = Vec::with_capacity(matrices.forward_edge_count() + self.inputs + self.outputs);
        let mut push_edge = |edge: Edge| {
            edges.push(edge);
            EdgeId::from(edges.len() - 1)
        };
        let mut channels: IndexMap<NodeId, FeedbackChannel> = IndexMap::with_hasher(FxBuildHasher);

        for (source, (forward, backward)) in forward.iter().zip(&backward).enumerate() {
            let origin = NodeId::from(source);
            for &destination in forward {
                assert!(source < destination, "NetworkBuilder::build: [1]");
                let target = NodeId::from(destination);
                let id = push_edge(Edge::new(
                    costs[(source, destination)],
                    Endpoint::Node(origin),
                    Endpoint::Node(target),
                ));
                nodes[source].outputs.push(id);
                nodes[destination].inputs.push(id);
            }
            for &destination in backward {
                assert!(source > destination, "NetworkBuilder::build: [2]");
                let target = NodeId::from(destination);
                let entry = channels.entry(target);
                let channel_id = ChannelId::from(entry.index());
                let channel = entry.or_insert_with(|| FeedbackChannel::new(target));
                let buffer = push_edge(Edge::new(
                    1.0,
                    Endpoint::Node(origin),
                    Endpoint::Channel(channel_id),
                ));
                let injection = push_edge(Edge::new(
                    costs[(source, destination)],
                    Endpoint::Channel(channel_id),
                    Endpoint::Node(target),
                ));
                nodes[source].outputs.push(buffer);
                nodes[destination].inputs.push(injection);
                channel.taps.push(FeedbackTap {
                    origin,
                    buffer,
                    injection,
                });
            }
        }

        // Phase 3: synthetic boundary edges.
        let input_edges: Vec<EdgeId> = (0..self.inputs)
            .map(|position| {
                let id = push_edge(Edge::new(
                    1.0,
                    Endpoint::Input(position),
                    Endpoint::Node(NodeId::from(position)),
                ));
                nodes[position].inputs.push(id);
                id
            })
            .collect();
        let output_edges: Vec<EdgeId> = (0..self.outputs)
            .map(|position| {
                let index = first_output + position;
                let id = push_edge(Edge::new(
                    1.0,
                    Endpoint::Node(NodeId::from(index)),
                    Endpoint::Output(position),
                ));
                nodes[index].outputs.push(id);
                id
            })
            .collect();

        let network = Network {
            nodes,
            edges,
            channels: channels.into_values().collect(),
            levels: layering.levels(),
            input_edges,
            output_edges,
        };
        assert_eq!(network.nodes.len(), size, "NetworkBuilder::build: [3]");
        assert!(
            network
                .channels
                .iter()
                .enumerate()
                .all(|(index, channel)| channel.taps.iter().all(|tap| {
                    network.edges[tap.injection.index()].producer
                        == Endpoint::Channel(ChannelId::from(index))
                })),
            "NetworkBuilder::build: [4]"
        );
        debug!(
            nodes = network.nodes.len(),
            edges = network.edges.len(),
            channels = network.channels.len(),
            levels = network.levels.len(),
            "built network"
        );
        Ok(network)
    }
}
