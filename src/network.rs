mod build;

/// Builder of the runtime graph, and the error returned when the matrices,
/// boundary sizes or layering cannot describe a network.
pub use crate::network::build::{BuildError, NetworkBuilder};
use crate::types::{ChannelId, EdgeId, NodeId};
use core::ops::Range;

/// Role of a node in the network.
///
/// Both kinds activate with the same rule; a node with no input edges
/// contributes zero net input and activates to `tanh(threshold)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Any node that is not among the trailing output-boundary nodes, including
    /// the input-boundary nodes.
    Interior,
    /// One of the trailing output-boundary nodes.
    OutputBoundary,
}

/// A node of the runtime graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    threshold: f64,
    inputs: Vec<EdgeId>,
    outputs: Vec<EdgeId>,
}

impl Node {
    pub(crate) const fn new(kind: NodeKind, threshold: f64) -> Self {
        Self {
            kind,
            threshold,
            inputs: vec![],
            outputs: vec![],
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Additive bias applied before the nonlinearity.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Incoming edges in wiring order: forward edges, then feedback injection
    /// edges, then the external input edge.
    #[must_use]
    pub fn inputs(&self) -> &[EdgeId] {
        &self.inputs
    }

    /// Outgoing edges in wiring order: forward edges, then feedback buffer
    /// edges, then the external output edge.
    #[must_use]
    pub fn outputs(&self) -> &[EdgeId] {
        &self.outputs
    }

    #[must_use]
    pub fn input_degree(&self) -> usize {
        self.inputs.len()
    }

    /// `tanh(accumulated / input_degree + threshold)`, where the mean input of a
    /// node without input edges is zero.
    #[must_use]
    #[inline]
    pub fn activate(&self, accumulated: f64) -> f64 {
        let mean = match self.inputs.len() {
            0 => 0.0,
            degree => accumulated / degree as f64,
        };
        (mean + self.threshold).tanh()
    }
}

/// One end of an edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Node(NodeId),
    /// Position in the external input vector.
    Input(usize),
    /// Position in the external output vector.
    Output(usize),
    Channel(ChannelId),
}

/// Directed weighted carrier between two endpoints. The value read from an
/// edge is its stored value multiplied by its weight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    weight: f64,
    producer: Endpoint,
    consumer: Endpoint,
}

impl Edge {
    pub(crate) const fn new(weight: f64, producer: Endpoint, consumer: Endpoint) -> Self {
        Self {
            weight,
            producer,
            consumer,
        }
    }

    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub const fn producer(&self) -> Endpoint {
        self.producer
    }

    #[must_use]
    pub const fn consumer(&self) -> Endpoint {
        self.consumer
    }
}

/// A single back-edge routed through a [`FeedbackChannel`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FeedbackTap {
    /// Node that produces the fed-back value.
    pub origin: NodeId,
    /// Edge `origin -> channel` written during evaluation, weight 1.
    pub buffer: EdgeId,
    /// Edge `channel -> destination` carrying the back-edge weight, read during
    /// evaluation and written only by a flush.
    pub injection: EdgeId,
}

/// Aggregates every back-edge ending in one destination node.
///
/// Values captured in the buffer edges during one evaluation reach the
/// destination only when the channel is flushed at the start of the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackChannel {
    destination: NodeId,
    taps: Vec<FeedbackTap>,
}

impl FeedbackChannel {
    pub(crate) const fn new(destination: NodeId) -> Self {
        Self {
            destination,
            taps: vec![],
        }
    }

    #[must_use]
    pub const fn destination(&self) -> NodeId {
        self.destination
    }

    /// One tap per origin, in origin order.
    #[must_use]
    pub fn taps(&self) -> &[FeedbackTap] {
        &self.taps
    }
}

/// Immutable topology of a built network: arenas of nodes, edges and feedback
/// channels addressed by handles, plus the concurrency levels.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    channels: Vec<FeedbackChannel>,
    levels: Vec<Range<usize>>,
    input_edges: Vec<EdgeId>,
    output_edges: Vec<EdgeId>,
}

impl Network {
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Feedback channels ordered by first appearance of their destination while
    /// scanning back-edges by origin.
    #[must_use]
    pub fn channels(&self) -> &[FeedbackChannel] {
        &self.channels
    }

    /// Half-open node ranges evaluated one after another; nodes within a range
    /// are evaluated in parallel.
    #[must_use]
    pub fn levels(&self) -> &[Range<usize>] {
        &self.levels
    }

    /// Edges fed from the external input vector, one per input-boundary node.
    #[must_use]
    pub fn input_edges(&self) -> &[EdgeId] {
        &self.input_edges
    }

    /// Edges read into the external output vector, one per output-boundary node.
    #[must_use]
    pub fn output_edges(&self) -> &[EdgeId] {
        &self.output_edges
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.input_edges.len()
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.output_edges.len()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
