//! Level-parallel evaluator for fixed-topology weighted signal graphs with
//! forward and feedback connections.
//!
//! A graph is given as an `N`x`N` adjacency matrix and an index-aligned cost
//! matrix. The first `inputs` nodes are input-boundary nodes, the last
//! `outputs` nodes are output-boundary nodes. Edges `i -> j` with `i < j` are
//! forward edges and form a DAG; edges with `i > j` are feedback edges whose
//! values are delayed by one evaluation.
//!
//! Construction is a one-directional pipeline:
//! - `simplify`: prunes interior nodes that are unreachable from the inputs or
//!   cannot reach the outputs;
//! - `layering`: partitions the nodes into contiguous concurrency levels so
//!   that no forward edge stays within a level;
//! - `network`: materializes node, edge and feedback-channel arenas addressed
//!   by integer handles;
//! - `evaluator`: flushes feedback, scatters inputs, evaluates the levels
//!   in order (each level fork-join parallel) and gathers outputs.
//!
//! Every node computes `tanh(sum(inputs) / input_degree + threshold)`, with a
//! zero mean input for nodes that have no input edges.
//!
//! Quick start:
//! 1. Build `GraphMatrices` from an adjacency and a cost matrix (or parse the
//!    whitespace-delimited text layout).
//! 2. Call `Evaluator::setup` with a `NetworkConfig`.
//! 3. Call `Evaluator::evaluate` once per time step.

/// Construction and runtime parameters.
pub mod config;
/// The concurrent level-by-level evaluator.
///
/// Owns the runtime state of a network (edge values, feedback buffers, node
/// states) and runs levels with `rayon` fork-join parallelism.
pub mod evaluator;
/// Ordered partition of nodes into levels safely evaluable in parallel.
pub mod layering;
/// Square matrices describing a graph, and their text layout.
pub mod matrix;
/// Runtime graph data model and its builder.
pub mod network;
/// Structural pruning of inert interior nodes.
pub mod simplify;
mod sync;
/// Node, edge and channel handles.
pub mod types;
mod utils;

pub use crate::{
    config::{FlushOrder, NetworkConfig},
    evaluator::{EvaluateError, Evaluator},
    layering::{Layering, LayeringError},
    matrix::{AdjacencyMatrix, CostMatrix, GraphMatrices, MatrixError, SquareMatrix},
    network::{BuildError, Network, NetworkBuilder},
    simplify::{GraphSimplifier, Simplified},
    types::{ChannelId, EdgeId, NodeId},
};
