use core::num::NonZeroUsize;

/// Ordering of the feedback flush relative to input validation at the start
/// of an evaluation call.
///
/// A flush copies every feedback buffer edge into its injection edge and is
/// idempotent, so the outputs of later successful calls are the same under
/// both orders. The orders differ only in the edge values left behind by a
/// rejected call, as reported by `Evaluator::edge_values`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FlushOrder {
    /// Reject a wrongly sized input vector before touching any runtime state.
    /// A failed call leaves the network exactly as it was.
    #[default]
    ValidateFirst,
    /// Flush feedback channels first and validate afterwards. A failed call
    /// still moves the buffered feedback into the destination edges.
    FlushFirst,
}

/// Construction parameters of a network and its evaluator.
///
/// The first `inputs` nodes of the adjacency matrix are input-boundary nodes and
/// the last `outputs` nodes are output-boundary nodes.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Number of leading input-boundary nodes.
    pub inputs: usize,
    /// Number of trailing output-boundary nodes.
    pub outputs: usize,
    /// Prune structurally inert interior nodes before construction.
    pub simplify: bool,
    /// Size of a dedicated worker pool. `None` runs levels on the global
    /// `rayon` pool.
    pub threads: Option<NonZeroUsize>,
    pub flush_order: FlushOrder,
}

impl NetworkConfig {
    /// Default configuration for the given boundary sizes.
    pub const fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            simplify: true,
            threads: None,
            flush_order: FlushOrder::ValidateFirst,
        }
    }

    /// Evaluate on a dedicated pool of `threads` workers.
    pub const fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Keep every node of the input graph, including inert ones.
    pub const fn without_simplification(mut self) -> Self {
        self.simplify = false;
        self
    }

    pub const fn with_flush_order(mut self, flush_order: FlushOrder) -> Self {
        self.flush_order = flush_order;
        self
    }
}
