use crate::{
    evaluator::EvaluateError,
    network::Network,
    sync::*,
    types::{EdgeSlot, NodeSlot, NodeState},
    utils::split_level,
};
use core::ops::Range;

/// # Safety
///
/// No thread may write `slot` concurrently with this call.
#[inline]
pub(super) unsafe fn load(slot: &EdgeSlot) -> f64 {
    // SAFETY: Upheld by the caller.
    unsafe { slot.get().with(|ptr| *ptr) }
}

/// # Safety
///
/// No thread may read or write `slot` concurrently with this call.
#[inline]
pub(super) unsafe fn store(slot: &EdgeSlot, value: f64) {
    // SAFETY: Upheld by the caller.
    unsafe { slot.get_mut().with(|ptr| *ptr = value) }
}

/// Fail unless `inputs` has one value per input-boundary node.
pub(super) fn validate(network: &Network, inputs: &[f64]) -> Result<(), EvaluateError> {
    let expected = network.num_inputs();
    if inputs.len() == expected {
        Ok(())
    } else {
        Err(EvaluateError::DimensionMismatch {
            expected,
            actual: inputs.len(),
        })
    }
}

/// Copy the value captured in every feedback buffer edge during the previous
/// evaluation into the matching injection edge.
///
/// # Safety
///
/// - `edge_values` must belong to `network`.
/// - No level may be running: the caller has exclusive logical access to all
///   edge slots.
pub(super) unsafe fn flush_feedback(network: &Network, edge_values: &[EdgeSlot]) {
    for channel in network.channels() {
        for tap in channel.taps() {
            // SAFETY: No concurrent access per the caller's contract; buffer and
            // injection are distinct slots.
            unsafe {
                let value = load(&edge_values[tap.buffer.index()]);
                store(&edge_values[tap.injection.index()], value);
            }
        }
    }
}

/// Write the external input vector into the input-boundary edges.
///
/// # Safety
///
/// Same as [`flush_feedback`]; additionally `inputs` has been validated.
pub(super) unsafe fn scatter_inputs(network: &Network, edge_values: &[EdgeSlot], inputs: &[f64]) {
    for (&edge, &value) in network.input_edges().iter().zip(inputs) {
        // SAFETY: No concurrent access per the caller's contract.
        unsafe { store(&edge_values[edge.index()], value) };
    }
}

/// Read the output-boundary edges into `outputs`, replacing its contents.
///
/// # Safety
///
/// Same as [`flush_feedback`].
pub(super) unsafe fn gather_outputs(
    network: &Network,
    edge_values: &[EdgeSlot],
    outputs: &mut Vec<f64>,
) {
    outputs.clear();
    outputs.extend(network.output_edges().iter().map(|&edge| {
        let weight = network.edges()[edge.index()].weight();
        // SAFETY: No concurrent access per the caller's contract.
        unsafe { load(&edge_values[edge.index()]) * weight }
    }));
}

/// Evaluate every node of `level` in parallel and return once all of them are
/// done.
///
/// # Safety
///
/// - `edge_values` and `node_states` must belong to `network`.
/// - `level` must be one of `network.levels()`, and every earlier level must
///   have completed, so that all input edges of its nodes hold their values
///   for this evaluation.
/// - No other thread may access the slots of this level's nodes or their
///   edges while the call runs.
pub(super) unsafe fn join_level(
    network: NetworkRef<'_>,
    edge_values: EdgeSlots<'_>,
    node_states: NodeSlots<'_>,
    level: Range<usize>,
) {
    match level.len() {
        0 => return,
        1 => {
            // SAFETY: `level.start` belongs to a ready level; no other task in
            // flight touches this node's state or edges.
            unsafe { fire(&network, &edge_values, &node_states, level.start) };
            return;
        }
        _ => {}
    }

    let (left_range, right_range) = split_level(level);
    // Copies of the borrows, or `Arc` clones under `loom`.
    let (rhs_network, rhs_edge_values, rhs_node_states) = (
        <NetworkRef<'_> as Clone>::clone(&network),
        <EdgeSlots<'_> as Clone>::clone(&edge_values),
        <NodeSlots<'_> as Clone>::clone(&node_states),
    );
    // SAFETY: The two halves hold disjoint node sets of the same level. No node
    // of a level reads an edge written by another node of the level, and every
    // edge has a single producer, so the halves touch disjoint slots.
    unsafe {
        join(
            || join_level(network, edge_values, node_states, left_range),
            || join_level(rhs_network, rhs_edge_values, rhs_node_states, right_range),
        );
    }
}

/// Accumulate the weighted inputs of node `index`, activate it and publish the
/// result on all of its output edges.
///
/// # Safety
///
/// - All input edges of the node hold their values for this evaluation and
///   are not written concurrently.
/// - No other thread accesses the node's state slot or output edges.
unsafe fn fire(network: &Network, edge_values: &[EdgeSlot], node_states: &[NodeSlot], index: usize) {
    let node = &network.nodes()[index];
    let edges = network.edges();

    let mut accumulated = 0.0;
    for &edge in node.inputs() {
        // SAFETY: Input edges are written only by earlier levels, scatter or
        // flush, all of which happen-before this call.
        accumulated += unsafe { load(&edge_values[edge.index()]) } * edges[edge.index()].weight();
    }
    let activated = node.activate(accumulated);

    // SAFETY: This task is the only producer of the node's output edges and the
    // only writer of its state; consumers run in later levels or after the
    // evaluation.
    unsafe {
        node_states[index].get_mut().with(|ptr| {
            *ptr = NodeState {
                accumulated,
                activated,
            };
        });
        for &edge in node.outputs() {
            store(&edge_values[edge.index()], activated);
        }
    }
}
