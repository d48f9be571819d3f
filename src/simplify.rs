use crate::{
    matrix::GraphMatrices,
    types::IndexSet,
    utils::shift_after_removal,
};
use core::ops::Range;
use tracing::{debug, info};

/// Prunes interior nodes that can never carry a signal from an input to an
/// output.
///
/// Two removal rules are alternated until the graph stops shrinking:
/// - an interior node without a forward predecessor (no edge from a lower
///   index) is unreachable from the inputs;
/// - an interior node without a forward successor (no edge to a higher index)
///   is a dead end.
///
/// Feedback edges never make a node reachable or live, since they only carry
/// the previous cycle's value into a node that must already be evaluated in
/// forward order. Boundary nodes are never removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GraphSimplifier {
    inputs: usize,
    outputs: usize,
}

/// Output of [`GraphSimplifier::simplify`].
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Simplified {
    matrices: GraphMatrices,
    /// `retained[i]` is the index node `i` had in the unsimplified graph.
    retained: Vec<usize>,
}

impl Simplified {
    /// Wrap matrices that are taken as they are.
    pub fn unchanged(matrices: GraphMatrices) -> Self {
        let retained = (0..matrices.len()).collect();
        Self { matrices, retained }
    }

    #[must_use]
    pub const fn matrices(&self) -> &GraphMatrices {
        &self.matrices
    }

    /// Original index of every surviving node, in order.
    #[must_use]
    pub fn retained(&self) -> &[usize] {
        &self.retained
    }

    #[must_use]
    pub fn into_parts(self) -> (GraphMatrices, Vec<usize>) {
        (self.matrices, self.retained)
    }

    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.matrices.len()
    }

    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    fn remove(&mut self, index: usize) -> usize {
        self.matrices.remove_node(index);
        self.retained.remove(index)
    }
}

impl GraphSimplifier {
    #[must_use]
    pub const fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }

    /// Remove unreachable and dead-end interior nodes to a fixed point.
    ///
    /// If the boundary ranges cover the whole graph (`inputs + outputs >= N`)
    /// there is nothing to prune and the matrices are returned unchanged.
    pub fn simplify(&self, matrices: GraphMatrices) -> Simplified {
        let mut graph = Simplified::unchanged(matrices);
        let initial = graph.len();
        loop {
            let before = graph.len();
            self.remove_unreachable(&mut graph);
            self.remove_dead_ends(&mut graph);
            if graph.len() == before {
                break;
            }
        }
        if graph.len() != initial {
            info!(
                before = initial,
                after = graph.len(),
                "pruned inert interior nodes"
            );
        }
        graph
    }

    /// Interior (prunable) index range of a graph with `size` nodes.
    fn interior(&self, size: usize) -> Range<usize> {
        self.inputs..size.saturating_sub(self.outputs)
    }

    fn remove_unreachable(&self, graph: &mut Simplified) {
        let mut worklist: IndexSet<usize> = self.interior(graph.len()).collect();
        while let Some(node) = worklist.pop() {
            let adjacency = graph.matrices.adjacency();
            if (0..node).any(|source| adjacency[(source, node)]) {
                continue;
            }
            let fed: Vec<usize> = (0..graph.len())
                .filter(|&destination| destination != node && adjacency[(node, destination)])
                .collect();
            let original = graph.remove(node);
            debug!(node = original, "removed unreachable node");
            worklist = self.requeue(worklist, fed, node, graph.len());
        }
    }

    fn remove_dead_ends(&self, graph: &mut Simplified) {
        let mut worklist: IndexSet<usize> = self.interior(graph.len()).collect();
        while let Some(node) = worklist.pop() {
            let adjacency = graph.matrices.adjacency();
            if (node + 1..graph.len()).any(|destination| adjacency[(node, destination)]) {
                continue;
            }
            let feeding: Vec<usize> = (0..graph.len())
                .filter(|&source| source != node && adjacency[(source, node)])
                .collect();
            let original = graph.remove(node);
            debug!(node = original, "removed dead-end node");
            worklist = self.requeue(worklist, feeding, node, graph.len());
        }
    }

    /// Re-index the pending candidates after `removed` was deleted and add the
    /// former neighbours of `removed` that are still prunable.
    fn requeue(
        &self,
        worklist: IndexSet<usize>,
        neighbours: Vec<usize>,
        removed: usize,
        size: usize,
    ) -> IndexSet<usize> {
        let interior = self.interior(size);
        worklist
            .into_iter()
            .chain(neighbours)
            .map(|index| shift_after_removal(index, removed))
            .filter(|index| interior.contains(index))
            .collect()
    }
}
