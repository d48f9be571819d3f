use crate::matrix::AdjacencyMatrix;
use core::ops::Range;
use thiserror::Error;

/// Error kind for layerings that do not describe a valid concurrency
/// partition of a graph.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LayeringError {
    /// The layering covers a different number of nodes than the graph has.
    #[error("layering covers {layering} nodes but the graph has {graph}")]
    SizeMismatch { layering: usize, graph: usize },
    /// A boundary is smaller than its predecessor.
    #[error("boundary {boundary} at position {position} is smaller than the previous one")]
    Decreasing { position: usize, boundary: usize },
    /// The last boundary is not the last node.
    #[error("last boundary must be {expected}, got {actual:?}")]
    WrongTerminal {
        expected: usize,
        actual: Option<usize>,
    },
    /// Both endpoints of a forward edge fall into the same level.
    #[error("forward edge {from} -> {to} stays within one level")]
    DependencyWithinLevel { from: usize, to: usize },
}

/// Ordered partition of the nodes `0..N` into contiguous concurrency levels.
///
/// Stored as the sequence of inclusive level ends: boundaries `[b0, b1, ..]`
/// describe the levels `0..=b0`, `b0+1..=b1`, and so on, with the last
/// boundary equal to `N - 1`. Nodes inside one level have no forward
/// dependency on each other, so a level can run in parallel once every earlier
/// level has finished.
///
/// An empty graph is represented by the single degenerate boundary `[0]` and
/// has no levels.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layering {
    size: usize,
    boundaries: Vec<usize>,
}

impl Layering {
    /// Compute the levels of the forward (`i < j`) subgraph of `adjacency`.
    ///
    /// Nodes are visited in index order while keeping, for each node, the
    /// number of forward predecessors that are not yet part of a closed level.
    /// A node that still has such a predecessor depends on the open level, so
    /// the open level is closed right before it and its pending edges are
    /// committed. Backward edges are ignored.
    pub fn compute(adjacency: &AdjacencyMatrix) -> Self {
        let size = adjacency.size();
        if size == 0 {
            return Self::empty();
        }

        // Unresolved forward in-degree as of the last closed level.
        let mut committed: Vec<usize> = (0..size)
            .map(|node| (0..node).filter(|&source| adjacency[(source, node)]).count())
            .collect();
        // Unresolved forward in-degree including the open level.
        let mut tentative = committed.clone();
        let mut boundaries = vec![];

        for source in 0..size {
            if committed[source] > 0 {
                // The unresolved predecessor sits in the open level before
                // `source`, so the open level is non-empty.
                boundaries.push(source - 1);
                committed.clone_from(&tentative);
            }
            for destination in source + 1..size {
                if adjacency[(source, destination)] {
                    tentative[destination] -= 1;
                }
            }
        }
        boundaries.push(size - 1);

        Self { size, boundaries }
    }

    /// Use a caller-supplied boundary sequence.
    ///
    /// Repeated boundaries (zero-length levels) are collapsed. The result is not
    /// checked against any graph; see [`Layering::check`].
    ///
    /// # Errors
    /// If the sequence decreases or does not end at `size - 1`.
    pub fn from_boundaries(size: usize, mut boundaries: Vec<usize>) -> Result<Self, LayeringError> {
        if size == 0 {
            if boundaries.iter().all(|&boundary| boundary == 0) {
                return Ok(Self::empty());
            }
            return Err(LayeringError::WrongTerminal {
                expected: 0,
                actual: boundaries.last().copied(),
            });
        }
        if let Some(position) = boundaries.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(LayeringError::Decreasing {
                position: position + 1,
                boundary: boundaries[position + 1],
            });
        }
        if boundaries.last() != Some(&(size - 1)) {
            return Err(LayeringError::WrongTerminal {
                expected: size - 1,
                actual: boundaries.last().copied(),
            });
        }
        boundaries.dedup();
        Ok(Self { size, boundaries })
    }

    fn empty() -> Self {
        Self {
            size: 0,
            boundaries: vec![0],
        }
    }

    /// Verify that the layering partitions `adjacency` and that no forward
    /// edge has both endpoints in the same level.
    ///
    /// # Errors
    /// On the first violation found.
    pub fn check(&self, adjacency: &AdjacencyMatrix) -> Result<(), LayeringError> {
        if adjacency.size() != self.size {
            return Err(LayeringError::SizeMismatch {
                layering: self.size,
                graph: adjacency.size(),
            });
        }
        for level in self.levels() {
            for from in level.clone() {
                for to in from + 1..level.end {
                    if adjacency[(from, to)] {
                        return Err(LayeringError::DependencyWithinLevel { from, to });
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of nodes covered.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Inclusive level ends.
    #[must_use]
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.size == 0 { 0 } else { self.boundaries.len() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Half-open node ranges of every level, in execution order.
    #[must_use]
    pub fn levels(&self) -> Vec<Range<usize>> {
        if self.size == 0 {
            return vec![];
        }
        let mut start = 0;
        self.boundaries
            .iter()
            .map(|&boundary| {
                let level = start..boundary + 1;
                start = boundary + 1;
                level
            })
            .collect()
    }

    /// Level that contains `node`.
    #[must_use]
    pub fn level_of(&self, node: usize) -> Option<usize> {
        (node < self.size).then(|| self.boundaries.partition_point(|&boundary| boundary < node))
    }
}
