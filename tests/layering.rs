#![allow(missing_docs)]

use csg::{
    layering::{Layering, LayeringError},
    matrix::{AdjacencyMatrix, SquareMatrix},
};

fn adjacency(size: usize, edges: &[(usize, usize)]) -> AdjacencyMatrix {
    let mut adjacency = AdjacencyMatrix::filled(size, false);
    for &edge in edges {
        adjacency[edge] = true;
    }
    adjacency
}

/// Forward edges of the nine-node reference graph.
const NINE_NODE_EDGES: [(usize, usize); 13] = [
    (0, 3),
    (1, 3),
    (1, 4),
    (2, 5),
    (2, 8),
    (3, 4),
    (3, 6),
    (4, 6),
    (5, 6),
    (5, 7),
    (5, 8),
    (6, 7),
    (6, 8),
];

fn assert_valid(layering: &Layering, adjacency: &AdjacencyMatrix) {
    let size = adjacency.size();
    let boundaries = layering.boundaries();
    assert!(boundaries.windows(2).all(|pair| pair[0] <= pair[1]));
    if size > 0 {
        assert_eq!(boundaries.last(), Some(&(size - 1)));
    }
    layering.check(adjacency).unwrap();
    for from in 0..size {
        for to in from + 1..size {
            if adjacency[(from, to)] {
                let (from_level, to_level) = (layering.level_of(from), layering.level_of(to));
                assert!(from_level < to_level, "{from} -> {to}");
            }
        }
    }
}

#[test]
fn empty_graph_has_a_degenerate_boundary() {
    let layering = Layering::compute(&adjacency(0, &[]));
    assert_eq!(layering.boundaries(), &[0]);
    assert!(layering.levels().is_empty());
    assert!(layering.is_empty());
}

#[test]
fn graph_without_forward_edges_is_one_level() {
    // Back-edges do not split levels.
    let graph = adjacency(4, &[(3, 0), (2, 1)]);
    let layering = Layering::compute(&graph);
    assert_eq!(layering.boundaries(), &[3]);
    assert_eq!(layering.levels(), vec![0..4]);
    assert_valid(&layering, &graph);
}

#[test]
fn chain_gets_one_level_per_node() {
    let graph = adjacency(4, &[(0, 1), (1, 2), (2, 3)]);
    let layering = Layering::compute(&graph);
    assert_eq!(layering.boundaries(), &[0, 1, 2, 3]);
    assert_valid(&layering, &graph);
}

#[test]
fn closes_level_for_nodes_without_successors() {
    // Node 1 has no outgoing edge but still depends on 0.
    let graph = adjacency(2, &[(0, 1)]);
    let layering = Layering::compute(&graph);
    assert_eq!(layering.levels(), vec![0..1, 1..2]);
    assert_valid(&layering, &graph);
}

#[test]
fn nine_node_graph_is_partitioned_validly() {
    let graph = adjacency(9, &NINE_NODE_EDGES);
    let layering = Layering::compute(&graph);
    assert_valid(&layering, &graph);
    // Every node is covered exactly once.
    let covered: Vec<usize> = layering.levels().into_iter().flatten().collect();
    assert_eq!(covered, (0..9).collect::<Vec<_>>());
    assert_eq!(layering.boundaries(), &[2, 3, 5, 6, 8]);
    assert_eq!(layering.levels(), vec![0..3, 3..4, 4..6, 6..7, 7..9]);
    // The three sources share the first level.
    assert_eq!(layering.level_of(0), Some(0));
    assert_eq!(layering.level_of(2), Some(0));
    assert_eq!(layering.level_of(9), None);
}

#[test]
fn diagonal_is_ignored() {
    let graph = SquareMatrix::from_rows(vec![vec![true, false], vec![false, true]]).unwrap();
    let layering = Layering::compute(&graph);
    assert_eq!(layering.boundaries(), &[1]);
}

#[test]
fn from_boundaries_collapses_zero_length_levels() {
    let layering = Layering::from_boundaries(5, vec![1, 1, 3, 4, 4]).unwrap();
    assert_eq!(layering.boundaries(), &[1, 3, 4]);
    assert_eq!(layering.levels(), vec![0..2, 2..4, 4..5]);
}

#[test]
fn from_boundaries_rejects_malformed_sequences() {
    assert_eq!(
        Layering::from_boundaries(5, vec![2, 1, 4]).unwrap_err(),
        LayeringError::Decreasing {
            position: 1,
            boundary: 1
        }
    );
    assert_eq!(
        Layering::from_boundaries(5, vec![1, 3]).unwrap_err(),
        LayeringError::WrongTerminal {
            expected: 4,
            actual: Some(3)
        }
    );
    assert_eq!(
        Layering::from_boundaries(5, vec![]).unwrap_err(),
        LayeringError::WrongTerminal {
            expected: 4,
            actual: None
        }
    );
    assert!(Layering::from_boundaries(0, vec![]).is_ok());
}

#[test]
fn check_rejects_dependency_within_level() {
    let graph = adjacency(4, &[(0, 2), (1, 3)]);
    let layering = Layering::from_boundaries(4, vec![1, 3]).unwrap();
    layering.check(&graph).unwrap();

    let layering = Layering::from_boundaries(4, vec![0, 3]).unwrap();
    assert_eq!(
        layering.check(&graph).unwrap_err(),
        LayeringError::DependencyWithinLevel { from: 1, to: 3 }
    );
    assert_eq!(
        layering.check(&adjacency(3, &[])).unwrap_err(),
        LayeringError::SizeMismatch {
            layering: 4,
            graph: 3
        }
    );
}
