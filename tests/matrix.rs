#![allow(missing_docs)]

use csg::matrix::{AdjacencyMatrix, CostMatrix, GraphMatrices, MatrixError, SquareMatrix};

#[test]
fn from_rows_rejects_ragged_input() {
    let err = SquareMatrix::from_rows(vec![vec![true, false], vec![true]]).unwrap_err();
    assert_eq!(
        err,
        MatrixError::NotSquare {
            row: 1,
            len: 1,
            size: 2
        }
    );
}

#[test]
fn graph_matrices_reject_size_mismatch() {
    let adjacency = AdjacencyMatrix::filled(3, false);
    let costs = CostMatrix::filled(2, 0.0);
    assert_eq!(
        GraphMatrices::new(adjacency, costs).unwrap_err(),
        MatrixError::SizeMismatch {
            adjacency: 3,
            costs: 2
        }
    );
}

#[test]
fn counts_forward_and_feedback_edges() {
    let adjacency = SquareMatrix::from_rows(vec![
        vec![true, true, true],
        vec![false, false, true],
        vec![true, true, false],
    ])
    .unwrap();
    let matrices = GraphMatrices::new(adjacency, CostMatrix::filled(3, 0.5)).unwrap();
    // The diagonal entry (0, 0) is neither.
    assert_eq!(matrices.forward_edge_count(), 3);
    assert_eq!(matrices.feedback_edge_count(), 2);
}

#[test]
fn parses_text_layout() {
    let text = "3\n\
                0 1 0\n\
                0 0 1\n\
                1 0 0\n\
                0.5 2 0\n\
                0 -1 0.25\n\
                3 0 1e-3\n";
    let matrices: GraphMatrices = text.parse().unwrap();
    assert_eq!(matrices.len(), 3);
    assert!(matrices.adjacency()[(0, 1)]);
    assert!(matrices.adjacency()[(2, 0)]);
    assert!(!matrices.adjacency()[(1, 0)]);
    assert_eq!(matrices.costs()[(0, 0)], 0.5);
    assert_eq!(matrices.costs()[(0, 1)], 2.0);
    assert_eq!(matrices.costs()[(1, 2)], 0.25);
    assert_eq!(matrices.costs()[(2, 2)], 1e-3);
}

#[test]
fn text_layout_round_trips() {
    let adjacency = SquareMatrix::from_rows(vec![
        vec![false, true, true, false],
        vec![false, false, true, true],
        vec![false, true, false, true],
        vec![true, false, false, false],
    ])
    .unwrap();
    let costs = SquareMatrix::from_rows(vec![
        vec![0.1, -0.7, 1.0 / 3.0, 0.0],
        vec![0.0, -2.5, 0.125, 7.0],
        vec![0.0, 0.3, 0.0, 1e-12],
        vec![4.0, 0.0, 0.0, -0.0],
    ])
    .unwrap();
    let matrices = GraphMatrices::new(adjacency, costs).unwrap();
    let parsed: GraphMatrices = matrices.to_string().parse().unwrap();
    assert_eq!(parsed, matrices);
}

#[test]
fn reports_malformed_text() {
    assert_eq!(
        "".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::UnexpectedEnd {
            expected: "node count"
        }
    );
    assert_eq!(
        "2 0 1 1".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::UnexpectedEnd {
            expected: "adjacency block"
        }
    );
    assert_eq!(
        "1 2 0".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::InvalidToken {
            token: "2".to_owned(),
            position: 1
        }
    );
    assert_eq!(
        "1 1 x".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::InvalidToken {
            token: "x".to_owned(),
            position: 2
        }
    );
    assert_eq!(
        "1 0 0.5 9".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::TrailingData { position: 3 }
    );
}

#[test]
fn node_count_must_be_backed_by_cells() {
    for text in ["4000000000", "100000", "100000 0 1"] {
        assert_eq!(
            text.parse::<GraphMatrices>().unwrap_err(),
            MatrixError::UnexpectedEnd {
                expected: "adjacency block"
            },
            "{text}"
        );
    }
    assert_eq!(
        "2 0 1 1 0 0.5".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::UnexpectedEnd {
            expected: "cost block"
        }
    );
    assert_eq!(
        "-1".parse::<GraphMatrices>().unwrap_err(),
        MatrixError::InvalidToken {
            token: "-1".to_owned(),
            position: 0
        }
    );
}

#[test]
fn empty_graph_round_trips() {
    let matrices: GraphMatrices = "0".parse().unwrap();
    assert!(matrices.is_empty());
    assert_eq!(matrices.to_string(), "0\n");
}
