#![allow(missing_docs)]
#![cfg(feature = "loom")]

use csg::{
    config::NetworkConfig,
    evaluator::{EvaluateError, Evaluator},
    matrix::{AdjacencyMatrix, CostMatrix, GraphMatrices},
};

fn graph(thresholds: &[f64], edges: &[(usize, usize, f64)]) -> GraphMatrices {
    let size = thresholds.len();
    let mut adjacency = AdjacencyMatrix::filled(size, false);
    let mut costs = CostMatrix::filled(size, 0.0);
    for (node, &threshold) in thresholds.iter().enumerate() {
        costs[(node, node)] = threshold;
    }
    for &(from, to, weight) in edges {
        adjacency[(from, to)] = true;
        costs[(from, to)] = weight;
    }
    GraphMatrices::new(adjacency, costs).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() <= 1e-12, "{actual} != {expected}");
}

#[test]
fn loom_diamond_level_barrier() {
    loom::model(|| {
        // Graph:
        //   0     1
        //    \   /
        //      2
        //      |
        //      3
        // Levels: [0, 1], [2], [3]. Node 2 must observe both writes of the
        // first level.
        let matrices = graph(
            &[0.0, 0.0, 0.1, 0.0],
            &[(0, 2, 1.0), (1, 2, 2.0), (2, 3, 1.0)],
        );
        let evaluator = Evaluator::setup(matrices, &NetworkConfig::new(2, 1)).unwrap();
        assert_eq!(evaluator.network().levels().len(), 3);

        let (evaluator, outputs) = evaluator.evaluate(&[0.5, -0.25]);
        let outputs = outputs.unwrap();

        let first = 0.5f64.tanh();
        let second = (-0.25f64).tanh();
        let hidden = ((first + 2.0 * second) / 2.0 + 0.1).tanh();
        assert_close(outputs[0], hidden.tanh());
        let activations = evaluator.activations();
        assert_close(activations[2], hidden);
    });
}

#[test]
fn loom_feedback_flush_between_evaluations() {
    loom::model(|| {
        // Graph:
        //   0     1
        //    \   /
        //      2
        // plus the back-edge 2 -> 0 with weight 0.5.
        let matrices = graph(
            &[0.0, 0.0, 0.0],
            &[(0, 2, 1.0), (1, 2, 1.0), (2, 0, 0.5)],
        );
        let evaluator = Evaluator::setup(matrices, &NetworkConfig::new(2, 1)).unwrap();

        let (evaluator, first) = evaluator.evaluate(&[1.0, 1.0]);
        let first = first.unwrap();
        let node0 = (1.0f64 / 2.0).tanh();
        let node1 = 1.0f64.tanh();
        assert_close(first[0], ((node0 + node1) / 2.0).tanh());

        let (evaluator, rejected) = evaluator.evaluate(&[1.0]);
        assert_eq!(
            rejected,
            Err(EvaluateError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );

        let (_, second) = evaluator.evaluate(&[1.0, 1.0]);
        let second = second.unwrap();
        let node0 = ((0.5 * first[0] + 1.0) / 2.0).tanh();
        assert_close(second[0], ((node0 + node1) / 2.0).tanh());
    });
}
