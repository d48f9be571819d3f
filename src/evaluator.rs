mod execute;

use crate::{
    config::{FlushOrder, NetworkConfig},
    evaluator::execute::{
        flush_feedback, gather_outputs, join_level, scatter_inputs, store, validate,
    },
    layering::Layering,
    matrix::GraphMatrices,
    network::{BuildError, Network, NetworkBuilder},
    simplify::{GraphSimplifier, Simplified},
    sync::*,
    types::{EdgeSlot, NodeId, NodeSlot, NodeState},
};
use derive_more::Debug;
use thiserror::Error;
use tracing::{debug, trace};

/// Error kind for a failed evaluation call.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvaluateError {
    /// The input vector does not have one value per input-boundary node.
    #[error("expected {expected} input values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Runs a built [`Network`] level by level.
///
/// One evaluation call:
/// 1. checks the input vector length and flushes every feedback channel, in
///    the order given by [`FlushOrder`];
/// 2. writes the input vector into the input-boundary edges;
/// 3. evaluates the levels in order, the nodes of one level in parallel, with
///    a join barrier between levels;
/// 4. reads the output-boundary edges into the result.
///
/// Values produced on back-edges during one call reach their destination only
/// in the next call, so a network with feedback is a discrete-time stateful
/// system while a network without it is a pure function of its input.
///
/// The evaluator owns all runtime state. Independent evaluators may run
/// concurrently; a single one is serialized by `&mut self`.
#[must_use]
#[derive(Debug)]
pub struct Evaluator {
    network: Network,
    edge_values: Vec<EdgeSlot>,
    node_states: Vec<NodeSlot>,
    /// Original (pre-simplification) index of every node.
    origins: Vec<usize>,
    flush_order: FlushOrder,
    #[cfg(not(feature = "loom"))]
    #[debug(skip)]
    pool: Option<rayon::ThreadPool>,
}

impl Evaluator {
    /// Run the whole construction pipeline:
    /// simplification (unless disabled), layering, network building.
    ///
    /// # Errors
    /// If the boundary ranges do not fit into the graph or the worker pool
    /// cannot be started.
    pub fn setup(matrices: GraphMatrices, config: &NetworkConfig) -> Result<Self, BuildError> {
        let builder = NetworkBuilder::new(config.inputs, config.outputs);
        builder.check_boundaries(matrices.len())?;

        let simplified = if config.simplify {
            GraphSimplifier::new(config.inputs, config.outputs).simplify(matrices)
        } else {
            Simplified::unchanged(matrices)
        };
        let layering = Layering::compute(simplified.matrices().adjacency());
        let network = builder.build(simplified.matrices(), &layering)?;
        let (_, origins) = simplified.into_parts();

        let mut evaluator = Self::from_network(network, config)?;
        evaluator.origins = origins;
        Ok(evaluator)
    }

    /// Wrap a prebuilt network. Only the runtime parts of `config`
    /// (`threads`, `flush_order`) are used.
    ///
    /// # Errors
    /// If the worker pool cannot be started.
    pub fn from_network(network: Network, config: &NetworkConfig) -> Result<Self, BuildError> {
        #[cfg(not(feature = "loom"))]
        let pool = config
            .threads
            .map(|threads| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.get())
                    .thread_name(|index| format!("csg-worker-{index}"))
                    .build()
                    .map_err(|err| BuildError::WorkerPool(err.to_string()))
            })
            .transpose()?;

        let edge_values = network.edges().iter().map(|_| EdgeSlot::new(0.0)).collect();
        let node_states = network
            .nodes()
            .iter()
            .map(|_| NodeSlot::new(NodeState::default()))
            .collect();
        debug!(
            nodes = network.len(),
            threads = config.threads.map(|threads| threads.get()),
            "evaluator ready"
        );
        Ok(Self {
            origins: (0..network.len()).collect(),
            network,
            edge_values,
            node_states,
            flush_order: config.flush_order,
            #[cfg(not(feature = "loom"))]
            pool,
        })
    }

    pub const fn network(&self) -> &Network {
        &self.network
    }

    /// Index `node` had in the matrices given to [`Evaluator::setup`].
    #[must_use]
    pub fn original_index(&self, node: NodeId) -> Option<usize> {
        self.origins.get(node.index()).copied()
    }

    /// Activation of every node after the last evaluation.
    #[must_use]
    pub fn activations(&self) -> Vec<f64> {
        self.states().map(|state| state.activated).collect()
    }

    /// Weighted input sum of every node after the last evaluation.
    #[must_use]
    pub fn accumulations(&self) -> Vec<f64> {
        self.states().map(|state| state.accumulated).collect()
    }

    /// Stored (unweighted) value of every edge, indexed by
    /// [`EdgeId`](crate::types::EdgeId). Feedback buffer and injection edges
    /// are included, so the pending feedback of the next call is visible here.
    #[must_use]
    pub fn edge_values(&self) -> Vec<f64> {
        self.edge_values
            .iter()
            // SAFETY: Evaluation requires `&mut self`, so no level runs while
            // `self` is borrowed.
            .map(|slot| unsafe { slot.get().with(|ptr| *ptr) })
            .collect()
    }

    fn states(&self) -> impl Iterator<Item = NodeState> + '_ {
        self.node_states.iter().map(|slot| {
            // SAFETY: Evaluation requires `&mut self`, so no level runs while
            // `self` is borrowed.
            unsafe { slot.get().with(|ptr| *ptr) }
        })
    }

    /// Zero every edge value, feedback buffer and node state, as if the
    /// network had just been built.
    pub fn reset(&mut self) {
        for slot in &self.edge_values {
            // SAFETY: Exclusive borrow; no level is running.
            unsafe { store(slot, 0.0) };
        }
        for slot in &self.node_states {
            // SAFETY: Exclusive borrow; no level is running.
            unsafe { slot.get_mut().with(|ptr| *ptr = NodeState::default()) };
        }
    }

    /// Validate, flush and scatter. Nothing is written if validation fails
    /// under [`FlushOrder::ValidateFirst`].
    fn prepare(
        network: &Network,
        edge_values: &[EdgeSlot],
        flush_order: FlushOrder,
        inputs: &[f64],
    ) -> Result<(), EvaluateError> {
        trace!(inputs = inputs.len(), ?flush_order, "evaluating network");
        let result = match flush_order {
            FlushOrder::ValidateFirst => validate(network, inputs).map(|()| {
                // SAFETY: Called only between evaluations with exclusive access.
                unsafe { flush_feedback(network, edge_values) };
            }),
            FlushOrder::FlushFirst => {
                // SAFETY: Called only between evaluations with exclusive access.
                unsafe { flush_feedback(network, edge_values) };
                validate(network, inputs)
            }
        };
        if let Err(err) = &result {
            debug!(%err, "rejected input vector");
        }
        result?;
        // SAFETY: Called only between evaluations with exclusive access;
        // `inputs` has been validated.
        unsafe { scatter_inputs(network, edge_values, inputs) };
        Ok(())
    }

    /// Evaluate the network once and return the output vector.
    ///
    /// # Errors
    /// If `inputs.len()` differs from the number of input-boundary nodes.
    #[cfg(not(feature = "loom"))]
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, EvaluateError> {
        let mut outputs = Vec::with_capacity(self.network.num_outputs());
        self.evaluate_into(inputs, &mut outputs)?;
        Ok(outputs)
    }

    /// Evaluate the network once, writing the output vector into `outputs`.
    /// `outputs` is left untouched on failure.
    ///
    /// # Errors
    /// If `inputs.len()` differs from the number of input-boundary nodes.
    #[cfg(not(feature = "loom"))]
    pub fn evaluate_into(
        &mut self,
        inputs: &[f64],
        outputs: &mut Vec<f64>,
    ) -> Result<(), EvaluateError> {
        let Self {
            network,
            edge_values,
            node_states,
            origins: _,
            flush_order,
            pool,
        } = self;
        Self::prepare(network, edge_values, *flush_order, inputs)?;

        let network: &Network = network;
        let edge_values: &[EdgeSlot] = edge_values;
        let node_states: &[NodeSlot] = node_states;
        let run_levels = || {
            for level in network.levels() {
                // SAFETY: Levels run in order and each call returns only after
                // all nodes of the level are done, so every earlier level has
                // completed. Slots belong to `network` and `&mut self` rules out
                // any other access.
                unsafe { join_level(network, edge_values, node_states, level.clone()) };
            }
        };
        match pool {
            Some(pool) => pool.install(run_levels),
            None => run_levels(),
        }

        // SAFETY: All levels have joined.
        unsafe { gather_outputs(network, edge_values, outputs) };
        Ok(())
    }

    /// Loom-testable version of `evaluate`.
    #[cfg(feature = "loom")]
    pub fn evaluate(self, inputs: &[f64]) -> (Self, Result<Vec<f64>, EvaluateError>) {
        let Self {
            network,
            edge_values,
            node_states,
            origins,
            flush_order,
        } = self;
        if let Err(err) = Self::prepare(&network, &edge_values, flush_order, inputs) {
            let this = Self {
                network,
                edge_values,
                node_states,
                origins,
                flush_order,
            };
            return (this, Err(err));
        }

        let network = Arc::new(network);
        let edge_values = Arc::new(edge_values);
        let node_states = Arc::new(node_states);
        for index in 0..network.levels().len() {
            let level = network.levels()[index].clone();
            // SAFETY: Levels run in order and each call returns only after all of
            // its threads joined; the `Arc`-backed slots belong to `network`.
            unsafe {
                join_level(
                    Arc::clone(&network),
                    Arc::clone(&edge_values),
                    Arc::clone(&node_states),
                    level,
                );
            }
        }

        let network = Arc::into_inner(network).unwrap();
        let edge_values = Arc::into_inner(edge_values).unwrap();
        let node_states = Arc::into_inner(node_states).unwrap();

        let mut outputs = Vec::with_capacity(network.num_outputs());
        // SAFETY: All levels have joined.
        unsafe { gather_outputs(&network, &edge_values, &mut outputs) };
        let this = Self {
            network,
            edge_values,
            node_states,
            origins,
            flush_order,
        };
        (this, Ok(outputs))
    }
}
