use crate::sync::UnsafeCell;
use derive_more::{Deref, DerefMut, Display, From};
use indexmap::{IndexMap as _IndexMap, IndexSet as _IndexSet};
use rustc_hash::FxBuildHasher;

/// A minimal `UnsafeCell` wrapper that is `Sync` when `T: Sync`.
///
/// Used internally by the evaluator to hold edge values and node states that
/// are written from worker threads. Correctness is ensured by the level
/// schedule: within one level every slot has at most one writer and no reader
/// that could observe the write before the level barrier.
#[derive(Debug, Deref, DerefMut)]
#[repr(transparent)]
pub(crate) struct SyncUnsafeCell<T>(UnsafeCell<T>);

// SAFETY: Every access goes through an `unsafe` evaluator routine whose
// contract rules out a concurrent writer on the same slot.
unsafe impl<T: Sync> Sync for SyncUnsafeCell<T> {}

impl<T> SyncUnsafeCell<T> {
    pub(crate) fn new(val: T) -> Self {
        Self(UnsafeCell::new(val))
    }
}

/// Stable handle of a node in the network arena.
///
/// Node handles are dense: they coincide with the node's index in the
/// (simplified) adjacency matrix.
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("node#{_0}")]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Stable handle of an edge in the network arena.
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("edge#{_0}")]
#[repr(transparent)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Position of the edge in the arena.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Stable handle of a feedback channel.
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("channel#{_0}")]
#[repr(transparent)]
pub struct ChannelId(usize);

impl ChannelId {
    /// Position of the channel in the network.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Runtime state of a node after its last activation.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub(crate) struct NodeState {
    /// Sum of the weighted values on all input edges.
    pub(crate) accumulated: f64,
    /// Value written to every output edge.
    pub(crate) activated: f64,
}

/// Stored (unweighted) value carried by an edge.
pub(crate) type EdgeSlot = SyncUnsafeCell<f64>;
pub(crate) type NodeSlot = SyncUnsafeCell<NodeState>;

pub(crate) type IndexMap<K, V> = _IndexMap<K, V, FxBuildHasher>;
pub(crate) type IndexSet<T> = _IndexSet<T, FxBuildHasher>;
