//! Switch between the production runtime and the `loom` model checker.
//!
//! Under `loom` every slot access goes through loom's tracked `UnsafeCell`,
//! and the two halves of a level run on model threads, which need `'static`
//! closures and therefore `Arc`-owned network state. Otherwise the evaluator
//! borrows its state and forks with `rayon`.

#[cfg(feature = "loom")]
mod imp {
    use crate::{
        network::Network,
        types::{EdgeSlot, NodeSlot},
    };
    pub(crate) use loom::{cell::UnsafeCell, thread};
    pub(crate) use std::sync::Arc;

    /// Owned handles to the state shared by the two halves of a level.
    pub(crate) type NetworkRef<'a> = Arc<Network>;
    pub(crate) type EdgeSlots<'a> = Arc<Vec<EdgeSlot>>;
    pub(crate) type NodeSlots<'a> = Arc<Vec<NodeSlot>>;

    /// Run both halves of a level on model threads and wait for both.
    pub(crate) fn join(lhs: impl FnOnce() + Send + 'static, rhs: impl FnOnce() + Send + 'static) {
        let handles = [thread::spawn(lhs), thread::spawn(rhs)];
        for handle in handles {
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }
        }
    }
}

#[cfg(not(feature = "loom"))]
mod imp {
    use crate::{
        network::Network,
        types::{EdgeSlot, NodeSlot, SyncUnsafeCell},
    };
    pub(crate) use core::cell::UnsafeCell;

    /// Borrowed views of the state shared by the two halves of a level.
    pub(crate) type NetworkRef<'a> = &'a Network;
    pub(crate) type EdgeSlots<'a> = &'a [EdgeSlot];
    pub(crate) type NodeSlots<'a> = &'a [NodeSlot];

    /// Run both halves of a level, possibly in parallel, and return once both
    /// are done.
    pub(crate) fn join(lhs: impl FnOnce() + Send, rhs: impl FnOnce() + Send) {
        rayon::join(lhs, rhs);
    }

    /// Gives a raw slot pointer loom's `with` accessor, so slot reads and writes
    /// are spelled the same in both builds.
    pub(crate) trait LoomPtrCompat: Sized {
        type Ptr;
        fn with<R>(self, f: impl FnOnce(Self::Ptr) -> R) -> R;
    }

    impl<T> LoomPtrCompat for *mut T {
        type Ptr = *mut T;
        fn with<R>(self, f: impl FnOnce(Self::Ptr) -> R) -> R {
            f(self)
        }
    }

    /// loom's `UnsafeCell::get_mut` returns a writable pointer through `&self`;
    /// `core`'s `get` already does.
    pub(crate) trait LoomUnsafeCellCompat<T> {
        fn get_mut(&self) -> impl LoomPtrCompat<Ptr = *mut T>;
    }

    impl<T> LoomUnsafeCellCompat<T> for SyncUnsafeCell<T> {
        fn get_mut(&self) -> impl LoomPtrCompat<Ptr = *mut T> {
            self.get()
        }
    }
}

pub(crate) use imp::*;
