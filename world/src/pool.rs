//! Single-thread registry of reusable scratch collections.
//!
//! Several phases need a short-lived list, set, queue, or map purely as
//! working space for one call (flood-filling a match region, accumulating a
//! bomb footprint) and would otherwise allocate one fresh every tick. One
//! [`Pool`] lives on the board and hands out buffers keyed by their concrete
//! type; a checkout returns itself to the registry when its guard drops, so
//! a panic or an early return inside the borrowing call still gives the
//! buffer back instead of leaking it for the rest of the run.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// The structural family a pooled container belongs to. Lookups key on the
/// concrete container type, not on this; it exists so a registry can be
/// inspected or reasoned about independent of its element types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    /// An order-preserving sequence (`Vec<T>`).
    List,
    /// An unordered membership set (`HashSet<T>`).
    Set,
    /// A FIFO double-ended buffer (`VecDeque<T>`).
    Queue,
    /// A keyed lookup table (`HashMap<K, V>`).
    Map,
}

/// A scratch container the pool knows how to hand out and reclaim.
pub trait Poolable: Any + Sized {
    /// The structural family this container belongs to.
    const KIND: StructuralKind;

    /// Builds a fresh, empty instance for when the registry has nothing idle
    /// to reuse.
    fn empty() -> Self;

    /// Clears the container's contents without shrinking its capacity, so
    /// the allocation survives for the next checkout.
    fn reset(&mut self);
}

impl<T: 'static> Poolable for Vec<T> {
    const KIND: StructuralKind = StructuralKind::List;

    fn empty() -> Self {
        Vec::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl<T: 'static + Eq + Hash> Poolable for HashSet<T> {
    const KIND: StructuralKind = StructuralKind::Set;

    fn empty() -> Self {
        HashSet::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl<T: 'static> Poolable for VecDeque<T> {
    const KIND: StructuralKind = StructuralKind::Queue;

    fn empty() -> Self {
        VecDeque::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl<K: 'static + Eq + Hash, V: 'static> Poolable for HashMap<K, V> {
    const KIND: StructuralKind = StructuralKind::Map;

    fn empty() -> Self {
        HashMap::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

type Idle = RefCell<HashMap<TypeId, Vec<Box<dyn Any>>>>;

/// Registry of idle scratch buffers, keyed by their concrete type.
///
/// Cloning a `Pool` clones the handle, not the registry: every clone shares
/// the same underlying idle buffers (an `Rc`), which is why checking one out
/// never borrows from whatever produced the handle — a [`PooledBuf`] is a
/// fully owned value, free to outlive the call that fetched it.
#[derive(Clone, Default)]
pub struct Pool {
    idle: Rc<Idle>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").finish_non_exhaustive()
    }
}

impl Pool {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks out a buffer of type `C`, reusing an idle one already reset to
    /// empty if the registry is holding one, or allocating fresh otherwise.
    #[must_use]
    pub fn checkout<C: Poolable>(&self) -> PooledBuf<C> {
        let reused = self
            .idle
            .borrow_mut()
            .get_mut(&TypeId::of::<C>())
            .and_then(Vec::pop)
            .and_then(|boxed| boxed.downcast::<C>().ok())
            .map(|boxed| *boxed);
        PooledBuf {
            pool: self.clone(),
            value: Some(reused.unwrap_or_else(C::empty)),
        }
    }

    fn reclaim<C: Poolable>(&self, mut value: C) {
        value.reset();
        self.idle
            .borrow_mut()
            .entry(TypeId::of::<C>())
            .or_default()
            .push(Box::new(value));
    }
}

/// A buffer checked out of a [`Pool`] for the scope of one call.
///
/// Dereferences to the underlying container. Returns the buffer to its pool
/// on drop — including when the guard's scope unwinds from a panic, since
/// `Drop::drop` still runs during unwinding — so no caller has to remember
/// to hand anything back on a failure path.
pub struct PooledBuf<C: Poolable> {
    pool: Pool,
    value: Option<C>,
}

impl<C: Poolable> Deref for PooledBuf<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.value.as_ref().expect("value is only taken on drop")
    }
}

impl<C: Poolable> DerefMut for PooledBuf<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.value.as_mut().expect("value is only taken on drop")
    }
}

impl<C: Poolable> Drop for PooledBuf<C> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.reclaim(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_reclaimed_buffer_is_reused_on_the_next_checkout() {
        let pool = Pool::new();
        {
            let mut list = pool.checkout::<Vec<u32>>();
            list.push(1);
            list.push(2);
        }
        let list = pool.checkout::<Vec<u32>>();
        assert!(list.is_empty());
        assert!(list.capacity() >= 2);
    }

    #[test]
    fn distinct_element_types_get_distinct_buffers() {
        let pool = Pool::new();
        let mut a = pool.checkout::<Vec<u32>>();
        let mut b = pool.checkout::<Vec<u64>>();
        a.push(1);
        b.push(2);
        assert_eq!(*a, vec![1]);
        assert_eq!(*b, vec![2]);
    }

    #[test]
    fn every_structural_kind_round_trips() {
        let pool = Pool::new();

        let mut set = pool.checkout::<HashSet<u32>>();
        let _ = set.insert(1);
        drop(set);
        assert!(pool.checkout::<HashSet<u32>>().is_empty());

        let mut queue = pool.checkout::<VecDeque<u32>>();
        queue.push_back(1);
        drop(queue);
        assert!(pool.checkout::<VecDeque<u32>>().is_empty());

        let mut map = pool.checkout::<HashMap<u32, u32>>();
        let _ = map.insert(1, 2);
        drop(map);
        assert!(pool.checkout::<HashMap<u32, u32>>().is_empty());
    }

    #[test]
    fn a_panic_inside_the_checkout_scope_still_returns_the_buffer() {
        let pool = Pool::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut list = pool.checkout::<Vec<u32>>();
            list.push(1);
            panic!("simulated failure path");
        }));
        assert!(result.is_err());
        let list = pool.checkout::<Vec<u32>>();
        assert!(list.is_empty());
    }

    #[test]
    fn cloned_handles_share_one_registry() {
        let pool = Pool::new();
        let handle = pool.clone();
        drop(pool.checkout::<Vec<u32>>());
        assert!(handle.checkout::<Vec<u32>>().is_empty());
    }
}
