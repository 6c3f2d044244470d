use std::mem;

use crate::config::StoreConfig;
use crate::error::InvariantError;

/// Index of the rear sentinel. It is never freed, reused or relocated.
pub(crate) const REAR: usize = 0;

/// One addressable unit of the store.
///
/// An occupied slot holds `Some(item)` and is linked into the list by `prev`
/// and `next`. A free slot holds `None`, its `prev` is unused and its `next`
/// links the free chain. The rear sentinel holds `None`, its `prev` is the
/// back slot and its `next` is always `None`.
#[derive(Debug)]
struct Slot<T> {
    item: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
    /// number of cursors resting on this slot
    refs: usize,
}

impl<T> Slot<T> {
    fn vacant() -> Self {
        Self {
            item: None,
            prev: None,
            next: None,
            refs: 0,
        }
    }

    fn is_occupied(&self) -> bool {
        self.item.is_some()
    }
}

/// The array-backed doubly-linked list underneath a
/// [`PositionalList`](crate::PositionalList).
///
/// "Pointers" are slot indices. Free slots are recycled through a chain
/// threaded over their `next` fields, and every slot counts the cursors
/// resting on it so that a slot shared by several cursors is never removed.
///
/// The store knows nothing about cursors beyond those counts; a slot with a
/// nonzero count is *pinned* and keeps its index for as long as the count
/// stays nonzero.
#[derive(Debug)]
pub(crate) struct SlotStore<T> {
    slots: Vec<Slot<T>>,
    front: usize,
    len: usize,
    free_head: Option<usize>,
    min_capacity: usize,
}

// observers
impl<T> SlotStore<T> {
    pub(crate) fn new(config: StoreConfig) -> Self {
        let mut slots = Vec::with_capacity(config.initial_capacity);
        slots.resize_with(config.initial_capacity, Slot::vacant);
        let mut store = Self {
            slots,
            front: REAR,
            len: 0,
            free_head: None,
            min_capacity: config.min_capacity,
        };
        store.rethread_free_chain();
        store
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    pub(crate) fn front(&self) -> usize {
        self.front
    }

    pub(crate) fn next_of(&self, slot: usize) -> Option<usize> {
        self.slots[slot].next
    }

    pub(crate) fn prev_of(&self, slot: usize) -> Option<usize> {
        self.slots[slot].prev
    }

    pub(crate) fn item(&self, slot: usize) -> Option<&T> {
        self.slots[slot].item.as_ref()
    }

    pub(crate) fn refs(&self, slot: usize) -> usize {
        self.slots[slot].refs
    }

    /// Walk the items from front to rear.
    pub(crate) fn items(&self) -> impl Iterator<Item = &T> + '_ {
        let mut slot = self.front;
        std::iter::from_fn(move || {
            let current = &self.slots[slot];
            let item = current.item.as_ref()?;
            slot = current.next.unwrap_or(REAR);
            Some(item)
        })
    }

    /// Take the items out from front to rear, consuming the store.
    pub(crate) fn into_items(mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.len);
        let mut slot = self.front;
        while slot != REAR {
            let current = &mut self.slots[slot];
            items.extend(current.item.take());
            slot = current.next.unwrap_or(REAR);
        }
        items
    }
}

// reference counts and item access
impl<T> SlotStore<T> {
    pub(crate) fn pin(&mut self, slot: usize) {
        self.slots[slot].refs += 1;
    }

    pub(crate) fn unpin(&mut self, slot: usize) {
        let refs = &mut self.slots[slot].refs;
        debug_assert!(*refs > 0, "unpinning slot {} with no cursor on it", slot);
        *refs = refs.saturating_sub(1);
    }

    /// Exchange the item cell of `slot` with `item`.
    ///
    /// Leaving `None` in an occupied slot is only allowed transiently, and
    /// the store must not be resized or walked until it is filled again.
    pub(crate) fn swap_item(&mut self, slot: usize, item: Option<T>) -> Option<T> {
        mem::replace(&mut self.slots[slot].item, item)
    }
}

// linking structure
impl<T> SlotStore<T> {
    /// Store `item` in a fresh slot linked in just before `at`, and return
    /// the fresh slot. Doubles the store first if no slot is free.
    pub(crate) fn insert_before(&mut self, at: usize, item: T) -> usize {
        let slot = self.allocate(item);
        let prev = self.slots[at].prev;
        let fresh = &mut self.slots[slot];
        fresh.prev = prev;
        fresh.next = Some(at);
        match prev {
            Some(prev) => self.slots[prev].next = Some(slot),
            None => self.front = slot,
        }
        self.slots[at].prev = Some(slot);
        self.len += 1;
        #[cfg(debug_assertions)]
        {
            if let Some(prev) = prev {
                self.assert_adjacent(prev, slot);
            }
            self.assert_adjacent(slot, at);
        }
        tracing::trace!(slot, len = self.len, "inserted item");
        self.verify();
        slot
    }

    /// Unlink the occupied `slot`, return it to the free chain and hand back
    /// its item. Shrinks the store afterwards if it became sparse.
    ///
    /// Every cursor must already have been moved off `slot`.
    pub(crate) fn remove(&mut self, slot: usize) -> T {
        debug_assert_ne!(slot, REAR, "removing the rear sentinel");
        debug_assert_eq!(self.slots[slot].refs, 0, "removing a pinned slot");
        let removed = &mut self.slots[slot];
        let item = removed.item.take().expect("removed slot is occupied");
        let prev = removed.prev.take();
        let next = removed.next.take().expect("occupied slot has a successor");
        self.slots[next].prev = prev;
        match prev {
            Some(prev) => self.slots[prev].next = Some(next),
            None => self.front = next,
        }
        #[cfg(debug_assertions)]
        if let Some(prev) = prev {
            self.assert_adjacent(prev, next);
        }
        self.slots[slot].next = self.free_head;
        self.free_head = Some(slot);
        self.len -= 1;
        tracing::trace!(slot, len = self.len, "removed item");
        self.shrink_if_sparse();
        self.verify();
        item
    }

    fn allocate(&mut self, item: T) -> usize {
        if self.free_head.is_none() {
            self.resize(self.capacity() * 2);
        }
        let slot = self.free_head.expect("a grown store has a free slot");
        let fresh = &mut self.slots[slot];
        self.free_head = fresh.next.take();
        fresh.item = Some(item);
        slot
    }

    /// Halve the store while fewer than a quarter of its slots hold items,
    /// staying at or above the minimum capacity.
    fn shrink_if_sparse(&mut self) {
        while self.len < self.capacity() / 4 && self.capacity() / 2 >= self.min_capacity {
            let target = self.capacity() / 2;
            if !self.evacuate_from(target) {
                break;
            }
            self.resize(target);
        }
    }

    /// Move every occupied slot at or above `target` into a vacant slot below
    /// it. Moves nothing and returns `false` if one of them is pinned.
    ///
    /// The free chain is left stale; the caller must rethread it.
    fn evacuate_from(&mut self, target: usize) -> bool {
        let capacity = self.capacity();
        if let Some(pinned) = (target..capacity).find(|&slot| self.slots[slot].refs > 0) {
            tracing::debug!(
                to = target,
                pinned,
                "shrink postponed: a cursor rests above the target capacity"
            );
            return false;
        }
        let mut vacant = 1;
        for slot in target..capacity {
            if !self.slots[slot].is_occupied() {
                continue;
            }
            while self.slots[vacant].is_occupied() {
                vacant += 1;
            }
            debug_assert!(vacant < target, "no vacant slot below {}", target);
            self.relocate(slot, vacant);
        }
        true
    }

    /// Move the unpinned occupied slot `from` into the vacant slot `to`,
    /// re-linking its neighbours.
    fn relocate(&mut self, from: usize, to: usize) {
        let moved = mem::replace(&mut self.slots[from], Slot::vacant());
        let (prev, next) = (moved.prev, moved.next);
        self.slots[to] = moved;
        match prev {
            Some(prev) => self.slots[prev].next = Some(to),
            None => self.front = to,
        }
        if let Some(next) = next {
            self.slots[next].prev = Some(to);
        }
    }

    /// Reallocate the store to exactly `new_capacity` slots.
    ///
    /// Every occupied slot must already lie below `new_capacity`.
    fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity > self.len);
        debug_assert!(self
            .slots
            .iter()
            .skip(new_capacity)
            .all(|slot| !slot.is_occupied() && slot.refs == 0));
        tracing::debug!(
            from = self.capacity(),
            to = new_capacity,
            len = self.len,
            "resizing slot store"
        );
        self.slots.resize_with(new_capacity, Slot::vacant);
        self.slots.shrink_to_fit();
        self.rethread_free_chain();
    }

    /// Rebuild the free chain over every vacant slot, lowest index first.
    fn rethread_free_chain(&mut self) {
        self.free_head = None;
        for slot in (1..self.capacity()).rev() {
            let vacant = &mut self.slots[slot];
            if !vacant.is_occupied() {
                vacant.prev = None;
                vacant.next = self.free_head;
                self.free_head = Some(slot);
            }
        }
    }

    #[cfg(debug_assertions)]
    fn assert_adjacent(&self, prev: usize, next: usize) {
        assert_eq!(self.slots[prev].next, Some(next));
        assert_eq!(self.slots[next].prev, Some(prev));
    }

    #[inline]
    fn verify(&self) {
        #[cfg(feature = "verify-invariants")]
        if let Err(err) = self.check_invariants() {
            panic!("slot store invariant broken: {}", err);
        }
    }
}

impl<T> SlotStore<T> {
    /// Walk the whole store and check its structural invariants.
    ///
    /// This operation should compute in *O*(*capacity*) time.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        let capacity = self.capacity();
        if capacity < self.min_capacity {
            return Err(InvariantError::CapacityBelowMinimum {
                capacity,
                min: self.min_capacity,
            });
        }
        if capacity <= self.len {
            return Err(InvariantError::CapacityExhausted {
                capacity,
                len: self.len,
            });
        }
        let sentinel = &self.slots[REAR];
        if sentinel.is_occupied() || sentinel.next.is_some() {
            return Err(InvariantError::OccupiedSentinel);
        }

        let mut seen = vec![false; capacity];
        let mut walked = 0;
        let mut prev = None;
        let mut slot = self.front;
        while slot != REAR {
            if slot >= capacity
                || seen[slot]
                || !self.slots[slot].is_occupied()
                || self.slots[slot].prev != prev
            {
                return Err(InvariantError::BrokenLink { slot });
            }
            seen[slot] = true;
            walked += 1;
            prev = Some(slot);
            slot = match self.slots[slot].next {
                Some(next) => next,
                None => return Err(InvariantError::BrokenLink { slot }),
            };
        }
        if self.slots[REAR].prev != prev {
            return Err(InvariantError::BrokenLink { slot: REAR });
        }
        if walked != self.len {
            return Err(InvariantError::LengthMismatch {
                walked,
                recorded: self.len,
            });
        }

        let mut free = self.free_head;
        while let Some(slot) = free {
            if slot == REAR
                || slot >= capacity
                || seen[slot]
                || self.slots[slot].is_occupied()
                || self.slots[slot].refs != 0
            {
                return Err(InvariantError::FreeSlotInUse { slot });
            }
            seen[slot] = true;
            free = self.slots[slot].next;
        }

        match (1..capacity).find(|&slot| !seen[slot]) {
            Some(slot) => Err(InvariantError::OrphanSlot { slot }),
            None => Ok(()),
        }
    }
}
