use std::fmt;

use ghost_cell::{GhostCell, GhostToken};

use crate::config::StoreConfig;
use crate::error::{ConfigError, InvariantError};
use crate::list::cursor::Cursor;
use crate::list::store::{SlotStore, REAR};

pub mod cursor;

pub(crate) mod store;

/// The `PositionalList` is a doubly-linked list whose items live in the slots
/// of a growable array. It is read and written only through [`Cursor`]s, which
/// can insert and remove items at any position in amortized constant time.
///
/// The list does not own its access right: every operation takes the
/// [`GhostToken`] of the list's brand `'id`. Observers borrow the token
/// shared, mutators borrow it exclusively, so at most one mutation runs at a
/// time over all lists of the same brand, and never while an observer holds
/// a borrowed item.
///
/// # Examples
///
/// ```
/// use positional_list::{GhostToken, PositionalList};
///
/// GhostToken::new(|mut token| {
///     let list = PositionalList::new();
///     assert!(list.is_empty(&token));
///
///     let mut cursor = list.new_cursor(&mut token);
///     cursor.insert(1, &mut token).unwrap();
///     cursor.insert(2, &mut token).unwrap();
///     cursor.dispose(&mut token);
///
///     assert_eq!(list.len(&token), 2);
///     assert_eq!(list.render(&token), "(1, 2)");
/// });
/// ```
pub struct PositionalList<'id, T> {
    store: GhostCell<'id, SlotStore<T>>,
}

impl<'id, T> PositionalList<'id, T> {
    /// Create an empty list with the default capacities.
    pub fn new() -> Self {
        Self::from_store(SlotStore::new(StoreConfig::default()))
    }

    /// Create an empty list with explicit capacities.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{GhostToken, PositionalList, StoreConfig};
    ///
    /// GhostToken::new(|token| {
    ///     let config = StoreConfig::default()
    ///         .with_initial_capacity(64)
    ///         .with_min_capacity(16);
    ///     let list = PositionalList::<u32>::with_config(config).unwrap();
    ///     assert_eq!(list.capacity(&token), 64);
    ///     assert_eq!(list.min_capacity(&token), 16);
    ///
    ///     let config = StoreConfig::default().with_min_capacity(0);
    ///     assert!(PositionalList::<u32>::with_config(config).is_err());
    /// });
    /// ```
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_store(SlotStore::new(config)))
    }

    fn from_store(store: SlotStore<T>) -> Self {
        Self {
            store: GhostCell::new(store),
        }
    }

    pub fn is_empty(&self, token: &GhostToken<'id>) -> bool {
        self.len(token) == 0
    }

    /// Returns the number of items in the list.
    pub fn len(&self, token: &GhostToken<'id>) -> usize {
        self.store.borrow(token).len()
    }

    /// Returns the number of slots in the store, the rear sentinel included.
    pub fn capacity(&self, token: &GhostToken<'id>) -> usize {
        self.store.borrow(token).capacity()
    }

    pub fn min_capacity(&self, token: &GhostToken<'id>) -> usize {
        self.store.borrow(token).min_capacity()
    }

    /// Create a cursor resting on the rear sentinel.
    ///
    /// The cursor must be released with [`Cursor::dispose`].
    pub fn new_cursor<'a>(&'a self, token: &mut GhostToken<'id>) -> Cursor<'a, 'id, T> {
        self.store.borrow_mut(token).pin(REAR);
        Cursor::new(self, REAR)
    }

    /// Run `f` with a fresh cursor resting on the rear sentinel, and dispose
    /// of the cursor afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::from_iter([1, 2, 3]);
    ///     let front = list.with_cursor(&mut token, |cursor, token| {
    ///         cursor.to_front(token)?;
    ///         cursor.remove(token)
    ///     });
    ///     assert_eq!(front, Ok(1));
    ///     assert_eq!(list.render(&token), "(2, 3)");
    ///     assert_eq!(list.check_invariants(&token), Ok(()));
    /// });
    /// ```
    pub fn with_cursor<'a, R, F>(&'a self, token: &mut GhostToken<'id>, f: F) -> R
    where
        F: FnOnce(&mut Cursor<'a, 'id, T>, &mut GhostToken<'id>) -> R,
    {
        let mut cursor = self.new_cursor(token);
        let result = f(&mut cursor, token);
        cursor.dispose(token);
        result
    }

    /// Returns an object that implements [`fmt::Display`], rendering the
    /// items from front to rear as `(a, b, c)`.
    pub fn display<'t>(&'t self, token: &'t GhostToken<'id>) -> Display<'t, T> {
        Display {
            store: self.store.borrow(token),
        }
    }

    /// Render the items from front to rear as `(a, b, c)`, or `()` if the
    /// list is empty.
    pub fn render(&self, token: &GhostToken<'id>) -> String
    where
        T: fmt::Display,
    {
        self.display(token).to_string()
    }

    /// Walk the whole store and check its structural invariants.
    ///
    /// This operation should compute in *O*(*capacity*) time.
    pub fn check_invariants(&self, token: &GhostToken<'id>) -> Result<(), InvariantError> {
        self.store.borrow(token).check_invariants()
    }

    /// Consume the list, returning its items from front to rear.
    pub fn into_vec(self) -> Vec<T> {
        self.store.into_inner().into_items()
    }
}

impl<'id, T> Default for PositionalList<'id, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'id, T> FromIterator<T> for PositionalList<'id, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'id, T> Extend<T> for PositionalList<'id, T> {
    /// Append items at the rear.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let store = self.store.get_mut();
        iter.into_iter().for_each(|item| {
            store.insert_before(REAR, item);
        });
    }
}

/// Helper struct for rendering a [`PositionalList`] with `format!` and `{}`.
///
/// Created by [`PositionalList::display`].
pub struct Display<'t, T> {
    store: &'t SlotStore<T>,
}

impl<'t, T: fmt::Display> fmt::Display for Display<'t, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, item) in self.store.items().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use crate::config::StoreConfig;
    use crate::error::CursorError;
    use crate::list::PositionalList;
    use ghost_cell::GhostToken;
    use proptest::prelude::*;

    fn trace_init() -> tracing::dispatcher::DefaultGuard {
        use tracing_subscriber::prelude::*;
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .with_target(false)
            .with_timer(())
            .set_default()
    }

    #[test]
    fn list_create() {
        GhostToken::new(|token| {
            let list = PositionalList::<i32>::new();
            assert!(list.is_empty(&token));
            assert_eq!(list.len(&token), 0);
            assert_eq!(list.capacity(&token), StoreConfig::DEFAULT_INITIAL_CAPACITY);
            assert_eq!(list.min_capacity(&token), StoreConfig::DEFAULT_MIN_CAPACITY);
            assert_eq!(list.render(&token), "()");
            assert_eq!(list.check_invariants(&token), Ok(()));
        })
    }

    #[test]
    fn list_insert_before_front() {
        let _trace = trace_init();
        GhostToken::new(|mut token| {
            let list = PositionalList::new();
            let mut cursor = list.new_cursor(&mut token);
            cursor.insert("b", &mut token).unwrap();
            cursor.to_front(&mut token).unwrap();
            cursor.insert("a", &mut token).unwrap();

            assert_eq!(list.render(&token), "(a, b)");
            assert_eq!(cursor.get_item(&token), Ok(&"b"));
            assert_eq!(list.len(&token), 2);
            cursor.dispose(&mut token);
            assert_eq!(list.check_invariants(&token), Ok(()));
        })
    }

    #[test]
    fn list_shared_removal_scenario() {
        let _trace = trace_init();
        GhostToken::new(|mut token| {
            let list = PositionalList::new();
            let mut first = list.new_cursor(&mut token);
            first.insert("a", &mut token).unwrap();
            first.insert("b", &mut token).unwrap();
            assert_eq!(list.render(&token), "(a, b)");

            first.to_front(&mut token).unwrap();
            assert_eq!(first.remove(&mut token), Ok("a"));
            assert_eq!(list.render(&token), "(b)");

            let mut second = list.new_cursor(&mut token);
            second.to_front(&mut token).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.get_item(&token), Ok(&"b"));
            assert!(matches!(
                first.remove(&mut token),
                Err(CursorError::SharedSlot { cursors: 2, .. })
            ));
            assert!(matches!(
                second.remove(&mut token),
                Err(CursorError::SharedSlot { cursors: 2, .. })
            ));
            assert_eq!(list.render(&token), "(b)");

            second.dispose(&mut token);
            assert_eq!(first.shared_count(&token), 1);
            assert_eq!(first.remove(&mut token), Ok("b"));
            assert_eq!(list.render(&token), "()");

            first.dispose(&mut token);
            assert_eq!(list.check_invariants(&token), Ok(()));
        })
    }

    #[test]
    fn list_display() {
        GhostToken::new(|token| {
            let list = PositionalList::from_iter([1.5, 2.0]);
            assert_eq!(format!("{}", list.display(&token)), "(1.5, 2)");
            let list = PositionalList::from_iter(["only"]);
            assert_eq!(list.render(&token), "(only)");
        })
    }

    #[test]
    fn list_with_cursor_disposes() {
        GhostToken::new(|mut token| {
            let list = PositionalList::from_iter(0..3);
            let err = list.with_cursor(&mut token, |cursor, token| {
                cursor.to_next(token).map(|_| ())
            });
            assert_eq!(err, Err(CursorError::AtRear { op: "to_next" }));

            // the scoped cursor no longer pins the rear
            let mut cursor = list.new_cursor(&mut token);
            assert_eq!(cursor.shared_count(&token), 1);
            cursor.dispose(&mut token);
        })
    }

    #[test]
    fn list_into_vec() {
        GhostToken::new(|mut token| {
            let mut list = PositionalList::from_iter(0..4);
            list.extend(4..6);
            list.with_cursor(&mut token, |cursor, token| {
                cursor.to_front(token)?.to_next(token)?;
                cursor.remove(token)
            })
            .unwrap();
            assert_eq!(list.into_vec(), vec![0, 2, 3, 4, 5]);
        })
    }

    #[test]
    fn list_rejects_bad_config() {
        let config = StoreConfig::default().with_initial_capacity(2);
        assert!(PositionalList::<i32>::with_config(config).is_err());
        let config = StoreConfig::default().with_min_capacity(1);
        assert!(PositionalList::<i32>::with_config(config).is_err());
    }

    #[test]
    fn list_capacity_returns_to_minimum() {
        let _trace = trace_init();
        GhostToken::new(|mut token| {
            let list = PositionalList::new();
            let mut cursor = list.new_cursor(&mut token);
            for round in 0..3 {
                for value in 0..100 {
                    cursor.insert(value, &mut token).unwrap();
                }
                assert_eq!(list.len(&token), 100);
                assert_eq!(list.capacity(&token), 128);

                cursor.to_front(&mut token).unwrap();
                for value in 0..100 {
                    assert_eq!(cursor.remove(&mut token), Ok(value), "round {}", round);
                }
                assert!(cursor.at_rear());
                assert!(list.is_empty(&token));
                assert_eq!(list.capacity(&token), list.min_capacity(&token));
                assert_eq!(list.check_invariants(&token), Ok(()));
            }
            cursor.dispose(&mut token);
        })
    }

    #[test]
    fn list_pinned_slot_keeps_capacity() {
        GhostToken::new(|mut token| {
            let list = PositionalList::from_iter(0..40);
            let capacity = list.capacity(&token);
            let mut last = list.new_cursor(&mut token);
            last.to_prev(&mut token).unwrap();
            let mut cursor = list.new_cursor(&mut token);
            cursor.to_front(&mut token).unwrap();
            for _ in 0..39 {
                cursor.remove(&mut token).unwrap();
            }
            // the item still pinned by `last` sits high in the store
            assert_eq!(list.capacity(&token), capacity);
            assert_eq!(last.get_item(&token), Ok(&39));
            assert_eq!(cursor, last);

            last.dispose(&mut token);
            cursor.remove(&mut token).unwrap();
            assert_eq!(list.capacity(&token), list.min_capacity(&token));
            cursor.dispose(&mut token);
            assert_eq!(list.check_invariants(&token), Ok(()));
        })
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(usize, i32),
        Remove(usize),
        Replace(usize, i32),
        Next(usize),
        Prev(usize),
        Front(usize),
        Rear(usize),
        SetTo(usize, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let cursor = 0..4usize;
        prop_oneof![
            4 => (cursor.clone(), any::<i32>()).prop_map(|(c, v)| Op::Insert(c, v)),
            3 => cursor.clone().prop_map(Op::Remove),
            1 => (cursor.clone(), any::<i32>()).prop_map(|(c, v)| Op::Replace(c, v)),
            2 => cursor.clone().prop_map(Op::Next),
            2 => cursor.clone().prop_map(Op::Prev),
            1 => cursor.clone().prop_map(Op::Front),
            1 => cursor.clone().prop_map(Op::Rear),
            1 => (cursor.clone(), cursor).prop_map(|(c, d)| Op::SetTo(c, d)),
        ]
    }

    fn render(model: &[i32]) -> String {
        let items: Vec<String> = model.iter().map(ToString::to_string).collect();
        format!("({})", items.join(", "))
    }

    /// Drive `count` cursors through `ops`, checking the list against a
    /// `Vec` and the cursors against plain indices (the rear being
    /// `model.len()`).
    fn check_against_model(ops: &[Op], count: usize) {
        GhostToken::new(|mut token| {
            let config = StoreConfig::default()
                .with_initial_capacity(2)
                .with_min_capacity(2);
            let list = PositionalList::with_config(config).unwrap();
            let mut cursors: Vec<_> = (0..count).map(|_| list.new_cursor(&mut token)).collect();
            let mut positions = vec![0usize; count];
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match *op {
                    Op::Insert(c, value) => {
                        let c = c % count;
                        let at = positions[c];
                        cursors[c].insert(value, &mut token).unwrap();
                        model.insert(at, value);
                        positions.iter_mut().filter(|p| **p >= at).for_each(|p| *p += 1);
                    }
                    Op::Remove(c) => {
                        let c = c % count;
                        let at = positions[c];
                        let sharing = positions.iter().filter(|&&p| p == at).count();
                        let result = cursors[c].remove(&mut token);
                        if at == model.len() {
                            assert_eq!(result, Err(CursorError::AtRear { op: "remove" }));
                        } else if sharing > 1 {
                            assert!(matches!(result, Err(CursorError::SharedSlot { .. })));
                        } else {
                            assert_eq!(result, Ok(model.remove(at)));
                            positions.iter_mut().filter(|p| **p > at).for_each(|p| *p -= 1);
                        }
                    }
                    Op::Replace(c, value) => {
                        let c = c % count;
                        let at = positions[c];
                        let result = cursors[c].replace(value, &mut token);
                        match model.get_mut(at) {
                            Some(item) => assert_eq!(result, Ok(std::mem::replace(item, value))),
                            None => assert!(result.is_err()),
                        }
                    }
                    Op::Next(c) => {
                        let c = c % count;
                        let moved = cursors[c].to_next(&mut token).is_ok();
                        assert_eq!(moved, positions[c] < model.len());
                        if moved {
                            positions[c] += 1;
                        }
                    }
                    Op::Prev(c) => {
                        let c = c % count;
                        let moved = cursors[c].to_prev(&mut token).is_ok();
                        assert_eq!(moved, positions[c] > 0);
                        if moved {
                            positions[c] -= 1;
                        }
                    }
                    Op::Front(c) => {
                        let c = c % count;
                        cursors[c].to_front(&mut token).unwrap();
                        positions[c] = 0;
                    }
                    Op::Rear(c) => {
                        let c = c % count;
                        cursors[c].to_rear(&mut token).unwrap();
                        positions[c] = model.len();
                    }
                    Op::SetTo(c, d) => {
                        let (c, d) = (c % count, d % count);
                        if c == d {
                            continue;
                        }
                        let (target, source) = if c < d {
                            let (left, right) = cursors.split_at_mut(d);
                            (&mut left[c], &right[0])
                        } else {
                            let (left, right) = cursors.split_at_mut(c);
                            (&mut right[0], &left[d])
                        };
                        target.set_to(source, &mut token).unwrap();
                        positions[c] = positions[d];
                    }
                }

                assert_eq!(list.check_invariants(&token), Ok(()));
                assert_eq!(list.len(&token), model.len());
                assert_eq!(list.render(&token), render(&model));
                assert!(list.capacity(&token) > model.len());
                for (cursor, &at) in cursors.iter().zip(&positions) {
                    match model.get(at) {
                        Some(item) => assert_eq!(cursor.get_item(&token), Ok(item)),
                        None => assert!(cursor.at_rear()),
                    }
                    assert_eq!(cursor.at_front(&token), at == 0);
                    let sharing = positions.iter().filter(|&&p| p == at).count();
                    assert_eq!(cursor.shared_count(&token), sharing);
                }
            }

            for mut cursor in cursors {
                cursor.dispose(&mut token);
            }
            assert_eq!(list.into_vec(), model);
        })
    }

    proptest! {
        #[test]
        fn single_cursor_matches_vec(ops in prop::collection::vec(op(), 0..200)) {
            check_against_model(&ops, 1);
        }

        #[test]
        fn many_cursors_match_vec(ops in prop::collection::vec(op(), 0..200)) {
            check_against_model(&ops, 3);
        }
    }
}
