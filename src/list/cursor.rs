use std::fmt;
use std::ptr;

use ghost_cell::GhostToken;

use crate::error::CursorError;
use crate::list::store::REAR;
use crate::list::PositionalList;

/// A cursor over a `PositionalList`.
///
/// A `Cursor` rests on one slot of its list: either a slot holding an item,
/// or the rear sentinel one past the last item. In a list with length *n*
/// there are *n* + 1 valid places for a cursor.
///
/// Any number of cursors may rest on the same list, and on the same slot.
/// Each slot counts the cursors resting on it, and a slot shared by more than
/// one cursor cannot be removed.
///
/// A cursor must be released with [`Cursor::dispose`] once it is no longer
/// needed. Dropping it undisposed leaks its count, which keeps the slot it
/// rested on from ever being removed.
///
/// # Examples
///
/// Here is a simple example showing how the cursors work. (The rear sentinel
/// is denoted by `#`).
/// ```
/// use positional_list::{GhostToken, PositionalList};
///
/// GhostToken::new(|mut token| {
///     // Create a list: [ A B C #]
///     let list = PositionalList::from_iter(['A', 'B', 'C']);
///
///     // New cursors start at the rear: [ A B C|#]
///     let mut cursor = list.new_cursor(&mut token);
///     assert!(cursor.at_rear());
///     assert!(cursor.get_item(&token).is_err());
///
///     // Move the cursor backward: [ A B|C #]
///     cursor.to_prev(&mut token).unwrap();
///     assert_eq!(cursor.get_item(&token), Ok(&'C'));
///
///     // Move the cursor to the front: [|A B C #]
///     cursor.to_front(&mut token).unwrap();
///     assert_eq!(cursor.get_item(&token), Ok(&'A'));
///
///     // Cannot move before the front
///     assert!(cursor.to_prev(&mut token).is_err());
///
///     cursor.dispose(&mut token);
/// });
/// ```
pub struct Cursor<'a, 'id, T: 'a> {
    list: &'a PositionalList<'id, T>,
    /// `None` once disposed
    slot: Option<usize>,
}

/// Compare cursors by their position.
///
/// Only cursors of the same list resting on the same slot are equal. A
/// disposed cursor equals nothing.
///
/// # Examples
/// ```
/// use positional_list::{GhostToken, PositionalList};
///
/// GhostToken::new(|mut token| {
///     let list = PositionalList::from_iter([1, 2, 3]);
///     let mut cursor1 = list.new_cursor(&mut token);
///     let mut cursor2 = cursor1.duplicate(&mut token).unwrap();
///     // The same list, and the same position.
///     assert_eq!(cursor1, cursor2);
///
///     cursor2.to_front(&mut token).unwrap();
///     // The same list, but different positions.
///     assert_ne!(cursor1, cursor2);
///
///     let another_list = PositionalList::from_iter([1, 2, 3]);
///     let mut cursor3 = another_list.new_cursor(&mut token);
///     // Different lists, even at the same slot.
///     assert_ne!(cursor1, cursor3);
///
///     cursor1.dispose(&mut token);
///     cursor2.dispose(&mut token);
///     cursor3.dispose(&mut token);
/// });
/// ```
impl<'a, 'b, 'id, T: 'a + 'b> PartialEq<Cursor<'b, 'id, T>> for Cursor<'a, 'id, T> {
    fn eq(&self, other: &Cursor<'b, 'id, T>) -> bool {
        self.same_list_with(other) && self.slot.is_some() && self.slot == other.slot
    }
}

// private methods
impl<'a, 'id, T: 'a> Cursor<'a, 'id, T> {
    /// The caller must already have counted the new cursor on `slot`.
    pub(crate) fn new(list: &'a PositionalList<'id, T>, slot: usize) -> Self {
        Self {
            list,
            slot: Some(slot),
        }
    }

    fn position(&self) -> Result<usize, CursorError> {
        self.slot.ok_or(CursorError::Disposed)
    }

    fn same_list_with(&self, other: &Cursor<'_, 'id, T>) -> bool {
        ptr::eq(self.list, other.list)
    }

    /// Move the cursor to `target`, carrying its count along.
    fn move_to(
        &mut self,
        target: usize,
        token: &mut GhostToken<'id>,
    ) -> Result<&mut Self, CursorError> {
        let current = self.position()?;
        let store = self.list.store.borrow_mut(token);
        store.unpin(current);
        store.pin(target);
        self.slot = Some(target);
        Ok(self)
    }
}

// observers
impl<'a, 'id, T: 'a> Cursor<'a, 'id, T> {
    /// Returns `true` if the cursor rests on the front of its list. In an
    /// empty list the front is the rear sentinel.
    ///
    /// A disposed cursor is never at the front.
    pub fn at_front(&self, token: &GhostToken<'id>) -> bool {
        self.slot == Some(self.list.store.borrow(token).front())
    }

    /// Returns `true` if the cursor rests on the rear sentinel.
    ///
    /// A disposed cursor is never at the rear.
    pub fn at_rear(&self) -> bool {
        self.slot == Some(REAR)
    }

    pub fn is_disposed(&self) -> bool {
        self.slot.is_none()
    }

    /// The list this cursor belongs to.
    pub fn list(&self) -> &'a PositionalList<'id, T> {
        self.list
    }

    /// Return the item the cursor rests on, or an error at the rear.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{CursorError, GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::from_iter([1, 2, 3]);
    ///     let mut cursor = list.new_cursor(&mut token);
    ///     assert_eq!(
    ///         cursor.get_item(&token),
    ///         Err(CursorError::AtRear { op: "get_item" })
    ///     );
    ///     cursor.to_front(&mut token).unwrap();
    ///     assert_eq!(cursor.get_item(&token), Ok(&1));
    ///     cursor.dispose(&mut token);
    /// });
    /// ```
    pub fn get_item<'t>(&'t self, token: &'t GhostToken<'id>) -> Result<&'t T, CursorError> {
        let slot = self.position()?;
        self.list
            .store
            .borrow(token)
            .item(slot)
            .ok_or(CursorError::AtRear { op: "get_item" })
    }

    /// Return the number of cursors (this one included) resting on the same
    /// slot as this cursor, or 0 if it is disposed.
    pub fn shared_count(&self, token: &GhostToken<'id>) -> usize {
        self.slot
            .map_or(0, |slot| self.list.store.borrow(token).refs(slot))
    }
}

// navigation
impl<'a, 'id, T: 'a> Cursor<'a, 'id, T> {
    /// Set the cursor to the front of the list (the rear, if it is empty).
    ///
    /// This operation should compute in *O*(1) time.
    pub fn to_front(&mut self, token: &mut GhostToken<'id>) -> Result<&mut Self, CursorError> {
        let front = self.list.store.borrow(token).front();
        self.move_to(front, token)
    }

    /// Set the cursor to the rear sentinel.
    ///
    /// This operation should compute in *O*(1) time.
    pub fn to_rear(&mut self, token: &mut GhostToken<'id>) -> Result<&mut Self, CursorError> {
        self.move_to(REAR, token)
    }

    /// Move the cursor one step towards the rear, or return an error if it
    /// already rests on the rear.
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::from_iter([1, 2]);
    ///     let mut cursor = list.new_cursor(&mut token);
    ///
    ///     // Forbid to move past the rear
    ///     assert!(cursor.to_next(&mut token).is_err());
    ///
    ///     cursor.to_front(&mut token).unwrap();
    ///     cursor.to_next(&mut token).unwrap();
    ///     assert_eq!(cursor.get_item(&token), Ok(&2));
    ///     cursor.to_next(&mut token).unwrap();
    ///     assert!(cursor.at_rear());
    ///     cursor.dispose(&mut token);
    /// });
    /// ```
    pub fn to_next(&mut self, token: &mut GhostToken<'id>) -> Result<&mut Self, CursorError> {
        let current = self.position()?;
        if current == REAR {
            return Err(CursorError::AtRear { op: "to_next" });
        }
        let next = self
            .list
            .store
            .borrow(token)
            .next_of(current)
            .expect("occupied slot has a successor");
        self.move_to(next, token)
    }

    /// Move the cursor one step towards the front, or return an error if it
    /// already rests on the front.
    ///
    /// This operation should compute in *O*(1) time.
    pub fn to_prev(&mut self, token: &mut GhostToken<'id>) -> Result<&mut Self, CursorError> {
        let current = self.position()?;
        let prev = self.list.store.borrow(token).prev_of(current);
        match prev {
            Some(prev) => self.move_to(prev, token),
            None => Err(CursorError::AtFront { op: "to_prev" }),
        }
    }

    /// Move the cursor to where `other` rests. Afterwards `self == other`.
    ///
    /// Returns an error, leaving the cursor put, if `other` belongs to a
    /// different list.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{CursorError, GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::from_iter([1, 2, 3]);
    ///     let other_list = PositionalList::from_iter([1, 2, 3]);
    ///
    ///     let mut cursor = list.new_cursor(&mut token);
    ///     let mut front = list.new_cursor(&mut token);
    ///     front.to_front(&mut token).unwrap();
    ///
    ///     cursor.set_to(&front, &mut token).unwrap();
    ///     assert_eq!(cursor, front);
    ///     assert_eq!(cursor.shared_count(&token), 2);
    ///
    ///     let mut stranger = other_list.new_cursor(&mut token);
    ///     assert_eq!(
    ///         cursor.set_to(&stranger, &mut token).err(),
    ///         Some(CursorError::ForeignCursor { op: "set_to" })
    ///     );
    ///
    ///     cursor.dispose(&mut token);
    ///     front.dispose(&mut token);
    ///     stranger.dispose(&mut token);
    /// });
    /// ```
    pub fn set_to(
        &mut self,
        other: &Cursor<'_, 'id, T>,
        token: &mut GhostToken<'id>,
    ) -> Result<&mut Self, CursorError> {
        self.position()?;
        if !self.same_list_with(other) {
            return Err(CursorError::ForeignCursor { op: "set_to" });
        }
        let target = other.position()?;
        self.move_to(target, token)
    }

    /// Release the cursor's count on its slot. The cursor becomes inert:
    /// navigation and mutation fail with [`CursorError::Disposed`] from now
    /// on.
    ///
    /// Disposing twice is harmless.
    pub fn dispose(&mut self, token: &mut GhostToken<'id>) {
        if let Some(slot) = self.slot.take() {
            self.list.store.borrow_mut(token).unpin(slot);
        }
    }

    /// Create a new cursor on the same list, resting on the same slot.
    ///
    /// The two cursors move independently afterwards.
    pub fn duplicate(&self, token: &mut GhostToken<'id>) -> Result<Cursor<'a, 'id, T>, CursorError> {
        let slot = self.position()?;
        self.list.store.borrow_mut(token).pin(slot);
        Ok(Cursor::new(self.list, slot))
    }
}

// Methods that might change the list.
impl<'a, 'id, T: 'a> Cursor<'a, 'id, T> {
    /// Add an item just before the cursor position. The cursor stays put;
    /// the new item becomes its predecessor, and the new front if the cursor
    /// was at the front.
    ///
    /// This operation should compute in amortized *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::new();
    ///     let mut cursor = list.new_cursor(&mut token);
    ///
    ///     cursor.insert("b", &mut token).unwrap();
    ///     cursor.to_front(&mut token).unwrap();
    ///     cursor.insert("a", &mut token).unwrap(); // becomes (a, b), points to b
    ///     assert_eq!(cursor.get_item(&token), Ok(&"b"));
    ///     assert_eq!(list.render(&token), "(a, b)");
    ///     cursor.dispose(&mut token);
    /// });
    /// ```
    pub fn insert(&mut self, item: T, token: &mut GhostToken<'id>) -> Result<(), CursorError> {
        let current = self.position()?;
        self.list.store.borrow_mut(token).insert_before(current, item);
        Ok(())
    }

    /// Remove the item the cursor rests on and return it. The cursor moves
    /// on to the removed item's successor.
    ///
    /// Fails at the rear, and fails when any other cursor rests on the same
    /// slot; a failed removal changes nothing.
    ///
    /// This operation should compute in amortized *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{CursorError, GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::from_iter([1, 2, 3]);
    ///     let mut cursor = list.new_cursor(&mut token);
    ///     cursor.to_front(&mut token).unwrap();
    ///
    ///     assert_eq!(cursor.remove(&mut token), Ok(1)); // becomes (2, 3), points to 2
    ///     assert_eq!(cursor.get_item(&token), Ok(&2));
    ///
    ///     let mut other = cursor.duplicate(&mut token).unwrap();
    ///     assert!(matches!(
    ///         cursor.remove(&mut token),
    ///         Err(CursorError::SharedSlot { cursors: 2, .. })
    ///     ));
    ///
    ///     other.dispose(&mut token);
    ///     assert_eq!(cursor.remove(&mut token), Ok(2));
    ///     assert_eq!(list.render(&token), "(3)");
    ///     cursor.dispose(&mut token);
    /// });
    /// ```
    pub fn remove(&mut self, token: &mut GhostToken<'id>) -> Result<T, CursorError> {
        let current = self.position()?;
        if current == REAR {
            return Err(CursorError::AtRear { op: "remove" });
        }
        let store = self.list.store.borrow_mut(token);
        let cursors = store.refs(current);
        if cursors > 1 {
            return Err(CursorError::SharedSlot {
                slot: current,
                cursors,
            });
        }
        let next = store
            .next_of(current)
            .expect("occupied slot has a successor");
        store.unpin(current);
        store.pin(next);
        self.slot = Some(next);
        Ok(store.remove(current))
    }

    /// Replace the item the cursor rests on, returning the old one, or return
    /// an error at the rear.
    pub fn replace(&mut self, item: T, token: &mut GhostToken<'id>) -> Result<T, CursorError> {
        let current = self.position()?;
        if current == REAR {
            return Err(CursorError::AtRear { op: "replace" });
        }
        let replaced = self
            .list
            .store
            .borrow_mut(token)
            .swap_item(current, Some(item))
            .expect("occupied slot holds an item");
        Ok(replaced)
    }

    /// Exchange the items this cursor and `other` rest on. `other` may belong
    /// to a different list governed by the same token.
    ///
    /// Fails, changing nothing, if either cursor is at the rear.
    ///
    /// # Examples
    ///
    /// ```
    /// use positional_list::{GhostToken, PositionalList};
    ///
    /// GhostToken::new(|mut token| {
    ///     let list = PositionalList::from_iter(["x", "y"]);
    ///     let mut first = list.new_cursor(&mut token);
    ///     first.to_front(&mut token).unwrap();
    ///     let mut second = first.duplicate(&mut token).unwrap();
    ///     second.to_next(&mut token).unwrap();
    ///
    ///     first.swap_items(&second, &mut token).unwrap();
    ///     assert_eq!(list.render(&token), "(y, x)");
    ///
    ///     first.dispose(&mut token);
    ///     second.dispose(&mut token);
    /// });
    /// ```
    pub fn swap_items(
        &mut self,
        other: &Cursor<'_, 'id, T>,
        token: &mut GhostToken<'id>,
    ) -> Result<(), CursorError> {
        let mine = self.position()?;
        let theirs = other.position()?;
        if mine == REAR || theirs == REAR {
            return Err(CursorError::AtRear { op: "swap_items" });
        }
        if self.same_list_with(other) && mine == theirs {
            return Ok(());
        }
        let item = self.list.store.borrow_mut(token).swap_item(mine, None);
        let item = other.list.store.borrow_mut(token).swap_item(theirs, item);
        self.list.store.borrow_mut(token).swap_item(mine, item);
        Ok(())
    }
}

impl<'a, 'id, T: 'a> fmt::Debug for Cursor<'a, 'id, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("list", &(self.list as *const PositionalList<'id, T>))
            .field("slot", &self.slot)
            .finish()
    }
}

impl<'a, 'id, T: 'a> Drop for Cursor<'a, 'id, T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot {
            tracing::warn!(
                slot,
                "cursor dropped without being disposed; its slot stays pinned"
            );
        }
    }
}
