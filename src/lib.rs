//! This crate provides a positional list: a doubly-linked list whose items live
//! in the slots of a growable array, navigated and mutated through
//! reference-counted cursors.
//!
//! The [`PositionalList`] allows inserting and removing items at any cursor
//! position in amortized constant time. Any number of cursors may rest on a
//! list at once; a slot that more than one cursor rests on cannot be removed.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use positional_list::{GhostToken, PositionalList};
//!
//! GhostToken::new(|mut token| {
//!     let list = PositionalList::from_iter([1, 2, 3, 4]);
//!
//!     let mut cursor = list.new_cursor(&mut token);
//!     cursor.to_front(&mut token).unwrap();
//!
//!     cursor.insert(0, &mut token).unwrap(); // insert 0 at the front of the list
//!     assert_eq!(cursor.get_item(&token), Ok(&1));
//!     assert_eq!(list.render(&token), "(0, 1, 2, 3, 4)");
//!
//!     cursor.to_next(&mut token).unwrap().to_next(&mut token).unwrap();
//!     assert_eq!(cursor.remove(&mut token), Ok(3)); // points to 4 afterwards
//!     assert_eq!(cursor.get_item(&token), Ok(&4));
//!     assert_eq!(list.render(&token), "(0, 1, 2, 4)");
//!
//!     cursor.dispose(&mut token);
//! });
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph:
//! ```text
//!                  front ──────────────┐
//!      ┌─────────────┬─────────────┬───↓─────────┬─────────────┬─────────────┐
//!      │   slot 0    │   slot 1    │   slot 2    │   slot 3    │   slot 4    │
//!      │  (sentinel) │             │             │   (free)    │   (free)    │
//!      ├─────────────┼─────────────┼─────────────┼─────────────┼─────────────┤
//! item │     ──      │      B      │      A      │     ──      │     ──      │
//! prev │      1      │      2      │     ──      │     ──      │     ──      │
//! next │     ──      │      0      │      1      │      4      │     ──      │
//! refs │      1      │      0      │      2      │      0      │      0      │
//!      └─────────────┴─────────────┴─────────────┴─────────────┴─────────────┘
//!                                                     ↑
//!    free head ───────────────────────────────────────┘
//! ```
//! The store holds:
//! - slot 0, the rear sentinel. It never holds an item; its `prev` is the last
//!   item of the list, and a cursor resting on it is *at the rear*;
//! - the occupied slots, linked from `front` to the sentinel by their `next`
//!   and `prev` indices, in list order rather than array order;
//! - the free slots, chained through their `next` indices from the free head.
//!
//! Every slot counts the cursors resting on it (`refs`). In the graph above one
//! cursor rests at the rear and two rest on `A`.
//!
//! In a list with length *n*, there are *n* + 1 valid places for a cursor: the
//! *n* items and the rear sentinel.
//!
//! The store doubles when no slot is free, and halves while fewer than a
//! quarter of its slots hold items, down to a minimum capacity (see
//! [`StoreConfig`]). Before halving, items in the upper half move down into
//! free slots. A slot a cursor rests on never moves; while one sits in the upper
//! half, shrinking waits.
//!
//! # Access Control
//!
//! A list does not guard itself. Every operation takes the [`GhostToken`] of
//! the list's brand: observers take `&GhostToken`, mutators take
//! `&mut GhostToken`. Lists created within one [`GhostToken::new`] closure share
//! the brand, so one token serializes every access to all of them, and a
//! cursor of one may exchange items with a cursor of another.
//!
//! ```
//! use positional_list::{GhostToken, PositionalList};
//!
//! GhostToken::new(|mut token| {
//!     let left = PositionalList::from_iter(['a', 'b']);
//!     let right = PositionalList::from_iter(['x', 'y']);
//!
//!     let mut l = left.new_cursor(&mut token);
//!     let mut r = right.new_cursor(&mut token);
//!     l.to_front(&mut token).unwrap();
//!     r.to_front(&mut token).unwrap();
//!     l.swap_items(&r, &mut token).unwrap();
//!
//!     assert_eq!(left.render(&token), "(x, b)");
//!     assert_eq!(right.render(&token), "(a, y)");
//!
//!     l.dispose(&mut token);
//!     r.dispose(&mut token);
//! });
//! ```
//!
//! # Cursor Lifecycle
//!
//! A cursor is created by [`PositionalList::new_cursor`] at the rear, or by
//! [`Cursor::duplicate`] at another cursor's position, and released by
//! [`Cursor::dispose`]. A cursor dropped without being disposed keeps its slot
//! pinned for good and logs a warning. [`PositionalList::with_cursor`] scopes a
//! cursor to a closure and disposes of it afterwards.
//!
//! # Cursor Mutations
//!
//! [`Cursor`] provides the ways to mutate the list at its position.
//! - [`insert`]: insert a new item before the cursor;
//! - [`remove`]: remove the item at the cursor, moving on to its successor;
//! - [`replace`]: replace the item at the cursor;
//! - [`swap_items`]: exchange the items at two cursors;
//!
//! [`insert`]: crate::list::cursor::Cursor::insert
//! [`remove`]: crate::list::cursor::Cursor::remove
//! [`replace`]: crate::list::cursor::Cursor::replace
//! [`swap_items`]: crate::list::cursor::Cursor::swap_items

#[doc(inline)]
pub use config::StoreConfig;
#[doc(inline)]
pub use error::{ConfigError, CursorError, CursorErrorKind, InvariantError};
pub use ghost_cell::GhostToken;
#[doc(inline)]
pub use list::{cursor::Cursor, PositionalList};

pub mod config;
pub mod error;
pub mod list;
