//! Error types of the positional list.

use thiserror::Error;

/// The broad class a [`CursorError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorErrorKind {
    /// The cursor's position (or disposal) forbids the operation.
    CursorState,
    /// Another cursor rests on the slot the operation would destroy.
    ConcurrentCursor,
    /// The argument cursor belongs to a different list.
    InvalidArgument,
}

/// Errors reported by cursor operations.
///
/// A failed operation never changes the list or any reference count.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    #[error("`{op}` requires the cursor not to be at the rear")]
    AtRear { op: &'static str },
    #[error("`{op}` requires the cursor not to be at the front")]
    AtFront { op: &'static str },
    #[error("cannot remove slot {slot}: {cursors} cursors rest on it")]
    SharedSlot { slot: usize, cursors: usize },
    #[error("`{op}` requires a cursor over the same list")]
    ForeignCursor { op: &'static str },
    #[error("the cursor has been disposed")]
    Disposed,
}

impl CursorError {
    pub fn kind(&self) -> CursorErrorKind {
        match self {
            CursorError::AtRear { .. } | CursorError::AtFront { .. } | CursorError::Disposed => {
                CursorErrorKind::CursorState
            }
            CursorError::SharedSlot { .. } => CursorErrorKind::ConcurrentCursor,
            CursorError::ForeignCursor { .. } => CursorErrorKind::InvalidArgument,
        }
    }
}

/// Errors reported when a [`StoreConfig`](crate::StoreConfig) is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("minimum capacity {min} cannot hold the rear sentinel and one item")]
    MinimumTooSmall { min: usize },
    #[error("initial capacity {initial} is below the minimum capacity {min}")]
    InitialBelowMinimum { initial: usize, min: usize },
}

/// A broken structural invariant, found by
/// [`PositionalList::check_invariants`](crate::PositionalList::check_invariants).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    #[error("capacity {capacity} is below the minimum capacity {min}")]
    CapacityBelowMinimum { capacity: usize, min: usize },
    #[error("capacity {capacity} cannot hold {len} items and the rear sentinel")]
    CapacityExhausted { capacity: usize, len: usize },
    #[error("the rear sentinel holds an item or a successor")]
    OccupiedSentinel,
    #[error("slot {slot} is badly linked")]
    BrokenLink { slot: usize },
    #[error("walked {walked} items but the list records {recorded}")]
    LengthMismatch { walked: usize, recorded: usize },
    #[error("slot {slot} is on the free chain but is occupied, pinned or repeated")]
    FreeSlotInUse { slot: usize },
    #[error("slot {slot} is neither linked nor on the free chain")]
    OrphanSlot { slot: usize },
}
