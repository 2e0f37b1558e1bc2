#![forbid(unsafe_code)]

//! Key records and the key directory.
//!
//! An overlay's keys form an ordered table. Navigation stores neighbor
//! *identifiers*, not indices, so layout data can be authored without
//! knowing table order; [`KeyTable::resolve`] turns an identifier back into
//! a table index.
//!
//! # Invariants
//!
//! 1. Tables are never empty (enforced at overlay construction).
//! 2. `resolve` always returns a valid index: unknown identifiers fall back
//!    to index 0. This is a deliberate safe-fallback policy, not an error
//!    path; the table is static, caller-supplied data.

use bitflags::bitflags;

use crate::event::{OutputKey, ScanCode};

/// Identifier of a key within one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct KeyId(pub u16);

impl KeyId {
    /// Reserved identifier that never names a real key.
    ///
    /// Layout data uses it for "no neighbor in this direction"; resolving it
    /// takes the first-entry fallback. Historically this value terminated
    /// the key table, so authored layouts already avoid it.
    pub const END: KeyId = KeyId(0xFFFF);
}

/// One on-screen key.
///
/// Caller-supplied and immutable; all mutable per-key state (pressed,
/// selected) lives in the session, keyed by table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// Identifier, unique within the overlay.
    pub id: KeyId,
    /// Neighbor reached by navigating up.
    pub up: KeyId,
    /// Neighbor reached by navigating down.
    pub down: KeyId,
    /// Neighbor reached by navigating left.
    pub left: KeyId,
    /// Neighbor reached by navigating right.
    pub right: KeyId,
    /// Host key emitted when this key is pressed.
    pub mapped: OutputKey,
    /// Raw keyboard input mapped 1:1 to this key while the overlay is
    /// hidden.
    pub scan: ScanCode,
    /// Toggle semantics: stays latched until explicitly toggled off instead
    /// of auto-releasing (modifiers such as Shift or Ctrl).
    pub toggle: bool,
}

bitflags! {
    /// Per-key transient flags, owned by the session (one entry per key).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyMeta: u8 {
        /// Latching key: pressed state persists until toggled off.
        const TOGGLE = 1;
        /// Currently emitting as held.
        const PRESSED = 2;
        /// Has navigation focus. Only ever set inside a draw call; never
        /// observable between frames.
        const SELECTED = 4;
    }
}

/// The ordered key table of one overlay.
#[derive(Debug, Clone, Copy)]
pub struct KeyTable<'a> {
    keys: &'a [Key],
}

impl<'a> KeyTable<'a> {
    /// Wrap a slice of key records.
    ///
    /// # Panics
    ///
    /// Panics if the slice is empty.
    pub fn new(keys: &'a [Key]) -> Self {
        assert!(!keys.is_empty(), "key table must not be empty");
        Self { keys }
    }

    /// Number of keys.
    #[inline]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; empty tables are rejected at construction.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The underlying records in table order.
    #[inline]
    pub const fn records(&self) -> &'a [Key] {
        self.keys
    }

    /// The key at a table index.
    #[inline]
    pub fn get(&self, index: usize) -> &'a Key {
        &self.keys[index]
    }

    /// Resolve an identifier to a table index.
    ///
    /// Linear scan in table order. An identifier not present in the table
    /// (including [`KeyId::END`]) resolves to index 0.
    pub fn resolve(&self, id: KeyId) -> usize {
        match self.keys.iter().position(|k| k.id == id) {
            Some(index) => index,
            None => {
                crate::trace!(id = id.0, "unknown key id, falling back to first entry");
                0
            }
        }
    }
}
