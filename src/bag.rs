//! Typed view over the inventory ("bag") section.
//!
//! The section is a fixed table: 3008 item slots × 16 bytes = 48128 bytes,
//! where the slot index IS the item id.  Each slot stores a quantity, a
//! pocket category, and 8 reserved bytes the engine owns; edits here rewrite
//! only the targeted slot's span and leave every other byte untouched.
//!
//! The category field is decoded verbatim.  Codepoints outside the known
//! pocket set — negative values in every corrupt save observed so far — are
//! surfaced as [`Category::Corrupt`] so repair tooling can load and fix such
//! saves instead of being locked out of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Exact byte length of the bag section.
pub const BAG_SIZE: usize = 48_128;
/// Byte length of one item slot.
pub const ENTRY_SIZE: usize = 16;
/// Number of item slots; slot index == item id.
pub const ENTRY_COUNT: usize = BAG_SIZE / ENTRY_SIZE;

#[derive(Error, Debug)]
pub enum BagError {
    #[error("bag section must be {BAG_SIZE} bytes, got {0}")]
    WrongLength(usize),
}

// ── Pockets ──────────────────────────────────────────────────────────────────

/// The legal pocket codepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pocket {
    None,
    Medicine,
    Balls,
    Battle,
    Berries,
    Other,
    Tms,
    Treasures,
    KeyItems,
    Mega,
}

impl Pocket {
    #[inline]
    pub fn raw(self) -> i32 {
        match self {
            Pocket::None      => 0,
            Pocket::Medicine  => 1,
            Pocket::Balls     => 2,
            Pocket::Battle    => 3,
            Pocket::Berries   => 4,
            Pocket::Other     => 5,
            Pocket::Tms       => 6,
            Pocket::Treasures => 7,
            Pocket::KeyItems  => 8,
            Pocket::Mega      => 9,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Pocket::None),
            1 => Some(Pocket::Medicine),
            2 => Some(Pocket::Balls),
            3 => Some(Pocket::Battle),
            4 => Some(Pocket::Berries),
            5 => Some(Pocket::Other),
            6 => Some(Pocket::Tms),
            7 => Some(Pocket::Treasures),
            8 => Some(Pocket::KeyItems),
            9 => Some(Pocket::Mega),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pocket::None      => "none",
            Pocket::Medicine  => "medicine",
            Pocket::Balls     => "balls",
            Pocket::Battle    => "battle",
            Pocket::Berries   => "berries",
            Pocket::Other     => "other",
            Pocket::Tms       => "tms",
            Pocket::Treasures => "treasures",
            Pocket::KeyItems  => "key_items",
            Pocket::Mega      => "mega",
        }
    }
}

/// A slot's category field: either a legal pocket or the raw bits of an
/// out-of-domain codepoint.  Corrupt is a data value, never a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Known(Pocket),
    Corrupt(i32),
}

impl Category {
    pub fn from_raw(raw: i32) -> Self {
        match Pocket::from_raw(raw) {
            Some(pocket) => Category::Known(pocket),
            None => Category::Corrupt(raw),
        }
    }

    #[inline]
    pub fn raw(self) -> i32 {
        match self {
            Category::Known(pocket) => pocket.raw(),
            Category::Corrupt(raw) => raw,
        }
    }

    pub fn is_corrupt(self) -> bool {
        matches!(self, Category::Corrupt(_))
    }

    pub fn pocket(self) -> Option<Pocket> {
        match self {
            Category::Known(pocket) => Some(pocket),
            Category::Corrupt(_) => None,
        }
    }
}

impl PartialEq<Pocket> for Category {
    fn eq(&self, other: &Pocket) -> bool {
        matches!(self, Category::Known(pocket) if pocket == other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Known(pocket) => f.write_str(pocket.name()),
            Category::Corrupt(raw) => write!(f, "corrupt({raw})"),
        }
    }
}

// ── Entries ──────────────────────────────────────────────────────────────────

/// One decoded item slot.
///
/// Slot layout: quantity (u32 LE) | category (i32 LE) | 8 reserved bytes.
/// The reserved bytes are carried through round trips untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagEntry {
    pub quantity: u32,
    pub category: Category,
    reserved: [u8; 8],
}

impl BagEntry {
    pub fn from_bytes(b: &[u8]) -> Self {
        debug_assert_eq!(b.len(), ENTRY_SIZE);
        let quantity = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        let category = Category::from_raw(i32::from_le_bytes([b[4], b[5], b[6], b[7]]));
        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&b[8..16]);
        Self { quantity, category, reserved }
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut out = [0u8; ENTRY_SIZE];
        out[0..4].copy_from_slice(&self.quantity.to_le_bytes());
        out[4..8].copy_from_slice(&self.category.raw().to_le_bytes());
        out[8..16].copy_from_slice(&self.reserved);
        out
    }
}

// ── BagSave ──────────────────────────────────────────────────────────────────

/// Parsed bag section.  Owns a copy of the section bytes; the caller writes
/// the result back into the container via `Block::replace_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagSave {
    buf: Vec<u8>,
}

impl BagSave {
    pub fn from_bytes(data: &[u8]) -> Result<Self, BagError> {
        if data.len() != BAG_SIZE {
            return Err(BagError::WrongLength(data.len()));
        }
        Ok(Self { buf: data.to_vec() })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Number of slots (fixed).
    pub fn len(&self) -> usize {
        ENTRY_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Decode the slot for `item` (panics if `item >= ENTRY_COUNT`).
    pub fn entry(&self, item: usize) -> BagEntry {
        assert!(item < ENTRY_COUNT, "item id {item} out of bag range");
        let start = item * ENTRY_SIZE;
        BagEntry::from_bytes(&self.buf[start..start + ENTRY_SIZE])
    }

    /// Rewrite exactly one slot's 16-byte span.
    pub fn set_entry(&mut self, item: usize, entry: &BagEntry) {
        assert!(item < ENTRY_COUNT, "item id {item} out of bag range");
        let start = item * ENTRY_SIZE;
        self.buf[start..start + ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
    }

    /// Iterate `(item id, entry)` in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, BagEntry)> + '_ {
        (0..ENTRY_COUNT).map(move |i| (i, self.entry(i)))
    }
}

impl fmt::Display for BagSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut occupied = 0usize;
        let mut corrupt = 0usize;
        for (_, entry) in self.entries() {
            if entry.quantity > 0 {
                occupied += 1;
            }
            if entry.category.is_corrupt() {
                corrupt += 1;
            }
        }
        write!(
            f,
            "bag: {occupied}/{ENTRY_COUNT} slots occupied, {corrupt} corrupt"
        )
    }
}
