use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::codec::CodecError;
use crate::crypto::KeyStream;
use crc32fast::Hasher;

// ── Frozen block keys ────────────────────────────────────────────────────────
//
// Hash-derived identifiers the engine uses to address save sections.  These
// values are permanent; the engine looks sections up by key, so a writer MUST
// echo every key it decoded, including ones it does not recognise.

/// Inventory ("bag") section.
pub const KEY_BAG_ITEMS: u32 = 0x45E3_1D0B;
/// Species dex flags and counters.
pub const KEY_POKEDEX: u32 = 0x9B2C_6F11;
/// Trainer core data (name, id, money, playtime).
pub const KEY_CORE_DATA: u32 = 0x2F8A_51C6;
/// Active party.
pub const KEY_PARTY: u32 = 0x6E95_03D2;
/// PC box storage.
pub const KEY_PC_BOXES: u32 = 0xB10D_77E4;
/// Options / system settings.
pub const KEY_OPTIONS: u32 = 0x53C0_A9F7;

/// Well-known section keys.
///
/// The save contains more sections than these; unknown keys are carried
/// through decode/encode untouched and are reachable via [`HashDb::find_raw`].
///
/// [`HashDb::find_raw`]: crate::store::HashDb::find_raw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKey {
    BagItems,
    Pokedex,
    CoreData,
    Party,
    PcBoxes,
    Options,
}

impl BlockKey {
    /// The raw on-disk key value.
    #[inline]
    pub fn raw(self) -> u32 {
        match self {
            BlockKey::BagItems => KEY_BAG_ITEMS,
            BlockKey::Pokedex  => KEY_POKEDEX,
            BlockKey::CoreData => KEY_CORE_DATA,
            BlockKey::Party    => KEY_PARTY,
            BlockKey::PcBoxes  => KEY_PC_BOXES,
            BlockKey::Options  => KEY_OPTIONS,
        }
    }

    /// Resolve a raw key to a known section, if it is one.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            KEY_BAG_ITEMS => Some(BlockKey::BagItems),
            KEY_POKEDEX   => Some(BlockKey::Pokedex),
            KEY_CORE_DATA => Some(BlockKey::CoreData),
            KEY_PARTY     => Some(BlockKey::Party),
            KEY_PC_BOXES  => Some(BlockKey::PcBoxes),
            KEY_OPTIONS   => Some(BlockKey::Options),
            _             => None,
        }
    }

    /// Human-readable name (for diagnostics only — never parsed).
    pub fn name(self) -> &'static str {
        match self {
            BlockKey::BagItems => "bag_items",
            BlockKey::Pokedex  => "pokedex",
            BlockKey::CoreData => "core_data",
            BlockKey::Party    => "party",
            BlockKey::PcBoxes  => "pc_boxes",
            BlockKey::Options  => "options",
        }
    }
}

// ── Block ────────────────────────────────────────────────────────────────────

/// One logical, key-addressed section of the decrypted body.
///
/// Wire layout: `key (u32 LE, clear)` followed by the block's keystream
/// XORed over `len (u32 LE) | payload | crc32(payload) (u32 LE)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    key:      u32,
    data:     Vec<u8>,
    checksum: u32,
    dirty:    bool,
}

impl Block {
    /// Build a fresh block with its checksum computed from `data`.
    pub fn new(key: u32, data: Vec<u8>) -> Self {
        let checksum = block_checksum(&data);
        Self { key, data, checksum, dirty: false }
    }

    pub fn key(&self) -> u32 {
        self.key
    }

    pub fn known_key(&self) -> Option<BlockKey> {
        BlockKey::from_raw(self.key)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the payload, marking the block dirty.
    ///
    /// The local checksum is recomputed immediately so no later failure can
    /// leave a stale checksum paired with new data.
    pub fn replace_data(&mut self, data: Vec<u8>) {
        self.checksum = block_checksum(&data);
        self.data = data;
        self.dirty = true;
    }

    /// Read one block from the decrypted-body cursor.
    pub(crate) fn read(cur: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let offset = cur.position();
        let key = cur
            .read_u32::<LittleEndian>()
            .map_err(|_| CodecError::Truncated { offset })?;

        let mut ks = KeyStream::new(key);

        let mut len_bytes = [0u8; 4];
        cur.read_exact(&mut len_bytes)
            .map_err(|_| CodecError::Truncated { offset })?;
        ks.apply(&mut len_bytes);
        let len = u32::from_le_bytes(len_bytes);

        // payload + trailing crc must fit in what is left of the body
        let remaining = cur.get_ref().len() as u64 - cur.position();
        if u64::from(len) + 4 > remaining {
            return Err(CodecError::BlockOverrun { key, len });
        }

        let mut data = vec![0u8; len as usize];
        cur.read_exact(&mut data)
            .map_err(|_| CodecError::Truncated { offset })?;
        ks.apply(&mut data);

        let mut crc_bytes = [0u8; 4];
        cur.read_exact(&mut crc_bytes)
            .map_err(|_| CodecError::Truncated { offset })?;
        ks.apply(&mut crc_bytes);
        let stored = u32::from_le_bytes(crc_bytes);

        let computed = block_checksum(&data);
        if stored != computed {
            return Err(CodecError::BlockChecksum { key, stored, computed });
        }

        Ok(Self { key, data, checksum: stored, dirty: false })
    }

    /// Append this block's wire form to `out`.
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.key.to_le_bytes());

        let mut body = Vec::with_capacity(8 + self.data.len());
        body.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.data);
        body.extend_from_slice(&self.checksum.to_le_bytes());

        KeyStream::new(self.key).apply(&mut body);
        out.extend_from_slice(&body);
    }
}

/// CRC32 of a block payload (the per-section "local" checksum).
pub(crate) fn block_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
