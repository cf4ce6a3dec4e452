//! Whole-container decode / encode and the cheap integrity probe.
//!
//! # Decode order
//! 1. Length and magic are checked first — a file that is not a PLZA save is
//!    reported before any decryption is attempted.
//! 2. The container-level body hash is verified over the raw bytes.
//! 3. The body is partitioned into blocks; each block's keystream is removed
//!    and its local CRC verified.  Duplicate keys in the stream are refused.
//!
//! # Encode
//! Blocks are written back in caller order, verbatim — the engine depends on
//! positional layout in addition to the key set, so the order is never sorted
//! or deduplicated here.  `encode` is the exact inverse of `decode` for
//! unmodified input; the engine performs its own verification on load and
//! rejects any file whose checksums do not match.

use std::collections::HashSet;
use std::io::Cursor;
use thiserror::Error;

use crate::block::Block;
use crate::crypto::{self, HASH_LEN};

/// 5-byte container signature.
pub const MAGIC: &[u8; 5] = &[0x17, 0x2D, 0xBB, 0x06, 0xEA];

/// Smallest container that can carry the signature and the hash tail.
pub const MIN_CONTAINER_LEN: usize = MAGIC.len() + HASH_LEN;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("file too short to be a save container: {0} bytes")]
    TooShort(usize),
    #[error("invalid magic number")]
    InvalidMagic,
    #[error("container hash mismatch — file is corrupt or tampered")]
    BodyHashMismatch,
    #[error("truncated block stream at body offset {offset}")]
    Truncated { offset: u64 },
    #[error("block {key:#010x} length {len} overruns the container body")]
    BlockOverrun { key: u32, len: u32 },
    #[error("block {key:#010x} appears twice in the stream")]
    DuplicateKey { key: u32 },
    #[error("block {key:#010x} checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    BlockChecksum { key: u32, stored: u32, computed: u32 },
}

/// Decode a raw save container into its ordered block sequence.
pub fn decode(raw: &[u8]) -> Result<Vec<Block>, CodecError> {
    if raw.len() < MIN_CONTAINER_LEN {
        return Err(CodecError::TooShort(raw.len()));
    }
    if &raw[..MAGIC.len()] != MAGIC {
        return Err(CodecError::InvalidMagic);
    }

    let tail = raw.len() - HASH_LEN;
    if crypto::body_hash(&raw[..tail]) != raw[tail..] {
        return Err(CodecError::BodyHashMismatch);
    }

    let body = &raw[MAGIC.len()..tail];
    let mut cur = Cursor::new(body);
    let mut blocks = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    while (cur.position() as usize) < body.len() {
        let block = Block::read(&mut cur)?;
        if !seen.insert(block.key()) {
            return Err(CodecError::DuplicateKey { key: block.key() });
        }
        blocks.push(block);
    }

    Ok(blocks)
}

/// Encode blocks back into a raw save container, preserving caller order.
pub fn encode(blocks: &[Block]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    for block in blocks {
        block.write(&mut out);
    }
    let hash = crypto::body_hash(&out);
    out.extend_from_slice(&hash);
    out
}

/// Non-throwing probe of the container-level hash alone.
///
/// Diagnostics only — this never gates a write, and it does not partition or
/// verify individual blocks.
pub fn is_hash_valid(raw: &[u8]) -> bool {
    if raw.len() < MIN_CONTAINER_LEN {
        return false;
    }
    let tail = raw.len() - HASH_LEN;
    crypto::body_hash(&raw[..tail]) == raw[tail..]
}
