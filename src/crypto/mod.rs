//! Keystream cipher and container hash for PLZA save files.
//!
//! Encryption: per-block xorshift32 keystream, seeded from the block key
//! mixed with a fixed 16-byte constant dumped from the game binary.  XOR is
//! its own inverse, so the same transform serves both directions.
//!
//! Integrity:  BLAKE3( HASH_HEAD | file[..n-32] | HASH_TAIL ) stored as the
//! final 32 bytes of the file.  The engine recomputes this on load and
//! rejects the save on mismatch.
//!
//! Container layout: [ magic (5 B) | block stream | body hash (32 B) ]

/// 16-byte keystream seed constant (little endian, from game dump).
pub const STREAM_KEY: [u8; 16] = [
    0x5e, 0xc1, 0x7a, 0xd4, 0x09, 0xb3, 0x6f, 0x22, 0xe8, 0x91, 0x3c, 0x57, 0xaa, 0x04, 0xcd, 0x76,
];

/// Salt prepended to the hashed region.
pub const HASH_HEAD: [u8; 16] = [
    0x33, 0x8f, 0xd1, 0x0c, 0x64, 0xe9, 0x12, 0xb7, 0x4a, 0xf5, 0x90, 0x2b, 0xc6, 0x71, 0x1d, 0xe0,
];

/// Salt appended to the hashed region.
pub const HASH_TAIL: [u8; 16] = [
    0xa7, 0x42, 0xfe, 0x19, 0x8b, 0x30, 0xd5, 0x6e, 0x03, 0xbc, 0x27, 0xf0, 0x5d, 0x98, 0x44, 0xe1,
];

/// Byte length of the body hash at the end of every container.
pub const HASH_LEN: usize = 32;

/// Fallback seed used when key mixing collapses the register to zero.
const SEED_FALLBACK: u32 = 0x6C07_8965;

/// Per-block keystream generator.
///
/// The engine derives one stream per block from the block's own key, so a
/// block can be re-encrypted in place without touching its neighbours.
pub struct KeyStream {
    state: u32,
    word:  [u8; 4],
    pos:   usize,
}

impl KeyStream {
    pub fn new(key: u32) -> Self {
        let mut state = key;
        for chunk in STREAM_KEY.chunks_exact(4) {
            state ^= u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            state = state.rotate_left(7).wrapping_mul(0x9E37_79B9);
        }
        // xorshift32 never leaves the zero state
        if state == 0 {
            state = SEED_FALLBACK;
        }
        Self { state, word: [0u8; 4], pos: 4 }
    }

    fn next_word(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_byte(&mut self) -> u8 {
        if self.pos == 4 {
            self.word = self.next_word().to_le_bytes();
            self.pos = 0;
        }
        let b = self.word[self.pos];
        self.pos += 1;
        b
    }

    /// XOR `buf` in place with the next `buf.len()` keystream bytes.
    pub fn apply(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b ^= self.next_byte();
        }
    }
}

/// Compute the container-level hash over everything before the 32-byte tail.
pub fn body_hash(prefix: &[u8]) -> [u8; HASH_LEN] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&HASH_HEAD);
    hasher.update(prefix);
    hasher.update(&HASH_TAIL);
    *hasher.finalize().as_bytes()
}
