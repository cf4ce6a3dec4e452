//! Key-indexed view over one container's decoded blocks.
//!
//! Built once from `codec::decode` output and owned for the run's duration.
//! The block set is frozen at construction — only payload replacement is
//! supported — and `blocks()` returns the original decode order, which is
//! exactly what `codec::encode` expects back.

use std::collections::HashMap;
use thiserror::Error;

use crate::block::{Block, BlockKey};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("block {0:#010x} appears more than once")]
    DuplicateKey(u32),
    #[error("block {} ({:#010x}) not present in this save", .0.name(), .0.raw())]
    NotFound(BlockKey),
}

/// Ordered, key-indexed collection of a container's blocks.
pub struct HashDb {
    blocks: Vec<Block>,
    by_key: HashMap<u32, usize>,
}

impl HashDb {
    pub fn new(blocks: Vec<Block>) -> Result<Self, StoreError> {
        let mut by_key = HashMap::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            if by_key.insert(block.key(), i).is_some() {
                return Err(StoreError::DuplicateKey(block.key()));
            }
        }
        Ok(Self { blocks, by_key })
    }

    /// Look up a required section; absence is an error.
    pub fn get(&self, key: BlockKey) -> Result<&Block, StoreError> {
        self.find(key).ok_or(StoreError::NotFound(key))
    }

    pub fn get_mut(&mut self, key: BlockKey) -> Result<&mut Block, StoreError> {
        match self.by_key.get(&key.raw()) {
            Some(&i) => Ok(&mut self.blocks[i]),
            None => Err(StoreError::NotFound(key)),
        }
    }

    /// Probe for an optional section (e.g. one only present on some save
    /// slots).  Absence here is a normal result, not corruption.
    pub fn find(&self, key: BlockKey) -> Option<&Block> {
        self.find_raw(key.raw())
    }

    /// Probe by raw key, for sections without a [`BlockKey`] name.
    pub fn find_raw(&self, key: u32) -> Option<&Block> {
        self.by_key.get(&key).map(|&i| &self.blocks[i])
    }

    /// All blocks in original decode order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::KEY_BAG_ITEMS;

    #[test]
    fn rejects_duplicate_keys() {
        let blocks = vec![
            Block::new(KEY_BAG_ITEMS, vec![1]),
            Block::new(KEY_BAG_ITEMS, vec![2]),
        ];
        assert!(matches!(
            HashDb::new(blocks),
            Err(StoreError::DuplicateKey(KEY_BAG_ITEMS))
        ));
    }

    #[test]
    fn get_distinguishes_absence_from_presence() {
        let db = HashDb::new(vec![Block::new(KEY_BAG_ITEMS, vec![0xAB])]).unwrap();
        assert!(db.get(BlockKey::BagItems).is_ok());
        assert!(db.find(BlockKey::Pokedex).is_none());
        assert!(matches!(
            db.get(BlockKey::Pokedex),
            Err(StoreError::NotFound(BlockKey::Pokedex))
        ));
    }

    #[test]
    fn replace_marks_dirty_and_recomputes_checksum() {
        let mut db = HashDb::new(vec![Block::new(KEY_BAG_ITEMS, vec![1, 2, 3])]).unwrap();
        let before = db.get(BlockKey::BagItems).unwrap().checksum();

        db.get_mut(BlockKey::BagItems)
            .unwrap()
            .replace_data(vec![9, 9, 9]);

        let block = db.get(BlockKey::BagItems).unwrap();
        assert!(block.is_dirty());
        assert_ne!(block.checksum(), before);
        assert_eq!(block.data(), &[9, 9, 9]);
    }

    #[test]
    fn blocks_keep_decode_order() {
        let blocks = vec![
            Block::new(3, vec![]),
            Block::new(1, vec![]),
            Block::new(2, vec![]),
        ];
        let db = HashDb::new(blocks.clone()).unwrap();
        assert_eq!(db.blocks(), &blocks[..]);
    }
}
