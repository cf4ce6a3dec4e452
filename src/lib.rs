pub mod crypto;
pub mod codec;
pub mod block;
pub mod store;
pub mod bag;
pub mod dex;
pub mod player;
pub mod items;
pub mod repair;
pub mod presets;

pub use block::{Block, BlockKey};
pub use codec::{decode, encode, is_hash_valid, CodecError, MAGIC};
pub use store::{HashDb, StoreError};
pub use bag::{BagEntry, BagSave, Category, Pocket};
pub use dex::{DexSave, SpeciesRecord};
pub use player::CoreData;
pub use items::{ItemInfo, ItemTable};
pub use repair::{repair_bag, RepairAction, RepairOptions};
