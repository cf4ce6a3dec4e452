//! End-to-end pipelines: decode → parse → mutate → serialize → replace →
//! encode → decode again, over realistic containers.

use std::fs;

use plaza_save::bag::{BagSave, Category, Pocket, BAG_SIZE, ENTRY_SIZE};
use plaza_save::block::{Block, BlockKey};
use plaza_save::codec::{decode, encode, is_hash_valid};
use plaza_save::dex::{DexSave, SpeciesRecord, DEX_SIZE, SPECIES_CAPACITY};
use plaza_save::items::ItemTable;
use plaza_save::player::{CoreData, CORE_DATA_SIZE};
use plaza_save::repair::{repair_bag, RepairAction, RepairOptions};
use plaza_save::store::HashDb;

/// A plausible save: core data, bag, dex, plus one section this tooling
/// does not understand and must carry through untouched.
fn sample_container(bag_bytes: Vec<u8>, dex_bytes: Vec<u8>) -> Vec<u8> {
    let mut core = vec![0u8; CORE_DATA_SIZE];
    {
        let mut parsed = CoreData::from_bytes(&core).unwrap();
        parsed.set_name("Tester").unwrap();
        parsed.set_trainer_id(271_828);
        parsed.set_money(5000);
        core = parsed.to_bytes();
    }
    let blocks = vec![
        Block::new(BlockKey::CoreData.raw(), core),
        Block::new(BlockKey::BagItems.raw(), bag_bytes),
        Block::new(BlockKey::Pokedex.raw(), dex_bytes),
        Block::new(0xDEAD_0001, b"opaque engine state".to_vec()),
    ];
    encode(&blocks)
}

#[test]
fn corrupt_bag_entry_is_repaired_through_the_full_pipeline() {
    // 48128 zero bytes, except entry 5 carries the corrupt category sentinel
    let mut bag_bytes = vec![0u8; BAG_SIZE];
    bag_bytes[5 * ENTRY_SIZE + 4..5 * ENTRY_SIZE + 8].copy_from_slice(&(-1i32).to_le_bytes());
    let raw = sample_container(bag_bytes, vec![0u8; DEX_SIZE]);

    let mut db = HashDb::new(decode(&raw).unwrap()).unwrap();
    let mut bag = BagSave::from_bytes(db.get(BlockKey::BagItems).unwrap().data()).unwrap();
    assert_eq!(bag.entry(5).category, Category::Corrupt(-1));

    let items = ItemTable::builtin().unwrap();
    let expected = items.get(5).unwrap().expected_pocket;
    let actions = repair_bag(&mut bag, &items, &RepairOptions::default());
    assert_eq!(
        actions,
        vec![RepairAction::PreemptiveCategoryFix { item: 5, to: expected }]
    );

    db.get_mut(BlockKey::BagItems)
        .unwrap()
        .replace_data(bag.to_bytes());
    let rewritten = encode(db.blocks());
    assert!(is_hash_valid(&rewritten));

    // the corrected state survives a fresh decode
    let db2 = HashDb::new(decode(&rewritten).unwrap()).unwrap();
    let bag2 = BagSave::from_bytes(db2.get(BlockKey::BagItems).unwrap().data()).unwrap();
    for (i, entry) in bag2.entries() {
        if i == 5 {
            assert_eq!(entry.category, expected);
            assert_eq!(entry.quantity, 0);
        } else {
            assert_eq!(entry.quantity, 0);
            assert_eq!(entry.category, Pocket::None);
        }
    }

    // untouched sections are byte-identical, in the original order
    let before = decode(&raw).unwrap();
    let after = db2.blocks();
    assert_eq!(after.len(), before.len());
    for (a, b) in after.iter().zip(&before) {
        assert_eq!(a.key(), b.key());
        if a.key() != BlockKey::BagItems.raw() {
            assert_eq!(a.data(), b.data());
        }
    }
}

#[test]
fn dex_flags_roundtrip_and_out_of_range_is_refused() {
    let raw = sample_container(vec![0u8; BAG_SIZE], vec![0u8; DEX_SIZE]);

    let mut db = HashDb::new(decode(&raw).unwrap()).unwrap();
    let mut dex = DexSave::from_bytes(db.get(BlockKey::Pokedex).unwrap().data()).unwrap();

    let mut rec = dex.record(1).unwrap();
    rec.set_captured(0, true);
    rec.set_battled(0, true);
    rec.set_shiny(0, true);
    dex.set_record(1, &rec).unwrap();

    // out-of-range access reports out of range and leaves the table alone
    let snapshot = dex.to_bytes();
    assert!(dex.is_out_of_range(SPECIES_CAPACITY + 1));
    assert!(dex.record(SPECIES_CAPACITY + 1).is_err());
    assert_eq!(dex.to_bytes(), snapshot);

    db.get_mut(BlockKey::Pokedex)
        .unwrap()
        .replace_data(dex.to_bytes());
    let rewritten = encode(db.blocks());

    let db2 = HashDb::new(decode(&rewritten).unwrap()).unwrap();
    let dex2 = DexSave::from_bytes(db2.get(BlockKey::Pokedex).unwrap().data()).unwrap();

    let rec2 = dex2.record(1).unwrap();
    assert!(rec2.captured(0) && rec2.battled(0) && rec2.shiny(0));
    assert_eq!(rec2.capture_count, 0);
    assert_eq!(rec2.defeat_count, 0);
    for species in 2..=SPECIES_CAPACITY {
        assert_eq!(dex2.record(species).unwrap(), SpeciesRecord::default());
    }
}

#[test]
fn optional_sections_probe_as_absent_without_error() {
    let blocks = vec![Block::new(BlockKey::BagItems.raw(), vec![0u8; BAG_SIZE])];
    let raw = encode(&blocks);
    let db = HashDb::new(decode(&raw).unwrap()).unwrap();

    assert!(db.find(BlockKey::Party).is_none());
    assert!(db.get(BlockKey::Party).is_err());
    assert!(db.find(BlockKey::BagItems).is_some());
    assert!(db.find_raw(0xDEAD_0001).is_none());
}

#[test]
fn repaired_container_survives_a_disk_roundtrip() {
    let mut bag_bytes = vec![0u8; BAG_SIZE];
    // an occupied potion slot filed under the wrong pocket
    bag_bytes[17 * ENTRY_SIZE..17 * ENTRY_SIZE + 4].copy_from_slice(&2u32.to_le_bytes());
    bag_bytes[17 * ENTRY_SIZE + 4..17 * ENTRY_SIZE + 8]
        .copy_from_slice(&Pocket::Berries.raw().to_le_bytes());
    let raw = sample_container(bag_bytes, vec![0u8; DEX_SIZE]);

    let mut db = HashDb::new(decode(&raw).unwrap()).unwrap();
    let mut bag = BagSave::from_bytes(db.get(BlockKey::BagItems).unwrap().data()).unwrap();
    let actions = repair_bag(&mut bag, &ItemTable::builtin().unwrap(), &RepairOptions::default());
    assert_eq!(actions.len(), 1);
    db.get_mut(BlockKey::BagItems)
        .unwrap()
        .replace_data(bag.to_bytes());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main");
    fs::write(&path, encode(db.blocks())).unwrap();

    let read_back = fs::read(&path).unwrap();
    assert!(is_hash_valid(&read_back));
    let db2 = HashDb::new(decode(&read_back).unwrap()).unwrap();
    let bag2 = BagSave::from_bytes(db2.get(BlockKey::BagItems).unwrap().data()).unwrap();
    assert_eq!(bag2.entry(17).category, Pocket::Medicine);
    assert_eq!(bag2.entry(17).quantity, 2);
}
