//! Static item lookup: item id → expected pocket and names.
//!
//! Loaded once from the JSON table embedded at build time (or any caller
//! supplied JSON with the same shape) and passed explicitly into repair
//! logic.  The table is immutable for the process lifetime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bag::Pocket;

/// One item's catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: u16,
    /// The pocket the engine expects this item's bag slot to carry.
    #[serde(rename = "pocket")]
    pub expected_pocket: Pocket,
    /// Internal romaji name as dumped from the game data.
    #[serde(rename = "canonical")]
    pub canonical_name: String,
    /// English UI name, for log lines.
    #[serde(rename = "english")]
    pub english_name: String,
}

impl ItemInfo {
    /// Mega stones carry internal names ending in `NAITO`, with the X/Y
    /// variants suffixed by a lowercase `x`/`y`.
    pub fn is_mega_stone(&self) -> bool {
        self.canonical_name
            .trim_matches(|c| c == 'x' || c == 'y')
            .ends_with("NAITO")
    }
}

/// Immutable id → [`ItemInfo`] lookup.
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    by_id: BTreeMap<u16, ItemInfo>,
}

impl ItemTable {
    /// Build from explicit rows (tests and future external catalogs).
    pub fn from_entries(entries: Vec<ItemInfo>) -> Self {
        let by_id = entries.into_iter().map(|e| (e.id, e)).collect();
        Self { by_id }
    }

    /// Parse a JSON array of catalog rows.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ItemInfo> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// The catalog shipped with this crate.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(include_str!("../data/items.json"))
    }

    pub fn get(&self, id: usize) -> Option<&ItemInfo> {
        u16::try_from(id).ok().and_then(|id| self.by_id.get(&id))
    }

    pub fn contains(&self, id: usize) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemInfo> {
        self.by_id.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let table = ItemTable::builtin().unwrap();
        assert!(!table.is_empty());
        // Master Ball is id 1 in every mainline game
        let master_ball = table.get(1).unwrap();
        assert_eq!(master_ball.expected_pocket, Pocket::Balls);
        assert_eq!(master_ball.english_name, "Master Ball");
    }

    #[test]
    fn mega_stone_detection() {
        let table = ItemTable::builtin().unwrap();
        let mega: Vec<_> = table.iter().filter(|i| i.is_mega_stone()).collect();
        assert!(!mega.is_empty());
        assert!(mega.iter().all(|i| i.expected_pocket == Pocket::Mega));
        // the x/y variant suffix must not defeat detection
        assert!(table.get(660).unwrap().is_mega_stone());
        // and ordinary balls are not stones
        assert!(!table.get(1).unwrap().is_mega_stone());
    }

    #[test]
    fn unknown_ids_are_absent() {
        let table = ItemTable::builtin().unwrap();
        assert!(table.get(0).is_none());
        assert!(table.get(60_000).is_none());
        assert!(table.get(usize::MAX).is_none());
    }
}
