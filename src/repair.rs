//! Bag repair rules.
//!
//! Corrupt category codepoints crash the in-game bag menu, so the rules
//! below restore every slot to the catalog's expected state while touching
//! as few bytes as possible.  The engine is pure: it mutates the parsed
//! [`BagSave`] and returns an action log; the caller decides whether to
//! write anything back.

use serde::Serialize;
use std::fmt;

use crate::bag::{BagSave, Category, Pocket};
use crate::items::{ItemInfo, ItemTable};

/// Tuning knobs, one per CLI flag.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Clamp mega stone quantities back to 1.  Off under `--keep-mega`.
    pub fix_mega_quantity: bool,
    /// Fix corrupt categories on slots whose item has not been obtained
    /// yet, so the engine cannot trip over them later.  Off under
    /// `--no-preemptive-edit`.
    pub preemptive_category_fix: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            fix_mega_quantity: true,
            preemptive_category_fix: true,
        }
    }
}

/// One applied edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    /// Corrupt category on an obtained item, restored from the catalog.
    RestoredCategory { item: u16, to: Pocket },
    /// Corrupt mega stone: category restored and quantity forced to 1.
    RestoredMegaStone { item: u16 },
    /// Corrupt category on an id the catalog does not know; the quantity is
    /// zeroed so the engine never renders the slot.
    ClearedCorruptUnknown { item: u16 },
    /// Occupied slot for an id the catalog does not know.
    ClearedUnknownItem { item: u16 },
    /// Legal but wrong category on an obtained item.
    FixedCategory { item: u16, from: i32, to: Pocket },
    /// Mega stone duplicated beyond the one the game can award.
    ClampedMegaQuantity { item: u16 },
    /// Corrupt category fixed before the item was ever obtained.
    PreemptiveCategoryFix { item: u16, to: Pocket },
}

impl RepairAction {
    pub fn item(&self) -> u16 {
        match *self {
            RepairAction::RestoredCategory { item, .. }
            | RepairAction::RestoredMegaStone { item }
            | RepairAction::ClearedCorruptUnknown { item }
            | RepairAction::ClearedUnknownItem { item }
            | RepairAction::FixedCategory { item, .. }
            | RepairAction::ClampedMegaQuantity { item }
            | RepairAction::PreemptiveCategoryFix { item, .. } => item,
        }
    }
}

impl fmt::Display for RepairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairAction::RestoredCategory { item, to } => {
                write!(f, "restored category of item {item} to {}", to.name())
            }
            RepairAction::RestoredMegaStone { item } => {
                write!(f, "restored mega stone {item} (category + quantity 1)")
            }
            RepairAction::ClearedCorruptUnknown { item } => {
                write!(f, "cleared corrupt unknown item {item}")
            }
            RepairAction::ClearedUnknownItem { item } => {
                write!(f, "removed unknown item {item}")
            }
            RepairAction::FixedCategory { item, from, to } => {
                write!(f, "fixed category of item {item} ({from} -> {})", to.name())
            }
            RepairAction::ClampedMegaQuantity { item } => {
                write!(f, "clamped quantity of mega stone {item} to 1")
            }
            RepairAction::PreemptiveCategoryFix { item, to } => {
                write!(f, "preemptively fixed category of item {item} to {}", to.name())
            }
        }
    }
}

/// A mega stone sitting in the Other or Mega pocket keeps its slot as-is;
/// the engine files them either way depending on story progress.
fn is_mega_slot(category: Category, info: &ItemInfo) -> bool {
    (category == Pocket::Other || category == Pocket::Mega) && info.is_mega_stone()
}

/// Run every repair rule over the bag.  Returns the edits applied, in item
/// id order; an empty log means the bag was already clean.
pub fn repair_bag(bag: &mut BagSave, items: &ItemTable, opts: &RepairOptions) -> Vec<RepairAction> {
    let mut actions = Vec::new();

    for item in 0..bag.len() {
        let mut entry = bag.entry(item);
        let info = items.get(item);
        let id = item as u16;

        // Unobtained slots are left alone, except that a corrupt category on
        // a known id is fixed now rather than when the item first drops.
        if entry.quantity == 0 {
            let Some(info) = info else { continue };
            if opts.preemptive_category_fix && entry.category.is_corrupt() {
                entry.category = Category::Known(info.expected_pocket);
                bag.set_entry(item, &entry);
                actions.push(RepairAction::PreemptiveCategoryFix {
                    item: id,
                    to: info.expected_pocket,
                });
            }
            continue;
        }

        // Corrupt category on an occupied slot crashes the bag menu.
        if entry.category.is_corrupt() {
            match info {
                Some(info) if info.is_mega_stone() => {
                    entry.category = Category::Known(info.expected_pocket);
                    entry.quantity = 1;
                    actions.push(RepairAction::RestoredMegaStone { item: id });
                }
                Some(info) => {
                    entry.category = Category::Known(info.expected_pocket);
                    actions.push(RepairAction::RestoredCategory {
                        item: id,
                        to: info.expected_pocket,
                    });
                }
                None => {
                    entry.quantity = 0;
                    actions.push(RepairAction::ClearedCorruptUnknown { item: id });
                }
            }
            bag.set_entry(item, &entry);
            continue;
        }

        // Occupied slot for an id the catalog does not know at all.
        let Some(info) = info else {
            entry.quantity = 0;
            entry.category = Category::Known(Pocket::None);
            bag.set_entry(item, &entry);
            actions.push(RepairAction::ClearedUnknownItem { item: id });
            continue;
        };

        let mut changed = false;

        if entry.category != Category::Known(info.expected_pocket)
            && !is_mega_slot(entry.category, info)
        {
            actions.push(RepairAction::FixedCategory {
                item: id,
                from: entry.category.raw(),
                to: info.expected_pocket,
            });
            entry.category = Category::Known(info.expected_pocket);
            changed = true;
        }

        if opts.fix_mega_quantity && is_mega_slot(entry.category, info) && entry.quantity > 1 {
            entry.quantity = 1;
            actions.push(RepairAction::ClampedMegaQuantity { item: id });
            changed = true;
        }

        if changed {
            bag.set_entry(item, &entry);
        }
    }

    actions
}
