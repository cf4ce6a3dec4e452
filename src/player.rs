//! Typed view over the trainer core-data section.
//!
//! An 80-byte record; only the spans below are understood, the rest belongs
//! to the engine and is preserved verbatim through round trips.
//!
//! ```text
//! 0x00  trainer id        u32 LE
//! 0x04  player name       13 UTF-16LE units, zero-terminated
//! 0x20  money             u32 LE
//! 0x24  language          u8
//! 0x25  gender            u8
//! 0x28  playtime hours    u16 LE
//! 0x2A  playtime minutes  u8
//! 0x2B  playtime seconds  u8
//! ```

use std::fmt;
use thiserror::Error;

/// Exact byte length of the core-data section.
pub const CORE_DATA_SIZE: usize = 80;

/// Maximum player name length in UTF-16 units (terminator excluded).
pub const NAME_MAX_UNITS: usize = 12;

const TRAINER_ID_OFFSET: usize = 0x00;
const NAME_OFFSET: usize = 0x04;
const NAME_UNITS: usize = 13;
const MONEY_OFFSET: usize = 0x20;
const LANGUAGE_OFFSET: usize = 0x24;
const GENDER_OFFSET: usize = 0x25;
const HOURS_OFFSET: usize = 0x28;
const MINUTES_OFFSET: usize = 0x2A;
const SECONDS_OFFSET: usize = 0x2B;

#[derive(Error, Debug)]
pub enum CoreDataError {
    #[error("core data section must be {CORE_DATA_SIZE} bytes, got {0}")]
    WrongLength(usize),
    #[error("player name is {0} UTF-16 units, maximum is {NAME_MAX_UNITS}")]
    NameTooLong(usize),
}

/// Parsed trainer block.  Owns a copy of the section bytes; the caller
/// writes the result back into the container via `Block::replace_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreData {
    buf: Vec<u8>,
}

impl CoreData {
    pub fn from_bytes(data: &[u8]) -> Result<Self, CoreDataError> {
        if data.len() != CORE_DATA_SIZE {
            return Err(CoreDataError::WrongLength(data.len()));
        }
        Ok(Self { buf: data.to_vec() })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    fn read_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes([
            self.buf[offset],
            self.buf[offset + 1],
            self.buf[offset + 2],
            self.buf[offset + 3],
        ])
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn trainer_id(&self) -> u32 {
        self.read_u32(TRAINER_ID_OFFSET)
    }

    pub fn set_trainer_id(&mut self, id: u32) {
        self.write_u32(TRAINER_ID_OFFSET, id);
    }

    /// The 6-digit id shown on the trainer card.
    pub fn display_id(&self) -> u32 {
        self.trainer_id() % 1_000_000
    }

    pub fn name(&self) -> String {
        let raw = &self.buf[NAME_OFFSET..NAME_OFFSET + NAME_UNITS * 2];
        let mut units = Vec::with_capacity(NAME_UNITS);
        for pair in raw.chunks_exact(2) {
            let unit = u16::from_le_bytes([pair[0], pair[1]]);
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        String::from_utf16_lossy(&units)
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), CoreDataError> {
        let units: Vec<u16> = name.encode_utf16().collect();
        if units.len() > NAME_MAX_UNITS {
            return Err(CoreDataError::NameTooLong(units.len()));
        }
        let span = &mut self.buf[NAME_OFFSET..NAME_OFFSET + NAME_UNITS * 2];
        span.fill(0);
        for (i, unit) in units.iter().enumerate() {
            span[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        Ok(())
    }

    pub fn money(&self) -> u32 {
        self.read_u32(MONEY_OFFSET)
    }

    pub fn set_money(&mut self, money: u32) {
        self.write_u32(MONEY_OFFSET, money);
    }

    pub fn language(&self) -> u8 {
        self.buf[LANGUAGE_OFFSET]
    }

    pub fn gender(&self) -> u8 {
        self.buf[GENDER_OFFSET]
    }

    /// Playtime as (hours, minutes, seconds).
    pub fn playtime(&self) -> (u16, u8, u8) {
        let hours = u16::from_le_bytes([self.buf[HOURS_OFFSET], self.buf[HOURS_OFFSET + 1]]);
        (hours, self.buf[MINUTES_OFFSET], self.buf[SECONDS_OFFSET])
    }

    pub fn set_playtime(&mut self, hours: u16, minutes: u8, seconds: u8) {
        self.buf[HOURS_OFFSET..HOURS_OFFSET + 2].copy_from_slice(&hours.to_le_bytes());
        self.buf[MINUTES_OFFSET] = minutes;
        self.buf[SECONDS_OFFSET] = seconds;
    }
}

impl fmt::Display for CoreData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.playtime();
        write!(
            f,
            "{} (id {:06}) money={} playtime={h}:{m:02}:{s:02}",
            self.name(),
            self.display_id(),
            self.money(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> CoreData {
        CoreData::from_bytes(&[0u8; CORE_DATA_SIZE]).unwrap()
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(matches!(
            CoreData::from_bytes(&[0u8; 79]),
            Err(CoreDataError::WrongLength(79))
        ));
    }

    #[test]
    fn name_roundtrips() {
        let mut core = blank();
        core.set_name("Satoshi").unwrap();
        assert_eq!(core.name(), "Satoshi");
        // shorter name clears the old tail
        core.set_name("Red").unwrap();
        assert_eq!(core.name(), "Red");
    }

    #[test]
    fn name_length_is_enforced() {
        let mut core = blank();
        assert!(matches!(
            core.set_name("ThisNameIsWayTooLong"),
            Err(CoreDataError::NameTooLong(20))
        ));
    }

    #[test]
    fn field_edits_leave_other_bytes_alone() {
        let mut data = [0u8; CORE_DATA_SIZE];
        for (i, b) in data.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut core = CoreData::from_bytes(&data).unwrap();
        core.set_money(1_000_000);

        let out = core.to_bytes();
        assert_eq!(out[..MONEY_OFFSET], data[..MONEY_OFFSET]);
        assert_eq!(out[MONEY_OFFSET + 4..], data[MONEY_OFFSET + 4..]);
        assert_eq!(core.money(), 1_000_000);
    }

    #[test]
    fn display_mentions_name_and_id() {
        let mut core = blank();
        core.set_name("Serena").unwrap();
        core.set_trainer_id(123_456_789);
        let line = core.to_string();
        assert!(line.contains("Serena"));
        assert!(line.contains("456789"));
    }
}
