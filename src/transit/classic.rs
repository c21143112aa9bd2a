//! Catch-all decoders for MIFARE Classic cards.

use alloc::vec;

use crate::codec::is_all;
use crate::dispatch::{Context, TransitFactory};
use crate::error::Result;
use crate::model::{Info, TransitData, TransitIdentity};
use crate::store::{GridStore, Sector};

/// Cards with every sector readable and no data written.
pub struct Blank;

pub static BLANK: Blank = Blank;

impl TransitFactory<GridStore> for Blank {
    fn name(&self) -> &'static str {
        "Blank MIFARE Classic"
    }

    fn check(&self, card: &GridStore) -> Result<bool> {
        let readable = card
            .sectors()
            .iter()
            .all(|sector| matches!(sector, Sector::Present(_)));

        Ok(readable
            && card.sectors().len() > 1
            && card
                .data_blocks()
                .all(|(_, _, data)| is_all(data, 0x00) || is_all(data, 0xFF)))
    }

    fn identity(&self, _card: &GridStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(self.name(), None))
    }

    fn data(&self, _card: &GridStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        let mut data = TransitData::new(self.name(), None);
        data.info = vec![Info::item("Contents", "This card holds no data.")];

        Ok(Some(data))
    }
}

/// Cards with no sector readable beyond the preamble.
pub struct Locked;

pub static LOCKED: Locked = Locked;

impl TransitFactory<GridStore> for Locked {
    fn name(&self) -> &'static str {
        "Locked MIFARE Classic"
    }

    fn check(&self, card: &GridStore) -> Result<bool> {
        let rest = card.sectors().get(1..).unwrap_or_default();

        Ok(!rest.is_empty() && rest.iter().all(|sector| *sector == Sector::Unauthorized))
    }

    fn identity(&self, _card: &GridStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(self.name(), None))
    }

    fn data(&self, _card: &GridStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        let mut data = TransitData::new(self.name(), None);
        data.info = vec![Info::item(
            "Contents",
            "This card is protected by keys the reader did not hold.",
        )];

        Ok(Some(data))
    }
}

/// Any MIFARE Classic card no other decoder recognized.
pub struct Unknown;

pub static UNKNOWN: Unknown = Unknown;

impl TransitFactory<GridStore> for Unknown {
    fn name(&self) -> &'static str {
        "MIFARE Classic"
    }

    fn check(&self, _card: &GridStore) -> Result<bool> {
        Ok(true)
    }

    fn identity(&self, card: &GridStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(self.name(), Some(hex::encode_upper(&card.meta().tag_id))))
    }

    fn data(&self, card: &GridStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        let mut data = TransitData::new(self.name(), Some(hex::encode_upper(&card.meta().tag_id)));
        data.info = vec![Info::item("Sectors", alloc::format!("{}", card.sectors().len()))];

        Ok(Some(data))
    }
}
