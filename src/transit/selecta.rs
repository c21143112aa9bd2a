//! Selecta vending machine payment cards, France.

use alloc::string::ToString;

use crate::codec::uint_be;
use crate::dispatch::{Context, TransitFactory};
use crate::error::Result;
use crate::model::{Balance, CardInfo, Family, Money, TransitData, TransitIdentity};
use crate::store::GridStore;

const NAME: &str = "Selecta France";

/// Operator code found in sector 0 block 1.
const OPERATOR: u64 = 0x0938;

pub struct SelectaFrance;

pub static SELECTA_FRANCE: SelectaFrance = SelectaFrance;

fn serial(card: &GridStore) -> Result<u64> {
    Ok(uint_be(card.slice(1, 0, 13, 3)?))
}

impl TransitFactory<GridStore> for SelectaFrance {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cards(&self) -> &'static [CardInfo] {
        &[CardInfo {
            name: NAME,
            location: "France",
            family: Family::MifareClassic,
            keys_required: false,
            preview: true,
        }]
    }

    fn check(&self, card: &GridStore) -> Result<bool> {
        Ok(uint_be(card.slice(0, 1, 2, 2)?) == OPERATOR)
    }

    fn identity(&self, card: &GridStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(NAME, Some(serial(card)?.to_string())))
    }

    fn data(&self, card: &GridStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        let balance = uint_be(card.slice(1, 2, 0, 3)?) as i64;

        let mut data = TransitData::new(NAME, Some(serial(card)?.to_string()));
        data.balance = Some(Balance::new(Money::new(balance, "EUR")));
        data.timezone = Some("Europe/Paris");

        Ok(Some(data))
    }
}
