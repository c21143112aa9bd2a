//! T-money, South Korea.
//!
//! Each record of the transaction log is a single charge or top-up. Records
//! are 46 bytes; only the fields below are understood.
//!
//! | Offset | Length | Field                      |
//! |--------|--------|----------------------------|
//! | 0      | 1      | Type (2 is a top-up)       |
//! | 2      | 4      | Balance after, big-endian  |
//! | 10     | 4      | Amount, big-endian         |
//! | 26     | 7      | Time, `YYYYMMDDhhmmss` BCD |

use alloc::vec::Vec;

use log::debug;

use crate::codec::{bcd, uint_be};
use crate::dispatch::{Context, TransitFactory};
use crate::error::Result;
use crate::model::{Balance, CardInfo, Family, Mode, Money, TransitData, TransitIdentity, Trip, TripKind};
use crate::reconstruct;
use crate::store::FileStore;

use super::ksx6923::{self, PurseInfo, TRANSACTION_FILE};

const NAME: &str = "T-money";
const CURRENCY: &str = "KRW";

/// Record type of a top-up.
const TOPUP: u8 = 2;

pub struct TMoney;

pub static TMONEY: TMoney = TMoney;

/// Parse a transaction log record, or `None` for an empty slot.
pub fn parse_trip(data: &[u8]) -> Option<Trip> {
    let kind = *data.first()?;
    let amount = i64::from(uint_be(data.get(10..14)?) as u32 as i32);
    let time = data.get(26..33)?;

    if amount == 0 && bcd::is_sentinel(time) {
        return None;
    }

    let fare = Money::new(amount, CURRENCY);
    let start_time = bcd::date_time(time);

    Some(match kind {
        TOPUP => Trip::refill(fare, start_time),
        _ => Trip {
            kind: TripKind::Journey,
            mode: Mode::Other,
            start_time,
            end_time: None,
            start_station: None,
            end_station: None,
            fare: Some(fare),
            journey: None,
            continuation: false,
        },
    })
}

impl TransitFactory<FileStore> for TMoney {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cards(&self) -> &'static [CardInfo] {
        &[CardInfo {
            name: NAME,
            location: "Seoul and everywhere, Korea",
            family: Family::Iso7816,
            keys_required: false,
            preview: false,
        }]
    }

    fn check(&self, card: &FileStore) -> Result<bool> {
        Ok(ksx6923::ensure(card).is_ok())
    }

    fn identity(&self, card: &FileStore) -> Result<TransitIdentity> {
        let serial = PurseInfo::read(card).ok().map(|purse| purse.serial()).transpose()?;

        Ok(TransitIdentity::new(NAME, serial))
    }

    fn data(&self, card: &FileStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        // Dumps from readers that skipped the FCI still carry the log.
        let purse = PurseInfo::read(card).ok();

        let mut trips: Vec<Trip> = ksx6923::records(card, TRANSACTION_FILE)?
            .iter()
            .filter_map(|record| parse_trip(record))
            .collect();

        debug!("Read {} T-money trips.", trips.len());
        reconstruct::chronological(&mut trips);

        let serial = purse.map(|purse| purse.serial()).transpose()?;

        let mut data = TransitData::new(NAME, serial);
        data.timezone = Some("Asia/Seoul");
        data.trips = trips;

        if let Some(purse) = purse {
            data.info = purse.info()?;
        }

        data.balance = match (card.application().balance, purse) {
            (Some(amount), Some(purse)) => Some(purse.balance(amount, CURRENCY)?),
            (Some(amount), None) => Some(Balance::new(Money::new(i64::from(amount), CURRENCY))),
            (None, _) => None,
        };

        Ok(Some(data))
    }
}
