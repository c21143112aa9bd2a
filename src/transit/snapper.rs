//! Snapper, Wellington, New Zealand.
//!
//! Snapper runs on KS X 6923 but leaves the timestamp area of the purse log
//! (SFI 4) blank, keeping tap details in a parallel trip log (SFI 3). The
//! two logs are read pairwise, record by record.
//!
//! Trip log record:
//!
//! | Offset | Length | Field                        |
//! |--------|--------|------------------------------|
//! | 4      | 1      | Sequence within the journey  |
//! | 5      | 1      | Journey                      |
//! | 6      | 1      | Flags; `0x10` marks a tap-on |
//! | 7      | 1      | Mode                         |
//! | 8      | 7      | Time, `YYYYMMDDhhmmss` BCD   |
//! | 15     | 2      | Stop, big-endian             |
//!
//! Purse log records share the T-money layout: type at 0, amount at 10.

use alloc::vec::Vec;
use core::cmp::Ordering;

use log::debug;
use time::PrimitiveDateTime;

use crate::codec::{bcd, is_all, uint_be};
use crate::dispatch::{Context, TransitFactory};
use crate::error::{Error, Result};
use crate::model::{
    CardInfo, Family, Mode, Money, StationRef, TransitData, TransitIdentity, Trip, TripKind,
};
use crate::reconstruct::{self, Leg, Tap, same_journey};
use crate::store::{FileId, FileStore, Locator};

use super::ksx6923::{self, PurseInfo, TRANSACTION_FILE};

const NAME: &str = "Snapper";
const CURRENCY: &str = "NZD";

/// Short identifier of the trip log.
pub const TRIP_FILE: u8 = 3;

/// Purse log record type of a top-up.
const TOPUP: u8 = 2;

pub struct Snapper;

pub static SNAPPER: Snapper = Snapper;

/// A tap, assembled from a trip log record and its purse log partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapperTap {
    pub index: usize,
    pub sequence: u8,
    pub journey: u8,
    pub tap_on: bool,
    pub mode: u8,
    pub timestamp: Option<PrimitiveDateTime>,
    pub station: u16,
    /// Amount charged.
    pub cost: i64,
}

/// An entry of the paired logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Tap(SnapperTap),
    Topup(Trip),
}

/// Pair a trip log record with its purse log record.
pub fn parse_entry(index: usize, trip: &[u8], purse: &[u8]) -> Option<Entry> {
    let &[sequence, journey, flags, mode] = trip.get(4..8)? else {
        return None;
    };

    let timestamp = bcd::date_time(trip.get(8..15)?);
    let station = uint_be(trip.get(15..17)?) as u16;
    let kind = *purse.first()?;
    let amount = i64::from(uint_be(purse.get(10..14)?) as u32 as i32);

    if amount == 0 && timestamp.is_none() {
        return None;
    }

    Some(match kind {
        TOPUP => Entry::Topup(Trip::refill(Money::new(amount, CURRENCY), timestamp)),
        _ => Entry::Tap(SnapperTap {
            index,
            sequence,
            journey,
            tap_on: flags & 0x10 != 0,
            mode,
            timestamp,
            station,
            cost: amount,
        }),
    })
}

/// Merge a tap-on with the tap-off following it on the same journey.
pub fn merge(on: &SnapperTap, off: &SnapperTap) -> bool {
    same_journey(on, off) && on.tap_on && !off.tap_on
}

fn mode(code: u8) -> Mode {
    match code {
        1 => Mode::Bus,
        2 => Mode::Train,
        3 => Mode::Ferry,
        _ => Mode::Other,
    }
}

fn station(code: u32) -> Option<StationRef> {
    (code != 0).then_some(StationRef {
        system: "snapper",
        code,
    })
}

fn trip(leg: Leg) -> Trip {
    Trip {
        kind: TripKind::Journey,
        mode: mode(leg.mode),
        start_time: leg.start_time,
        end_time: leg.end_time,
        start_station: station(leg.start_station),
        end_station: leg.end_station.and_then(station),
        fare: Some(Money::new(leg.cost, CURRENCY)),
        journey: Some(leg.journey),
        continuation: leg.continuation,
    }
}

impl Ord for SnapperTap {
    fn cmp(&self, other: &Self) -> Ordering {
        self.journey
            .cmp(&other.journey)
            .then_with(|| self.sequence.cmp(&other.sequence))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for SnapperTap {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Tap for SnapperTap {
    fn journey(&self) -> u32 {
        u32::from(self.journey)
    }

    fn mode(&self) -> u8 {
        self.mode
    }

    fn value(&self) -> i64 {
        -self.cost
    }

    fn timestamp(&self) -> Option<PrimitiveDateTime> {
        self.timestamp
    }

    fn station(&self) -> u32 {
        u32::from(self.station)
    }
}

impl TransitFactory<FileStore> for Snapper {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cards(&self) -> &'static [CardInfo] {
        &[CardInfo {
            name: NAME,
            location: "Wellington, New Zealand",
            family: Family::Iso7816,
            keys_required: false,
            preview: true,
        }]
    }

    fn check(&self, card: &FileStore) -> Result<bool> {
        let Some(file) = card.sfi_file(TRANSACTION_FILE) else {
            return Ok(false);
        };

        for (index, record) in file.records().iter().enumerate() {
            let blank = record.get(26..46).ok_or(Error::OutOfRange(Locator::Record {
                file: FileId::Sfi(TRANSACTION_FILE),
                index,
            }))?;

            if !is_all(blank, 0xFF) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn identity(&self, card: &FileStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(NAME, Some(PurseInfo::read(card)?.serial()?)))
    }

    fn data(&self, card: &FileStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        let Some(trip_log) = card.sfi_file(TRIP_FILE) else {
            debug!("No trip log on Snapper card.");
            return Ok(None);
        };

        let purse = PurseInfo::read(card)?;
        let purse_log = ksx6923::records(card, TRANSACTION_FILE)?;

        let mut taps = Vec::new();
        let mut trips = Vec::new();

        for (index, (record, partner)) in trip_log.records().iter().zip(purse_log).enumerate() {
            match parse_entry(index, record, partner) {
                Some(Entry::Tap(tap)) => taps.push(tap),
                Some(Entry::Topup(refill)) => trips.push(refill),
                None => debug!("Empty Snapper log slot {index}."),
            }
        }

        trips.extend(reconstruct::legs(taps, &merge).into_iter().map(trip));
        reconstruct::chronological(&mut trips);

        let mut data = TransitData::new(NAME, Some(purse.serial()?));
        data.timezone = Some("Pacific/Auckland");
        data.trips = trips;
        data.info = purse.info()?;
        data.balance = card
            .application()
            .balance
            .map(|amount| purse.balance(amount, CURRENCY))
            .transpose()?;

        Ok(Some(data))
    }
}
