//! Records stored in Nextfare data blocks.
//!
//! Every 16-byte block outside the preamble and sector trailers holds at most
//! one record, and its type follows from where it sits. Multi-byte fields are
//! little-endian. Dates are packed into 27 bits: day, month, year since 2000
//! and minute of the day.

use core::cmp::Ordering;

use log::{debug, trace};
use tartan_bitfield::bitfield;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};
use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::{U16, U32};

use crate::codec::is_all;
use crate::reconstruct::{Tap, Versioned};
use crate::store::{Block, Locator};

/// A classified data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Balance(BalanceRecord),
    Config(ConfigRecord),
    Topup(TopupRecord),
    Transaction(TransactionRecord),
    TravelPass(TravelPassRecord),
    /// A block holding nothing recognizable, or an empty slot.
    Unknown(Locator),
}

/// Classify the block at `sector`, `block` by position and contents.
pub fn classify(data: &Block, sector: usize, block: usize) -> Record {
    let locator = Locator::Block { sector, block };

    let record = match (sector, block) {
        (1, 0 | 1) => Some(Record::Balance(BalanceRecord::parse(data, locator.clone()))),
        (1, 2) => Some(Record::Config(ConfigRecord::parse(data, locator.clone()))),
        (2, _) => TopupRecord::parse(data, locator.clone()).map(Record::Topup),
        (3, _) => TravelPassRecord::parse(data, locator.clone()).map(Record::TravelPass),
        (5..=8, _) => TransactionRecord::parse(data, locator.clone()).map(Record::Transaction),
        _ => None,
    };

    match record {
        Some(record) => {
            trace!("Classified {locator}: {record:?}");
            record
        }
        None => Record::Unknown(locator),
    }
}

/// Unpack a 27-bit Nextfare timestamp.
pub fn unpack_date(raw: u32) -> Option<PrimitiveDateTime> {
    bitfield! {
        struct PackedDate(u32) {
            [0..5] day: u8,
            [5..9] month: u8,
            [9..16] year: u8,
            [16..27] minute: u16,
        }
    }

    let packed = PackedDate(raw);

    if packed.minute() >= 24 * 60 {
        return None;
    }

    let month = Month::try_from(packed.month()).ok()?;
    let date = Date::from_calendar_date(2000 + i32::from(packed.year()), month, packed.day()).ok()?;

    Some(PrimitiveDateTime::new(date, Time::MIDNIGHT) + Duration::minutes(i64::from(packed.minute())))
}

/// Decode a signed amount stored as magnitude with a high sign bit.
fn signed(raw: u16) -> i64 {
    if raw > 0x8000 {
        -i64::from(raw & 0x7FFF)
    } else {
        i64::from(raw)
    }
}

#[derive(FromBytes)]
#[repr(C)]
struct BalanceBlock {
    _kind: u8,
    flags: u8,
    balance: U16,
    _reserved: [u8; 3],
    travel_pass: u8,
    _reserved_2: [u8; 5],
    version: u8,
    _checksum: U16,
}

/// One of the two stored-value slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub locator: Locator,
    pub version: u8,
    /// Balance in cents; negative when overdrawn.
    pub balance: i64,
    pub travel_pass_available: bool,
}

impl BalanceRecord {
    pub fn parse(data: &Block, locator: Locator) -> Self {
        let BalanceBlock {
            flags,
            balance,
            travel_pass,
            version,
            ..
        } = zerocopy::transmute!(*data);

        let raw = balance.get();

        let balance = if raw & 0x8000 != 0 {
            -i64::from(raw & 0x7FFF)
        } else if flags & 0x80 != 0 {
            -i64::from(raw)
        } else {
            i64::from(raw)
        };

        Self {
            locator,
            version,
            balance,
            travel_pass_available: travel_pass != 0,
        }
    }
}

impl Versioned for BalanceRecord {
    fn version(&self) -> u8 {
        self.version
    }
}

#[derive(FromBytes)]
#[repr(C)]
struct ConfigBlock {
    _reserved: [u8; 4],
    expiry: U32,
    ticket_type: U16,
    _reserved_2: [u8; 6],
}

/// Card configuration: product expiry and fare class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub locator: Locator,
    pub expiry: Option<PrimitiveDateTime>,
    pub ticket_type: u16,
}

impl ConfigRecord {
    pub fn parse(data: &Block, locator: Locator) -> Self {
        let ConfigBlock {
            expiry,
            ticket_type,
            ..
        } = zerocopy::transmute!(*data);

        Self {
            locator,
            expiry: unpack_date(expiry.get()),
            ticket_type: ticket_type.get(),
        }
    }
}

#[derive(FromBytes)]
#[repr(C)]
struct TopupBlock {
    _kind: u8,
    _reserved: u8,
    date: U32,
    credit: U16,
    _reserved_2: [u8; 4],
    station: U16,
    _checksum: U16,
}

/// Value added to the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopupRecord {
    pub locator: Locator,
    pub timestamp: Option<PrimitiveDateTime>,
    /// Credit in cents.
    pub credit: i64,
    pub station: u16,
}

impl TopupRecord {
    /// Parse a top-up, or `None` for an empty slot.
    pub fn parse(data: &Block, locator: Locator) -> Option<Self> {
        if is_all(&data[2..6], 0) {
            debug!("Empty top-up slot at {locator}.");
            return None;
        }

        let TopupBlock {
            date,
            credit,
            station,
            ..
        } = zerocopy::transmute!(*data);

        Some(Self {
            locator,
            timestamp: unpack_date(date.get()),
            credit: i64::from(credit.get() & 0x7FFF),
            station: station.get(),
        })
    }
}

#[derive(FromBytes)]
#[repr(C)]
struct TransactionBlock {
    kind: u8,
    mode: u8,
    stamp: [u8; 5],
    value: U16,
    _reserved: [u8; 3],
    station: U16,
    _checksum: U16,
}

/// A tap on or off a vehicle or gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub locator: Locator,
    pub mode: u8,
    pub timestamp: Option<PrimitiveDateTime>,
    pub journey: u16,
    pub continuation: bool,
    /// Change to stored value in cents; charges are negative.
    pub value: i64,
    pub station: u16,
}

impl TransactionRecord {
    /// Parse a tap, or `None` for an empty slot or a non-travel record.
    pub fn parse(data: &Block, locator: Locator) -> Option<Self> {
        // The journey field shares its low byte with the top of the date.
        bitfield! {
            struct JourneyField(u16) {
                [4] continuation,
                [5..16] journey: u16,
            }
        }

        let TransactionBlock {
            kind,
            mode,
            stamp,
            value,
            station,
            ..
        } = zerocopy::transmute!(*data);

        if kind > 0x70 {
            debug!("Skipping non-travel record {kind:#04x} at {locator}.");
            return None;
        }

        if is_all(&data[1..9], 0) {
            debug!("Empty transaction slot at {locator}.");
            return None;
        }

        let [a, b, c, d, e] = stamp;
        let field = JourneyField(u16::from_le_bytes([d, e]));

        Some(Self {
            locator,
            mode,
            timestamp: unpack_date(u32::from_le_bytes([a, b, c, d])),
            journey: field.journey(),
            continuation: field.continuation(),
            value: signed(value.get()),
            station: station.get(),
        })
    }
}

impl Ord for TransactionRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.journey
            .cmp(&other.journey)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
            .then_with(|| self.locator.cmp(&other.locator))
    }
}

impl PartialOrd for TransactionRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Tap for TransactionRecord {
    fn journey(&self) -> u32 {
        u32::from(self.journey)
    }

    fn mode(&self) -> u8 {
        self.mode
    }

    fn value(&self) -> i64 {
        self.value
    }

    fn timestamp(&self) -> Option<PrimitiveDateTime> {
        self.timestamp
    }

    fn station(&self) -> u32 {
        u32::from(self.station)
    }

    fn continuation(&self) -> bool {
        self.continuation
    }
}

#[derive(FromBytes)]
#[repr(C)]
struct TravelPassBlock {
    _kind: u8,
    _reserved: u8,
    expiry: U32,
    _reserved_2: [u8; 7],
    version: u8,
    _checksum: U16,
}

/// A period pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelPassRecord {
    pub locator: Locator,
    pub version: u8,
    pub expiry: Option<PrimitiveDateTime>,
}

impl TravelPassRecord {
    /// Parse a pass, or `None` for an empty slot.
    pub fn parse(data: &Block, locator: Locator) -> Option<Self> {
        if is_all(&data[2..6], 0) {
            debug!("Empty travel pass slot at {locator}.");
            return None;
        }

        let TravelPassBlock { expiry, version, .. } = zerocopy::transmute!(*data);

        Some(Self {
            locator,
            version,
            expiry: unpack_date(expiry.get()),
        })
    }
}

impl Versioned for TravelPassRecord {
    fn version(&self) -> u8 {
        self.version
    }
}
