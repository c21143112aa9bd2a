//! Normalized transit data, as produced by decoders.
//!
//! All values are plain data. Times are card-local wall-clock times; the
//! zone they are local to is reported alongside in [`TransitData`].

use alloc::string::String;
use alloc::vec::Vec;

use time::{Date, PrimitiveDateTime};

use crate::station::{Station, StationLookup};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Card family, as distinguished by memory layout.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    MifareClassic,
    MifareUltralight,
    Iso7816,
}

/// Catalogue entry describing a card a decoder understands.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardInfo {
    pub name: &'static str,
    pub location: &'static str,
    pub family: Family,
    /// Whether reading the card needs keys not published by the issuer.
    pub keys_required: bool,
    /// Whether support is incomplete.
    pub preview: bool,
}

/// The cheap answer to "what card is this?".
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitIdentity {
    pub name: String,
    pub serial: Option<String>,
}

impl TransitIdentity {
    pub fn new(name: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            name: name.into(),
            serial,
        }
    }
}

/// An amount of money in minor units of an ISO 4217 currency.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    pub amount: i64,
    pub currency: &'static str,
}

impl Money {
    pub const fn new(amount: i64, currency: &'static str) -> Self {
        Self { amount, currency }
    }
}

/// Stored value held on a card.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub value: Money,
    /// Fare class or ticket type the balance is held under.
    pub class: Option<String>,
    pub valid_from: Option<Date>,
    pub expiry: Option<Date>,
}

impl Balance {
    pub fn new(value: Money) -> Self {
        Self {
            value,
            class: None,
            valid_from: None,
            expiry: None,
        }
    }
}

/// How a trip was made.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Bus,
    Train,
    Tram,
    Metro,
    Ferry,
    TicketMachine,
    VendingMachine,
    Pos,
    Other,
}

/// Whether a trip moved the holder or moved money onto the card.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripKind {
    /// Travel, with `fare` charged to the card.
    Journey,
    /// A top-up, with `fare` credited to the card.
    Refill,
}

/// A station code within a named station system.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationRef {
    pub system: &'static str,
    pub code: u32,
}

impl StationRef {
    pub fn resolve(&self, stations: &dyn StationLookup) -> Option<Station> {
        stations.lookup(self.system, self.code)
    }
}

/// A single trip or top-up.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub kind: TripKind,
    pub mode: Mode,
    pub start_time: Option<PrimitiveDateTime>,
    pub end_time: Option<PrimitiveDateTime>,
    pub start_station: Option<StationRef>,
    pub end_station: Option<StationRef>,
    pub fare: Option<Money>,
    /// Identifier the card used to correlate taps of one journey.
    pub journey: Option<u32>,
    /// Whether this leg continues an earlier journey, as on a transfer.
    pub continuation: bool,
}

impl Trip {
    /// A top-up of `amount`, made at `time`.
    pub fn refill(amount: Money, time: Option<PrimitiveDateTime>) -> Self {
        Self {
            kind: TripKind::Refill,
            mode: Mode::TicketMachine,
            start_time: time,
            end_time: None,
            start_station: None,
            end_station: None,
            fare: Some(amount),
            journey: None,
            continuation: false,
        }
    }

    /// The time a trip is ordered by: its start, or failing that its end.
    pub fn sort_time(&self) -> Option<PrimitiveDateTime> {
        self.start_time.or(self.end_time)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    Unused,
    Started,
    Used,
    Expired,
    Unknown,
}

/// A pass or period product held on a card.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: Option<String>,
    pub state: SubscriptionState,
    pub valid_from: Option<PrimitiveDateTime>,
    pub valid_to: Option<PrimitiveDateTime>,
}

/// A line of free-form card information.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Info {
    Header(String),
    Item { label: String, value: String },
}

impl Info {
    pub fn item(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Item {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Everything decoded from a card.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitData {
    pub card_name: String,
    pub serial: Option<String>,
    pub balance: Option<Balance>,
    /// Trips in chronological order, oldest first.
    pub trips: Vec<Trip>,
    pub subscriptions: Vec<Subscription>,
    pub info: Vec<Info>,
    /// Whether some station code could not be found in the station tables.
    pub has_unknown_stations: bool,
    /// IANA name of the zone trip times are local to.
    pub timezone: Option<&'static str>,
}

impl TransitData {
    /// Data for a card with nothing known beyond its name and serial.
    pub fn new(card_name: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            card_name: card_name.into(),
            serial,
            balance: None,
            trips: Vec::new(),
            subscriptions: Vec::new(),
            info: Vec::new(),
            has_unknown_stations: false,
            timezone: None,
        }
    }

    pub fn identity(&self) -> TransitIdentity {
        TransitIdentity::new(self.card_name.clone(), self.serial.clone())
    }
}
