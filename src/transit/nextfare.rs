//! Cubic Nextfare stored-value cards on MIFARE Classic.
//!
//! Nextfare is a platform shared by several agencies. Each deployment is a
//! [`NextfareSystem`] value: the record layouts are common, while the
//! currency, time zone, station table, mode codes and trip-merging rule
//! differ. Deployments are told apart by a six-byte system code following
//! the manufacturer signature in sector 0.

pub mod record;

use alloc::string::String;
use alloc::vec::Vec;
use alloc::{format, vec};

use log::debug;

use crate::codec::{format_number, luhn, uint_le};
use crate::dispatch::{Context, TransitFactory};
use crate::error::Result;
use crate::model::{
    Balance, CardInfo, Info, Mode, Money, StationRef, Subscription, SubscriptionState,
    TransitData, TransitIdentity, Trip, TripKind,
};
use crate::reconstruct::{self, Leg, UnknownStations, same_journey};
use crate::store::GridStore;

use record::{Record, TransactionRecord};

/// Signature following the first byte of sector 0 block 1.
pub const MANUFACTURER: [u8; 8] = [0x16, 0x18, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F];

/// A Nextfare deployment.
pub struct NextfareSystem {
    pub name: &'static str,
    pub currency: &'static str,
    pub timezone: Option<&'static str>,
    /// Station system the card's station codes belong to.
    pub stations: &'static str,
    /// Whether a station table exists, so misses are worth reporting.
    pub report_unknown_stations: bool,
    /// System codes claimed by this deployment; empty claims any.
    pub system_codes: &'static [[u8; 6]],
    pub merge: fn(&TransactionRecord, &TransactionRecord) -> bool,
    pub mode: fn(u8) -> Mode,
    pub cards: &'static [CardInfo],
}

/// Nextfare cards of no more specific deployment.
pub static NEXTFARE: NextfareSystem = NextfareSystem {
    name: "Nextfare",
    currency: "USD",
    timezone: None,
    stations: "nextfare",
    report_unknown_stations: false,
    system_codes: &[],
    merge: same_journey,
    mode: |_| Mode::Other,
    cards: &[],
};

/// Read the card number from sector 0.
pub fn serial(card: &GridStore) -> Result<u32> {
    Ok(uint_le(card.slice(0, 0, 0, 4)?) as u32)
}

/// Format a card number as printed, with its issuer prefix and check digit.
pub fn format_serial(serial: u32) -> String {
    let mut formatted = format!("0160 {}", format_number(u64::from(serial), " ", &[4, 4, 3]));
    let digits: String = formatted.chars().filter(char::is_ascii_digit).collect();

    if let Some(check) = luhn::check_digit(&digits) {
        formatted.push(char::from(b'0' + check));
    }

    formatted
}

/// Records of a card, sorted by kind.
#[derive(Debug, Default)]
struct Records {
    balances: Vec<record::BalanceRecord>,
    config: Option<record::ConfigRecord>,
    topups: Vec<record::TopupRecord>,
    taps: Vec<TransactionRecord>,
    passes: Vec<record::TravelPassRecord>,
}

impl Records {
    fn read(card: &GridStore) -> Self {
        let mut records = Self::default();

        for (sector, block, data) in card.data_blocks() {
            match record::classify(data, sector, block) {
                Record::Balance(r) => records.balances.push(r),
                Record::Config(r) => records.config = Some(r),
                Record::Topup(r) => records.topups.push(r),
                Record::Transaction(r) => records.taps.push(r),
                Record::TravelPass(r) => records.passes.push(r),
                Record::Unknown(_) => {}
            }
        }

        records
    }
}

impl NextfareSystem {
    fn station(&self, code: u32) -> Option<StationRef> {
        (code != 0).then_some(StationRef {
            system: self.stations,
            code,
        })
    }

    fn trip(&self, leg: Leg) -> Trip {
        Trip {
            kind: TripKind::Journey,
            mode: (self.mode)(leg.mode),
            start_time: leg.start_time,
            end_time: leg.end_time,
            start_station: self.station(leg.start_station),
            end_station: leg.end_station.and_then(|code| self.station(code)),
            fare: Some(Money::new(leg.cost, self.currency)),
            journey: Some(leg.journey),
            continuation: leg.continuation,
        }
    }

    /// Decode a card already known to belong to this deployment.
    pub fn decode(&self, card: &GridStore, context: &Context<'_>) -> Result<TransitData> {
        let serial = serial(card)?;
        let system_code = card.slice(0, 1, 9, 6)?;
        let block_2 = card.block(0, 2)?;

        let Records {
            balances,
            config,
            topups,
            taps,
            mut passes,
        } = Records::read(card);

        let mut data = TransitData::new(self.name, Some(format_serial(serial)));
        data.timezone = self.timezone;
        data.info = vec![
            Info::Header("Nextfare".into()),
            Info::item("System code", hex::encode_upper(system_code)),
            Info::item("Block 2", hex::encode_upper(block_2)),
        ];

        let resolved = reconstruct::resolve_balance(balances);

        if let Some(resolved) = &resolved {
            if resolved.ambiguous {
                data.info.push(Info::item(
                    "Balance",
                    format!("Ambiguous slots, using version {}", resolved.record.version),
                ));
            }

            if resolved.record.travel_pass_available {
                data.subscriptions.push(Subscription {
                    name: None,
                    state: SubscriptionState::Unused,
                    valid_from: None,
                    valid_to: None,
                });
            }
        }

        let mut balance = Balance::new(Money::new(
            resolved.map_or(0, |r| r.record.balance),
            self.currency,
        ));

        if let Some(config) = config {
            balance.class = Some(format!("Ticket class {}", config.ticket_type));
            balance.expiry = config.expiry.map(|e| e.date());
        }

        data.balance = Some(balance);

        let mut trips: Vec<Trip> = topups
            .into_iter()
            .map(|topup| {
                let mut trip = Trip::refill(Money::new(topup.credit, self.currency), topup.timestamp);
                trip.start_station = self.station(u32::from(topup.station));
                trip
            })
            .collect();

        let legs = reconstruct::legs(taps, &self.merge);
        debug!("Rebuilt {} trips from {} journeys.", legs.len(), self.name);

        trips.extend(legs.into_iter().map(|leg| self.trip(leg)));
        reconstruct::chronological(&mut trips);

        if self.report_unknown_stations {
            let mut unknown = UnknownStations::default();

            for trip in &trips {
                unknown.note(context.stations, trip.start_station.as_ref());
                unknown.note(context.stations, trip.end_station.as_ref());
            }

            data.has_unknown_stations = unknown.any();
        }

        data.trips = trips;

        passes.sort_by(|a, b| b.version.cmp(&a.version));

        if let Some(pass) = passes.first() {
            data.subscriptions.push(Subscription {
                name: Some("Travel pass".into()),
                state: SubscriptionState::Used,
                valid_from: None,
                valid_to: pass.expiry,
            });
        }

        Ok(data)
    }
}

impl TransitFactory<GridStore> for NextfareSystem {
    fn name(&self) -> &'static str {
        self.name
    }

    fn cards(&self) -> &'static [CardInfo] {
        self.cards
    }

    fn check(&self, card: &GridStore) -> Result<bool> {
        let block = card.block(0, 1)?;

        if block[1..9] != MANUFACTURER {
            return Ok(false);
        }

        Ok(self.system_codes.is_empty() || self.system_codes.iter().any(|code| block[9..15] == *code))
    }

    fn identity(&self, card: &GridStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(self.name, Some(format_serial(serial(card)?))))
    }

    fn data(&self, card: &GridStore, context: &Context<'_>) -> Result<Option<TransitData>> {
        self.decode(card, context).map(Some)
    }
}
