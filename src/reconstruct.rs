//! Reassembly of trips and balances from card logs.
//!
//! Cards log individual taps rather than trips: a tap-on when boarding and,
//! on some systems, a tap-off when alighting. Trips are rebuilt by sorting
//! taps and merging each with its successor when the system's merge rule
//! says the two belong to the same ride. The engine works on the [`Tap`]
//! abstraction so each card format only has to say where its fields live.
//!
//! Balances are often written to two alternating slots, each stamped with an
//! 8-bit version counter; [`resolve_balance`] picks the current one.

use alloc::vec::Vec;
use core::cmp::Ordering;

use either::Either::{self, Left, Right};
use log::{trace, warn};
use time::PrimitiveDateTime;

use crate::model::{StationRef, Trip};
use crate::station::StationLookup;

/// A logged tap, able to open or close a trip.
///
/// The [`Ord`] implementation is the order taps are replayed in, usually by
/// journey and then by time.
pub trait Tap: Ord {
    /// Identifier correlating the taps of one journey.
    fn journey(&self) -> u32;
    /// Raw mode code, compared when deciding whether taps merge.
    fn mode(&self) -> u8;
    /// Signed change to stored value; charges are negative.
    fn value(&self) -> i64;
    fn timestamp(&self) -> Option<PrimitiveDateTime>;
    fn station(&self) -> u32;
    fn continuation(&self) -> bool {
        false
    }
}

/// Decides whether a tap completes the trip opened by its predecessor.
pub trait MergeRule<T> {
    fn should_merge(&self, on: &T, off: &T) -> bool;
}

impl<T, F: Fn(&T, &T) -> bool> MergeRule<T> for F {
    fn should_merge(&self, on: &T, off: &T) -> bool {
        self(on, off)
    }
}

/// Merge consecutive taps sharing a journey and mode.
pub fn same_journey<T: Tap>(on: &T, off: &T) -> bool {
    on.journey() == off.journey() && on.mode() == off.mode()
}

/// Never merge, for systems which record no tap-off.
pub fn never<T>(_on: &T, _off: &T) -> bool {
    false
}

/// A trip rebuilt from one or two taps, still in raw card codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub journey: u32,
    pub mode: u8,
    pub start_time: Option<PrimitiveDateTime>,
    pub end_time: Option<PrimitiveDateTime>,
    pub start_station: u32,
    pub end_station: Option<u32>,
    /// Amount charged; negative for a net credit.
    pub cost: i64,
    pub continuation: bool,
}

/// State token for a trip opened by a tap, awaiting its tap-off.
#[derive(Debug)]
pub struct PendingTrip<'a, T> {
    on: &'a T,
    leg: Leg,
}

impl<'a, T: Tap> PendingTrip<'a, T> {
    pub fn open(on: &'a T) -> Self {
        let leg = Leg {
            journey: on.journey(),
            mode: on.mode(),
            start_time: on.timestamp(),
            end_time: None,
            start_station: on.station(),
            end_station: None,
            cost: -on.value(),
            continuation: on.continuation(),
        };

        Self { on, leg }
    }

    /// Transition by offering the following tap, if any, as a tap-off.
    ///
    /// Returns the closed trip if the tap was consumed, or the trip left open
    /// if it was not.
    pub fn advance(self, next: Option<&T>, rule: &impl MergeRule<T>) -> Either<Leg, Leg> {
        let Self { on, mut leg } = self;

        match next {
            Some(off) if rule.should_merge(on, off) => {
                leg.end_time = off.timestamp();
                leg.end_station = Some(off.station());
                leg.cost -= off.value();
                Left(leg)
            }
            _ => Right(leg),
        }
    }
}

/// Sort taps and merge them into trips.
pub fn legs<T: Tap>(mut taps: Vec<T>, rule: &impl MergeRule<T>) -> Vec<Leg> {
    taps.sort();

    let mut legs = Vec::with_capacity(taps.len());
    let mut i = 0;

    while let Some(on) = taps.get(i) {
        i += match PendingTrip::open(on).advance(taps.get(i + 1), rule) {
            Left(leg) => {
                trace!("Merged taps into journey {}.", leg.journey);
                legs.push(leg);
                2
            }
            Right(leg) => {
                legs.push(leg);
                1
            }
        };
    }

    legs
}

/// Put trips in chronological order, oldest first.
///
/// Trips are sorted newest first by start (or else end) time and journey,
/// then reversed. Trips with no time at all end up first.
pub fn chronological(trips: &mut [Trip]) {
    trips.sort_by(newest_first);
    trips.reverse();
}

fn newest_first(a: &Trip, b: &Trip) -> Ordering {
    let by_time = match (a.sort_time(), b.sort_time()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_time.then_with(|| b.journey.cmp(&a.journey))
}

/// A record stamped with an 8-bit version counter.
pub trait Versioned {
    fn version(&self) -> u8;
}

/// Versions at or above this are taken to be about to wrap, and are never
/// ambiguous.
pub const WRAP_HIGH: u8 = 240;
/// Versions at or below this are taken to have just wrapped, and are never
/// ambiguous.
pub const WRAP_LOW: u8 = 10;

/// A balance slot chosen by [`resolve_balance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub record: T,
    /// Whether both of two slots held mid-range versions, leaving the choice
    /// without a wraparound to decide it.
    pub ambiguous: bool,
}

/// Choose the current balance record among versioned slots.
///
/// Candidates are sorted by version. With exactly two, a first slot at or
/// above [`WRAP_HIGH`] and a second at or below [`WRAP_LOW`] are read as a
/// counter wraparound and the second is chosen; otherwise the first is.
///
/// The ascending sort means the wraparound case never holds, so the lowest
/// version is always chosen: `(250, 3)` resolves to 3. The thresholds only
/// decide whether two mid-range versions are reported as ambiguous.
pub fn resolve_balance<T: Versioned>(mut candidates: Vec<T>) -> Option<Resolved<T>> {
    candidates.sort_by_key(T::version);

    let (wrapped, ambiguous) = match candidates.as_slice() {
        [a, b] => {
            let mid = |v: u8| v > WRAP_LOW && v < WRAP_HIGH;
            (
                a.version() >= WRAP_HIGH && b.version() <= WRAP_LOW,
                mid(a.version()) && mid(b.version()),
            )
        }
        _ => (false, false),
    };

    if ambiguous {
        let versions: Vec<u8> = candidates.iter().map(T::version).collect();
        warn!("Ambiguous balance slot versions {versions:?}, choosing the first.");
    }

    let index = usize::from(wrapped);

    (index < candidates.len()).then(|| Resolved {
        record: candidates.swap_remove(index),
        ambiguous,
    })
}

/// Sticky record of whether any station failed to resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnknownStations(bool);

impl UnknownStations {
    /// Check a station against the lookup, latching on the first miss.
    pub fn note(&mut self, stations: &dyn StationLookup, station: Option<&StationRef>) {
        if self.0 {
            return;
        }

        if let Some(station) = station {
            if station.code != 0 && station.resolve(stations).is_none() {
                trace!("Unknown station {} in {}.", station.code, station.system);
                self.0 = true;
            }
        }
    }

    pub fn any(&self) -> bool {
        self.0
    }
}
