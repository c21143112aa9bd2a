//! Choosing a decoder for a card.
//!
//! Each card family has an ordered [`Registry`] of [`TransitFactory`]
//! decoders. The first whose `check` accepts a card wins, so specific
//! decoders sit ahead of generic ones and catch-alls come last. Probing a
//! card with the wrong decoder routinely reads past the end of a store or
//! into a locked region; such errors only mean "not this decoder", and the
//! search carries on. When nothing matches, the family's fallback decoder
//! describes the card as best it can.
//!
//! A [`Session`] bundles the three registries with the station tables, and
//! is built once and shared for any number of cards.

use alloc::vec::Vec;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{CardInfo, TransitData, TransitIdentity};
use crate::station::StationLookup;
use crate::store::{ByteStore, FileStore, GridStore, PageStore};
use crate::transit::{self, ksx6923};

/// Inputs available to decoders beyond the card itself.
#[derive(Clone, Copy)]
pub struct Context<'s> {
    pub stations: &'s dyn StationLookup,
}

/// A decoder for one transit system on cards of memory layout `C`.
pub trait TransitFactory<C>: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Cards this decoder understands, for listing to users.
    fn cards(&self) -> &'static [CardInfo] {
        &[]
    }

    /// Whether this decoder recognizes the card.
    ///
    /// Should read as little as possible. Errors are taken as "no".
    fn check(&self, card: &C) -> Result<bool>;

    /// Name and serial number, without decoding trips.
    fn identity(&self, card: &C) -> Result<TransitIdentity>;

    /// Decode everything. `None` hands the card to the fallback decoder.
    fn data(&self, card: &C, context: &Context<'_>) -> Result<Option<TransitData>>;
}

/// Decoders for one card family, in priority order.
pub struct Registry<C: 'static> {
    candidates: Vec<&'static dyn TransitFactory<C>>,
    fallback: &'static dyn TransitFactory<C>,
}

impl<C: 'static> Registry<C> {
    /// Build a registry trying `candidates` in order, then `fallback`.
    pub fn new(
        candidates: Vec<&'static dyn TransitFactory<C>>,
        fallback: &'static dyn TransitFactory<C>,
    ) -> Self {
        Self {
            candidates,
            fallback,
        }
    }

    pub fn candidates(&self) -> &[&'static dyn TransitFactory<C>] {
        &self.candidates
    }

    pub fn fallback(&self) -> &'static dyn TransitFactory<C> {
        self.fallback
    }

    /// The first decoder recognizing the card, if any.
    pub fn find(&self, card: &C) -> Option<&'static dyn TransitFactory<C>> {
        self.matching(card).next()
    }

    /// Identify the card with the first decoder able to.
    pub fn identify(&self, card: &C) -> Result<TransitIdentity> {
        for factory in self.matching(card) {
            match factory.identity(card) {
                Ok(identity) => return Ok(identity),
                Err(e) if e.is_layout_miss() => debug!("{} failed to identify card: {e}", factory.name()),
                Err(e) => Err(e)?,
            }
        }

        self.fallback.identity(card)
    }

    /// Decode the card with the first decoder able to.
    pub fn decode(&self, card: &C, context: &Context<'_>) -> Result<TransitData> {
        for factory in self.matching(card) {
            match factory.data(card, context) {
                Ok(Some(data)) => return Ok(data),
                Ok(None) => {
                    debug!("{} declined card, using {}.", factory.name(), self.fallback.name());
                    break;
                }
                Err(e) if e.is_layout_miss() => warn!("{} failed to decode card: {e}", factory.name()),
                Err(e) => Err(e)?,
            }
        }

        self.fallback
            .data(card, context)?
            .ok_or(Error::Unsupported("fallback decoder declined card"))
    }

    fn matching<'a>(&'a self, card: &'a C) -> impl Iterator<Item = &'static dyn TransitFactory<C>> + 'a {
        self.candidates
            .iter()
            .copied()
            .filter(move |factory| match factory.check(card) {
                Ok(matched) => matched,
                Err(e) => {
                    debug!("{} check failed: {e}", factory.name());
                    false
                }
            })
    }

    fn cards(&self) -> impl Iterator<Item = &'static CardInfo> + '_ {
        self.candidates
            .iter()
            .chain(core::iter::once(&self.fallback))
            .flat_map(|factory| factory.cards())
    }
}

/// Decoders and station tables for a run of decoding.
pub struct Session<'s> {
    stations: &'s dyn StationLookup,
    classic: Registry<GridStore>,
    ultralight: Registry<PageStore>,
    ksx6923: Registry<FileStore>,
}

impl<'s> Session<'s> {
    /// A session using the standard decoders.
    pub fn new(stations: &'s dyn StationLookup) -> Self {
        Self {
            stations,
            classic: transit::classic(),
            ultralight: transit::ultralight(),
            ksx6923: transit::ksx6923(),
        }
    }

    pub fn with_classic(self, classic: Registry<GridStore>) -> Self {
        Self { classic, ..self }
    }

    pub fn with_ultralight(self, ultralight: Registry<PageStore>) -> Self {
        Self { ultralight, ..self }
    }

    pub fn with_ksx6923(self, ksx6923: Registry<FileStore>) -> Self {
        Self { ksx6923, ..self }
    }

    pub fn context(&self) -> Context<'s> {
        Context {
            stations: self.stations,
        }
    }

    /// Name and serial number of a card.
    pub fn identify(&self, store: &ByteStore) -> Result<TransitIdentity> {
        match store {
            ByteStore::Grid(card) => self.classic.identify(card),
            ByteStore::Page(card) => self.ultralight.identify(card),
            ByteStore::File(card) => {
                ksx6923::ensure(card)?;
                self.ksx6923.identify(card)
            }
        }
    }

    /// Everything that can be decoded from a card.
    pub fn decode(&self, store: &ByteStore) -> Result<TransitData> {
        let context = self.context();

        match store {
            ByteStore::Grid(card) => self.classic.decode(card, &context),
            ByteStore::Page(card) => self.ultralight.decode(card, &context),
            ByteStore::File(card) => {
                ksx6923::ensure(card)?;
                self.ksx6923.decode(card, &context)
            }
        }
    }

    /// Every card the session's decoders understand, by name.
    pub fn cards(&self) -> Vec<&'static CardInfo> {
        let mut cards: Vec<_> = self
            .classic
            .cards()
            .chain(self.ultralight.cards())
            .chain(self.ksx6923.cards())
            .collect();

        cards.sort_by_key(|card| card.name);
        cards.dedup();
        cards
    }
}
