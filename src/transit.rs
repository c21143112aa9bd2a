//! Decoders for individual transit systems.
//!
//! The standard registries below fix the order decoders are tried in. Order
//! matters: a system-specific decoder must come ahead of the generic decoder
//! for the same card platform, and the blank and locked catch-alls must come
//! after everything that could claim a partly readable card.

pub mod classic;
pub mod ksx6923;
pub mod lax_tap;
pub mod nextfare;
pub mod selecta;
pub mod seq_go;
pub mod snapper;
pub mod tmoney;
pub mod ultralight;

use crate::dispatch::{Registry, TransitFactory};
use crate::store::{FileStore, GridStore, PageStore};

/// Standard decoders for MIFARE Classic cards.
pub fn classic() -> Registry<GridStore> {
    let candidates: [&'static dyn TransitFactory<GridStore>; 6] = [
        &selecta::SELECTA_FRANCE,
        &seq_go::SEQ_GO,
        &lax_tap::LAX_TAP,
        &nextfare::NEXTFARE,
        &classic::BLANK,
        &classic::LOCKED,
    ];

    Registry::new(candidates.to_vec(), &classic::UNKNOWN)
}

/// Standard decoders for MIFARE Ultralight cards.
pub fn ultralight() -> Registry<PageStore> {
    let candidates: [&'static dyn TransitFactory<PageStore>; 5] = [
        &ultralight::COMPASS,
        &ultralight::VENTRA,
        &ultralight::NEXTFARE_ULTRALIGHT,
        &ultralight::BLANK,
        &ultralight::LOCKED,
    ];

    Registry::new(candidates.to_vec(), &ultralight::UNKNOWN)
}

/// Standard decoders for KS X 6923 purse applications.
pub fn ksx6923() -> Registry<FileStore> {
    let candidates: [&'static dyn TransitFactory<FileStore>; 2] =
        [&snapper::SNAPPER, &tmoney::TMONEY];

    Registry::new(candidates.to_vec(), &tmoney::TMONEY)
}
