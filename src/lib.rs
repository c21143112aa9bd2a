#![no_std]

//! A decoder for contactless transit smart-card dumps.
//!
//! Turnstile takes a memory image already read from a card and turns it into
//! a normalized picture of the card: who issued it, its serial number, its
//! stored-value balance, its trip history and its passes.
//!
//! Card dumps are wrapped in a [`ByteStore`], which comes in one flavour per
//! card family. A [`Session`] holds the ordered list of transit decoders for
//! each family and picks the first that recognizes a card, falling back to a
//! generic decoder when none does. Most users need only [`Session::identify`]
//! and [`Session::decode`].
//!
//! Individual decoders live in [`transit`], built on the stateless helpers in
//! [`codec`] and the trip assembly in [`reconstruct`].
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable loading station tables from CSV (default).
//! - `serde`: implement `Serialize` for the decoded data model.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod reconstruct;
pub mod station;
pub mod store;
pub mod transit;

pub use dispatch::{Context, Registry, Session, TransitFactory};
pub use error::{Error, Result};
pub use model::{TransitData, TransitIdentity};
pub use store::ByteStore;
