//! Read-only views over card memory.
//!
//! Each card family lays out its memory differently: MIFARE Classic cards as
//! sectors of 16-byte blocks ([`GridStore`]), MIFARE Ultralight cards as a
//! flat run of 4-byte pages ([`PageStore`]), and ISO 7816 cards as a tree of
//! files holding records ([`FileStore`]). All three report the same
//! [`Error`](crate::Error) kinds when asked for something they do not hold,
//! and all are immutable once built.

pub mod file;
pub mod grid;
pub mod page;

use alloc::{string::String, vec::Vec};
use core::fmt;

use time::OffsetDateTime;

pub use file::{Application, File, FileEntry, FileId, FileStore, PathElement, Selector};
pub use grid::{BLOCK_SIZE, Block, GridStore, Sector};
pub use page::{PAGE_SIZE, Page, PageStore};

use crate::model::Family;

/// Details recorded alongside every dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardMeta {
    /// Anti-collision identifier reported by the tag.
    pub tag_id: Vec<u8>,
    /// When the dump was taken, if the reader recorded it.
    pub scanned_at: Option<OffsetDateTime>,
    /// Chip model reported by the reader, such as `EV1_MF0UL11`.
    pub model: Option<String>,
}

/// A position within a store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Locator {
    /// A whole sector of a grid store.
    Sector(usize),
    /// A block within a sector of a grid store.
    Block { sector: usize, block: usize },
    /// A page of a page store.
    Page(usize),
    /// A file of a file store.
    File(FileId),
    /// A record within a file of a file store.
    Record { file: FileId, index: usize },
    /// A BER-TLV tag within file control information.
    Tag(u32),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sector(sector) => write!(f, "sector {sector}"),
            Self::Block { sector, block } => write!(f, "sector {sector} block {block}"),
            Self::Page(page) => write!(f, "page {page}"),
            Self::File(file) => write!(f, "file {file}"),
            Self::Record { file, index } => write!(f, "file {file} record {index}"),
            Self::Tag(tag) => write!(f, "tag {tag:02x}"),
        }
    }
}

/// One line of a raw dump listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub label: String,
    pub data: RawData,
}

/// Contents of a raw dump line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawData {
    /// Upper-case hexadecimal bytes.
    Hex(String),
    /// A region the reader could not authenticate to.
    Unauthorized,
}

impl RawData {
    fn hex(data: &[u8]) -> Self {
        Self::Hex(hex::encode_upper(data))
    }
}

/// Memory of a card of any supported family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteStore {
    Grid(GridStore),
    Page(PageStore),
    File(FileStore),
}

impl ByteStore {
    pub fn meta(&self) -> &CardMeta {
        match self {
            Self::Grid(s) => s.meta(),
            Self::Page(s) => s.meta(),
            Self::File(s) => s.meta(),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Self::Grid(_) => Family::MifareClassic,
            Self::Page(_) => Family::MifareUltralight,
            Self::File(_) => Family::Iso7816,
        }
    }

    /// List the store's contents for debugging, in storage order.
    pub fn raw(&self) -> Vec<RawItem> {
        match self {
            Self::Grid(s) => s.raw(),
            Self::Page(s) => s.raw(),
            Self::File(s) => s.raw(),
        }
    }
}
