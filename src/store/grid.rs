//! Sector and block storage, as found on MIFARE Classic cards.

use alloc::{format, vec::Vec};

use super::{CardMeta, Locator, RawData, RawItem};
use crate::error::{Error, Result};

/// Bytes in a block.
pub const BLOCK_SIZE: usize = 16;

pub type Block = [u8; BLOCK_SIZE];

/// A sector as read from the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sector {
    /// Blocks of a readable sector, the last of which holds access keys.
    Present(Vec<Block>),
    /// A sector the reader held no key for.
    Unauthorized,
}

/// Memory of a card addressed by sector and block.
///
/// Sector 0 holds the manufacturer preamble, and the last block of every
/// sector holds its access conditions; neither carries transit payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStore {
    meta: CardMeta,
    sectors: Vec<Sector>,
}

impl GridStore {
    pub fn new(meta: CardMeta, sectors: Vec<Sector>) -> Result<Self> {
        if sectors.is_empty() {
            Err(Error::Unsupported("no sectors"))?;
        }

        Ok(Self { meta, sectors })
    }

    pub fn meta(&self) -> &CardMeta {
        &self.meta
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Blocks of a sector, if it was readable.
    pub fn sector(&self, index: usize) -> Result<&[Block]> {
        match self.sectors.get(index) {
            Some(Sector::Present(blocks)) => Ok(blocks),
            Some(Sector::Unauthorized) => Err(Error::Unauthorized(Locator::Sector(index))),
            None => Err(Error::OutOfRange(Locator::Sector(index))),
        }
    }

    pub fn block(&self, sector: usize, block: usize) -> Result<&Block> {
        self.sector(sector)?
            .get(block)
            .ok_or(Error::OutOfRange(Locator::Block { sector, block }))
    }

    /// Borrow `len` bytes of a block, starting at `offset`.
    pub fn slice(&self, sector: usize, block: usize, offset: usize, len: usize) -> Result<&[u8]> {
        let data = self.block(sector, block)?;

        offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or(Error::OutOfRange(Locator::Block { sector, block }))
    }

    /// Iterate over blocks which may carry transit payload.
    ///
    /// Yields `(sector, block, data)` for every block outside the preamble
    /// sector and sector trailers, skipping unreadable sectors.
    pub fn data_blocks(&self) -> impl Iterator<Item = (usize, usize, &Block)> {
        self.sectors
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, sector)| match sector {
                Sector::Present(blocks) => Some((index, blocks)),
                Sector::Unauthorized => None,
            })
            .flat_map(|(sector, blocks)| {
                let trailer = blocks.len().saturating_sub(1);
                blocks
                    .iter()
                    .enumerate()
                    .take(trailer)
                    .map(move |(block, data)| (sector, block, data))
            })
    }

    pub(super) fn raw(&self) -> Vec<RawItem> {
        let mut items = Vec::new();

        for (index, sector) in self.sectors.iter().enumerate() {
            match sector {
                Sector::Present(blocks) => {
                    items.extend(blocks.iter().enumerate().map(|(block, data)| RawItem {
                        label: format!("Sector {index} / Block {block}"),
                        data: RawData::hex(data),
                    }))
                }
                Sector::Unauthorized => items.push(RawItem {
                    label: format!("Sector {index}"),
                    data: RawData::Unauthorized,
                }),
            }
        }

        items
    }
}
