//! Page storage, as found on MIFARE Ultralight cards.

use alloc::{format, vec::Vec};

use super::{CardMeta, Locator, RawData, RawItem};
use crate::error::{Error, Result};

/// Bytes in a page.
pub const PAGE_SIZE: usize = 4;

/// A page as read from the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Present([u8; PAGE_SIZE]),
    /// A page protected from reading.
    Unauthorized,
}

/// Memory of a card addressed by page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStore {
    meta: CardMeta,
    pages: Vec<Page>,
}

impl PageStore {
    pub fn new(meta: CardMeta, pages: Vec<Page>) -> Result<Self> {
        if pages.is_empty() {
            Err(Error::Unsupported("no pages"))?;
        }

        Ok(Self { meta, pages })
    }

    pub fn meta(&self) -> &CardMeta {
        &self.meta
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Chip model reported by the reader.
    pub fn model(&self) -> Option<&str> {
        self.meta.model.as_deref()
    }

    /// State of a page, readable or not.
    pub fn page(&self, index: usize) -> Result<&Page> {
        self.pages
            .get(index)
            .ok_or(Error::OutOfRange(Locator::Page(index)))
    }

    /// Contents of a readable page.
    pub fn page_data(&self, index: usize) -> Result<&[u8; PAGE_SIZE]> {
        match self.page(index)? {
            Page::Present(data) => Ok(data),
            Page::Unauthorized => Err(Error::Unauthorized(Locator::Page(index))),
        }
    }

    /// Concatenate `count` consecutive pages starting at `start`.
    ///
    /// Fails if the range runs past the last page or any page in it is
    /// unreadable.
    pub fn read_pages(&self, start: usize, count: usize) -> Result<Vec<u8>> {
        let end = start
            .checked_add(count)
            .filter(|end| *end <= self.pages.len())
            .ok_or(Error::OutOfRange(Locator::Page(start)))?;
        let capacity = count
            .checked_mul(PAGE_SIZE)
            .ok_or(Error::OutOfRange(Locator::Page(start)))?;

        let mut data = Vec::with_capacity(capacity);

        for index in start..end {
            data.extend_from_slice(self.page_data(index)?);
        }

        Ok(data)
    }

    /// Read `len` bytes starting `offset` bytes into page `page`.
    pub fn slice(&self, page: usize, offset: usize, len: usize) -> Result<Vec<u8>> {
        let end = offset
            .checked_add(len)
            .ok_or(Error::OutOfRange(Locator::Page(page)))?;
        let data = self.read_pages(page, end.div_ceil(PAGE_SIZE))?;

        data.get(offset..end)
            .map(<[u8]>::to_vec)
            .ok_or(Error::OutOfRange(Locator::Page(page)))
    }

    /// The seven-byte tag identifier stored in pages 0 and 1.
    ///
    /// Page 0 carries three identifier bytes and a check byte, page 1 the
    /// remaining four.
    pub fn uid(&self) -> Result<[u8; 7]> {
        let [a, b, c, _] = *self.page_data(0)?;
        let [d, e, f, g] = *self.page_data(1)?;

        Ok([a, b, c, d, e, f, g])
    }

    pub(super) fn raw(&self) -> Vec<RawItem> {
        self.pages
            .iter()
            .enumerate()
            .map(|(index, page)| RawItem {
                label: format!("Page {index:02x}"),
                data: match page {
                    Page::Present(data) => RawData::hex(data),
                    Page::Unauthorized => RawData::Unauthorized,
                },
            })
            .collect()
    }
}
