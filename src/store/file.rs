//! File storage, as found on ISO 7816 cards.
//!
//! Files are addressed either by a full selector path from the card root or
//! by a short file identifier (SFI) within the current application. Dumps
//! from older readers recorded only one of the two, so lookups accept both.

use alloc::{format, vec::Vec};
use core::fmt;

use super::{CardMeta, Locator, RawData, RawItem};
use crate::error::{Error, Result};

/// One step of a selector path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathElement {
    /// A dedicated file selected by name, such as an application identifier.
    Name(Vec<u8>),
    /// A file selected by its two-byte identifier.
    Id(u16),
}

/// A path from the card root to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(Vec<PathElement>);

impl Selector {
    /// A path selecting a dedicated file by name.
    pub fn name(name: &[u8]) -> Self {
        Self(alloc::vec![PathElement::Name(name.to_vec())])
    }

    /// A path selecting a file by identifier.
    pub fn id(id: u16) -> Self {
        Self(alloc::vec![PathElement::Id(id)])
    }

    /// Extend the path with a child file identifier.
    pub fn then(mut self, id: u16) -> Self {
        self.0.push(PathElement::Id(id));
        self
    }

    pub fn path(&self) -> &[PathElement] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }

            match element {
                PathElement::Name(name) => name.iter().try_for_each(|b| write!(f, "{b:02x}"))?,
                PathElement::Id(id) => write!(f, "{id:04x}")?,
            }
        }

        Ok(())
    }
}

/// How a file was addressed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileId {
    Sfi(u8),
    Path(Selector),
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sfi(sfi) => write!(f, "SFI {sfi:02x}"),
            Self::Path(selector) => write!(f, "{selector}"),
        }
    }
}

/// Contents of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum File {
    /// A record file, in the order records were read.
    Records(Vec<Vec<u8>>),
    /// A transparent elementary file.
    Binary(Vec<u8>),
}

impl File {
    /// Records of a record file; empty for a transparent file.
    pub fn records(&self) -> &[Vec<u8>] {
        match self {
            Self::Records(records) => records,
            Self::Binary(_) => &[],
        }
    }

    pub fn binary(&self) -> Option<&[u8]> {
        match self {
            Self::Records(_) => None,
            Self::Binary(data) => Some(data),
        }
    }
}

/// The application selected when the card was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    /// Application identifier.
    pub name: Vec<u8>,
    /// File control information returned on selection.
    pub fci: Vec<u8>,
    /// Purse balance, if the card answered a balance query.
    pub balance: Option<u32>,
}

/// A file and the addresses it was read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub selector: Selector,
    pub sfi: Option<u8>,
    pub file: File,
}

/// Memory of a card addressed by file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    meta: CardMeta,
    application: Application,
    files: Vec<FileEntry>,
}

impl FileStore {
    pub fn new(meta: CardMeta, application: Application, files: Vec<FileEntry>) -> Result<Self> {
        if files.is_empty() && application.fci.is_empty() && application.balance.is_none() {
            Err(Error::Unsupported("no files"))?;
        }

        Ok(Self {
            meta,
            application,
            files,
        })
    }

    pub fn meta(&self) -> &CardMeta {
        &self.meta
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// A file read under the given short file identifier.
    pub fn sfi_file(&self, sfi: u8) -> Option<&File> {
        self.files
            .iter()
            .find(|entry| entry.sfi == Some(sfi))
            .map(|entry| &entry.file)
    }

    /// A file read under the given selector path.
    pub fn file(&self, selector: &Selector) -> Option<&File> {
        self.files
            .iter()
            .find(|entry| entry.selector == *selector)
            .map(|entry| &entry.file)
    }

    /// Find a file by short identifier, falling back to its selector path.
    pub fn lookup(&self, selector: &Selector, sfi: Option<u8>) -> Result<&File> {
        sfi.and_then(|sfi| self.sfi_file(sfi))
            .or_else(|| self.file(selector))
            .ok_or_else(|| Error::NotFound(Locator::File(Self::file_id(selector, sfi))))
    }

    /// A single record of a file found as by [`lookup`](Self::lookup).
    pub fn record(&self, selector: &Selector, sfi: Option<u8>, index: usize) -> Result<&[u8]> {
        self.lookup(selector, sfi)?
            .records()
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::OutOfRange(Locator::Record {
                file: Self::file_id(selector, sfi),
                index,
            }))
    }

    fn file_id(selector: &Selector, sfi: Option<u8>) -> FileId {
        match sfi {
            Some(sfi) => FileId::Sfi(sfi),
            None => FileId::Path(selector.clone()),
        }
    }

    pub(super) fn raw(&self) -> Vec<RawItem> {
        let mut items = Vec::new();

        if !self.application.fci.is_empty() {
            items.push(RawItem {
                label: format!("Application {}", hex::encode(&self.application.name)),
                data: RawData::hex(&self.application.fci),
            });
        }

        for entry in &self.files {
            match &entry.file {
                File::Records(records) => {
                    items.extend(records.iter().enumerate().map(|(index, data)| RawItem {
                        label: format!("File {} / Record {index}", entry.selector),
                        data: RawData::hex(data),
                    }))
                }
                File::Binary(data) => items.push(RawItem {
                    label: format!("File {}", entry.selector),
                    data: RawData::hex(data),
                }),
            }
        }

        items
    }
}
