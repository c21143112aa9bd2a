//! Errors raised while reading card storage.

use thiserror::Error;

use crate::store::Locator;

/// An error reading or interpreting card storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An address or length outside the bounds of the store.
    #[error("Read past the end of the store at {0}.")]
    OutOfRange(Locator),
    /// A region the reader could not authenticate to.
    #[error("Could not read {0} from the card.")]
    Unauthorized(Locator),
    /// A file or tag absent from the store.
    #[error("Nothing found at {0}.")]
    NotFound(Locator),
    /// A card which no decoder can represent.
    #[error("Unsupported card ({0}).")]
    Unsupported(&'static str),
}

impl Error {
    /// Whether this error means a decoder guessed wrong about a card's
    /// layout. The dispatcher treats such errors as "no match" rather than
    /// failing the card.
    pub fn is_layout_miss(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
