//! The KS X 6923 transit purse application.
//!
//! KS X 6923 is a Korean standard for stored-value transit purses, used by
//! T-money and adopted by Snapper in New Zealand. Card details live in a
//! "purse info" structure under BER-TLV tag `B0` of the application's file
//! control information; trips are logged in record files.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::format;

use time::Date;

use crate::codec::{bcd, group, tlv};
use crate::error::{Error, Result};
use crate::model::{Balance, Info, Money};
use crate::store::{FileStore, Locator, Selector};

/// Application identifier of the purse application.
pub const APP_NAME: [u8; 7] = [0xD4, 0x10, 0x00, 0x00, 0x03, 0x00, 0x01];

/// Short identifier of the transaction log.
pub const TRANSACTION_FILE: u8 = 4;

/// Tag holding purse info.
const PURSE_INFO: u32 = 0xB0;

/// Fail unless the store holds the purse application.
pub fn ensure(card: &FileStore) -> Result<()> {
    if card.application().name != APP_NAME {
        Err(Error::Unsupported("not a KS X 6923 application"))?;
    }

    Ok(())
}

/// Records of a file found by short identifier, or for older dumps by its
/// path under the application. Missing files read as empty.
pub fn records(card: &FileStore, sfi: u8) -> Result<&[Vec<u8>]> {
    let selector = Selector::name(&APP_NAME).then(u16::from(sfi));

    match card.lookup(&selector, Some(sfi)) {
        Ok(file) => Ok(file.records()),
        Err(Error::NotFound(_)) => Ok(&[]),
        Err(e) => Err(e),
    }
}

/// Card details held in the application's file control information.
#[derive(Debug, Clone, Copy)]
pub struct PurseInfo<'a>(&'a [u8]);

impl<'a> PurseInfo<'a> {
    pub fn read(card: &'a FileStore) -> Result<Self> {
        tlv::find(&card.application().fci, PURSE_INFO)
            .map(Self)
            .ok_or(Error::NotFound(Locator::Tag(PURSE_INFO)))
    }

    fn field(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.0
            .get(offset..offset + len)
            .ok_or(Error::OutOfRange(Locator::Tag(PURSE_INFO)))
    }

    fn byte(&self, offset: usize) -> Result<u8> {
        Ok(self.field(offset, 1)?[0])
    }

    pub fn card_type(&self) -> Result<u8> {
        self.byte(0)
    }

    pub fn id_center(&self) -> Result<u8> {
        self.byte(3)
    }

    /// Card serial number, as hexadecimal.
    pub fn csn(&self) -> Result<String> {
        Ok(hex::encode(self.field(4, 8)?))
    }

    /// Card serial number, as printed.
    pub fn serial(&self) -> Result<String> {
        Ok(group(&self.csn()?, " ", &[4, 4, 4]))
    }

    /// Identifier of the card's holder registration, if encoded.
    pub fn idtr(&self) -> Result<Option<u64>> {
        Ok(bcd::decode(self.field(12, 5)?))
    }

    pub fn issue_date(&self) -> Result<Option<Date>> {
        Ok(bcd::date(self.field(17, 4)?))
    }

    pub fn expiry_date(&self) -> Result<Option<Date>> {
        Ok(bcd::date(self.field(21, 4)?))
    }

    pub fn user_code(&self) -> Result<u8> {
        self.byte(26)
    }

    pub fn discount_rate(&self) -> Result<u8> {
        self.byte(27)
    }

    pub fn transport_code(&self) -> Result<u8> {
        self.byte(37)
    }

    pub fn company_code(&self) -> Result<u8> {
        self.byte(38)
    }

    /// A balance in `currency`, valid over the card's issue period.
    pub fn balance(&self, amount: u32, currency: &'static str) -> Result<Balance> {
        let mut balance = Balance::new(Money::new(i64::from(amount), currency));
        balance.valid_from = self.issue_date()?;
        balance.expiry = self.expiry_date()?;

        Ok(balance)
    }

    /// Details worth showing alongside trips.
    pub fn info(&self) -> Result<Vec<Info>> {
        let date = |d: Option<Date>| d.map_or_else(|| String::from("Unknown"), |d| format!("{d}"));

        let mut info = alloc::vec![
            Info::Header("Purse".into()),
            Info::item("Card type", format!("{:#04x}", self.card_type()?)),
            Info::item("Issuer", format!("{:#04x}", self.id_center()?)),
            Info::item("Issue date", date(self.issue_date()?)),
            Info::item("Expiry date", date(self.expiry_date()?)),
            Info::item("User code", format!("{:#04x}", self.user_code()?)),
            Info::item("Discount rate", format!("{:#04x}", self.discount_rate()?)),
        ];

        if let Some(idtr) = self.idtr()? {
            info.push(Info::item("Holder registration", format!("{idtr}")));
        }

        if let (Ok(transport), Ok(company)) = (self.transport_code(), self.company_code()) {
            info.push(Info::item("Transport code", format!("{transport:#04x}")));
            info.push(Info::item("Company code", format!("{company:#04x}")));
        }

        Ok(info)
    }
}
