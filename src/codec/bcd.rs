//! Packed binary-coded decimal.
//!
//! Timestamps written as BCD use an all-`FF` field to mean "no value".

use time::{Date, Month, PrimitiveDateTime, Time};

use super::is_all;

/// Decode one byte, if both of its nibbles are decimal digits.
pub fn byte(b: u8) -> Option<u8> {
    let (high, low) = (b >> 4, b & 0x0F);
    (high < 10 && low < 10).then_some(high * 10 + low)
}

/// Decode a big-endian BCD field into an integer.
pub fn decode(bytes: &[u8]) -> Option<u64> {
    bytes.iter().try_fold(0u64, |acc, b| {
        acc.checked_mul(100)?.checked_add(u64::from(byte(*b)?))
    })
}

/// Whether a field holds the all-ones "no value" sentinel.
pub fn is_sentinel(bytes: &[u8]) -> bool {
    is_all(bytes, 0xFF)
}

/// Decode a BCD timestamp.
///
/// Seven-byte fields read `YYYYMMDDhhmmss`; six-byte fields read
/// `YYMMDDhhmmss` with years counted from 2000.
pub fn date_time(bytes: &[u8]) -> Option<PrimitiveDateTime> {
    if is_sentinel(bytes) {
        return None;
    }

    let (year, rest) = match bytes.len() {
        7 => (decode(&bytes[..2])?, &bytes[2..]),
        6 => (2000 + decode(&bytes[..1])?, &bytes[1..]),
        _ => return None,
    };

    let &[month, day, hour, minute, second] = rest else {
        return None;
    };

    let date = calendar_date(year, byte(month)?, byte(day)?)?;
    let time = Time::from_hms(byte(hour)?, byte(minute)?, byte(second)?).ok()?;

    Some(PrimitiveDateTime::new(date, time))
}

/// Decode a four-byte `YYYYMMDD` BCD date.
pub fn date(bytes: &[u8]) -> Option<Date> {
    let &[century, year, month, day] = bytes else {
        return None;
    };

    if is_sentinel(bytes) {
        return None;
    }

    calendar_date(decode(&[century, year])?, byte(month)?, byte(day)?)
}

fn calendar_date(year: u64, month: u8, day: u8) -> Option<Date> {
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(i32::try_from(year).ok()?, month, day).ok()
}
