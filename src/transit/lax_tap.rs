//! TAP, Los Angeles, California.
//!
//! TAP charges flat fares on boarding and records no tap-off, so taps are
//! never merged into longer trips.

use crate::model::{CardInfo, Family, Mode};
use crate::reconstruct::never;

use super::nextfare::NextfareSystem;

pub static LAX_TAP: NextfareSystem = NextfareSystem {
    name: "TAP",
    currency: "USD",
    timezone: Some("America/Los_Angeles"),
    stations: "lax_tap",
    report_unknown_stations: true,
    system_codes: &[[0x01, 0x01, 0x01, 0x01, 0x01, 0x01]],
    merge: never,
    mode,
    cards: &[CardInfo {
        name: "TAP",
        location: "Los Angeles, CA, USA",
        family: Family::MifareClassic,
        keys_required: true,
        preview: false,
    }],
};

fn mode(code: u8) -> Mode {
    match code {
        1 => Mode::Metro,
        2 => Mode::Bus,
        3 => Mode::Tram,
        _ => Mode::Other,
    }
}
