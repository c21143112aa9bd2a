//! Go card, South East Queensland, Australia.

use crate::model::{CardInfo, Family, Mode};
use crate::reconstruct::same_journey;

use super::nextfare::NextfareSystem;

pub static SEQ_GO: NextfareSystem = NextfareSystem {
    name: "Go card",
    currency: "AUD",
    timezone: Some("Australia/Brisbane"),
    stations: "seq_go",
    report_unknown_stations: true,
    system_codes: &[
        [0x5A, 0x5B, 0x20, 0x21, 0x22, 0x23],
        [0x20, 0x21, 0x22, 0x23, 0x01, 0x01],
    ],
    merge: same_journey,
    mode,
    cards: &[CardInfo {
        name: "Go card",
        location: "Brisbane and South East Queensland, Australia",
        family: Family::MifareClassic,
        keys_required: true,
        preview: false,
    }],
};

fn mode(code: u8) -> Mode {
    match code {
        1 => Mode::TicketMachine,
        4 => Mode::Bus,
        5 => Mode::Train,
        18 => Mode::Ferry,
        _ => Mode::Other,
    }
}
