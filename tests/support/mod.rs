#![allow(dead_code)]

use turnstile::store::{
    Application, Block, CardMeta, File, FileEntry, FileStore, GridStore, Page, PageStore, Sector,
    Selector,
};
use turnstile::transit::ksx6923::APP_NAME;
use turnstile::transit::nextfare::MANUFACTURER;

pub fn meta(tag_id: &str) -> CardMeta {
    CardMeta {
        tag_id: hex::decode(tag_id).unwrap(),
        ..CardMeta::default()
    }
}

pub fn bytes(hex: &str) -> Vec<u8> {
    hex::decode(hex.replace(' ', "")).unwrap()
}

// Grid stores.

pub fn zero_sectors(count: usize) -> Vec<Sector> {
    vec![Sector::Present(vec![[0; 16]; 4]); count]
}

pub fn set(sectors: &mut [Sector], sector: usize, block: usize, data: Block) {
    match &mut sectors[sector] {
        Sector::Present(blocks) => blocks[block] = data,
        Sector::Unauthorized => panic!("sector {sector} is locked"),
    }
}

pub fn grid(sectors: Vec<Sector>) -> GridStore {
    GridStore::new(meta("01020304"), sectors).unwrap()
}

/// An empty Nextfare card with the given serial number and system code.
pub fn nextfare(serial: u32, system_code: [u8; 6]) -> Vec<Sector> {
    let mut sectors = zero_sectors(16);

    let mut header = [0; 16];
    header[..4].copy_from_slice(&serial.to_le_bytes());
    set(&mut sectors, 0, 0, header);

    let mut signature = [0; 16];
    signature[1..9].copy_from_slice(&MANUFACTURER);
    signature[9..15].copy_from_slice(&system_code);
    set(&mut sectors, 0, 1, signature);

    sectors
}

pub fn packed_date(year: u16, month: u8, day: u8, minute: u16) -> u32 {
    u32::from(day)
        | u32::from(month) << 5
        | u32::from(year - 2000) << 9
        | u32::from(minute) << 16
}

/// Encode an amount as magnitude with a high sign bit.
pub fn amount(value: i16) -> u16 {
    if value < 0 {
        0x8000 | value.unsigned_abs()
    } else {
        value as u16
    }
}

pub fn tap(mode: u8, date: u32, journey: u16, continuation: bool, value: i16, station: u16) -> Block {
    let mut b = [0; 16];
    b[0] = 0x05;
    b[1] = mode;
    b[2..6].copy_from_slice(&date.to_le_bytes());

    let field = journey << 5 | u16::from(continuation) << 4 | u16::from(b[5] & 0x0F);
    b[5..7].copy_from_slice(&field.to_le_bytes());
    b[7..9].copy_from_slice(&amount(value).to_le_bytes());
    b[12..14].copy_from_slice(&station.to_le_bytes());
    b
}

pub fn balance(version: u8, cents: i16, travel_pass: bool) -> Block {
    let mut b = [0; 16];
    b[2..4].copy_from_slice(&amount(cents).to_le_bytes());
    b[7] = u8::from(travel_pass);
    b[13] = version;
    b
}

pub fn topup(date: u32, credit: u16, station: u16) -> Block {
    let mut b = [0; 16];
    b[0] = 0x01;
    b[2..6].copy_from_slice(&date.to_le_bytes());
    b[6..8].copy_from_slice(&credit.to_le_bytes());
    b[12..14].copy_from_slice(&station.to_le_bytes());
    b
}

pub fn travel_pass(expiry: u32, version: u8) -> Block {
    let mut b = [0; 16];
    b[2..6].copy_from_slice(&expiry.to_le_bytes());
    b[13] = version;
    b
}

pub fn config(expiry: u32, ticket_type: u16) -> Block {
    let mut b = [0; 16];
    b[4..8].copy_from_slice(&expiry.to_le_bytes());
    b[8..10].copy_from_slice(&ticket_type.to_le_bytes());
    b
}

// Page stores.

pub fn pages(hex: &[&str]) -> Vec<Page> {
    hex.iter()
        .map(|page| Page::Present(bytes(page).try_into().unwrap()))
        .collect()
}

pub fn page_store(pages: Vec<Page>) -> PageStore {
    PageStore::new(meta("04112233445566"), pages).unwrap()
}

/// An Ultralight ticket with the given page 4 and page 5, and zeros after.
pub fn ultralight(page_4: &str, page_5: &str) -> Vec<Page> {
    let mut all = pages(&["04112299", "33445566", "00000000", "00000000", page_4, page_5]);
    all.extend(pages(&["00000000"; 10]));
    all
}

// File stores.

pub fn purse_info() -> Vec<u8> {
    let mut info = vec![0; 46];
    info[0] = 0x01;
    info[3] = 0x02;
    info[4..12].copy_from_slice(&bytes("1010010012345678"));
    info[17..21].copy_from_slice(&bytes("20190105"));
    info[21..25].copy_from_slice(&bytes("20240104"));
    info[26] = 0x01;
    info
}

/// File control information wrapping purse info under tag B0.
pub fn fci(purse_info: &[u8]) -> Vec<u8> {
    let mut inner = vec![0x84, APP_NAME.len() as u8];
    inner.extend_from_slice(&APP_NAME);
    inner.push(0xB0);
    inner.push(purse_info.len() as u8);
    inner.extend_from_slice(purse_info);

    let mut fci = vec![0x6F, inner.len() as u8];
    fci.extend(inner);
    fci
}

/// A purse log record.
pub fn purse_record(kind: u8, amount: u32, time: &str, tail: u8) -> Vec<u8> {
    let mut record = vec![tail; 46];
    record[..26].fill(0);
    record[0] = kind;
    record[10..14].copy_from_slice(&amount.to_be_bytes());
    record[26..33].copy_from_slice(&bytes(time));
    record
}

/// A Snapper trip log record.
pub fn trip_record(sequence: u8, journey: u8, tap_on: bool, mode: u8, time: &str, stop: u16) -> Vec<u8> {
    let mut record = vec![0; 32];
    record[4] = sequence;
    record[5] = journey;
    record[6] = if tap_on { 0x10 } else { 0x00 };
    record[7] = mode;
    record[8..15].copy_from_slice(&bytes(time));
    record[15..17].copy_from_slice(&stop.to_be_bytes());
    record
}

pub fn sfi_file(sfi: u8, records: Vec<Vec<u8>>) -> FileEntry {
    FileEntry {
        selector: Selector::name(&APP_NAME).then(u16::from(sfi)),
        sfi: Some(sfi),
        file: File::Records(records),
    }
}

pub fn ksx_card(balance: Option<u32>, files: Vec<FileEntry>) -> FileStore {
    let application = Application {
        name: APP_NAME.to_vec(),
        fci: fci(&purse_info()),
        balance,
    };

    FileStore::new(meta("08123456"), application, files).unwrap()
}
