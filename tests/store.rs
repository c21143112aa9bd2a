mod support;

use support::*;
use turnstile::Error;
use turnstile::model::Family;
use turnstile::store::{
    Application, ByteStore, File, FileEntry, FileId, FileStore, GridStore, Locator, Page,
    PageStore, RawData, Sector, Selector,
};
use turnstile::transit::ksx6923::APP_NAME;

#[test]
fn empty_stores_are_unsupported() {
    assert!(matches!(GridStore::new(meta("01"), vec![]), Err(Error::Unsupported(_))));
    assert!(matches!(PageStore::new(meta("01"), vec![]), Err(Error::Unsupported(_))));
    assert!(matches!(
        FileStore::new(meta("01"), Application::default(), vec![]),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn grid_bounds_and_locks() {
    let mut sectors = zero_sectors(3);
    sectors[2] = Sector::Unauthorized;
    set(&mut sectors, 1, 0, *b"0123456789abcdef");
    let card = grid(sectors);

    assert_eq!(card.slice(1, 0, 4, 3).unwrap(), b"456");
    assert_eq!(card.block(1, 0).unwrap(), b"0123456789abcdef");

    assert_eq!(card.sector(9).unwrap_err(), Error::OutOfRange(Locator::Sector(9)));
    assert_eq!(card.sector(2).unwrap_err(), Error::Unauthorized(Locator::Sector(2)));
    assert_eq!(
        card.block(1, 4).unwrap_err(),
        Error::OutOfRange(Locator::Block { sector: 1, block: 4 })
    );
    assert_eq!(
        card.slice(1, 0, 14, 4).unwrap_err(),
        Error::OutOfRange(Locator::Block { sector: 1, block: 0 })
    );
    assert!(card.slice(1, 0, usize::MAX, 2).is_err());
}

#[test]
fn grid_data_blocks_skip_preamble_trailers_and_locks() {
    let mut sectors = zero_sectors(4);
    sectors[2] = Sector::Unauthorized;
    let card = grid(sectors);

    let positions: Vec<_> = card.data_blocks().map(|(s, b, _)| (s, b)).collect();
    assert_eq!(positions, vec![(1, 0), (1, 1), (1, 2), (3, 0), (3, 1), (3, 2)]);
}

#[test]
fn grid_raw_listing() {
    let mut sectors = zero_sectors(2);
    sectors[1] = Sector::Unauthorized;
    let store = ByteStore::Grid(grid(sectors));

    let raw = store.raw();
    assert_eq!(raw.len(), 5);
    assert_eq!(raw[0].label, "Sector 0 / Block 0");
    assert_eq!(raw[0].data, RawData::Hex("0".repeat(32)));
    assert_eq!(raw[4].label, "Sector 1");
    assert_eq!(raw[4].data, RawData::Unauthorized);
    assert_eq!(store.family(), Family::MifareClassic);
}

#[test]
fn page_bounds_and_locks() {
    let mut all = support::pages(&["04112299", "33445566", "00010203", "04050607"]);
    all.push(Page::Unauthorized);
    let card = page_store(all);

    assert_eq!(card.uid().unwrap(), [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    assert_eq!(card.read_pages(2, 2).unwrap(), [0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(card.slice(2, 3, 3).unwrap(), [3, 4, 5]);
    assert_eq!(card.page(4).unwrap(), &Page::Unauthorized);

    assert_eq!(card.page_data(4).unwrap_err(), Error::Unauthorized(Locator::Page(4)));
    assert_eq!(card.read_pages(3, 2).unwrap_err(), Error::Unauthorized(Locator::Page(4)));
    assert_eq!(card.page(5).unwrap_err(), Error::OutOfRange(Locator::Page(5)));

    assert_eq!(card.read_pages(2, 4).unwrap_err(), Error::OutOfRange(Locator::Page(2)));
    assert_eq!(card.slice(3, 2, 8).unwrap_err(), Error::OutOfRange(Locator::Page(3)));

    let raw = ByteStore::Page(card).raw();
    assert_eq!(raw[2].label, "Page 02");
    assert_eq!(raw[2].data, RawData::Hex("00010203".into()));
    assert_eq!(raw[4].data, RawData::Unauthorized);
}

#[test]
fn files_by_sfi_then_path() {
    let path = Selector::name(&APP_NAME).then(4);
    let by_path = FileEntry {
        selector: path.clone(),
        sfi: None,
        file: File::Records(vec![vec![1], vec![2]]),
    };
    let by_sfi = FileEntry {
        selector: Selector::id(0x3F00),
        sfi: Some(3),
        file: File::Binary(vec![9, 9]),
    };

    let card = FileStore::new(meta("08"), Application::default(), vec![by_path, by_sfi]).unwrap();

    assert_eq!(card.lookup(&path, Some(4)).unwrap().records(), [vec![1], vec![2]]);
    assert_eq!(card.lookup(&Selector::id(1), Some(3)).unwrap().binary(), Some(&[9, 9][..]));
    assert_eq!(card.record(&path, Some(4), 1).unwrap(), [2]);

    assert_eq!(
        card.record(&path, Some(4), 2).unwrap_err(),
        Error::OutOfRange(Locator::Record {
            file: FileId::Sfi(4),
            index: 2
        })
    );
    assert_eq!(
        card.lookup(&Selector::id(1), None).unwrap_err(),
        Error::NotFound(Locator::File(FileId::Path(Selector::id(1))))
    );
}

#[test]
fn selector_display() {
    let path = Selector::name(&APP_NAME).then(4);

    assert_eq!(path.to_string(), "d4100000030001/0004");
    assert_eq!(
        Error::NotFound(Locator::File(FileId::Sfi(4))).to_string(),
        "Nothing found at file SFI 04."
    );
}

#[test]
fn huge_page_ranges_are_out_of_range() {
    let card = page_store(support::pages(&["04112299", "33445566"]));

    assert_eq!(card.slice(0, 0, usize::MAX / 2).unwrap_err(), Error::OutOfRange(Locator::Page(0)));
    assert_eq!(card.slice(0, usize::MAX, 2).unwrap_err(), Error::OutOfRange(Locator::Page(0)));
    assert_eq!(card.read_pages(1, usize::MAX / 2).unwrap_err(), Error::OutOfRange(Locator::Page(1)));
    assert_eq!(card.read_pages(usize::MAX, 2).unwrap_err(), Error::OutOfRange(Locator::Page(usize::MAX)));
}
