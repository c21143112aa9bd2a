mod support;

use support::*;
use turnstile::dispatch::{Context, Registry, Session, TransitFactory};
use turnstile::model::{Family, TransitData, TransitIdentity};
use turnstile::station::NoStations;
use turnstile::store::{Application, ByteStore, FileStore, GridStore, Sector};
use turnstile::{Error, Result};

#[test]
fn first_match_wins() {
    let card = marked(0xAA);

    assert_eq!(decode(&[&SPECIFIC, &GENERIC], &card).card_name, "Specific");
    assert_eq!(decode(&[&GENERIC, &SPECIFIC], &card).card_name, "Generic");
    assert_eq!(decode(&[&SPECIFIC, &GENERIC], &marked(0xA5)).card_name, "Generic");
}

#[test]
fn no_match_uses_fallback() {
    let card = marked(0x00);

    assert_eq!(decode(&[&SPECIFIC, &GENERIC], &card).card_name, "Fallback");
    assert_eq!(registry(&[]).identify(&card).unwrap().name, "Fallback");
    assert!(registry(&[&SPECIFIC]).find(&card).is_none());
}

#[test]
fn layout_errors_are_no_match() {
    let card = marked(0xAA);

    assert_eq!(decode(&[&OUT_OF_RANGE, &LOCKED_READ, &SPECIFIC], &card).card_name, "Specific");
    assert_eq!(registry(&[&OUT_OF_RANGE, &SPECIFIC]).find(&card).unwrap().name(), "Specific");
}

#[test]
fn declined_card_goes_straight_to_fallback() {
    let card = marked(0xAA);

    assert_eq!(decode(&[&DECLINING, &SPECIFIC], &card).card_name, "Fallback");
}

#[test]
fn data_errors_try_the_next_decoder() {
    let card = marked(0xAA);

    assert_eq!(decode(&[&FAILING, &SPECIFIC], &card).card_name, "Specific");
}

#[test]
fn fallback_may_refuse() {
    let registry = Registry::new(vec![&SPECIFIC as &dyn TransitFactory<GridStore>], &DECLINING);
    let context = Context { stations: &NoStations };

    assert_eq!(
        registry.decode(&marked(0x00), &context).unwrap_err(),
        Error::Unsupported("fallback decoder declined card")
    );
}

#[test]
fn session_with_custom_registry() {
    let session = Session::new(&NoStations).with_classic(registry(&[&SPECIFIC]));
    let store = ByteStore::Grid(marked(0xAA));

    assert_eq!(session.identify(&store).unwrap().name, "Specific");
    assert_eq!(session.decode(&store).unwrap().card_name, "Specific");
}

#[test]
fn standard_classic_catch_alls() {
    let session = Session::new(&NoStations);

    let blank = ByteStore::Grid(grid(zero_sectors(16)));
    assert_eq!(session.decode(&blank).unwrap().card_name, "Blank MIFARE Classic");

    let mut sectors = vec![Sector::Unauthorized; 16];
    sectors[0] = zero_sectors(1).remove(0);
    let locked = ByteStore::Grid(grid(sectors));
    assert_eq!(session.decode(&locked).unwrap().card_name, "Locked MIFARE Classic");

    let mut sectors = zero_sectors(16);
    set(&mut sectors, 4, 1, [0x42; 16]);
    let unknown = session.decode(&ByteStore::Grid(grid(sectors))).unwrap();
    assert_eq!(unknown.card_name, "MIFARE Classic");
    assert_eq!(unknown.serial.as_deref(), Some("01020304"));
}

#[test]
fn session_rejects_foreign_applications() {
    let application = Application {
        name: vec![0xA0, 0x00, 0x00, 0x00, 0x03, 0x10, 0x10],
        fci: vec![0x6F, 0x00],
        balance: None,
    };
    let card = FileStore::new(meta("08"), application, vec![]).unwrap();
    let session = Session::new(&NoStations);

    assert!(matches!(session.decode(&ByteStore::File(card.clone())), Err(Error::Unsupported(_))));
    assert!(matches!(session.identify(&ByteStore::File(card)), Err(Error::Unsupported(_))));
}

#[test]
fn card_catalogue() {
    let cards = Session::new(&NoStations).cards();
    let names: Vec<_> = cards.iter().map(|card| card.name).collect();

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    for name in ["Compass", "Go card", "Snapper", "T-money", "TAP"] {
        assert!(names.contains(&name), "{name}");
    }

    let tmoney = cards.iter().find(|card| card.name == "T-money").unwrap();
    assert_eq!(tmoney.family, Family::Iso7816);
    assert_eq!(names.iter().filter(|name| **name == "T-money").count(), 1);

    let selecta = cards.iter().find(|card| card.name == "Selecta France").unwrap();
    assert!(!selecta.keys_required);
    assert!(selecta.preview);
}

/// A decoder made of plain functions, naming its output after itself.
struct FnDecoder {
    name: &'static str,
    check: fn(&GridStore) -> Result<bool>,
    data: fn(&GridStore) -> Result<Option<()>>,
}

impl TransitFactory<GridStore> for FnDecoder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, card: &GridStore) -> Result<bool> {
        (self.check)(card)
    }

    fn identity(&self, _card: &GridStore) -> Result<TransitIdentity> {
        Ok(TransitIdentity::new(self.name, None))
    }

    fn data(&self, card: &GridStore, _context: &Context<'_>) -> Result<Option<TransitData>> {
        Ok((self.data)(card)?.map(|()| TransitData::new(self.name, None)))
    }
}

static SPECIFIC: FnDecoder = FnDecoder {
    name: "Specific",
    check: |card| Ok(card.block(0, 0)?[0] == 0xAA),
    data: |_| Ok(Some(())),
};

static GENERIC: FnDecoder = FnDecoder {
    name: "Generic",
    check: |card| Ok(card.block(0, 0)?[0] & 0xA0 == 0xA0),
    data: |_| Ok(Some(())),
};

static OUT_OF_RANGE: FnDecoder = FnDecoder {
    name: "Out of range",
    check: |card| Ok(card.block(40, 0)?[0] == 0xAA),
    data: |_| Ok(Some(())),
};

static LOCKED_READ: FnDecoder = FnDecoder {
    name: "Locked",
    check: |card| Ok(card.block(1, 0)?[0] == 0xAA),
    data: |_| Ok(Some(())),
};

static DECLINING: FnDecoder = FnDecoder {
    name: "Declining",
    check: |_| Ok(true),
    data: |_| Ok(None),
};

static FAILING: FnDecoder = FnDecoder {
    name: "Failing",
    check: |_| Ok(true),
    data: |card| card.block(1, 0).map(|_| Some(())),
};

static FALLBACK: FnDecoder = FnDecoder {
    name: "Fallback",
    check: |_| Ok(true),
    data: |_| Ok(Some(())),
};

/// A two-sector card with `mark` as its first byte and sector 1 locked.
fn marked(mark: u8) -> GridStore {
    let mut sectors = zero_sectors(2);
    set(&mut sectors, 0, 0, [mark; 16]);
    sectors[1] = Sector::Unauthorized;
    grid(sectors)
}

fn registry(candidates: &[&'static dyn TransitFactory<GridStore>]) -> Registry<GridStore> {
    Registry::new(candidates.to_vec(), &FALLBACK)
}

fn decode(candidates: &[&'static dyn TransitFactory<GridStore>], card: &GridStore) -> TransitData {
    registry(candidates)
        .decode(card, &Context { stations: &NoStations })
        .unwrap()
}
