//! BER-TLV traversal, as used in ISO 7816 file control information.
//!
//! Values are borrowed from the input; nothing is copied. Parsing stops
//! quietly at the first malformed element.

use super::uint_be;

/// A single tag-length-value element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    /// Tag, one to three bytes packed big-endian.
    pub tag: u32,
    pub value: &'a [u8],
    constructed: bool,
}

impl Tlv<'_> {
    /// Whether the value is itself a sequence of elements.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }
}

/// Iterator over the elements at one level of a TLV sequence.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    data: &'a [u8],
}

/// Iterate over the elements at the top level of `data`.
pub fn iter(data: &[u8]) -> Iter<'_> {
    Iter { data }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Tlv<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.data.iter().position(|b| *b != 0x00 && *b != 0xFF)?;
        let data = &self.data[start..];

        let parsed = parse_tag(data).and_then(|(tag, tag_len)| {
            let (len, len_len) = parse_length(&data[tag_len..])?;
            let offset = tag_len + len_len;
            let value = data.get(offset..offset.checked_add(len)?)?;

            Some((Tlv { tag, value, constructed: data[0] & 0x20 != 0 }, offset + len))
        });

        match parsed {
            Some((tlv, consumed)) => {
                self.data = &data[consumed..];
                Some(tlv)
            }
            None => {
                self.data = &[];
                None
            }
        }
    }
}

/// Find the value of the first element with the given tag, depth-first.
pub fn find(data: &[u8], tag: u32) -> Option<&[u8]> {
    iter(data).find_map(|tlv| match tlv {
        Tlv { tag: t, value, .. } if t == tag => Some(value),
        tlv if tlv.is_constructed() => find(tlv.value, tag),
        _ => None,
    })
}

/// Parse a tag of one to three bytes.
fn parse_tag(data: &[u8]) -> Option<(u32, usize)> {
    let first = *data.first()?;

    let len = if first & 0x1F != 0x1F {
        1
    } else if data.get(1)? & 0x80 == 0 {
        2
    } else {
        3
    };

    Some((uint_be(data.get(..len)?) as u32, len))
}

/// Parse a definite length in short or long form.
fn parse_length(data: &[u8]) -> Option<(usize, usize)> {
    let first = *data.first()?;

    if first & 0x80 == 0 {
        return Some((usize::from(first), 1));
    }

    let count = usize::from(first & 0x7F);

    if count == 0 || count > 4 {
        return None;
    }

    let len = usize::try_from(uint_be(data.get(1..1 + count)?)).ok()?;
    Some((len, 1 + count))
}
