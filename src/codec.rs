//! Stateless conversions from card bytes to values.
//!
//! Every function here is total: malformed input yields `None` (or a
//! harmless value) rather than an error, leaving bounds to the stores.

pub mod bcd;
pub mod luhn;
pub mod tlv;

use alloc::{format, string::String};

/// Read a big-endian unsigned integer of up to eight bytes.
pub fn uint_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, b| acc << 8 | u64::from(*b))
}

/// Read a little-endian unsigned integer of up to eight bytes.
pub fn uint_le(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0, |acc, b| acc << 8 | u64::from(*b))
}

/// Whether a non-empty field is filled with a single byte value.
pub fn is_all(bytes: &[u8], value: u8) -> bool {
    !bytes.is_empty() && bytes.iter().all(|b| *b == value)
}

/// Split an ASCII string into groups of the given widths.
///
/// Characters left over once the groups run out form one final group.
pub fn group(value: &str, separator: &str, groups: &[usize]) -> String {
    let mut out = String::with_capacity(value.len() + separator.len() * groups.len());
    let mut rest = value;

    for &width in groups.iter().chain(core::iter::once(&usize::MAX)) {
        if rest.is_empty() {
            break;
        }

        let (head, tail) = rest.split_at(width.min(rest.len()));

        if !out.is_empty() {
            out.push_str(separator);
        }

        out.push_str(head);
        rest = tail;
    }

    out
}

/// Format a number zero-padded to the total width of `groups`, then group it.
pub fn format_number(value: u64, separator: &str, groups: &[usize]) -> String {
    let width: usize = groups.iter().sum();
    group(&format!("{value:0width$}"), separator, groups)
}
