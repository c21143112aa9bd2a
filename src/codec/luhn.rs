//! Helpers for the Luhn mod-10 check digit used on printed card numbers.

/// Compute the Luhn checksum of a string of decimal digits.
///
/// A number carrying a valid check digit sums to zero. Returns `None` if the
/// string holds anything but digits.
pub fn checksum(number: &str) -> Option<u8> {
    sum(number, 0)
}

/// Compute the digit to append to `base` to make it pass the Luhn check.
pub fn check_digit(base: &str) -> Option<u8> {
    sum(base, 1).map(|s| (10 - s) % 10)
}

/// Whether a string of digits carries a valid Luhn check digit.
pub fn is_valid(number: &str) -> bool {
    !number.is_empty() && checksum(number) == Some(0)
}

/// Sum digits from the right, doubling those whose position differs in
/// parity from `plain`.
fn sum(digits: &str, plain: usize) -> Option<u8> {
    let mut total = 0;

    for (i, c) in digits.bytes().rev().enumerate() {
        let digit = char::from(c).to_digit(10)?;

        total += match (i % 2 == plain % 2, digit * 2) {
            (true, _) => digit,
            (false, doubled) if doubled > 9 => doubled - 9,
            (false, doubled) => doubled,
        };
    }

    Some((total % 10) as u8)
}
