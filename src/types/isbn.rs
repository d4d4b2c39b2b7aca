//! ISBN cleaning, check-digit validation and ISBN-10 to ISBN-13 conversion.
//!
//! Everything here is a pure string transform. Functions that answer "is this
//! usable" return `bool` or `Option` rather than errors, so callers can branch
//! on presence and pick their own error.

/// Removes hyphens and whitespace anywhere in the input and uppercases it, so
/// a lowercase `x` check digit becomes `X`.
pub fn clean_isbn(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn isbn13_check_digit(first12: &[u8]) -> u8 {
    let sum: u32 = first12
        .iter()
        .enumerate()
        .map(|(i, d)| u32::from(d - b'0') * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

pub fn is_valid_isbn10(input: &str) -> bool {
    let cleaned = clean_isbn(input);
    let bytes = cleaned.as_bytes();
    if bytes.len() != 10
        || !bytes[..9].iter().all(u8::is_ascii_digit)
        || !(bytes[9].is_ascii_digit() || bytes[9] == b'X')
    {
        return false;
    }
    let sum: u32 = bytes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let value = if *c == b'X' { 10 } else { u32::from(c - b'0') };
            value * (10 - i as u32)
        })
        .sum();
    sum % 11 == 0
}

pub fn is_valid_isbn13(input: &str) -> bool {
    let cleaned = clean_isbn(input);
    let bytes = cleaned.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    isbn13_check_digit(&bytes[..12]) == bytes[12] - b'0'
}

/// Dispatches on the cleaned length; anything that is not 10 or 13 characters
/// long is invalid.
pub fn is_valid_isbn(input: &str) -> bool {
    let cleaned = clean_isbn(input);
    match cleaned.len() {
        10 => is_valid_isbn10(&cleaned),
        13 => is_valid_isbn13(&cleaned),
        _ => false,
    }
}

/// Canonical ISBN-13 for a valid ISBN-10 or ISBN-13, `None` otherwise.
pub fn to_isbn13(input: &str) -> Option<String> {
    let cleaned = clean_isbn(input);
    match cleaned.len() {
        13 if is_valid_isbn13(&cleaned) => Some(cleaned),
        10 if is_valid_isbn10(&cleaned) => {
            let mut first12 = String::with_capacity(13);
            first12.push_str("978");
            first12.push_str(&cleaned[..9]);
            let check = isbn13_check_digit(first12.as_bytes());
            first12.push(char::from(b'0' + check));
            Some(first12)
        }
        _ => None,
    }
}

/// Hyphenated form for display, when the registration group is known.
pub fn hyphenated(isbn: &str) -> Option<String> {
    isbn.parse::<isbn2::Isbn>()
        .ok()
        .and_then(|isbn| isbn.hyphenate().ok())
        .map(|s| s.to_string())
}
