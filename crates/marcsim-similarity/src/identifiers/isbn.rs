use once_cell::sync::Lazy;
use regex::Regex;

static ISBN13_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]{13})").expect("valid regex"));

static ISBN10_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9X]{10})").expect("valid regex"));

/// EAN-13 check digit over the 12 leading digits: weights alternate 1,3.
pub fn ean13_check_digit(digits: &[u8; 12]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d as u32 } else { d as u32 * 3 })
        .sum();
    ((10 - (sum % 10)) % 10) as u8
}

/// Rewrite a 10-character ISBN as ISBN-13 (`978` prefix, recomputed check
/// digit). Anything that is not 10 characters with 9 leading digits is
/// returned unchanged; the ISBN-10 check digit itself is not validated.
pub fn to_isbn13(isbn: &str) -> String {
    if isbn.len() != 10 {
        return isbn.to_string();
    }

    let mut d12 = [0u8; 12];
    d12[..3].copy_from_slice(&[9, 7, 8]);
    for (slot, c) in d12[3..].iter_mut().zip(isbn.chars().take(9)) {
        match c.to_digit(10) {
            Some(d) => *slot = d as u8,
            None => return isbn.to_string(),
        }
    }

    let check = ean13_check_digit(&d12);
    let mut out: String = d12.iter().map(|d| char::from(b'0' + d)).collect();
    out.push(char::from(b'0' + check));
    out
}

/// First ISBN found in free text, as ISBN-13. A 13-digit run wins over a
/// 10-character one.
pub fn extract_isbn(text: &str) -> Option<String> {
    if let Some(m) = ISBN13_REGEX.captures(text).and_then(|c| c.get(1)) {
        return Some(m.as_str().to_string());
    }
    ISBN10_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| to_isbn13(m.as_str()))
}
