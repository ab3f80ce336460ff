use once_cell::sync::Lazy;
use regex::Regex;

static CANONICAL_ROMAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$").expect("valid regex")
});

fn digit_value(c: char) -> Option<u32> {
    match c.to_ascii_uppercase() {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    }
}

/// Value of a canonical Roman numeral, case-insensitive. Non-canonical forms
/// such as `IIII` or `VX` are rejected.
pub fn parse_roman(token: &str) -> Option<u32> {
    if token.is_empty() || !CANONICAL_ROMAN.is_match(token) {
        return None;
    }

    let values: Vec<u32> = token.chars().map(digit_value).collect::<Option<_>>()?;
    let mut total = 0;
    for (i, &v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if next > v => total -= v as i64,
            _ => total += v as i64,
        }
    }
    u32::try_from(total).ok()
}

pub fn is_roman(token: &str) -> bool {
    parse_roman(token).is_some()
}

/// Value of a word that reads as a numeral in running text: all uppercase,
/// or lowercase built from `i`, `v` and `x` only. Words such as "mix" or
/// "di" stay words.
pub fn parse_roman_word(word: &str) -> Option<u32> {
    let upper = word.chars().all(|c| c.is_ascii_uppercase());
    let small = word.chars().all(|c| matches!(c, 'i' | 'v' | 'x'));
    if upper || small {
        parse_roman(word)
    } else {
        None
    }
}
