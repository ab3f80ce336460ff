use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::roman::parse_roman;

static PAGE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[?(\d+)\]?\s*-\s*\[?(\d+)\]?").expect("valid regex"));

const MAX_PLAUSIBLE_PAGES: u32 = 10_000;

/// Parsed extent statement of a 300 $a.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub start: u32,
    pub end: u32,
    pub total: u32,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.start, self.end, self.total)
    }
}

enum Token {
    Number { value: u32, grouped: bool },
    Roman(u32),
    Unit,
}

fn is_unit(token: &str) -> bool {
    matches!(token.to_ascii_lowercase().as_str(), "s" | "ss" | "p" | "pp")
}

fn classify(token: &str, grouped: bool) -> Option<Token> {
    if token.chars().all(|c| c.is_ascii_digit()) {
        // Overlong digit runs are kept as implausible page counts.
        let value = token.parse().unwrap_or(u32::MAX);
        return Some(Token::Number { value, grouped });
    }
    if is_unit(token) {
        return Some(Token::Unit);
    }
    parse_roman(token).map(Token::Roman)
}

fn flush(current: &mut String, grouped: bool, tokens: &mut Vec<Token>) -> Option<()> {
    if current.is_empty() {
        return Some(());
    }
    let token = classify(current, grouped)?;
    current.clear();
    tokens.push(token);
    Some(())
}

/// Split on anything that is not alphanumeric, remembering whether each token
/// sat inside parentheses or brackets.
fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut current_grouped = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if current.is_empty() {
                current_grouped = depth > 0;
            }
            current.push(c);
            continue;
        }
        flush(&mut current, current_grouped, &mut tokens)?;
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    flush(&mut current, current_grouped, &mut tokens)?;
    Some(tokens)
}

/// Paren and bracket nesting depth at byte `offset`.
fn depth_at(text: &str, offset: usize) -> usize {
    text[..offset].chars().fold(0, |depth, c| match c {
        '(' | '[' => depth + 1,
        ')' | ']' => depth.saturating_sub(1),
        _ => depth,
    })
}

fn page_range(caps: &regex::Captures<'_>) -> Option<PageInfo> {
    let start: u32 = caps[1].parse().ok()?;
    let end: u32 = caps[2].parse().ok()?;
    Some(PageInfo {
        start,
        end,
        total: end.saturating_sub(start),
    })
}

/// Parse an extent phrase such as `"XI, 373 s."` or `"S. 123-179."`.
///
/// Numbers and ranges outside parentheses or brackets win over grouped ones.
/// Returns `None` when the text contains a word that is neither a number, a
/// Roman numeral nor a page unit, or when it has no number at all.
pub fn parse_page_info(text: &str) -> Option<PageInfo> {
    let tokens = tokenize(text)?;

    let mut ungrouped_range: Option<PageInfo> = None;
    let mut grouped_range: Option<PageInfo> = None;
    for caps in PAGE_RANGE.captures_iter(text) {
        // a range's own leading bracket, as in "[348]-593", does not group it
        let slot = if depth_at(text, caps.get(0)?.start()) == 0 {
            &mut ungrouped_range
        } else {
            &mut grouped_range
        };
        if slot.is_none() {
            *slot = Some(page_range(&caps)?);
        }
    }
    if ungrouped_range.is_some() {
        return ungrouped_range;
    }

    let plausible = |grouped_wanted: bool| {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Number { value, grouped }
                    if *grouped == grouped_wanted && *value > 0 && *value < MAX_PLAUSIBLE_PAGES =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .max()
    };
    let roman_total: u32 = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Roman(v) => Some(*v),
            _ => None,
        })
        .sum();
    let counted = |end: u32| PageInfo {
        start: 0,
        end,
        total: end + roman_total,
    };

    if let Some(end) = plausible(false) {
        return Some(counted(end));
    }
    if grouped_range.is_some() {
        return grouped_range;
    }
    match plausible(true) {
        Some(end) => Some(counted(end)),
        None if roman_total > 0 => Some(PageInfo {
            start: 0,
            end: roman_total,
            total: roman_total,
        }),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi(text: &str) -> (u32, u32, u32) {
        let info = parse_page_info(text).unwrap();
        (info.start, info.end, info.total)
    }

    #[test]
    fn plain_page_count() {
        assert_eq!(pi("138 s."), (0, 138, 138));
    }

    #[test]
    fn page_ranges() {
        assert_eq!(pi("S. 123-179.").0, 123);
        assert_eq!(pi("S. 123-179.").1, 179);
        assert_eq!(pi("Ss [348]-593"), (348, 593, 245));
    }

    #[test]
    fn roman_preliminaries_add_to_total() {
        assert_eq!(pi("XI, 373 s."), (0, 373, 384));
        assert_eq!(pi("v, 443, 8 s."), (0, 443, 448));
    }

    #[test]
    fn prefers_numbers_outside_groups() {
        assert_eq!(pi("(2) s., s. 519-590, (5) s. "), (519, 590, 71));
        assert_eq!(pi("(2) s., s. 431, (5) s. "), (0, 431, 431));
        assert_eq!(pi("vii s., s. 81-230, [2]  :"), (81, 230, 149));
    }

    #[test]
    fn grouped_range_loses_to_plain_count() {
        assert_eq!(pi("(1-4) s., 300 s."), (0, 300, 300));
        assert_eq!(pi("[4] s., 120 s."), (0, 120, 120));
        assert_eq!(pi("(1-4) s."), (1, 4, 3));
    }

    #[test]
    fn falls_back_to_grouped_numbers() {
        assert_eq!(pi("[96] s."), (0, 96, 96));
    }

    #[test]
    fn rejects_unknown_words() {
        assert_eq!(parse_page_info("a1 kirja (63 s.), 1 CD-äänilevy ;"), None);
        assert_eq!(parse_page_info("s."), None);
    }

    #[test]
    fn display_form() {
        assert_eq!(parse_page_info("XI, 373 s.").unwrap().to_string(), "0-373 (384)");
    }
}
