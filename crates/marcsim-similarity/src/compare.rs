//! Set and string comparators.
//!
//! Field sets are flattened before comparison. Exact set operations key each
//! subfield by `code + value`; the `*_with` variants take a comparator and see
//! bare values only.

use std::collections::HashSet;
use std::hash::Hash;

use marcsim_core::FieldSet;

pub fn string_equals(a: &str, b: &str) -> f64 {
    if a == b { 1.0 } else { 0.0 }
}

/// Jaccard index over distinct items. Two empty inputs are identical.
pub fn jaccard<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let a: HashSet<&T> = a.iter().collect();
    let b: HashSet<&T> = b.iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Jaccard index over the distinct characters of two strings.
pub fn string_jaccard(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    jaccard(&a, &b)
}

/// Normalized Levenshtein similarity, `1 - distance / longer length`.
pub fn levenshtein(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// 1 when the two value lists share an element, else 0.
pub fn set_compare(a: &[String], b: &[String]) -> f64 {
    if a.iter().any(|x| b.contains(x)) { 1.0 } else { 0.0 }
}

// ─── Field-set operations ──────────────────────────────────

fn keyed(set: &FieldSet) -> Vec<String> {
    set.values(true)
}

fn bare(set: &FieldSet) -> Vec<String> {
    set.values(false)
}

fn contains_with(haystack: &[String], item: &str, cmp: &impl Fn(&str, &str) -> bool) -> bool {
    haystack.iter().any(|candidate| cmp(candidate, item))
}

fn values_subset(a: &[String], b: &[String], cmp: &impl Fn(&str, &str) -> bool) -> bool {
    a.iter().all(|item| contains_with(b, item, cmp))
}

fn exact(a: &str, b: &str) -> bool {
    a == b
}

/// Every element of `a` has an exact counterpart in `b`.
pub fn is_subset(a: &FieldSet, b: &FieldSet) -> bool {
    values_subset(&keyed(a), &keyed(b), &exact)
}

pub fn is_subset_with(a: &FieldSet, b: &FieldSet, cmp: impl Fn(&str, &str) -> bool) -> bool {
    values_subset(&bare(a), &bare(b), &cmp)
}

pub fn is_identical(a: &FieldSet, b: &FieldSet) -> bool {
    is_subset(a, b) && is_subset(b, a)
}

pub fn is_identical_with(a: &FieldSet, b: &FieldSet, cmp: impl Fn(&str, &str) -> bool) -> bool {
    let (a, b) = (bare(a), bare(b));
    values_subset(&a, &b, &cmp) && values_subset(&b, &a, &cmp)
}

/// Distinct elements of `a` that also occur in `b`, in `a` order.
pub fn intersection(a: &FieldSet, b: &FieldSet) -> Vec<String> {
    let b: HashSet<String> = keyed(b).into_iter().collect();
    let mut seen = HashSet::new();
    keyed(a)
        .into_iter()
        .filter(|item| b.contains(item) && seen.insert(item.clone()))
        .collect()
}

pub fn has_intersection(a: &FieldSet, b: &FieldSet) -> bool {
    !intersection(a, b).is_empty()
}

pub fn has_intersection_with(a: &FieldSet, b: &FieldSet, cmp: impl Fn(&str, &str) -> bool) -> bool {
    let b = bare(b);
    bare(a).iter().any(|item| contains_with(&b, item, &cmp))
}

// ─── Comparator factories ──────────────────────────────────

pub fn lv_comparator(threshold: f64) -> impl Fn(&str, &str) -> bool + Copy {
    move |a, b| levenshtein(a, b) >= threshold
}

pub fn jaccard_comparator(threshold: f64) -> impl Fn(&str, &str) -> bool + Copy {
    move |a, b| {
        let a: Vec<&str> = a.split(' ').collect();
        let b: Vec<&str> = b.split(' ').collect();
        jaccard(&a, &b) >= threshold
    }
}

/// Equal strings, or the shorter one occurring verbatim in the longer when
/// both have at least two characters and the length ratio exceeds 0.2.
pub fn string_partof_comparator(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a < 2 || len_b < 2 {
        return false;
    }
    let (smaller, larger, len_s, len_l) = if len_a < len_b {
        (a, b, len_a, len_b)
    } else {
        (b, a, len_b, len_a)
    };
    if len_s as f64 / len_l as f64 <= 0.2 {
        return false;
    }
    larger.contains(smaller)
}

pub fn string_partof_comparator_ratio(ratio: f64) -> impl Fn(&str, &str) -> bool + Copy {
    move |a, b| {
        let (len_a, len_b) = (a.chars().count(), b.chars().count());
        let (min, max) = (len_a.min(len_b), len_a.max(len_b));
        let length_ratio = if max == 0 { 1.0 } else { min as f64 / max as f64 };
        length_ratio >= ratio && string_partof_comparator(a, b)
    }
}

/// Abbreviation-aware name comparison: `"A B CDE"` matches `"ABC BCD CDE"`.
///
/// Tokens are sorted and matched from the end, where the unabbreviated ones
/// sort; a one-character token matches any token with the same initial.
pub fn abbr_comparator(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    let mut tokens_a: Vec<&str> = a.split_whitespace().collect();
    let mut tokens_b: Vec<&str> = b.split_whitespace().collect();
    tokens_a.sort_unstable();
    tokens_b.sort_unstable();

    if longest_token(&tokens_a) <= 1 || longest_token(&tokens_b) <= 1 {
        return false;
    }
    if tokens_a.len() != tokens_b.len() {
        return false;
    }

    let token_eq = |x: &str, y: &str| {
        if x.chars().count() == 1 || y.chars().count() == 1 {
            x.chars().next() == y.chars().next()
        } else {
            x == y
        }
    };

    let mut available: Vec<Option<&str>> = tokens_a.into_iter().map(Some).collect();
    for wanted in tokens_b.iter().rev() {
        let hit = available
            .iter_mut()
            .find(|slot| slot.is_some_and(|t| token_eq(t, *wanted)));
        match hit {
            Some(slot) => *slot = None,
            None => return false,
        }
    }
    true
}

fn longest_token(tokens: &[&str]) -> usize {
    tokens.iter().map(|t| t.chars().count()).max().unwrap_or(0)
}

fn canonical_int(s: &str) -> Option<i64> {
    let n: i64 = s.parse().ok()?;
    (n.to_string() == s).then_some(n)
}

/// Both values are canonical integers at most `max_distance` apart.
pub fn distance_comparator(max_distance: i64) -> impl Fn(&str, &str) -> bool + Copy {
    move |a, b| match (canonical_int(a), canonical_int(b)) {
        (Some(x), Some(y)) => (x - y).abs() <= max_distance,
        _ => false,
    }
}

/// Both values are equal canonical integers of at least `min`.
pub fn skip_smaller_than(min: i64) -> impl Fn(&str, &str) -> bool + Copy {
    move |a, b| match (canonical_int(a), canonical_int(b)) {
        (Some(x), Some(y)) => x >= min && y >= min && x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marcsim_core::{DataField, Field};

    fn set(values: &[&str]) -> FieldSet {
        values
            .iter()
            .map(|v| Field::from(DataField::single("020", 'a', *v).unwrap()))
            .collect()
    }

    #[test]
    fn string_jaccard_properties() {
        assert_eq!(string_jaccard("abc", "abc"), 1.0);
        assert_eq!(string_jaccard("abc", "xyz"), 0.0);
        assert!((string_jaccard("abcx", "abcz") - 0.6).abs() < 1e-9);
        assert_eq!(string_jaccard("abcx", "abcz"), string_jaccard("abcz", "abcx"));
    }

    #[test]
    fn equals_and_levenshtein() {
        assert_eq!(string_equals("a", "a"), 1.0);
        assert_eq!(string_equals("a", "b"), 0.0);
        assert_eq!(levenshtein("kitten", "kitten"), 1.0);
        assert!((levenshtein("abcd", "abce") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn subset_and_identity() {
        let a = set(&["1", "2"]);
        let b = set(&["1", "2", "3"]);
        assert!(is_subset(&a, &b));
        assert!(!is_subset(&b, &a));
        assert!(!is_identical(&a, &b));
        assert!(is_identical(&a, &set(&["2", "1"])));
        assert_eq!(is_subset(&a, &b) && is_subset(&b, &a), is_identical(&a, &b));
    }

    #[test]
    fn identity_holds_for_every_comparator() {
        let a = set(&["MATTI MEIKALAINEN", "A B CDE"]);
        assert!(is_identical(&a, &a));
        assert!(is_identical_with(&a, &a, abbr_comparator));
        assert!(is_identical_with(&a, &a, lv_comparator(1.0)));
        assert!(is_identical_with(&a, &a, string_partof_comparator));
    }

    #[test]
    fn exact_operations_see_subfield_codes() {
        let a = set(&["X"]);
        let b = FieldSet::from_fields(vec![DataField::single("020", 'z', "X").unwrap().into()]);
        assert!(!is_identical(&a, &b));
        assert!(is_identical_with(&a, &b, |x, y| x == y));
    }

    #[test]
    fn intersections() {
        let a = set(&["1", "2", "2"]);
        let b = set(&["2", "3"]);
        assert_eq!(intersection(&a, &b), vec!["a2"]);
        assert!(has_intersection(&a, &b));
        assert!(!has_intersection(&a, &FieldSet::new()));
        assert!(!has_intersection_with(&FieldSet::new(), &b, |_, _| true));
        assert!(has_intersection_with(&set(&["20"]), &set(&["22"]), distance_comparator(3)));
    }

    #[test]
    fn abbreviations() {
        assert!(abbr_comparator("A B CDE", "ABC BCD CDE"));
        assert!(!abbr_comparator("A B C", "ABC BCD CDE"));
        assert!(!abbr_comparator("A CDE", "ABC BCD CDE"));
        assert!(abbr_comparator("J R R TOLKIEN", "JOHN RONALD REUEL TOLKIEN"));
    }

    #[test]
    fn partof() {
        assert!(string_partof_comparator("WSOY", "WSOY KIRJAPAINO"));
        assert!(!string_partof_comparator("A", "ABC"));
        assert!(!string_partof_comparator("AB", "ABCDEFGHIJKL"));
        assert!(string_partof_comparator_ratio(0.5)("ABCD", "ABCDEF"));
        assert!(!string_partof_comparator_ratio(0.75)("ABCD", "ABCDEFGH"));
    }

    #[test]
    fn numeric_comparators() {
        let near = distance_comparator(5);
        assert!(near("100", "104"));
        assert!(!near("100", "106"));
        assert!(!near("0100", "100"));
        assert!(!near("x", "100"));

        let big = skip_smaller_than(20);
        assert!(big("25", "25"));
        assert!(!big("10", "10"));
        assert!(!big("25", "26"));
    }

    #[test]
    fn token_jaccard_and_set_compare() {
        assert!(jaccard_comparator(0.5)("WSOY KIRJAPAINO", "WSOY"));
        assert!(!jaccard_comparator(0.66)("WSOY KIRJAPAINO", "WSOY"));
        assert_eq!(jaccard::<&str>(&[], &[]), 1.0);
        let a = vec!["x".to_string(), "y".to_string()];
        assert_eq!(set_compare(&a, &["y".to_string()]), 1.0);
        assert_eq!(set_compare(&a, &["z".to_string()]), 0.0);
    }
}
