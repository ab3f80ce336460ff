//! Title comparison over 245, 246 and the part designators of 245.
//!
//! Titles are cut into fragments (subfield `X`) at parallel-title (`=`) and
//! subtitle (`:`) boundaries. Part numbers ride along in `$n` long enough to
//! veto pairs that describe different parts of the same work.

use marcsim_core::{FieldSet, Record, Subfield, select};

use super::{ALMOST_SURE, CheckOutcome, MAYBE, SURE, SURELY_NOT, Verdict};
use crate::compare::{
    is_identical, is_identical_with, is_subset, lv_comparator, string_partof_comparator,
    string_partof_comparator_ratio,
};
use crate::error::Result;
use crate::normalize::{Step, collapse, is_year, normalize};

const FRAGMENT: char = 'X';

const UNICODE_STEPS: &[Step] = &[Step::Utf8Norm, Step::RemoveDiacs];

const PART_STEPS: &[Step] = &[
    Step::to_space("[],=:-()/"),
    Step::NumberWords,
    Step::to_space("."),
    Step::RomanToArabic,
];

const TITLE_STEPS: &[Step] = &[
    Step::to_space("-"),
    Step::del_chars("'/,.:\""),
    Step::Trim,
    Step::Upper,
    Step::Collapse,
];

/// `"Osa 6 = Del 6 = Part 6"` becomes `"Osa = Del = Part 6"`.
fn collapse_repeated_numbers(value: &str) -> String {
    let parts: Vec<&str> = value.split('=').collect();

    let texts: Vec<String> = parts
        .iter()
        .map(|part| collapse(&part.replace(|c: char| c.is_ascii_digit(), "")))
        .collect();

    let mut numbers: Vec<String> = Vec::new();
    for part in &parts {
        let digits: String = part.chars().filter(char::is_ascii_digit).collect();
        if !digits.is_empty() && !numbers.contains(&digits) {
            numbers.push(digits);
        }
    }

    texts.join("=") + &numbers.join(" ")
}

/// Words reduced to their initials unless they start with a digit, then sorted.
fn abbreviate(value: &str) -> String {
    let mut words: Vec<String> = value
        .split_whitespace()
        .map(|word| match word.chars().next() {
            Some(first) if !first.is_ascii_digit() => first.to_string(),
            _ => word.to_string(),
        })
        .collect();
    words.sort();
    words.join(" ")
}

fn rewrite_subfields(set: &mut FieldSet, code: char, f: impl Fn(&str) -> String) {
    for df in set.data_fields_mut() {
        for sf in df.subfields.iter_mut().filter(|sf| sf.code == code) {
            sf.value = f(&sf.value);
        }
    }
}

fn part_designators(mut parts: FieldSet) -> FieldSet {
    rewrite_subfields(&mut parts, 'n', collapse_repeated_numbers);
    let mut parts = normalize(&parts, PART_STEPS);
    rewrite_subfields(&mut parts, 'n', abbreviate);
    normalize(&parts, UNICODE_STEPS)
}

/// Each 245 field becomes one field of `X` fragments.
fn title_fragments(titles: &FieldSet) -> FieldSet {
    let mut titles = normalize(titles, UNICODE_STEPS);
    for df in titles.data_fields_mut() {
        let joined: String = df.subfields.iter().map(|sf| format!("{} ", sf.value)).collect();
        df.subfields = joined
            .split('=')
            .flat_map(|parallel| parallel.trim().split(':'))
            .map(|fragment| Subfield::new(FRAGMENT, fragment.trim()))
            .collect();
    }
    titles
}

fn append_to_first(set: &mut FieldSet, extra: &FieldSet) {
    if let (Some(first), Some(source)) = (set.data_fields_mut().next(), extra.data_fields().next()) {
        first.subfields.extend(source.subfields.iter().cloned());
    }
}

/// Raw and normalized title fields of one record. A record without 245 has
/// an empty normalized set.
fn title_fields(record: &Record) -> Result<(FieldSet, FieldSet)> {
    let titles = select(&["245..ab"], record)?;
    let variants = select(&["246..a"], record)?;
    let parts = select(&["245..pn"], record)?;

    let mut raw = titles.clone();
    append_to_first(&mut raw, &parts);
    raw.extend(variants.clone());

    if !record.has_field("245") {
        return Ok((raw, FieldSet::new()));
    }

    let mut normalized = title_fragments(&titles);
    normalized.extend(normalize(&variants, UNICODE_STEPS));
    append_to_first(&mut normalized, &part_designators(parts));

    Ok((raw, normalize(&normalized, TITLE_STEPS)))
}

/// Digits of the part numbers, years left out.
fn part_numbers(set: &FieldSet) -> String {
    set.subfield_values("245", 'n')
        .iter()
        .flat_map(|value| value.split(' '))
        .filter(|token| !is_year(token))
        .flat_map(str::chars)
        .filter(char::is_ascii_digit)
        .collect()
}

fn title_verdict(set1: &FieldSet, set2: &FieldSet) -> Verdict {
    if set1.is_empty() || set2.is_empty() {
        return Verdict::Skip;
    }

    if set1.has_subfield('n') && set2.has_subfield('n') && part_numbers(set1) != part_numbers(set2) {
        return Verdict::Veto;
    }

    let set1 = set1.clone().without_subfields(|sf| sf.code == 'n');
    let set2 = set2.clone().without_subfields(|sf| sf.code == 'n');

    if !set1.has_subfield(FRAGMENT) || !set2.has_subfield(FRAGMENT) {
        return Verdict::Skip;
    }

    if is_identical(&set1, &set2) {
        return Verdict::Evidence(SURE);
    }

    if is_subset(&set1, &set2) || is_subset(&set2, &set1) {
        let (count1, count2) = (set1.subfield_count(), set2.subfield_count());
        let ratio = count1.min(count2) as f64 / count1.max(count2) as f64;
        if ratio >= 0.5 {
            return Verdict::Evidence(MAYBE);
        }
    }

    if is_identical_with(&set1, &set2, lv_comparator(0.85)) {
        return Verdict::Evidence(ALMOST_SURE);
    }
    if is_identical_with(&set1, &set2, string_partof_comparator_ratio(0.75)) {
        return Verdict::Evidence(ALMOST_SURE);
    }
    if is_identical_with(&set1, &set2, string_partof_comparator) {
        return Verdict::Evidence(0.3);
    }

    Verdict::Evidence(SURELY_NOT)
}

pub fn title(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let (fields1, norm1) = title_fields(record1)?;
    let (fields2, norm2) = title_fields(record2)?;

    let verdict = title_verdict(&norm1, &norm2);
    Ok(CheckOutcome::new(verdict, [fields1, fields2], [norm1, norm2]))
}
