//! Author checkers: main and added entries, and the statement of
//! responsibility in 245 $c.

use marcsim_core::{FieldSet, Record, select};

use super::{
    ALMOST_SURE, CheckOutcome, MAYBE, SURE, SURELY_NOT, Verdict, normalize_pair, select_pair,
    synthetic_field,
};
use crate::compare::{
    abbr_comparator, has_intersection, is_identical, is_identical_with, is_subset, is_subset_with,
    jaccard_comparator, lv_comparator, string_partof_comparator,
};
use crate::error::Result;
use crate::normalize::{Step, normalize, sort_content};

const AUTHOR_SELECTORS: &[&str] = &["100", "110", "111", "700", "710", "711"];

const RESPONSIBILITY_STEPS: &[Step] = &[
    Step::to_space("-"),
    Step::del_chars("':,."),
    Step::TrimEnd,
    Step::Upper,
    Step::Utf8Norm,
    Step::RemoveDiacs,
];

const NAME_STEPS: &[Step] = &[
    Step::to_space("-"),
    Step::del_chars("':,."),
    Step::TrimEnd,
    Step::Upper,
    Step::Utf8Norm,
    Step::RemoveDiacs,
    Step::SortContent,
];

const AUTHOR245C_STEPS: &[Step] = &[
    Step::to_space("-"),
    Step::del_chars("':,."),
    Step::TrimEnd,
    Step::Upper,
    Step::Utf8Norm,
    Step::RemoveDiacs,
    Step::RemoveEmpty,
];

/// Names longer than this are matched only in their given word order.
const MAX_PERMUTED_WORDS: usize = 5;

/// Every ordering of `words`, generated by picking the remaining words in
/// index order.
fn permutations<'a>(words: &[&'a str]) -> Vec<Vec<&'a str>> {
    fn extend<'a>(remaining: &mut Vec<&'a str>, used: &mut Vec<&'a str>, out: &mut Vec<Vec<&'a str>>) {
        for i in 0..remaining.len() {
            let word = remaining.remove(i);
            used.push(word);
            if remaining.is_empty() {
                out.push(used.clone());
            }
            extend(remaining, used, out);
            used.pop();
            remaining.insert(i, word);
        }
    }

    let mut out = Vec::new();
    extend(&mut words.to_vec(), &mut Vec::new(), &mut out);
    out
}

/// First ordering of `name` that occurs verbatim in `text`.
fn find_in_text(name: &str, text: &str) -> Option<String> {
    let words: Vec<&str> = name.split(' ').collect();
    if words.len() > MAX_PERMUTED_WORDS {
        return text.contains(name).then(|| name.to_string());
    }
    permutations(&words)
        .into_iter()
        .map(|order| order.join(" "))
        .find(|candidate| text.contains(candidate.as_str()))
}

/// Normalized 245 $c text of a record, subfields joined by `,`.
fn responsibility_text(record: &Record) -> Result<String> {
    let statement = select(&["245..c"], record)?;
    Ok(normalize(&statement, RESPONSIBILITY_STEPS).values(false).join(","))
}

/// Names of `names` that the other record mentions in its 245 $c, as
/// synthetic `245 $c` fields for that other record.
fn names_in_statement(names: &FieldSet, statement: &str) -> Result<FieldSet> {
    let mut found = FieldSet::new();
    for name in names.values(false).iter().filter(|name| !name.is_empty()) {
        if let Some(hit) = find_in_text(name, statement) {
            tracing::trace!(name = %name, "author found in statement of responsibility");
            found.push(synthetic_field("245", 'c', sort_content(&hit))?);
        }
    }
    Ok(found)
}

pub fn author(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let [mut fields1, mut fields2] = select_pair(AUTHOR_SELECTORS, record1, record2)?;
    let [mut norm1, mut norm2] = normalize_pair(&[fields1.clone(), fields2.clone()], NAME_STEPS);

    let statement1 = responsibility_text(record1)?;
    let statement2 = responsibility_text(record2)?;

    let mined_for2 = names_in_statement(&norm1, &statement2)?;
    let mined_for1 = names_in_statement(&norm2, &statement1)?;
    norm1.extend(mined_for1);
    norm2.extend(mined_for2);

    fields1.extend(select(&["245..c"], record1)?);
    fields2.extend(select(&["245..c"], record2)?);

    let verdict = author_verdict(&norm1, &norm2);
    Ok(CheckOutcome::new(verdict, [fields1, fields2], [norm1, norm2]))
}

fn either_subset_with(set1: &FieldSet, set2: &FieldSet, cmp: impl Fn(&str, &str) -> bool + Copy) -> bool {
    is_subset_with(set1, set2, cmp) || is_subset_with(set2, set1, cmp)
}

fn author_verdict(set1: &FieldSet, set2: &FieldSet) -> Verdict {
    if set1.is_empty() || set2.is_empty() {
        return Verdict::Skip;
    }
    if !set1.has_subfield('a') || !set2.has_subfield('a') {
        return Verdict::Skip;
    }

    if is_identical(set1, set2) || is_subset(set1, set2) || is_subset(set2, set1) {
        return Verdict::Evidence(SURE);
    }
    if is_identical_with(set1, set2, string_partof_comparator)
        || is_identical_with(set1, set2, abbr_comparator)
    {
        return Verdict::Evidence(SURE);
    }
    if is_identical_with(set1, set2, jaccard_comparator(0.66))
        || is_identical_with(set1, set2, lv_comparator(0.75))
    {
        return Verdict::Evidence(ALMOST_SURE);
    }

    if either_subset_with(set1, set2, lv_comparator(0.75))
        || either_subset_with(set1, set2, string_partof_comparator)
        || either_subset_with(set1, set2, abbr_comparator)
        || either_subset_with(set1, set2, jaccard_comparator(0.75))
    {
        return Verdict::Evidence(0.6);
    }

    if has_intersection(set1, set2) {
        return Verdict::Evidence(MAYBE);
    }
    Verdict::Evidence(SURELY_NOT)
}

/// Statement of responsibility on its own; name fields are left to [`author`].
pub fn author245c(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["245..c"], record1, record2)?;
    let normalized = normalize_pair(&fields, AUTHOR245C_STEPS);

    let [set1, set2] = &normalized;
    let verdict = if set1.is_empty() || set2.is_empty() {
        Verdict::Skip
    } else if !set1.has_subfield('c') || !set2.has_subfield('c') {
        Verdict::Skip
    } else if is_identical(set1, set2) || is_identical_with(set1, set2, string_partof_comparator) {
        Verdict::Evidence(SURE)
    } else if is_identical_with(set1, set2, jaccard_comparator(0.66))
        || is_identical_with(set1, set2, lv_comparator(0.75))
    {
        Verdict::Evidence(ALMOST_SURE)
    } else {
        Verdict::Evidence(SURELY_NOT)
    };

    Ok(CheckOutcome::new(verdict, fields, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testing::{record, score};

    #[test]
    fn permutations_in_index_order() {
        let orders: Vec<String> = permutations(&["A", "B", "C"])
            .into_iter()
            .map(|p| p.join(" "))
            .collect();
        assert_eq!(orders, vec!["A B C", "A C B", "B A C", "B C A", "C A B", "C B A"]);
    }

    #[test]
    fn finds_reordered_name_in_text() {
        assert_eq!(
            find_in_text("MATTI MEIKALAINEN", "TEKSTI MEIKALAINEN MATTI,KUVAT X"),
            Some("MEIKALAINEN MATTI".to_string())
        );
        assert_eq!(find_in_text("A B C D E F", "F E D C B A"), None);
    }

    #[test]
    fn same_author_is_sure() {
        let r1 = record("2000", &[("100", '1', &[('a', "Meikäläinen, Matti.")])]);
        let r2 = record("2000", &[("100", '1', &[('a', "Meikalainen, Matti")])]);
        assert_eq!(score(&author(&r1, &r2).unwrap()), Some(SURE));
    }

    #[test]
    fn added_entries_subset_is_sure() {
        let r1 = record("2000", &[("100", '1', &[('a', "Meikäläinen, Matti")])]);
        let r2 = record(
            "2000",
            &[
                ("100", '1', &[('a', "Meikäläinen, Matti")]),
                ("700", '1', &[('a', "Virtanen, Ville")]),
            ],
        );
        assert_eq!(score(&author(&r1, &r2).unwrap()), Some(SURE));
    }

    #[test]
    fn abbreviated_first_names_match() {
        let r1 = record("2000", &[("100", '1', &[('a', "Tolkien, J. R. R.")])]);
        let r2 = record("2000", &[("100", '1', &[('a', "Tolkien, John Ronald Reuel")])]);
        assert_eq!(score(&author(&r1, &r2).unwrap()), Some(SURE));
    }

    #[test]
    fn different_authors_are_not_duplicates() {
        let r1 = record("2000", &[("100", '1', &[('a', "Meikäläinen, Matti")])]);
        let r2 = record("2000", &[("100", '1', &[('a', "Virtanen, Ville")])]);
        assert_eq!(score(&author(&r1, &r2).unwrap()), Some(SURELY_NOT));
    }

    #[test]
    fn names_mined_from_other_statement() {
        let r1 = record("2000", &[("100", '1', &[('a', "Meikäläinen, Matti")])]);
        let r2 = record(
            "2000",
            &[
                ("245", '1', &[('a', "Kirja /"), ('c', "Matti Meikäläinen.")]),
                ("700", '1', &[('a', "Virtanen, Ville")]),
            ],
        );
        let outcome = author(&r1, &r2).unwrap();
        assert_eq!(outcome.normalized[1].subfield_values("245", 'c'), vec!["MATTI MEIKALAINEN"]);
        // the raw side shows the record's own 245 $c
        assert_eq!(outcome.fields[1].subfield_values("245", 'c'), vec!["Matti Meikäläinen."]);
    }

    #[test]
    fn missing_names_skip() {
        let r1 = record("2000", &[]);
        let r2 = record("2000", &[("100", '1', &[('a', "Meikäläinen, Matti")])]);
        assert_eq!(author(&r1, &r2).unwrap().verdict, Verdict::Skip);
    }

    #[test]
    fn statement_of_responsibility_cascade() {
        let stmt = |text: &str| record("2000", &[("245", '1', &[('a', "Kirja"), ('c', text)])]);

        let base = stmt("Matti Meikäläinen ; kuvittanut Ville Virtanen.");
        assert_eq!(
            score(&author245c(&base, &stmt("Matti Meikalainen ; kuvittanut Ville Virtanen")).unwrap()),
            Some(SURE)
        );
        assert_eq!(score(&author245c(&base, &stmt("Matti Meikäläinen")).unwrap()), Some(SURE));
        assert_eq!(score(&author245c(&base, &stmt("Liisa Laine")).unwrap()), Some(SURELY_NOT));
        assert_eq!(author245c(&base, &record("2000", &[])).unwrap().verdict, Verdict::Skip);
    }
}
