use marcsim_core::{Field, FieldSet, Record};

use super::{CheckOutcome, SURELY_NOT, Verdict};
use crate::compare::levenshtein;
use crate::error::Result;
use crate::normalize::{Step, normalize};

/// Local and administrative fields left out of the text comparison.
const NON_DESCRIPTIVE: &[&str] = &["LOW", "CAT", "SID", "001", "005", "080"];

const TEXT_STEPS: &[Step] = &[
    Step::to_space("-"),
    Step::del_chars("':,."),
    Step::TrimEnd,
    Step::Upper,
    Step::Utf8Norm,
    Step::RemoveDiacs,
    Step::RemoveEmpty,
];

const MIN_RATIO: f64 = 0.6;

fn descriptive_fields(record: &Record) -> FieldSet {
    record
        .to_fields()
        .into_iter()
        .filter(|field| !NON_DESCRIPTIVE.contains(&field.tag().as_str()))
        .collect()
}

/// Control fields verbatim, data fields normalized; steps leave control
/// fields untouched.
fn full_text(normalized: &FieldSet) -> String {
    normalized.values(false).join(" ")
}

/// Levenshtein ratio over the whole descriptive text of both records.
pub fn charsimilarity(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = [descriptive_fields(record1), descriptive_fields(record2)];
    let normalized = [normalize(&fields[0], TEXT_STEPS), normalize(&fields[1], TEXT_STEPS)];

    let (text1, text2) = (full_text(&normalized[0]), full_text(&normalized[1]));
    let verdict = if text1.is_empty() || text2.is_empty() {
        Verdict::Skip
    } else {
        let ratio = levenshtein(&text1, &text2);
        tracing::trace!(ratio, "character similarity");
        if ratio > MIN_RATIO {
            Verdict::Evidence(ratio)
        } else {
            Verdict::Evidence(SURELY_NOT)
        }
    };

    Ok(CheckOutcome::new(verdict, fields, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testing::{record, score};
    use marcsim_core::DataField;

    #[test]
    fn administrative_fields_are_ignored() {
        let mut r1 = record("2000", &[("245", '1', &[('a', "Kalevala")])]);
        let r2 = record("2000", &[("245", '1', &[('a', "Kalevala.")])]);
        r1.data_fields.push(DataField::single("LOW", 'a', "FIKKA").unwrap());
        r1.data_fields.push(DataField::single("080", 'a', "894.541").unwrap());

        let outcome = charsimilarity(&r1, &r2).unwrap();
        assert_eq!(score(&outcome), Some(1.0));
        assert!(outcome.fields[0].iter().all(|f: &Field| f.tag().as_str() != "LOW"));
    }

    #[test]
    fn dissimilar_text_scores_zero() {
        let r1 = Record::new().with_data(DataField::single("245", 'a', "Kalevala").unwrap());
        let r2 = Record::new().with_data(DataField::single("245", 'a', "Tuntematon sotilas").unwrap());
        assert_eq!(score(&charsimilarity(&r1, &r2).unwrap()), Some(SURELY_NOT));
    }

    #[test]
    fn empty_records_skip() {
        let r2 = Record::new().with_data(DataField::single("245", 'a', "Kalevala").unwrap());
        assert_eq!(charsimilarity(&Record::new(), &r2).unwrap().verdict, Verdict::Skip);
    }
}
