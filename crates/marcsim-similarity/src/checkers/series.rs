use marcsim_core::{DataField, FieldSet, Record};

use super::{ALMOST_SURE, CheckOutcome, SURE, SURELY_NOT, Verdict, select_pair};
use crate::error::Result;
use crate::normalize::{Pipeline, Step, normalize};

const VOLUME_STEPS: &[Step] = &[Step::OnlyNumbers, Step::Trim, Step::SortContent];

const SERIES_STEPS: &[Step] = &[
    Step::Utf8Norm,
    Step::RemoveDiacs,
    Step::del_chars("':;,."),
    Step::TrimEnd,
    Step::Upper,
];

fn normalize_series(fields: &FieldSet) -> FieldSet {
    let volumes = Pipeline::new(VOLUME_STEPS).only_code('v').run(fields.clone());
    normalize(&volumes, SERIES_STEPS)
}

/// Same subfields, ignoring order and repetition.
fn same_field(a: &DataField, b: &DataField) -> bool {
    let contains = |x: &DataField, y: &DataField| {
        x.subfields
            .iter()
            .all(|sf| y.subfields.iter().any(|other| other.code == sf.code && other.value == sf.value))
    };
    contains(a, b) && contains(b, a)
}

fn fields_subset(smaller: &FieldSet, larger: &FieldSet) -> bool {
    smaller
        .data_fields()
        .all(|a| larger.data_fields().any(|b| same_field(a, b)))
}

/// Series statements (490) and added entries (830), compared field by field.
pub fn sarjat(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["490", "830"], record1, record2)?;
    let normalized = [normalize_series(&fields[0]), normalize_series(&fields[1])];

    let [set1, set2] = &normalized;
    let verdict = if set1.is_empty() || set2.is_empty() {
        Verdict::Skip
    } else if fields_subset(set1, set2) && fields_subset(set2, set1) {
        Verdict::Evidence(SURE)
    } else if fields_subset(set1, set2) || fields_subset(set2, set1) {
        Verdict::Evidence(ALMOST_SURE)
    } else {
        Verdict::Evidence(SURELY_NOT)
    };

    Ok(CheckOutcome::new(verdict, fields, normalized))
}
