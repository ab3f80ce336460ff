use marcsim_core::{FieldSet, Record};

use super::{
    ALMOST_SURE, CheckOutcome, SURE, SURELY_NOT, Verdict, dates_from_008, normalize_pair,
    select_pair,
};
use crate::compare::{is_identical, is_subset_with};
use crate::error::Result;
use crate::normalize::Step;

const YEAR_STEPS: &[Step] = &[Step::OnlyYearNumbers, Step::RemoveEmpty];

/// Years from 260 $c, 500 $a and both 008 date positions. Records without 008
/// cannot be compared.
pub fn years(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let [mut fields1, mut fields2] = select_pair(&["260..c", "500..a"], record1, record2)?;
    fields1.extend(dates_from_008(record1)?);
    fields2.extend(dates_from_008(record2)?);

    let fields = [fields1, fields2];
    let normalized = normalize_pair(&fields, YEAR_STEPS);

    let verdict = years_verdict(&normalized[0], &normalized[1]);
    Ok(CheckOutcome::new(verdict, fields, normalized))
}

fn years_verdict(set1: &FieldSet, set2: &FieldSet) -> Verdict {
    if set1.subfield_count() == 0 || set2.subfield_count() == 0 {
        return Verdict::Skip;
    }
    if is_identical(set1, set2) {
        return Verdict::Evidence(SURE);
    }

    let same = |a: &str, b: &str| a == b;
    if is_subset_with(set1, set2, same) || is_subset_with(set2, set1, same) {
        return Verdict::Evidence(ALMOST_SURE);
    }
    Verdict::Evidence(SURELY_NOT)
}
