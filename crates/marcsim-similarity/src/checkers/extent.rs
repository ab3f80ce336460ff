//! Edition and extent checkers over 250 and 300.

use marcsim_core::{FieldSet, Record};

use super::{
    ALMOST_SURE, CheckOutcome, MAYBE, SURE, SURELY_NOT, Verdict, normalize_pair, select_pair,
    single_value, synthetic_field,
};
use crate::compare::{
    distance_comparator, has_intersection_with, is_identical, is_identical_with, is_subset_with,
    skip_smaller_than,
};
use crate::error::Result;
use crate::normalize::{Step, parse_page_info};

const REPRINT_STEPS: &[Step] = &[
    Step::del_chars(":-"),
    Step::OnlyNumbers,
    Step::TrimEnd,
    Step::Upper,
];

const MAX_PAGE_DIFFERENCE: u32 = 2;

fn page_total(fields: &FieldSet) -> Result<Option<u32>> {
    let extent = single_value(fields, "300", 'a')?;
    Ok(extent.and_then(|text| parse_page_info(&text)).map(|info| info.total))
}

/// Same edition number, or a reprint with (nearly) the same page count.
pub fn reprint(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["300..a", "250..a"], record1, record2)?;
    let normalized = normalize_pair(&fields, REPRINT_STEPS);

    let verdict = reprint_verdict(&fields, &normalized)?;
    Ok(CheckOutcome::new(verdict, fields, normalized))
}

fn reprint_verdict(fields: &[FieldSet; 2], normalized: &[FieldSet; 2]) -> Result<Verdict> {
    let [norm1, norm2] = normalized;
    if norm1.is_empty() || norm2.is_empty() {
        return Ok(Verdict::Skip);
    }

    let (Some(edition1), Some(edition2)) = (
        single_value(norm1, "250", 'a')?,
        single_value(norm2, "250", 'a')?,
    ) else {
        return Ok(Verdict::Skip);
    };

    if edition1 == edition2 {
        return Ok(Verdict::Evidence(SURE));
    }

    match (page_total(&fields[0])?, page_total(&fields[1])?) {
        (Some(pages1), Some(pages2)) if pages1.abs_diff(pages2) <= MAX_PAGE_DIFFERENCE => {
            Ok(Verdict::Evidence(ALMOST_SURE))
        }
        _ => Ok(Verdict::Evidence(SURELY_NOT)),
    }
}

/// Page end and total of every parsable 300 $a, as synthetic `300 $a` fields.
fn page_numbers(fields: &FieldSet) -> Result<FieldSet> {
    let mut out = FieldSet::new();
    for value in fields.subfield_values("300", 'a') {
        let Some(info) = parse_page_info(value) else {
            tracing::trace!(value, "unparsable extent");
            continue;
        };
        out.push(synthetic_field("300", 'a', info.end.to_string())?);
        out.push(synthetic_field("300", 'a', info.total.to_string())?);
    }
    Ok(out)
}

pub fn size(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["300..a"], record1, record2)?;
    let normalized = [page_numbers(&fields[0])?, page_numbers(&fields[1])?];

    let [set1, set2] = &normalized;
    let verdict = if set1.is_empty() || set2.is_empty() {
        Verdict::Skip
    } else if is_identical(set1, set2) {
        Verdict::Evidence(SURE)
    } else if is_identical_with(set1, set2, distance_comparator(5)) {
        Verdict::Evidence(ALMOST_SURE)
    } else if is_subset_with(set1, set2, distance_comparator(3))
        || is_subset_with(set2, set1, distance_comparator(3))
    {
        Verdict::Evidence(ALMOST_SURE)
    } else if has_intersection_with(set1, set2, skip_smaller_than(20)) {
        Verdict::Evidence(MAYBE)
    } else {
        Verdict::Evidence(SURELY_NOT)
    };

    Ok(CheckOutcome::new(verdict, fields, normalized))
}
