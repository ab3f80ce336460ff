use marcsim_core::Record;

use super::{
    ALMOST_SURE, CheckOutcome, MAYBE, SURE, SURELY_NOT, Verdict, normalize_pair, select_pair,
};
use crate::compare::{
    has_intersection, has_intersection_with, is_identical, is_identical_with, jaccard_comparator,
    lv_comparator, string_partof_comparator,
};
use crate::error::Result;
use crate::normalize::Step;

const PUBLISHER_STEPS: &[Step] = &[
    Step::to_space("-."),
    Step::del_chars("':,[]()"),
    Step::TrimEnd,
    Step::Upper,
    Step::Utf8Norm,
    Step::RemoveDiacs,
    Step::RemoveEmpty,
];

/// Place and name of publisher from 260 $a $b.
pub fn publisher(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["260..ab"], record1, record2)?;
    let normalized = normalize_pair(&fields, PUBLISHER_STEPS);

    let [set1, set2] = &normalized;
    let verdict = if set1.is_empty() || set2.is_empty() {
        Verdict::Skip
    } else if is_identical(set1, set2) {
        Verdict::Evidence(SURE)
    } else if is_identical_with(set1, set2, lv_comparator(0.65)) {
        Verdict::Evidence(ALMOST_SURE)
    } else if has_intersection(set1, set2) || is_identical_with(set1, set2, jaccard_comparator(0.5)) {
        Verdict::Evidence(0.7)
    } else if has_intersection_with(set1, set2, jaccard_comparator(0.5))
        || has_intersection_with(set1, set2, string_partof_comparator)
    {
        Verdict::Evidence(MAYBE)
    } else {
        Verdict::Evidence(SURELY_NOT)
    };

    Ok(CheckOutcome::new(verdict, fields, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testing::{record, score};

    fn published(place: &str, name: &str) -> Record {
        record("2000", &[("260", ' ', &[('a', place), ('b', name), ('c', "2000")])])
    }

    #[test]
    fn publisher_cascade() {
        let base = published("Helsinki :", "Otava,");
        assert_eq!(score(&publisher(&base, &published("Helsinki", "Otava")).unwrap()), Some(SURE));
        assert_eq!(
            score(&publisher(&base, &published("Helsinky", "Otava")).unwrap()),
            Some(ALMOST_SURE)
        );
        assert_eq!(score(&publisher(&base, &published("Porvoo", "Otava")).unwrap()), Some(0.7));
        assert_eq!(
            score(&publisher(&base, &published("Porvoo :", "Otava-kirjapaino")).unwrap()),
            Some(MAYBE)
        );
        assert_eq!(score(&publisher(&base, &published("Porvoo", "WSOY")).unwrap()), Some(SURELY_NOT));
    }

    #[test]
    fn missing_260_skips() {
        let base = published("Helsinki", "Otava");
        assert_eq!(publisher(&base, &record("2000", &[])).unwrap().verdict, Verdict::Skip);
    }
}
