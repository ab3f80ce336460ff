//! Identifier-family checkers: ISBN and the other standard numbers.

use marcsim_core::{FieldSet, Record};

use super::{
    ALMOST_SURE, CheckOutcome, MAYBE, SURE, SURELY_NOT, Verdict, gate_on_publication_year,
    normalize_pair, select_pair,
};
use crate::compare::{has_intersection, intersection, is_identical, is_subset};
use crate::error::Result;
use crate::identifiers::{extract_isbn, to_isbn13};
use crate::normalize::Step;

const NUMBER_STEPS: &[Step] = &[Step::del_chars(":-"), Step::TrimEnd, Step::Upper];

const ISBN_STEPS: &[Step] = &[
    Step::del_chars(":-"),
    Step::TrimEnd,
    Step::Upper,
    Step::StripQualifier,
];

const MIN_ISBN_LEN: usize = 3;

/// Shared scoring for identifier sets.
///
/// Skip when either side has nothing to compare; sure on identity or
/// containment; `partial` when the sets only overlap.
pub fn identifier_verdict(set1: &FieldSet, set2: &FieldSet, partial: f64) -> Verdict {
    if set1.is_empty() || set2.is_empty() {
        return Verdict::Skip;
    }
    if !set1.has_subfield('a') || !set2.has_subfield('a') {
        return Verdict::Skip;
    }

    if is_identical(set1, set2) || is_subset(set1, set2) || is_subset(set2, set1) {
        return Verdict::Evidence(SURE);
    }
    if has_intersection(set1, set2) {
        return Verdict::Evidence(partial);
    }
    Verdict::Evidence(SURELY_NOT)
}

/// A standard number compared with the shared skeleton.
#[derive(Debug, Clone, Copy)]
pub struct StandardNumber {
    pub selector: &'static str,
    /// Records published before this year carry no usable number.
    pub min_year: Option<u32>,
}

impl StandardNumber {
    pub const ISSN: Self = Self::gated("022..a", 1974);
    pub const ISRC: Self = Self::new("0240.a");
    pub const UPC: Self = Self::new("0241.a");
    pub const ISMN: Self = Self::gated("0242.a", 1992);
    pub const EAN: Self = Self::new("0243.a");
    pub const SICI: Self = Self::new("0244.a");
    pub const MISC024: Self = Self::new("0247.a2");
    pub const ISRN: Self = Self::new("027..a");
    pub const F010: Self = Self::new("010..a");
    pub const F015: Self = Self::new("015..a");
    pub const F027: Self = Self::new("027");

    const fn new(selector: &'static str) -> Self {
        Self {
            selector,
            min_year: None,
        }
    }

    const fn gated(selector: &'static str, min_year: u32) -> Self {
        Self {
            selector,
            min_year: Some(min_year),
        }
    }

    pub fn check(&self, record1: &Record, record2: &Record) -> Result<CheckOutcome> {
        let fields = select_pair(&[self.selector], record1, record2)?;
        let [mut norm1, mut norm2] = normalize_pair(&fields, NUMBER_STEPS);
        let [mut fields1, mut fields2] = fields;

        if let Some(min_year) = self.min_year {
            norm1 = gate_on_publication_year(record1, min_year, &mut fields1, norm1)?;
            norm2 = gate_on_publication_year(record2, min_year, &mut fields2, norm2)?;
        }

        let verdict = identifier_verdict(&norm1, &norm2, ALMOST_SURE);
        Ok(CheckOutcome::new(verdict, [fields1, fields2], [norm1, norm2]))
    }
}

fn isbn13_values(set: FieldSet) -> FieldSet {
    let mut set = set.without_subfields(|sf| sf.code == 'a' && sf.value.chars().count() < MIN_ISBN_LEN);
    for df in set.data_fields_mut() {
        for sf in df.subfields.iter_mut().filter(|sf| sf.code == 'a') {
            sf.value = to_isbn13(&sf.value);
        }
    }
    set
}

pub fn isbn(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let fields = select_pair(&["020..a"], record1, record2)?;
    let [norm1, norm2] = normalize_pair(&fields, ISBN_STEPS);
    let [mut fields1, mut fields2] = fields;

    let norm1 = gate_on_publication_year(record1, 1972, &mut fields1, isbn13_values(norm1))?;
    let norm2 = gate_on_publication_year(record2, 1972, &mut fields2, isbn13_values(norm2))?;

    let verdict = identifier_verdict(&norm1, &norm2, 0.6);
    Ok(CheckOutcome::new(verdict, [fields1, fields2], [norm1, norm2]))
}

/// Replace each subfield value by the ISBN found in it; subfields without one
/// are dropped.
fn extracted_isbns(mut set: FieldSet) -> FieldSet {
    for df in set.data_fields_mut() {
        df.subfields = std::mem::take(&mut df.subfields)
            .into_iter()
            .filter_map(|mut sf| {
                sf.value = extract_isbn(&sf.value)?;
                Some(sf)
            })
            .collect();
    }
    set
}

fn isbn_sources(
    selectors: &[&str],
    record1: &Record,
    record2: &Record,
) -> Result<([FieldSet; 2], [FieldSet; 2])> {
    let fields = select_pair(selectors, record1, record2)?;
    let [norm1, norm2] = normalize_pair(&fields, NUMBER_STEPS);
    Ok((fields, [extracted_isbns(norm1), extracted_isbns(norm2)]))
}

/// ISBNs quoted in 515 notes. The same ISBN in both 515s means two parts of
/// one work; a 515 ISBN matching the other record's 020 is weak evidence.
pub fn isbn_extra(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let (fields, [norm1, norm2]) = isbn_sources(&["515", "020"], record1, record2)?;

    let (notes1, notes2) = (norm1.restrict("515", 'a'), norm2.restrict("515", 'a'));
    let (own1, own2) = (norm1.restrict("020", 'a'), norm2.restrict("020", 'a'));

    let verdict = if !intersection(&notes1, &notes2).is_empty() {
        Verdict::Evidence(SURELY_NOT)
    } else if has_intersection(&notes1, &own2) || has_intersection(&notes2, &own1) {
        Verdict::Evidence(MAYBE)
    } else {
        Verdict::Skip
    };

    Ok(CheckOutcome::new(verdict, fields, [norm1, norm2]))
}

/// A record whose own ISBN is listed in the other's 530 (additional physical
/// form) describes a different manifestation.
pub fn additional_physical_form(record1: &Record, record2: &Record) -> Result<CheckOutcome> {
    let (fields, [norm1, norm2]) = isbn_sources(&["530", "020"], record1, record2)?;

    let (forms1, forms2) = (norm1.restrict("530", 'a'), norm2.restrict("530", 'a'));
    let (own1, own2) = (norm1.restrict("020", 'a'), norm2.restrict("020", 'a'));

    let verdict = if has_intersection(&own2, &forms1) || has_intersection(&own1, &forms2) {
        Verdict::Veto
    } else {
        Verdict::Skip
    };

    Ok(CheckOutcome::new(verdict, fields, [norm1, norm2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testing::{record, score};

    #[test]
    fn isbn10_matches_equivalent_isbn13() {
        let r1 = record("2005", &[("020", ' ', &[('a', "951-0-12345-6 (nid.)")])]);
        let r2 = record("2005", &[("020", ' ', &[('a', "9789510123454")])]);
        let outcome = isbn(&r1, &r2).unwrap();
        assert_eq!(score(&outcome), Some(SURE));
        assert_eq!(outcome.normalized[0].values(false), vec!["9789510123454"]);
    }

    #[test]
    fn isbn_partial_overlap_and_mismatch() {
        let r1 = record(
            "2005",
            &[
                ("020", ' ', &[('a', "9789510123454")]),
                ("020", ' ', &[('a', "9789510000001")]),
            ],
        );
        let r2 = record(
            "2005",
            &[
                ("020", ' ', &[('a', "9789510123454")]),
                ("020", ' ', &[('a', "9789510000002")]),
            ],
        );
        assert_eq!(score(&isbn(&r1, &r2).unwrap()), Some(0.6));

        let r3 = record("2005", &[("020", ' ', &[('a', "9789510999999")])]);
        assert_eq!(score(&isbn(&r1, &r3).unwrap()), Some(SURELY_NOT));
    }

    #[test]
    fn isbn_subset_is_sure() {
        let r1 = record("2005", &[("020", ' ', &[('a', "9789510123454")])]);
        let r2 = record(
            "2005",
            &[
                ("020", ' ', &[('a', "9789510123454")]),
                ("020", ' ', &[('a', "9789510000002")]),
            ],
        );
        assert_eq!(score(&isbn(&r1, &r2).unwrap()), Some(SURE));
    }

    #[test]
    fn old_records_skip_isbn() {
        let r1 = record("1965", &[("020", ' ', &[('a', "9789510123454")])]);
        let r2 = record("2005", &[("020", ' ', &[('a', "9789510123454")])]);
        let outcome = isbn(&r1, &r2).unwrap();
        assert_eq!(outcome.verdict, Verdict::Skip);
        // the year is shown with the raw fields
        assert_eq!(outcome.fields[0].subfield_values("999", 'a'), vec!["1965"]);
    }

    #[test]
    fn short_isbn_values_are_dropped() {
        let r1 = record("2005", &[("020", ' ', &[('a', "12")])]);
        let r2 = record("2005", &[("020", ' ', &[('a', "9789510123454")])]);
        assert_eq!(isbn(&r1, &r2).unwrap().verdict, Verdict::Skip);
    }

    #[test]
    fn missing_isbn_skips() {
        let r1 = record("2005", &[]);
        let r2 = record("2005", &[("020", ' ', &[('a', "9789510123454")])]);
        assert_eq!(isbn(&r1, &r2).unwrap().verdict, Verdict::Skip);
    }

    #[test]
    fn ismn_uses_indicator_and_year_gate() {
        let r1 = record("2000", &[("024", '2', &[('a', "M-2306-7118-7")])]);
        let r2 = record("2000", &[("024", '2', &[('a', "M230671187")])]);
        assert_eq!(score(&StandardNumber::ISMN.check(&r1, &r2).unwrap()), Some(SURE));

        let r3 = record("1990", &[("024", '2', &[('a', "M230671187")])]);
        assert_eq!(StandardNumber::ISMN.check(&r1, &r3).unwrap().verdict, Verdict::Skip);

        // an EAN (ind1 3) is not an ISMN
        let r4 = record("2000", &[("024", '3', &[('a', "M230671187")])]);
        assert_eq!(StandardNumber::ISMN.check(&r1, &r4).unwrap().verdict, Verdict::Skip);
    }

    #[test]
    fn standard_number_overlap_is_almost_sure() {
        let r1 = record(
            "2000",
            &[("022", ' ', &[('a', "0355-0001")]), ("022", ' ', &[('a', "1234-5678")])],
        );
        let r2 = record(
            "2000",
            &[("022", ' ', &[('a', "03550001")]), ("022", ' ', &[('a', "8765-4321")])],
        );
        assert_eq!(score(&StandardNumber::ISSN.check(&r1, &r2).unwrap()), Some(ALMOST_SURE));
    }

    #[test]
    fn isbn_extra_scores() {
        let r1 = record(
            "2000",
            &[("515", ' ', &[('a', "Koko teos ISBN 951-0-12345-6")])],
        );
        let r2 = record("2000", &[("020", ' ', &[('a', "9789510123454")])]);
        assert_eq!(score(&isbn_extra(&r1, &r2).unwrap()), Some(MAYBE));

        let r3 = record("2000", &[("515", ' ', &[('a', "ISBN 9789510123454")])]);
        assert_eq!(score(&isbn_extra(&r1, &r3).unwrap()), Some(SURELY_NOT));

        let r4 = record("2000", &[]);
        assert_eq!(isbn_extra(&r1, &r4).unwrap().verdict, Verdict::Skip);
    }

    #[test]
    fn additional_physical_form_vetoes() {
        let r1 = record(
            "2000",
            &[("530", ' ', &[('a', "Julkaistu myös verkkoaineistona, ISBN 9789510123454")])],
        );
        let r2 = record("2000", &[("020", ' ', &[('a', "978-951-0-12345-4")])]);
        assert_eq!(additional_physical_form(&r1, &r2).unwrap().verdict, Verdict::Veto);
        assert_eq!(additional_physical_form(&r2, &r2).unwrap().verdict, Verdict::Skip);
    }
}
