//! Field-family checkers.
//!
//! Every checker selects its fields from both records, normalizes copies and
//! scores them. The registry is closed: [`CheckerKind`] names every checker a
//! strategy may refer to.

pub mod author;
pub mod charsim;
pub mod extent;
pub mod publisher;
pub mod script;
pub mod series;
pub mod standard_numbers;
pub mod title;
pub mod years;

use std::fmt;
use std::str::FromStr;

use marcsim_core::{DataField, FieldSet, Record, select};
use serde::{Serialize, Serializer};

use crate::error::{Result, SimilarityError};
use crate::normalize::{Step, normalize};

// Certainty levels shared by the checkers.
pub const SURE: f64 = 1.0;
pub const ALMOST_SURE: f64 = 0.8;
pub const MAYBE: f64 = 0.5;
pub const SURELY_NOT: f64 = 0.0;

/// Publication year used when a record carries no plausible year.
pub const UNKNOWN_YEAR: u32 = 9999;

// ─── Verdict ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Confidence in `[0, 1]` that the records describe the same item.
    Evidence(f64),
    /// Not enough data to say anything.
    Skip,
    /// The records are not duplicates, whatever the other checkers say.
    Veto,
}

impl Verdict {
    /// Numeric form used at the output boundary: `None` for Skip, `-1` for Veto.
    pub fn similarity(self) -> Option<f64> {
        match self {
            Verdict::Evidence(score) => Some(score),
            Verdict::Skip => None,
            Verdict::Veto => Some(-1.0),
        }
    }

    pub fn is_veto(self) -> bool {
        self == Verdict::Veto
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.similarity().serialize(serializer)
    }
}

/// Verdict of one checker plus the field sets it looked at.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    #[serde(rename = "similarity")]
    pub verdict: Verdict,
    /// Selected fields, as found in each record.
    pub fields: [FieldSet; 2],
    /// The same fields after normalization.
    pub normalized: [FieldSet; 2],
}

impl CheckOutcome {
    pub fn new(verdict: Verdict, fields: [FieldSet; 2], normalized: [FieldSet; 2]) -> Self {
        Self {
            verdict,
            fields,
            normalized,
        }
    }
}

// ─── Registry ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckerKind {
    Isbn,
    IsbnExtra,
    AdditionalPhysicalForm,
    Issn,
    Isrc,
    Upc,
    Ismn,
    Ean,
    Sici,
    Misc024,
    Isrn,
    F010,
    F015,
    F027,
    Has880,
    Reprint,
    Size,
    Years,
    Title,
    Author,
    Author245c,
    Publisher,
    Sarjat,
    CharSimilarity,
}

impl CheckerKind {
    pub const ALL: [CheckerKind; 24] = [
        CheckerKind::Isbn,
        CheckerKind::IsbnExtra,
        CheckerKind::AdditionalPhysicalForm,
        CheckerKind::Issn,
        CheckerKind::Isrc,
        CheckerKind::Upc,
        CheckerKind::Ismn,
        CheckerKind::Ean,
        CheckerKind::Sici,
        CheckerKind::Misc024,
        CheckerKind::Isrn,
        CheckerKind::F010,
        CheckerKind::F015,
        CheckerKind::F027,
        CheckerKind::Has880,
        CheckerKind::Reprint,
        CheckerKind::Size,
        CheckerKind::Years,
        CheckerKind::Title,
        CheckerKind::Author,
        CheckerKind::Author245c,
        CheckerKind::Publisher,
        CheckerKind::Sarjat,
        CheckerKind::CharSimilarity,
    ];

    /// Stable configuration key.
    pub fn name(self) -> &'static str {
        match self {
            CheckerKind::Isbn => "ISBN",
            CheckerKind::IsbnExtra => "ISBNExtra",
            CheckerKind::AdditionalPhysicalForm => "AdditionalPhysicalForm",
            CheckerKind::Issn => "ISSN",
            CheckerKind::Isrc => "ISRC",
            CheckerKind::Upc => "UPC",
            CheckerKind::Ismn => "ISMN",
            CheckerKind::Ean => "EAN",
            CheckerKind::Sici => "SICI",
            CheckerKind::Misc024 => "MISC024",
            CheckerKind::Isrn => "ISRN",
            CheckerKind::F010 => "F010",
            CheckerKind::F015 => "F015",
            CheckerKind::F027 => "F027",
            CheckerKind::Has880 => "has880",
            CheckerKind::Reprint => "reprint",
            CheckerKind::Size => "size",
            CheckerKind::Years => "years",
            CheckerKind::Title => "title",
            CheckerKind::Author => "author",
            CheckerKind::Author245c => "author245c",
            CheckerKind::Publisher => "publisher",
            CheckerKind::Sarjat => "sarjat",
            CheckerKind::CharSimilarity => "charsimilarity",
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            CheckerKind::Isbn => "020$a ISBNs, ISBN-10 folded to ISBN-13",
            CheckerKind::IsbnExtra => "ISBNs quoted in 515 against 515 and 020",
            CheckerKind::AdditionalPhysicalForm => "020 ISBN listed as another form in 530 (veto)",
            CheckerKind::Issn => "022$a ISSNs",
            CheckerKind::Isrc => "024 ind1 0: ISRC",
            CheckerKind::Upc => "024 ind1 1: UPC",
            CheckerKind::Ismn => "024 ind1 2: ISMN",
            CheckerKind::Ean => "024 ind1 3: EAN",
            CheckerKind::Sici => "024 ind1 4: SICI",
            CheckerKind::Misc024 => "024 ind1 7: source-specified standard numbers",
            CheckerKind::Isrn => "027$a ISRN",
            CheckerKind::F010 => "010$a LC control number",
            CheckerKind::F015 => "015$a national bibliography number",
            CheckerKind::F027 => "027 standard technical report number",
            CheckerKind::Has880 => "880 alternate script fields (veto)",
            CheckerKind::Reprint => "250$a edition, then 300$a page count",
            CheckerKind::Size => "300$a extent",
            CheckerKind::Years => "years from 260$c, 500$a and 008",
            CheckerKind::Title => "245 titles, parallel titles and part numbers, 246$a",
            CheckerKind::Author => "100/110/111/700/710/711 names, mined from 245$c",
            CheckerKind::Author245c => "245$c statement of responsibility",
            CheckerKind::Publisher => "260$a$b place and publisher",
            CheckerKind::Sarjat => "490/830 series",
            CheckerKind::CharSimilarity => "Levenshtein ratio over the descriptive fields",
        }
    }

    pub fn check(self, record1: &Record, record2: &Record) -> Result<CheckOutcome> {
        use standard_numbers::StandardNumber;

        match self {
            CheckerKind::Isbn => standard_numbers::isbn(record1, record2),
            CheckerKind::IsbnExtra => standard_numbers::isbn_extra(record1, record2),
            CheckerKind::AdditionalPhysicalForm => {
                standard_numbers::additional_physical_form(record1, record2)
            }
            CheckerKind::Issn => StandardNumber::ISSN.check(record1, record2),
            CheckerKind::Isrc => StandardNumber::ISRC.check(record1, record2),
            CheckerKind::Upc => StandardNumber::UPC.check(record1, record2),
            CheckerKind::Ismn => StandardNumber::ISMN.check(record1, record2),
            CheckerKind::Ean => StandardNumber::EAN.check(record1, record2),
            CheckerKind::Sici => StandardNumber::SICI.check(record1, record2),
            CheckerKind::Misc024 => StandardNumber::MISC024.check(record1, record2),
            CheckerKind::Isrn => StandardNumber::ISRN.check(record1, record2),
            CheckerKind::F010 => StandardNumber::F010.check(record1, record2),
            CheckerKind::F015 => StandardNumber::F015.check(record1, record2),
            CheckerKind::F027 => StandardNumber::F027.check(record1, record2),
            CheckerKind::Has880 => script::has880(record1, record2),
            CheckerKind::Reprint => extent::reprint(record1, record2),
            CheckerKind::Size => extent::size(record1, record2),
            CheckerKind::Years => years::years(record1, record2),
            CheckerKind::Title => title::title(record1, record2),
            CheckerKind::Author => author::author(record1, record2),
            CheckerKind::Author245c => author::author245c(record1, record2),
            CheckerKind::Publisher => publisher::publisher(record1, record2),
            CheckerKind::Sarjat => series::sarjat(record1, record2),
            CheckerKind::CharSimilarity => charsim::charsimilarity(record1, record2),
        }
    }
}

impl FromStr for CheckerKind {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self> {
        CheckerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SimilarityError::UnknownChecker(s.to_string()))
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for CheckerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ─── Shared helpers ────────────────────────────────────────

/// Select the same fields from both records.
pub(crate) fn select_pair(
    selectors: &[&str],
    record1: &Record,
    record2: &Record,
) -> Result<[FieldSet; 2]> {
    Ok([select(selectors, record1)?, select(selectors, record2)?])
}

pub(crate) fn normalize_pair(fields: &[FieldSet; 2], steps: &[Step]) -> [FieldSet; 2] {
    [normalize(&fields[0], steps), normalize(&fields[1], steps)]
}

pub(crate) fn synthetic_field(tag: &str, code: char, value: impl Into<String>) -> Result<DataField> {
    Ok(DataField::single(tag, code, value)?)
}

/// `len` characters of a fixed-length control field starting at `start`;
/// shorter values yield what is there.
pub(crate) fn fixed_slice(value: &str, start: usize, len: usize) -> String {
    value.chars().skip(start).take(len).collect()
}

/// The two date positions of 008 (07-10 and 11-14) as synthetic `008 $a` fields.
pub(crate) fn dates_from_008(record: &Record) -> Result<FieldSet> {
    let f008 = record
        .control_field("008")
        .ok_or_else(|| SimilarityError::MissingField {
            tag: "008".to_string(),
        })?;

    let mut out = FieldSet::new();
    for start in [7, 11] {
        out.push(synthetic_field("008", 'a', fixed_slice(&f008.value, start, 4))?);
    }
    Ok(out)
}

/// Largest plausible year in 260 $c, falling back to the dates of 008.
pub fn publication_year(record: &Record) -> Result<u32> {
    let mut fields = select(&["260..c"], record)?;
    if fields.is_empty() {
        fields = dates_from_008(record)?;
    }

    let normalized = normalize(&fields, &[Step::OnlyYearNumbers, Step::RemoveEmpty]);
    let year = normalized
        .values(false)
        .iter()
        .flat_map(|v| v.split(' ').filter_map(|y| y.parse::<u32>().ok()).collect::<Vec<_>>())
        .max()
        .unwrap_or(UNKNOWN_YEAR);
    Ok(year)
}

/// For records published before `min_year`, drop subfield `$a` from the
/// normalized set and note the year as `999 $a` in the raw diagnostics.
pub(crate) fn gate_on_publication_year(
    record: &Record,
    min_year: u32,
    fields: &mut FieldSet,
    normalized: FieldSet,
) -> Result<FieldSet> {
    let year = publication_year(record)?;
    if year >= min_year {
        return Ok(normalized);
    }

    tracing::debug!(year, min_year, "publication year below gate, ignoring $a");
    fields.push(synthetic_field("999", 'a', year.to_string())?);
    Ok(normalized.without_subfields(|sf| sf.code == 'a'))
}

/// Value of `tag $code` where exactly one such subfield is expected.
///
/// Several matching fields only warrant a warning and the first one is used;
/// several matching subfields in that field are an error.
pub(crate) fn single_value(set: &FieldSet, tag: &str, code: char) -> Result<Option<String>> {
    let mut matching = set.data_fields().filter(|df| df.tag == tag);
    let Some(first) = matching.next() else {
        return Ok(None);
    };
    if matching.next().is_some() {
        tracing::warn!("record has multiple {tag}{code} fields, using the first");
    }

    let values: Vec<&str> = first.subfield_values(code).collect();
    match values.as_slice() {
        [] => Ok(None),
        [value] => Ok(Some(value.to_string())),
        _ => Err(SimilarityError::AmbiguousField {
            selector: format!("{tag}{code}"),
        }),
    }
}
