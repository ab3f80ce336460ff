//! Field selector micro-language.
//!
//! A selector is a three-character tag, optionally followed by an indicator-1
//! constraint, an indicator-2 constraint and a list of subfield codes to keep:
//!
//! ```text
//! 245          every 245, all subfields
//! 020..a       every 020, only $a
//! 0242.a       024 with ind1 = '2', only $a
//! ```
//!
//! `.` in an indicator position matches any indicator; a space matches only
//! a blank indicator.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::models::{DataField, Field, FieldSet, Record, Tag};

const ANY: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub tag: Tag,
    pub ind1: Option<char>,
    pub ind2: Option<char>,
    /// Subfield codes to keep; `None` keeps all of them.
    pub codes: Option<Vec<char>>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let chars: Vec<char> = selector.chars().collect();
        if chars.len() < 3 {
            return Err(CoreError::InvalidSelector(selector.to_string()));
        }

        let tag = Tag::new(chars[..3].iter().collect::<String>())?;
        let indicator = |pos: usize| chars.get(pos).copied().filter(|&c| c != ANY);
        let codes: Vec<char> = chars.iter().skip(5).copied().collect();

        Ok(Self {
            tag,
            ind1: indicator(3),
            ind2: indicator(4),
            codes: (!codes.is_empty()).then_some(codes),
        })
    }

    /// A bare selector has no indicator constraints and no subfield list.
    pub fn is_bare(&self) -> bool {
        self.ind1.is_none() && self.ind2.is_none() && self.codes.is_none()
    }

    pub fn matches(&self, field: &Field) -> bool {
        match field {
            Field::Control(cf) => self.is_bare() && cf.tag == self.tag,
            Field::Data(df) => self.matches_data(df),
        }
    }

    fn matches_data(&self, df: &DataField) -> bool {
        df.tag == self.tag
            && self.ind1.is_none_or(|c| c == df.ind1)
            && self.ind2.is_none_or(|c| c == df.ind2)
    }

    fn keeps(&self, code: char) -> bool {
        self.codes.as_ref().is_none_or(|codes| codes.contains(&code))
    }

    /// Copies of the matching fields, control fields first, with subfields
    /// pruned to the requested codes.
    pub fn apply(&self, record: &Record) -> FieldSet {
        let mut out = FieldSet::new();

        if self.is_bare() {
            for cf in record.control_fields.iter().filter(|cf| cf.tag == self.tag) {
                out.push(cf.clone());
            }
        }

        for df in record.data_fields.iter().filter(|df| self.matches_data(df)) {
            let mut copy = df.clone();
            copy.subfields.retain(|sf| self.keeps(sf.code));
            out.push(copy);
        }

        out
    }
}

impl FromStr for Selector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.tag,
            self.ind1.unwrap_or(ANY),
            self.ind2.unwrap_or(ANY)
        )?;
        if let Some(codes) = &self.codes {
            for code in codes {
                write!(f, "{code}")?;
            }
        }
        Ok(())
    }
}

/// Evaluate each selector independently and concatenate the results in the
/// order given.
pub fn select(selectors: &[&str], record: &Record) -> Result<FieldSet> {
    let mut out = FieldSet::new();
    for selector in selectors {
        out.extend(Selector::parse(selector)?.apply(record));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ControlField;

    fn record() -> Record {
        Record::new()
            .with_control(ControlField::new("001", "42").unwrap())
            .with_control(ControlField::new("008", "850101s2005    fi").unwrap())
            .with_data(
                DataField::new("020", ' ', ' ')
                    .unwrap()
                    .with_subfield('a', "9510123456")
                    .with_subfield('c', "20 EUR"),
            )
            .with_data(DataField::new("024", '2', ' ').unwrap().with_subfield('a', "M123"))
            .with_data(DataField::new("024", '3', ' ').unwrap().with_subfield('a', "640"))
            .with_data(
                DataField::new("245", '1', '0')
                    .unwrap()
                    .with_subfield('a', "Title")
                    .with_subfield('c', "Author"),
            )
    }

    #[test]
    fn parse_pads_short_selectors() {
        let sel = Selector::parse("245").unwrap();
        assert!(sel.is_bare());
        assert_eq!(sel.to_string(), "245..");

        let sel = Selector::parse("0247.a2").unwrap();
        assert_eq!(sel.ind1, Some('7'));
        assert_eq!(sel.ind2, None);
        assert_eq!(sel.codes, Some(vec!['a', '2']));
    }

    #[test]
    fn parse_rejects_short_selector() {
        assert!(matches!(
            Selector::parse("24"),
            Err(CoreError::InvalidSelector(_))
        ));
    }

    #[test]
    fn subfield_list_prunes_copies() {
        let rec = record();
        let set = select(&["020..a"], &rec).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.values(true), vec!["a9510123456"]);
        // source untouched
        assert_eq!(rec.data_fields[0].subfields.len(), 2);
    }

    #[test]
    fn indicator_constraint_must_match() {
        let rec = record();
        let set = select(&["0242.a"], &rec).unwrap();
        assert_eq!(set.values(false), vec!["M123"]);
        assert!(select(&["0245.a"], &rec).unwrap().is_empty());
        assert!(select(&["2450.a"], &rec).unwrap().is_empty());
    }

    #[test]
    fn blank_indicator_is_a_constraint() {
        let rec = record();
        let sel = Selector::parse("020  a").unwrap();
        assert_eq!((sel.ind1, sel.ind2), (Some(' '), Some(' ')));
        assert_eq!(select(&["020  a"], &rec).unwrap().values(false), vec!["9510123456"]);
        // 024 fields carry ind1 '2' and '3', never blank
        assert!(select(&["024  a"], &rec).unwrap().is_empty());
        assert_eq!(select(&["024. a"], &rec).unwrap().len(), 2);
    }

    #[test]
    fn control_fields_only_match_bare_selectors() {
        let rec = record();
        assert_eq!(select(&["008"], &rec).unwrap().len(), 1);
        assert!(select(&["008..a"], &rec).unwrap().is_empty());
    }

    #[test]
    fn multiple_selectors_concatenate_in_order() {
        let rec = record();
        let set = select(&["245..a", "001", "020..c"], &rec).unwrap();
        assert_eq!(set.values(false), vec!["Title", "42", "20 EUR"]);
    }
}
