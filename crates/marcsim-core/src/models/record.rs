use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

// ─── Tag ────────────────────────────────────────────────────

/// A MARC field tag. Always exactly three characters (`020`, `245`, `LOW`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if tag.chars().count() != 3 {
            return Err(CoreError::InvalidTag(tag));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Tag {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl FromStr for Tag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Fields ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    pub code: char,
    pub value: String,
}

impl Subfield {
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

/// Fixed-semantics field below `010`: one flat value, no subfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    pub tag: Tag,
    pub value: String,
}

impl ControlField {
    pub fn new(tag: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Self {
            tag: Tag::new(tag)?,
            value: value.into(),
        })
    }
}

fn blank_indicator() -> char {
    ' '
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub tag: Tag,
    #[serde(default = "blank_indicator")]
    pub ind1: char,
    #[serde(default = "blank_indicator")]
    pub ind2: char,
    #[serde(default)]
    pub subfields: Vec<Subfield>,
}

impl DataField {
    pub fn new(tag: &str, ind1: char, ind2: char) -> Result<Self> {
        Ok(Self {
            tag: Tag::new(tag)?,
            ind1,
            ind2,
            subfields: Vec::new(),
        })
    }

    /// A field with blank indicators and a single subfield.
    pub fn single(tag: &str, code: char, value: impl Into<String>) -> Result<Self> {
        Ok(Self::new(tag, ' ', ' ')?.with_subfield(code, value))
    }

    pub fn with_subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.subfields.push(Subfield::new(code, value));
        self
    }

    pub fn has_subfield(&self, code: char) -> bool {
        self.subfields.iter().any(|sf| sf.code == code)
    }

    pub fn subfield_values(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }
}

/// Either kind of field, as produced by selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Control(ControlField),
    Data(DataField),
}

impl Field {
    pub fn tag(&self) -> &Tag {
        match self {
            Field::Control(cf) => &cf.tag,
            Field::Data(df) => &df.tag,
        }
    }

    pub fn subfields(&self) -> &[Subfield] {
        match self {
            Field::Control(_) => &[],
            Field::Data(df) => &df.subfields,
        }
    }

    pub fn as_data(&self) -> Option<&DataField> {
        match self {
            Field::Data(df) => Some(df),
            Field::Control(_) => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut DataField> {
        match self {
            Field::Data(df) => Some(df),
            Field::Control(_) => None,
        }
    }
}

impl From<ControlField> for Field {
    fn from(field: ControlField) -> Self {
        Field::Control(field)
    }
}

impl From<DataField> for Field {
    fn from(field: DataField) -> Self {
        Field::Data(field)
    }
}

// ─── Record ─────────────────────────────────────────────────

/// A bibliographic record: control fields followed by data fields, in source order.
///
/// Records are produced by an external parser and treated as read-only while
/// they are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub control_fields: Vec<ControlField>,
    #[serde(default)]
    pub data_fields: Vec<DataField>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control(mut self, field: ControlField) -> Self {
        self.control_fields.push(field);
        self
    }

    pub fn with_data(mut self, field: DataField) -> Self {
        self.data_fields.push(field);
        self
    }

    /// First control field with the given tag.
    pub fn control_field(&self, tag: &str) -> Option<&ControlField> {
        self.control_fields.iter().find(|cf| cf.tag == tag)
    }

    pub fn has_field(&self, tag: &str) -> bool {
        self.control_fields.iter().any(|cf| cf.tag == tag)
            || self.data_fields.iter().any(|df| df.tag == tag)
    }

    /// Record identifier from control field `001`.
    pub fn id(&self) -> Option<&str> {
        self.control_field("001").map(|cf| cf.value.as_str())
    }

    /// All fields as owned copies, control fields first.
    pub fn to_fields(&self) -> Vec<Field> {
        self.control_fields
            .iter()
            .cloned()
            .map(Field::Control)
            .chain(self.data_fields.iter().cloned().map(Field::Data))
            .collect()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Cache key for a record pair: the two identifiers in lexicographic order.
pub fn pair_key(id1: &str, id2: &str) -> (String, String) {
    if id1 <= id2 {
        (id1.to_string(), id2.to_string())
    } else {
        (id2.to_string(), id1.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_must_be_three_chars() {
        assert!(Tag::new("020").is_ok());
        assert!(Tag::new("LOW").is_ok());
        assert!(matches!(Tag::new("02"), Err(CoreError::InvalidTag(_))));
        assert!(Tag::new("0200").is_err());
    }

    #[test]
    fn record_json_roundtrip_keeps_order() {
        let record = Record::new()
            .with_control(ControlField::new("001", "000123").unwrap())
            .with_data(
                DataField::new("020", ' ', ' ')
                    .unwrap()
                    .with_subfield('a', "9510123456")
                    .with_subfield('c', "20 EUR"),
            )
            .with_data(DataField::single("245", 'a', "Title").unwrap());

        let json = serde_json::to_string(&record).unwrap();
        let parsed = Record::from_json(&json).unwrap();

        assert_eq!(parsed, record);
        assert_eq!(parsed.id(), Some("000123"));
        assert_eq!(parsed.data_fields[0].subfields[1].code, 'c');
        assert_eq!(parsed.data_fields[1].tag, "245");
    }

    #[test]
    fn invalid_tag_is_rejected_on_deserialize() {
        let json = r#"{"control_fields":[{"tag":"0001","value":"x"}]}"#;
        assert!(Record::from_json(json).is_err());
    }

    #[test]
    fn indicators_default_to_blank() {
        let json = r#"{"data_fields":[{"tag":"245","subfields":[{"code":"a","value":"T"}]}]}"#;
        let record = Record::from_json(json).unwrap();
        assert_eq!(record.data_fields[0].ind1, ' ');
        assert_eq!(record.data_fields[0].ind2, ' ');
    }

    #[test]
    fn pair_key_is_sorted() {
        assert_eq!(pair_key("b", "a"), ("a".to_string(), "b".to_string()));
        assert_eq!(pair_key("a", "b"), pair_key("b", "a"));
    }
}
