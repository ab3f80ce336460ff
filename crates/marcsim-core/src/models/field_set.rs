use serde::{Deserialize, Serialize};

use crate::models::record::{DataField, Field, Subfield};

/// An ordered, owned sequence of fields produced by selection.
///
/// A `FieldSet` never aliases the record it was selected from, so checkers
/// are free to transform it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Field> {
        self.fields.iter_mut()
    }

    pub fn push(&mut self, field: impl Into<Field>) {
        self.fields.push(field.into());
    }

    pub fn extend(&mut self, other: FieldSet) {
        self.fields.extend(other.fields);
    }

    pub fn into_vec(self) -> Vec<Field> {
        self.fields
    }

    pub fn data_fields(&self) -> impl Iterator<Item = &DataField> {
        self.fields.iter().filter_map(Field::as_data)
    }

    pub fn data_fields_mut(&mut self) -> impl Iterator<Item = &mut DataField> {
        self.fields.iter_mut().filter_map(Field::as_data_mut)
    }

    /// Whether any data field in the set carries a subfield with `code`.
    pub fn has_subfield(&self, code: char) -> bool {
        self.data_fields().any(|df| df.has_subfield(code))
    }

    /// Total number of subfields across all data fields.
    pub fn subfield_count(&self) -> usize {
        self.data_fields().map(|df| df.subfields.len()).sum()
    }

    /// Flatten to comparable strings: one entry per subfield (prefixed by its
    /// code when `with_code` is set) and one per control field value.
    pub fn values(&self, with_code: bool) -> Vec<String> {
        let mut out = Vec::new();
        for field in &self.fields {
            match field {
                Field::Control(cf) => out.push(cf.value.clone()),
                Field::Data(df) => {
                    for sf in &df.subfields {
                        if with_code {
                            out.push(format!("{}{}", sf.code, sf.value));
                        } else {
                            out.push(sf.value.clone());
                        }
                    }
                }
            }
        }
        out
    }

    /// Values of subfield `code` in fields tagged `tag`.
    pub fn subfield_values(&self, tag: &str, code: char) -> Vec<&str> {
        self.data_fields()
            .filter(|df| df.tag == tag)
            .flat_map(|df| df.subfield_values(code))
            .collect()
    }

    /// Copies of the fields tagged `tag`, each keeping only subfield `code`.
    pub fn restrict(&self, tag: &str, code: char) -> FieldSet {
        self.data_fields()
            .filter(|df| df.tag == tag)
            .map(|df| {
                let mut df = df.clone();
                df.subfields.retain(|sf| sf.code == code);
                Field::Data(df)
            })
            .collect()
    }

    /// Drop every subfield matching `pred`; fields themselves are kept.
    pub fn without_subfields(mut self, pred: impl Fn(&Subfield) -> bool) -> FieldSet {
        for df in self.data_fields_mut() {
            df.subfields.retain(|sf| !pred(sf));
        }
        self
    }
}

impl IntoIterator for FieldSet {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Field>> for FieldSet {
    fn from(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}
