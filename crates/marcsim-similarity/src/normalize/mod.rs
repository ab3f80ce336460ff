//! Normalization steps and pipelines over owned field sets.
//!
//! Steps rewrite data-field subfield values and leave control fields alone.
//! They are addressed by stable names (`trimEnd`, `delChars(":-")`) so a
//! checker recipe can be written as plain data and validated up front.

pub mod page_info;
pub mod roman;
pub mod wordmap;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use marcsim_core::FieldSet;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{Result, SimilarityError};

pub use page_info::{PageInfo, parse_page_info};
pub use roman::{parse_roman, parse_roman_word};
pub use wordmap::map_number_word;

static TRAILING_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(.*\)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Trim,
    TrimEnd,
    Upper,
    DelChars(Cow<'static, str>),
    ToSpace(Cow<'static, str>),
    Collapse,
    Utf8Norm,
    RemoveDiacs,
    OnlyNumbers,
    OnlyYearNumbers,
    RemoveEmpty,
    SortContent,
    RomanToArabic,
    ParsePageInfo,
    StripQualifier,
    NumberWords,
}

impl Step {
    pub const fn del_chars(set: &'static str) -> Self {
        Step::DelChars(Cow::Borrowed(set))
    }

    pub const fn to_space(set: &'static str) -> Self {
        Step::ToSpace(Cow::Borrowed(set))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Trim => "trim",
            Step::TrimEnd => "trimEnd",
            Step::Upper => "upper",
            Step::DelChars(_) => "delChars",
            Step::ToSpace(_) => "toSpace",
            Step::Collapse => "collapse",
            Step::Utf8Norm => "utf8norm",
            Step::RemoveDiacs => "removediacs",
            Step::OnlyNumbers => "onlyNumbers",
            Step::OnlyYearNumbers => "onlyYearNumbers",
            Step::RemoveEmpty => "removeEmpty",
            Step::SortContent => "sortContent",
            Step::RomanToArabic => "romanToArabic",
            Step::ParsePageInfo => "parsePageInfo",
            Step::StripQualifier => "stripQualifier",
            Step::NumberWords => "numberWords",
        }
    }

    /// Rewrite a single value. `RemoveEmpty` works on whole subfields and
    /// leaves values as they are.
    pub fn apply_value(&self, value: &str) -> String {
        match self {
            Step::Trim => value.trim().to_string(),
            Step::TrimEnd => value.trim_end().to_string(),
            Step::Upper => value.to_uppercase(),
            Step::DelChars(set) => value.chars().filter(|c| !set.contains(*c)).collect(),
            Step::ToSpace(set) => value
                .chars()
                .map(|c| if set.contains(c) { ' ' } else { c })
                .collect(),
            Step::Collapse => collapse(value),
            Step::Utf8Norm => value.nfc().collect(),
            Step::RemoveDiacs => remove_diacritics(value),
            Step::OnlyNumbers => only_numbers(value),
            Step::OnlyYearNumbers => only_year_numbers(value),
            Step::RemoveEmpty => value.to_string(),
            Step::SortContent => sort_content(value),
            Step::RomanToArabic => map_words(value, |w| match parse_roman_word(w) {
                Some(n) => Cow::Owned(n.to_string()),
                None => Cow::Borrowed(w),
            }),
            Step::ParsePageInfo => parse_page_info(value)
                .map(|info| info.to_string())
                .unwrap_or_default(),
            Step::StripQualifier => TRAILING_QUALIFIER.replace(value, "").into_owned(),
            Step::NumberWords => map_words(value, map_number_word),
        }
    }

    /// Apply the step to every subfield, or only to subfields with `code`.
    pub fn apply(&self, set: FieldSet, code: Option<char>) -> FieldSet {
        let targeted = |c: char| code.is_none_or(|only| only == c);

        if *self == Step::RemoveEmpty {
            return set.without_subfields(|sf| targeted(sf.code) && sf.value.is_empty());
        }

        let mut set = set;
        for df in set.data_fields_mut() {
            for sf in df.subfields.iter_mut().filter(|sf| targeted(sf.code)) {
                sf.value = self.apply_value(&sf.value);
            }
        }
        set
    }
}

fn parse_argument(raw: &str) -> Option<String> {
    let inner = raw.trim().strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next()?);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

impl FromStr for Step {
    type Err = SimilarityError;

    /// Parse `name` or `name("arg")`.
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || SimilarityError::UnknownStep(s.to_string());
        let s_trim = s.trim();

        if let Some((name, rest)) = s_trim.split_once('(') {
            let arg = rest
                .strip_suffix(')')
                .and_then(parse_argument)
                .ok_or_else(unknown)?;
            return match name {
                "delChars" => Ok(Step::DelChars(Cow::Owned(arg))),
                "toSpace" => Ok(Step::ToSpace(Cow::Owned(arg))),
                _ => Err(unknown()),
            };
        }

        Ok(match s_trim {
            "trim" => Step::Trim,
            "trimEnd" => Step::TrimEnd,
            "upper" => Step::Upper,
            "collapse" => Step::Collapse,
            "utf8norm" => Step::Utf8Norm,
            "removediacs" => Step::RemoveDiacs,
            "onlyNumbers" => Step::OnlyNumbers,
            "onlyYearNumbers" => Step::OnlyYearNumbers,
            "removeEmpty" => Step::RemoveEmpty,
            "sortContent" => Step::SortContent,
            "romanToArabic" => Step::RomanToArabic,
            "parsePageInfo" => Step::ParsePageInfo,
            "stripQualifier" => Step::StripQualifier,
            "numberWords" => Step::NumberWords,
            _ => return Err(unknown()),
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::DelChars(arg) | Step::ToSpace(arg) => {
                let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "{}(\"{}\")", self.name(), escaped)
            }
            _ => f.write_str(self.name()),
        }
    }
}

// ─── Value transforms ──────────────────────────────────────

fn map_words<'a>(value: &'a str, f: impl Fn(&'a str) -> Cow<'a, str>) -> String {
    value.split(' ').map(f).collect::<Vec<_>>().join(" ")
}

pub fn collapse(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_space = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

pub fn remove_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

fn digit_groups(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| !c.is_ascii_digit())
        .filter(|group| !group.is_empty())
}

pub fn only_numbers(value: &str) -> String {
    digit_groups(value).collect::<Vec<_>>().join(" ")
}

pub fn is_year(group: &str) -> bool {
    group.len() == 4
        && group
            .parse::<u32>()
            .is_ok_and(|year| year > 1000 && year < 2100)
}

pub fn only_year_numbers(value: &str) -> String {
    digit_groups(value)
        .filter(|group| is_year(group))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn sort_content(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

// ─── Pipeline ──────────────────────────────────────────────

/// An ordered list of steps, folded left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    steps: Vec<Step>,
    code: Option<char>,
}

impl Pipeline {
    pub fn new(steps: &[Step]) -> Self {
        Self {
            steps: steps.to_vec(),
            code: None,
        }
    }

    /// Build from step names, failing on the first unknown one.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let steps = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<Step>>>()?;
        Ok(Self { steps, code: None })
    }

    /// Restrict every step to subfields with `code`.
    pub fn only_code(mut self, code: char) -> Self {
        self.code = Some(code);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn run(&self, set: FieldSet) -> FieldSet {
        self.steps
            .iter()
            .fold(set, |acc, step| step.apply(acc, self.code))
    }
}

/// Run `steps` over a copy of `set`.
pub fn normalize(set: &FieldSet, steps: &[Step]) -> FieldSet {
    steps
        .iter()
        .fold(set.clone(), |acc, step| step.apply(acc, None))
}
