use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Number words seen in part designators (245 $n), keyed by lowercase form.
static NUMBER_WORDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // en
        ("one", "1"),
        ("two", "2"),
        ("second", "2"),
        ("three", "3"),
        ("fourth", "4"),
        ("fifth", "5"),
        // fi
        ("ensimmäinen", "1"),
        ("toinen", "2"),
        ("kolmas", "3"),
        ("neljäs", "4"),
        ("viides", "5"),
        ("kuudes", "6"),
        ("seitsemäs", "7"),
        // sv; "d." would otherwise read as the Roman numeral D
        ("första", "1"),
        ("andra", "2"),
        ("tredje", "3"),
        ("fjärde", "4"),
        ("femte", "5"),
        ("d.", "Del"),
        // de
        ("erster", "1"),
    ])
});

pub fn map_number_word(word: &str) -> Cow<'_, str> {
    match NUMBER_WORDS.get(word.to_lowercase().as_str()) {
        Some(mapped) => Cow::Borrowed(*mapped),
        None => Cow::Borrowed(word),
    }
}
