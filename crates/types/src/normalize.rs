//! Text normalization applied on every write.
//!
//! Names are stored uppercased. Descriptions are stored title-cased: the
//! first letter of every word is uppercased and the remaining characters are
//! left untouched, so `"digital money"` becomes `"Digital Money"` and an
//! acronym such as `"DeFi"` survives unchanged.

/// Normalizes a crypto name for storage.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_uppercase()
}

/// Normalizes a crypto description for storage.
#[must_use]
pub fn normalize_description(description: &str) -> String {
    title_case(description)
}

/// Uppercases the first letter of each word.
///
/// A word starts after any separator (see [`is_word_separator`]) or at the
/// beginning of the input.
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for c in input.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }

    out
}

/// Whether `c` ends a word.
///
/// ASCII letters, digits and underscore belong to words; every other ASCII
/// character separates them. Outside ASCII, letters and digits belong to
/// words and only whitespace separates them.
fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        return !(c.is_ascii_alphanumeric() || c == '_');
    }
    if c.is_alphanumeric() {
        return false;
    }
    c.is_whitespace()
}
