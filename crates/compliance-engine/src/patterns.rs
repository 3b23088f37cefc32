//! Word lists and text-position helpers shared by the grammar rules

/// Frequent misspellings and their corrections
pub const COMMON_MISSPELLINGS: &[(&str, &str)] = &[
    ("accomodate", "accommodate"),
    ("acheive", "achieve"),
    ("alot", "a lot"),
    ("complience", "compliance"),
    ("definately", "definitely"),
    ("enviroment", "environment"),
    ("existance", "existence"),
    ("goverment", "government"),
    ("independant", "independent"),
    ("neccessary", "necessary"),
    ("occured", "occurred"),
    ("occurence", "occurrence"),
    ("publically", "publicly"),
    ("recieve", "receive"),
    ("refered", "referred"),
    ("responsability", "responsibility"),
    ("seperate", "separate"),
    ("teh", "the"),
    ("thier", "their"),
    ("untill", "until"),
    ("wich", "which"),
];

/// Vowel-initial words that take "a" because they start with a consonant sound
pub const CONSONANT_SOUND_PREFIXES: &[&str] = &[
    "one", "once", "uni", "use", "usu", "uti", "ubi", "eu", "ewe",
];

/// Consonant-initial words that take "an" because the h is silent
pub const SILENT_H_PREFIXES: &[&str] = &["hour", "honest", "honor", "honour", "heir"];

/// Characters of context kept on each side of a span
pub const CONTEXT_RADIUS: usize = 20;

/// Convert a byte index into a character index
pub fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

/// Snippet around a character span, newlines flattened to spaces
pub fn context_snippet(text: &str, offset: usize, length: usize) -> String {
    let start = offset.saturating_sub(CONTEXT_RADIUS);
    let end = offset + length + CONTEXT_RADIUS;
    text.chars()
        .skip(start)
        .take(end - start)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Check if a lowercase word starts with any of the given prefixes
pub fn starts_with_any(word: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| word.starts_with(prefix))
}

/// Apply the capitalization of `original`'s first letter to `replacement`
pub fn match_capitalization(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
