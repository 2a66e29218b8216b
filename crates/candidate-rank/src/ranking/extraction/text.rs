use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

static MARKUP: OnceLock<Regex> = OnceLock::new();

fn markup() -> &'static Regex {
    MARKUP.get_or_init(|| Regex::new(r"<[^>]+>").expect("markup pattern compiles"))
}

/// Lowercase, strip markup, unify dashes and apostrophes, and collapse whitespace.
/// Punctuation survives so degree abbreviations and year ranges stay recognisable.
pub(crate) fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let stripped = markup().replace_all(text, " ");
    let unified: String = stripped
        .chars()
        .map(|ch| match ch {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' | '\u{00b4}' | '`' => '\'',
            other => other,
        })
        .collect();

    unified
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Reduce text to lowercase alphanumeric words for institution-name matching.
pub(crate) fn clean_words(text: &str) -> String {
    let stripped = markup().replace_all(text, " ");
    let mapped: String = stripped
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' {
                ch
            } else {
                ' '
            }
        })
        .collect();

    mapped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive literal matcher anchored on word boundaries wherever the term itself
/// starts or ends with a word character. Internal whitespace matches any whitespace run.
pub(crate) fn term_pattern(term: &str) -> Option<Result<Regex, regex::Error>> {
    let words: Vec<&str> = term.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let body = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join(r"\s+");

    let starts_with_word = words
        .first()
        .and_then(|word| word.chars().next())
        .map(is_word_char)
        .unwrap_or(false);
    let ends_with_word = words
        .last()
        .and_then(|word| word.chars().last())
        .map(is_word_char)
        .unwrap_or(false);

    let mut pattern = String::with_capacity(body.len() + 4);
    if starts_with_word {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&body);
    if ends_with_word {
        pattern.push_str(r"\b");
    }

    Some(RegexBuilder::new(&pattern).case_insensitive(true).build())
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
