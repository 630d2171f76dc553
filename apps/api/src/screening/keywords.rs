//! Keyword Highlighter — wraps requested skills in `**…**` markers.

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

/// Splits a comma-separated skills input into trimmed, non-empty keywords.
///
/// Order, duplicates and case variants are kept as given.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Builds a case-insensitive whole-word matcher for one keyword.
///
/// A word boundary is asserted only on edges that are word characters, so
/// `C++` or `.NET` still match literally. Returns `None` for blank keywords.
pub fn keyword_matcher(keyword: &str) -> Option<Regex> {
    let keyword = keyword.trim();
    let first = keyword.chars().next()?;
    let last = keyword.chars().next_back()?;

    let pattern = format!(
        "{}{}{}",
        if is_word_char(first) { r"\b" } else { "" },
        regex::escape(keyword),
        if is_word_char(last) { r"\b" } else { "" },
    );

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Skipping keyword '{keyword}': {e}");
            None
        }
    }
}

/// Returns a copy of `text` with every whole-word, case-insensitive match of
/// each keyword wrapped as `**match**`.
///
/// Keywords are applied one after another, each pass scanning the text the
/// previous pass produced. A keyword listed twice is therefore wrapped twice.
pub fn highlight_keywords<S: AsRef<str>>(text: &str, keywords: &[S]) -> String {
    let mut highlighted = text.to_string();
    for keyword in keywords {
        let Some(re) = keyword_matcher(keyword.as_ref()) else {
            continue;
        };
        highlighted = re
            .replace_all(&highlighted, |caps: &Captures| format!("**{}**", &caps[0]))
            .into_owned();
    }
    highlighted
}
