use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on a credible "N years" claim; larger figures are ignored.
pub const MAX_EXPERIENCE_YEARS: u32 = 60;

static YEARS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("years pattern is valid")
});

/// Largest "N years" / "N+ yrs" figure mentioned in a resume, if any.
pub fn estimate_experience_years(text: &str) -> Option<u32> {
    YEARS_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .filter(|&years| years <= MAX_EXPERIENCE_YEARS)
        .max()
}

/// A zero threshold accepts everyone, including resumes with no stated figure.
pub fn meets_minimum(years: Option<u32>, min_years: u32) -> bool {
    min_years == 0 || years.is_some_and(|y| y >= min_years)
}
