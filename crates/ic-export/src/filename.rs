//! Download filename derivation: `<problem-slug>-<YYYY-MM-DD>.tar.gz`.

use chrono::NaiveDate;

/// Lowercase the title, collapse runs of non-alphanumerics to a single `-`,
/// trim leading/trailing `-`, and truncate to 50 characters.
pub fn problem_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    trimmed.chars().take(50).collect()
}

/// The archive's suggested download filename for `export_date` (the host's
/// local calendar date at export time).
pub fn download_filename(problem_title: &str, export_date: NaiveDate) -> String {
    format!(
        "{}-{}.tar.gz",
        problem_slug(problem_title),
        export_date.format("%Y-%m-%d")
    )
}
