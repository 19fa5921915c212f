use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating phone numbers on user profiles
    /// Optional leading "+", then digits with optional spaces or hyphens
    /// - Valid: "+62 812-3456-7890", "0812345678", "112"
    /// - Invalid: "phone", "+", "12a45", "--123"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9](?:[0-9 \-]{1,18}[0-9])?$").unwrap();
}

/// Strip path components and unsafe characters from an uploaded filename
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');

    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.chars().take(100).collect()
    }
}
