//! Field validators and the phone normalizer shared by the server dispatcher
//! and the client form flow. All functions are pure.

use chrono::{DateTime, NaiveDate};

/// Characters dropped from phone input before matching or normalizing.
fn is_phone_filler(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '(' | ')')
}

fn clean_phone(text: &str) -> String {
    text.chars().filter(|c| !is_phone_filler(*c)).collect()
}

/// At least two characters after trimming, letters of any script and
/// whitespace only.
pub fn validate_name(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() >= 2 && trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
}

/// `local@domain.tld` shape: no whitespace, a single `@`, and a dot inside the
/// domain with text on both sides.
pub fn validate_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .match_indices('.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// Ten digits, optionally preceded by `+7`, `7` or `8`, once spaces, hyphens
/// and parentheses are removed.
pub fn validate_phone(text: &str) -> bool {
    let cleaned = clean_phone(text);
    ["+7", "7", "8", ""]
        .iter()
        .filter_map(|prefix| cleaned.strip_prefix(prefix))
        .any(|rest| rest.len() == 10 && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Both dates present and check-out strictly after check-in.
pub fn validate_date_range(check_in: Option<&str>, check_out: Option<&str>) -> bool {
    match (check_in.and_then(parse_day), check_out.and_then(parse_day)) {
        (Some(start), Some(end)) => end > start,
        _ => false,
    }
}

/// Minimum review body length, counted in characters after trimming.
pub const MIN_REVIEW_TEXT: usize = 10;

pub fn validate_review_text(text: &str) -> bool {
    text.trim().chars().count() >= MIN_REVIEW_TEXT
}

/// Rewrite a phone number into the single `+7XXXXXXXXXX` form.
///
/// Total: malformed input yields a best-effort string; rejecting it is the
/// validator's job.
pub fn normalize_phone(text: &str) -> String {
    let cleaned = clean_phone(text);
    if let Some(rest) = cleaned.strip_prefix('8') {
        format!("+7{rest}")
    } else if cleaned.starts_with('7') {
        format!("+{cleaned}")
    } else if !cleaned.starts_with('+') {
        format!("+7{cleaned}")
    } else {
        cleaned
    }
}

/// Date inputs post `YYYY-MM-DD`; full RFC 3339 instants compare in UTC.
fn parse_day(raw: &str) -> Option<chrono::NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}
