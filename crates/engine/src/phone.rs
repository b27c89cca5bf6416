//! Phone number cleanup for outbound SMS.

/// Prefix used when no country code is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Keep ASCII digits, plus a `+` if it is the first non-blank character.
pub fn strip_formatting(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(char::is_ascii_digit));
    out
}

/// Normalize a stored number into the form handed to the SMS provider.
///
/// Returns `None` when the input has no digits at all.
pub fn normalize(raw: &str, default_country_code: &str) -> Option<String> {
    let stripped = strip_formatting(raw);
    if !stripped.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if stripped.starts_with('+') {
        Some(stripped)
    } else {
        Some(format!("{default_country_code}{stripped}"))
    }
}
