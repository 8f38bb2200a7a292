//! Domain / IP entry validation

/// Check whether `entry` may be stored in a list file
///
/// Accepts either a dotted quad of digit runs (`192.168.0.1`) or a
/// hostname-like token: at least one `.`, no whitespace, and only ASCII
/// alphanumerics, `.`, `-` and `_`. Callers trim lines before validating;
/// a string that still contains whitespace is never valid.
pub fn is_valid_entry(entry: &str) -> bool {
    if entry.trim().is_empty() {
        return false;
    }

    if is_dotted_quad(entry) {
        return true;
    }

    entry.contains('.')
        && !entry.chars().any(char::is_whitespace)
        && entry
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

fn is_dotted_quad(entry: &str) -> bool {
    let mut parts = 0;
    for part in entry.split('.') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        parts += 1;
    }
    parts == 4
}
