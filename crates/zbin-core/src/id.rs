//! Document identifier handling.

/// Strip every non-alphanumeric character from a client-supplied id.
///
/// Returns `None` when nothing usable is left, so callers can reject the
/// request before touching storage.
pub fn sanitize_id(raw: &str) -> Option<String> {
    let id: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_id_unchanged() {
        assert_eq!(
            sanitize_id("CgnTycJHTErpuFaSnb9Z").as_deref(),
            Some("CgnTycJHTErpuFaSnb9Z")
        );
    }

    #[test]
    fn test_punctuation_stripped() {
        assert_eq!(sanitize_id("ab-c.d/../e").as_deref(), Some("abcde"));
        assert_eq!(sanitize_id(" id#frag ").as_deref(), Some("idfrag"));
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(sanitize_id(""), None);
        assert_eq!(sanitize_id("   \t\n"), None);
        assert_eq!(sanitize_id("../"), None);
    }

    #[test]
    fn test_non_ascii_stripped() {
        assert_eq!(sanitize_id("é1ß2").as_deref(), Some("12"));
    }
}
