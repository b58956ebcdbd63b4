// src/utils/cookies.rs

//! Cookie string handling.

/// Parse a raw `;`-delimited cookie string into key/value pairs.
///
/// Entries without `=` are ignored. Keys and values are trimmed.
pub fn parse_cookie_str(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|entry| {
            let (key, value) = entry.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Render parsed pairs into a `Cookie` header value.
pub fn cookie_header(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie_str() {
        let pairs = parse_cookie_str("a=1; b=2;c=3");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_skips_entries_without_equals() {
        let pairs = parse_cookie_str("a=1; junk; =orphan; b=2");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_value_keeps_embedded_equals() {
        let pairs = parse_cookie_str("token=abc=def");
        assert_eq!(pairs, vec![("token".to_string(), "abc=def".to_string())]);
    }

    #[test]
    fn test_cookie_header_round() {
        let pairs = parse_cookie_str("a=1; b=2");
        assert_eq!(cookie_header(&pairs), "a=1; b=2");
        assert_eq!(cookie_header(&[]), "");
    }
}
