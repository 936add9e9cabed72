//! Upload token check
//!
//! The `Authorization` header carries `<scheme> <token>`. The scheme word is
//! not inspected; everything after the first space must equal the secret.

/// Check an `Authorization` header value against the configured secret
pub fn has_valid_token(authorization: Option<&str>, secret: &str) -> bool {
    authorization
        .and_then(|value| value.split_once(' '))
        .is_some_and(|(_, token)| constant_time_eq(token.as_bytes(), secret.as_bytes()))
}

/// Byte comparison whose running time depends only on the lengths
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_scheme_accepted() {
        assert!(has_valid_token(Some("Bearer s3cret"), "s3cret"));
        assert!(has_valid_token(Some("Token s3cret"), "s3cret"));
        assert!(has_valid_token(Some(" s3cret"), "s3cret"));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        assert!(!has_valid_token(None, "s3cret"));
        assert!(!has_valid_token(Some("s3cret"), "s3cret"));
        assert!(!has_valid_token(Some(""), "s3cret"));
    }

    #[test]
    fn test_token_must_match_exactly() {
        assert!(!has_valid_token(Some("Bearer S3CRET"), "s3cret"));
        assert!(!has_valid_token(Some("Bearer s3cret "), "s3cret"));
        assert!(!has_valid_token(Some("Bearer  s3cret"), "s3cret"));
        assert!(!has_valid_token(Some("Bearer s3cre"), "s3cret"));
    }
}
