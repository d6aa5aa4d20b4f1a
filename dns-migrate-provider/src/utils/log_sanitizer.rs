//! Log sanitization
//!
//! Response bodies can carry TXT payloads (DKIM keys, verification tokens) and configs carry
//! API secrets. Neither should land verbatim in logs or in anything shown back to users.

/// Longest response excerpt written to debug logs, in bytes.
const LOG_EXCERPT_LIMIT: usize = 256;

/// Visible tail of a masked secret.
const SECRET_TAIL: usize = 4;

/// Cut `s` to at most `LOG_EXCERPT_LIMIT` bytes on a char boundary, noting the full size.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_EXCERPT_LIMIT {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= LOG_EXCERPT_LIMIT)
        .last()
        .unwrap_or(0);
    format!("{}... [truncated, total {} bytes]", &s[..cut], s.len())
}

/// Mask a secret as `***` followed by its last four characters.
///
/// Secrets of four characters or fewer are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= SECRET_TAIL {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - SECRET_TAIL..].iter().collect();
    format!("***{tail}")
}
