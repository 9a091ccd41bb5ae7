pub mod jwt;

/// Leading characters of a token, safe to put in logs.
pub fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(12)
        .map(|(idx, _)| idx)
        .unwrap_or(token.len());
    &token[..end]
}
