/// Split text into words on the space character, skipping empty runs.
///
/// Only `' '` separates words. Tabs, newlines and other control characters stay
/// inside the word and are rejected later by [`is_valid_word`].
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|w| !w.is_empty()).collect()
}

/// A word is valid when it is non-empty, does not start with `-` and holds no
/// control characters.
pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && !word.starts_with('-') && !word.bytes().any(|b| b < b' ')
}

/// Strip at most one leading `-`. Returns the remainder and whether a minus was
/// removed.
pub fn strip_minus(token: &str) -> (&str, bool) {
    match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    }
}

/// Validity of a raw token from a document or query: the minus prefix is
/// stripped first, so `-cat` is legal while `-`, `--cat` and `ca\tt` are not.
pub fn is_valid_token(token: &str) -> bool {
    is_valid_word(strip_minus(token).0)
}
