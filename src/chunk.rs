//! Splitting documents for size-limited messaging channels

/// Twilio's WhatsApp body limit
pub const DEFAULT_MAX_CHUNK_LEN: usize = 1500;

/// Greedily pack whitespace-separated tokens into chunks of at most
/// `max_len` characters.
///
/// Tokens are never split: a token longer than `max_len` becomes a chunk of
/// its own and exceeds the limit. Joining the chunks with single spaces gives
/// back the input with its whitespace normalized.
#[must_use]
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in text.split_whitespace() {
        let token_len = token.chars().count();

        if current.is_empty() {
            current.push_str(token);
            current_len = token_len;
        } else if current_len + 1 + token_len <= max_len {
            current.push(' ');
            current.push_str(token);
            current_len += 1 + token_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(token);
            current_len = token_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
