//! Markdown Fence Unwrapping
//!
//! Models often wrap JSON in a fenced block (```` ```json ... ``` ````), with
//! or without a language tag, and sometimes with prose before or after it.

const FENCE: &str = "```";

/// Return the payload inside the first well-formed fenced block of `text`.
///
/// The fence may appear anywhere in the text and may carry a language tag.
/// An opening fence with no closing fence is stripped from the start. Text
/// without a fence comes back trimmed and otherwise unchanged.
pub fn unwrap_fenced(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(inner) = first_fenced_block(trimmed) {
        return inner.trim();
    }

    if let Some(rest) = trimmed.strip_prefix(FENCE) {
        let body = skip_language_tag(rest);
        return body.strip_suffix(FENCE).unwrap_or(body).trim();
    }

    trimmed
}

fn first_fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)?;
    let body = skip_language_tag(&text[start + FENCE.len()..]);
    let end = body.find(FENCE)?;
    Some(&body[..end])
}

/// Skip an optional language tag right after an opening fence.
///
/// A leading word only counts as a tag when a line break, the end of the
/// block, or the start of a JSON document follows it; otherwise it is content
/// (```` ```hello world``` ````).
fn skip_language_tag(after_fence: &str) -> &str {
    let tag_len = after_fence
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.')))
        .unwrap_or(after_fence.len());
    let rest = &after_fence[tag_len..];
    let padded = rest.trim_start_matches([' ', '\t']);

    if let Some(next_line) = padded
        .strip_prefix("\r\n")
        .or_else(|| padded.strip_prefix('\n'))
    {
        return next_line;
    }
    if tag_len == 0 {
        return rest;
    }
    if padded.is_empty() || padded.starts_with(['{', '[']) || padded.starts_with(FENCE) {
        return padded;
    }
    after_fence
}
