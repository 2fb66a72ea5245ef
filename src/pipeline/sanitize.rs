//! Text hygiene on both sides of the completion service: user-provided
//! text going in, model formatting artifacts coming out.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum intake-notes length forwarded to the completion service.
pub const MAX_NOTES_LENGTH: usize = 20_000;

/// Maximum length of a single transcript entry forwarded to the completion
/// service. Entries are capped one by one; the conversation is never cut.
pub const MAX_TRANSCRIPT_ENTRY_LENGTH: usize = 10_000;

/// Clean user text before it is embedded in a prompt.
///
/// Removes non-visible Unicode and control characters (keeping newline and
/// tab), then truncates at a word boundary.
pub fn sanitize_for_llm(text: &str, max_chars: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !is_invisible(*c))
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    truncate_at_word_boundary(&cleaned, max_chars)
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
            | '\u{00AD}'
            | '\u{034F}'
            | '\u{061C}'
            | '\u{180E}'
    )
}

/// Truncate to at most `max_chars` characters, backing off to the last
/// whitespace so words are not split.
pub fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    let Some((byte_end, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let truncated = &text[..byte_end];
    match truncated.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated.to_string(),
    }
}

/// Strip the formatting artifacts models wrap around JSON: markdown code
/// fences (with or without a language tag) and XML-style wrapper tags such
/// as `<answer>`, `<json>` or `<output>`, nested or not.
pub fn clean_model_output(raw: &str) -> String {
    static FENCE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"```[A-Za-z]*[ \t]*").unwrap());
    static ANSWER_TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</?\s*answer\s*>").unwrap());

    let without_fences = FENCE.replace_all(raw.trim(), "");
    let unwrapped = strip_wrapper_tags(&without_fences);
    // Stray, unbalanced answer delimiters.
    let without_tags = ANSWER_TAG.replace_all(unwrapped, "");
    without_tags.trim().to_string()
}

/// Peel matching `<tag>...</tag>` pairs that enclose the whole text.
fn strip_wrapper_tags(text: &str) -> &str {
    static OPEN_TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^<\s*([A-Za-z_][\w-]*)\s*>").unwrap());

    let mut current = text.trim();
    while let Some(caps) = OPEN_TAG.captures(current) {
        let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body = current[open.end()..].trim_end();
        match strip_closing_tag(body, name.as_str()) {
            Some(inner) => current = inner.trim(),
            None => break,
        }
    }
    current
}

/// `body` without its trailing `</name>`, if it ends with one.
fn strip_closing_tag<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let start = body.rfind("</")?;
    let close = body[start + 2..].strip_suffix('>')?;
    close.trim().eq_ignore_ascii_case(name).then(|| &body[..start])
}

/// Shorten raw model output for log lines.
pub fn truncate_for_log(raw: &str) -> String {
    const LOG_LIMIT: usize = 500;
    match raw.char_indices().nth(LOG_LIMIT) {
        Some((end, _)) => format!("{}...", &raw[..end]),
        None => raw.to_string(),
    }
}
