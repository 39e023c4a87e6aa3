//! Telegram MarkdownV2 escaping helpers

/// Escapes every character that has a meaning in MarkdownV2 plain text.
///
/// # Example
///
/// ```
/// use spike::core::utils::escape_markdown_v2;
///
/// assert_eq!(escape_markdown_v2("1.5 (beta)!"), "1\\.5 \\(beta\\)\\!");
/// ```
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}'
            | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Wraps `text` into an inline code span.
///
/// Inside `pre` and `code` entities only backtick and backslash need escaping.
pub fn code(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('`');
    for c in text.chars() {
        if c == '`' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('`');
    result
}

/// Builds an inline link `[label](url)`.
///
/// Inside the `(...)` part of a link only `)` and backslash need escaping.
pub fn link(label: &str, url: &str) -> String {
    let mut escaped_url = String::with_capacity(url.len());
    for c in url.chars() {
        if c == ')' || c == '\\' {
            escaped_url.push('\\');
        }
        escaped_url.push(c);
    }
    format!("[{}]({})", escape_markdown_v2(label), escaped_url)
}
