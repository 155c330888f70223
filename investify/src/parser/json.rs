//! Locating JSON objects inside free text

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn fenced_json_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced JSON pattern is valid")
    })
}

/// JSON objects wrapped in markdown code fences, in document order
///
/// Handles:
/// - ```json blocks
/// - Generic ``` blocks whose body is an object
pub fn fenced_json_blocks(text: &str) -> impl Iterator<Item = &str> {
    fenced_json_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Every brace-balanced `{...}` substring, ordered by start position
///
/// One pass over `text` pairs each `}` with the nearest open `{`. Braces inside
/// JSON strings are ignored; quotes only count once an object is open.
/// Unterminated objects are skipped.
pub fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    let mut spans = Vec::new();
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(idx),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, idx + ch.len_utf8()));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|(start, _)| *start);
    spans.into_iter().map(move |(start, end)| &text[start..end])
}

/// Remove `// ...` comments outside of strings
///
/// Models often copy the annotated example JSON from the prompt verbatim.
pub fn strip_line_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("//") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(ch),
        }
    }

    Cow::Owned(out)
}
