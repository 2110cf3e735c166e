//! Message formatting
//!
//! Turns raw prompt or response text into the display markup stored on a
//! transcript entry. Formatting happens exactly once, when the entry is
//! created; feeding markup back through [`format_message`] is not supported.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));

const LIST_MARKER: &str = "- ";

/// Format raw text into display markup.
///
/// Rules, in order:
/// - line breaks become `<br>`
/// - `**bold**` becomes `<strong>bold</strong>`
/// - `*italic*` becomes `<em>italic</em>`
/// - lines starting with `- ` become `<li>` items, and each contiguous run
///   of items is wrapped in a single `<ul>`
///
/// HTML-significant characters are escaped first, so the only markup in the
/// output is the markup produced by these rules. Emphasis does not span
/// lines.
pub fn format_message(raw: &str) -> String {
    let escaped = escape_html(raw);
    let mut out = String::with_capacity(escaped.len() + 16);
    let mut in_list = false;

    for (index, line) in escaped.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(item) = line.strip_prefix(LIST_MARKER) {
            if !in_list {
                out.push_str("<ul>");
                in_list = true;
            }
            out.push_str("<li>");
            out.push_str(&emphasize(item));
            out.push_str("</li>");
            continue;
        }

        if in_list {
            // The list container already ends the previous line
            out.push_str("</ul>");
            in_list = false;
        } else if index > 0 {
            out.push_str("<br>");
        }
        out.push_str(&emphasize(line));
    }

    if in_list {
        out.push_str("</ul>");
    }

    out
}

fn emphasize(line: &str) -> String {
    let bold = BOLD.replace_all(line, "<strong>$1</strong>");
    ITALIC.replace_all(&bold, "<em>$1</em>").into_owned()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
