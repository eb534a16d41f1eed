//! Escaping for text placed into markup and inline `<script>` blocks.

use lexicon_shared::{LexiconError, Result};
use serde::Serialize;

/// Escape text for use in element content and quoted attribute values.
pub fn html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize `value` as JSON that is safe inside a `<script>` element.
///
/// `<!--` becomes `\u003c!--` and `</` becomes `<\/`. JSON parsers read both
/// back as the original string, and neither can open a comment or close the
/// element. `<` only ever occurs inside JSON strings, so both rewrites are
/// valid escapes.
pub fn script_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| LexiconError::integrity(format!("JSON serialization failed: {e}")))?;

    Ok(json.replace("<!--", "\\u003c!--").replace("</", "<\\/"))
}
