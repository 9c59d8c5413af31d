//! Fallback highlighter that only escapes.

use crate::panels::render::escape_html;
use crate::traits::Highlighter;

/// Wraps source in a `<code class="language-…">` element with HTML escaping
/// and no token coloring. Used when no real highlighter is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapingHighlighter;

impl Highlighter for EscapingHighlighter {
    fn highlight(&self, source: &str, language: &str) -> String {
        format!(
            "<code class=\"language-{}\">{}</code>",
            escape_html(language),
            escape_html(source)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_source() {
        let out = EscapingHighlighter.highlight("SELECT * FROM t WHERE a < 1", "sql");
        assert_eq!(
            out,
            "<code class=\"language-sql\">SELECT * FROM t WHERE a &lt; 1</code>"
        );
    }
}
