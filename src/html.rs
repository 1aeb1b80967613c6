//! Reduce HTML descriptions to readable plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());

static BLOCK_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(p|div|li|ul|ol|strong|em|span)\b[^>]*>").unwrap()
});

static ANY_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static INLINE_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip markup from `s`, keeping the text readable.
///
/// Entities are decoded first, `<br>` becomes a line break, every tag is
/// removed, runs of spaces and tabs collapse to one space and at most one
/// blank line is kept between paragraphs.
pub fn strip_html(s: &str) -> String {
    let text = decode_entities(s);
    let text = BR_RE.replace_all(&text, "\n");
    let text = BLOCK_TAG_RE.replace_all(&text, "");
    let text = ANY_TAG_RE.replace_all(&text, "");
    let text = INLINE_SPACE_RE.replace_all(&text, " ");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decode named (full HTML5 table) and numeric character references.
/// Unknown names are left untouched.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_paragraphs_and_breaks() {
        let html = "<p>Day 1: <strong>Kigali</strong> city tour<br/>Day 2:   Nyungwe</p>";
        assert_eq!(strip_html(html), "Day 1: Kigali city tour\nDay 2: Nyungwe");
    }

    #[test]
    fn test_entities_decoded_before_tags() {
        assert_eq!(strip_html("Fish &amp; chips &lt;3"), "Fish & chips <3");
        assert_eq!(strip_html("caf&eacute; &#233; &#xE9;"), "café é é");
    }

    #[test]
    fn test_html5_named_entities() {
        assert_eq!(
            strip_html("&Eacute;glise, h&ocirc;tel, &uuml;ber, &laquo;safari&raquo; &frac12; day"),
            "Église, hôtel, über, «safari» ½ day"
        );
        assert_eq!(decode_entities("&Agrave;&Ccedil;&Ntilde;"), "ÀÇÑ");
    }

    #[test]
    fn test_unknown_entity_left_alone() {
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn test_blank_lines_capped() {
        assert_eq!(strip_html("a<br><br><br><br>b"), "a\n\nb");
    }

    #[test]
    fn test_other_tags_removed() {
        assert_eq!(
            strip_html("<h2 class=\"x\">Title</h2><a href=\"#\">link</a>"),
            "Titlelink"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_html("  just text \t here "), "just text here");
    }
}
