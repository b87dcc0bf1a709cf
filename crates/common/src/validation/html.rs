// HTML encoding and allow-list tag filtering
use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::ValidationResult;

/// Default maximum output length for HTML sanitization, in characters
pub const DEFAULT_HTML_MAX_LENGTH: usize = 10_000;

/// Tags kept when HTML is allowed and no explicit allow-list is configured
pub const DEFAULT_ALLOWED_TAGS: &[&str] =
    &["b", "i", "em", "strong", "u", "p", "br", "ul", "ol", "li", "a", "code", "pre", "blockquote"];

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>")
        .expect("SCRIPT_BLOCK pattern is valid and well-formed")
});

static UNTERMINATED_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\s*script\b.*$").expect("UNTERMINATED_SCRIPT pattern is valid and well-formed")
});

static COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<![^>]*>").expect("COMMENT pattern is valid and well-formed")
});

// Quoted attribute values may contain `>`.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9-]*)((?:"[^"]*"|'[^']*'|[^'">])*)>"#)
        .expect("TAG pattern is valid and well-formed")
});

static UNTERMINATED_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*/?\s*[a-zA-Z!][^>]*$").expect("UNTERMINATED_TAG pattern is valid and well-formed")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#)
        .expect("ATTRIBUTE pattern is valid and well-formed")
});

/// Attributes whose value a browser may navigate to or load
const URL_ATTRIBUTES: &[&str] =
    &["href", "src", "action", "formaction", "xlink:href", "background", "poster", "cite", "data"];

/// Upper bound on filter passes
const MAX_FILTER_PASSES: usize = 32;

/// Options for [`super::Sanitizer::sanitize_html`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSanitizeOptions {
    /// Keep allow-listed markup instead of encoding everything
    pub allow_html: bool,
    /// Lowercase tag names kept when `allow_html` is set
    pub allowed_tags: BTreeSet<String>,
    /// Maximum output length in characters, applied last
    pub max_length: usize,
}

impl Default for HtmlSanitizeOptions {
    fn default() -> Self {
        Self {
            allow_html: false,
            allowed_tags: DEFAULT_ALLOWED_TAGS.iter().map(|t| (*t).to_string()).collect(),
            max_length: DEFAULT_HTML_MAX_LENGTH,
        }
    }
}

impl HtmlSanitizeOptions {
    /// Options that keep the default tag allow-list
    pub fn allowing_html() -> Self {
        Self { allow_html: true, ..Self::default() }
    }

    /// Replace the tag allow-list
    pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags = tags.into_iter().map(|t| t.into().to_ascii_lowercase()).collect();
        self
    }

    /// Set the maximum output length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

/// Escape the HTML-significant characters of `text`.
///
/// Each character is visited once, so an `&` in the input becomes exactly one
/// `&amp;`. Encoding already-encoded text encodes it again.
///
/// ```rust
/// use trustgate_common::validation::encode_html;
///
/// assert_eq!(encode_html("<a href='/x'>"), "&lt;a href=&#x27;&#x2F;x&#x27;&gt;");
/// ```
pub fn encode_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

pub(crate) fn sanitize_html(text: &str, options: &HtmlSanitizeOptions) -> ValidationResult<String> {
    if !options.allow_html {
        let encoded = truncate_chars(encode_html(text), options.max_length);
        return ValidationResult::from_parts(Some(encoded), Vec::new(), Vec::new());
    }

    let mut report = FilterReport::default();
    let mut current = text.to_string();

    // Removing one construct can join its neighbours into a new one, so
    // filter until nothing changes.
    for _ in 0..MAX_FILTER_PASSES {
        let next = filter_pass(&current, options, &mut report);
        if next == current {
            break;
        }
        current = next;
    }

    if UNTERMINATED_TAG.is_match(&current) {
        report.removed_tags = true;
        current = UNTERMINATED_TAG.replace(&current, "").into_owned();
    }
    let current = emit_markup(&current, options, &mut report);

    let mut warnings = Vec::new();
    if report.removed_script {
        warnings.push("Script blocks were removed".to_string());
    }
    if report.removed_attributes {
        warnings.push("Event handler attributes were removed".to_string());
    }
    if report.removed_tags {
        warnings.push("Disallowed tags were removed".to_string());
    }

    let output = truncate_chars(current, options.max_length);
    ValidationResult::from_parts(Some(output), Vec::new(), warnings)
}

#[derive(Debug, Default)]
struct FilterReport {
    removed_script: bool,
    removed_attributes: bool,
    removed_tags: bool,
}

/// One round of script, comment and tag filtering
fn filter_pass(text: &str, options: &HtmlSanitizeOptions, report: &mut FilterReport) -> String {
    let mut current = text.to_string();
    loop {
        let next = SCRIPT_BLOCK.replace_all(&current, "").into_owned();
        if next == current {
            break;
        }
        report.removed_script = true;
        current = next;
    }
    if UNTERMINATED_SCRIPT.is_match(&current) {
        report.removed_script = true;
        current = UNTERMINATED_SCRIPT.replace(&current, "").into_owned();
    }

    current = COMMENT.replace_all(&current, "").into_owned();

    TAG.replace_all(&current, |caps: &Captures<'_>| rebuild_tag(caps, options, report))
        .into_owned()
}

/// Final pass: keep rebuilt allowed tags and escape every other bracket
fn emit_markup(text: &str, options: &HtmlSanitizeOptions, report: &mut FilterReport) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in TAG.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut out, &text[last..whole.start()]);
        out.push_str(&rebuild_tag(&caps, options, report));
        last = whole.end();
    }
    push_text(&mut out, &text[last..]);
    out
}

fn push_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

/// Re-emit an allowed tag with only safe attributes; drop anything else
fn rebuild_tag(caps: &Captures<'_>, options: &HtmlSanitizeOptions, report: &mut FilterReport) -> String {
    let name = caps[2].to_ascii_lowercase();
    if !options.allowed_tags.contains(&name) {
        report.removed_tags = true;
        return String::new();
    }
    if !caps[1].is_empty() {
        return format!("</{}>", name);
    }

    let mut tag = format!("<{}", name);
    for attr in ATTRIBUTE.captures_iter(&caps[3]) {
        let attr_name = attr[1].to_ascii_lowercase();
        let value = attr.get(2).map(|m| m.as_str());
        if is_unsafe_attribute(&attr_name, value) {
            report.removed_attributes = true;
            continue;
        }
        tag.push(' ');
        tag.push_str(&attr_name);
        if let Some(value) = value {
            tag.push('=');
            tag.push_str(value);
        }
    }
    tag.push('>');
    tag
}

fn is_unsafe_attribute(name: &str, value: Option<&str>) -> bool {
    if name.starts_with("on") || name == "srcdoc" {
        return true;
    }
    if !URL_ATTRIBUTES.contains(&name) {
        return false;
    }
    let Some(value) = value else { return false };

    // Browsers ignore whitespace and control characters inside the scheme.
    let normalized: String = value
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    normalized.starts_with("javascript:")
        || normalized.starts_with("vbscript:")
        // Entity-obfuscated schemes such as `jav&#x61;script:`
        || (normalized.contains('&') && normalized.contains("script"))
        || normalized.contains("&colon;")
        || normalized.contains("&#58;")
        || normalized.contains("&#x3a;")
}

fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
    text
}

#[cfg(test)]
mod tests {
    //! Unit tests for HTML encoding and tag filtering
    use super::*;

    /// Validates `encode_html` escapes every significant character.
    ///
    /// Assertions:
    /// - Confirms each of `& < > " ' /` maps to its entity.
    #[test]
    fn test_encode_html_all_characters() {
        assert_eq!(encode_html(r#"&<>"'/"#), "&amp;&lt;&gt;&quot;&#x27;&#x2F;");
        assert_eq!(encode_html("plain text"), "plain text");
    }

    /// Validates that encoding is single-pass and not idempotent.
    #[test]
    fn test_encode_html_not_idempotent() {
        let once = encode_html("<");
        assert_eq!(once, "&lt;");
        assert_eq!(encode_html(&once), "&amp;lt;");
    }

    /// Validates truncation length equals `min(len(encoded), max_length)`.
    #[test]
    fn test_encoded_output_truncated_exactly() {
        let options = HtmlSanitizeOptions::default().with_max_length(7);
        let result = sanitize_html("<<<<", &options);
        assert!(result.valid);
        assert_eq!(result.sanitized.as_deref(), Some("&lt;&lt"));

        let short = sanitize_html("ab", &options);
        assert_eq!(short.sanitized.as_deref(), Some("ab"));
    }

    /// Validates truncation counts characters rather than bytes.
    #[test]
    fn test_truncate_multibyte() {
        let options = HtmlSanitizeOptions::default().with_max_length(2);
        let result = sanitize_html("héllo", &options);
        assert_eq!(result.sanitized.as_deref(), Some("hé"));
    }

    /// Validates that script blocks are removed with their content.
    #[test]
    fn test_allow_html_strips_script_block() {
        let result = sanitize_html(
            "<p>hi</p><script>alert('x')</script>",
            &HtmlSanitizeOptions::allowing_html(),
        );
        let output = result.sanitized.unwrap_or_default();
        assert_eq!(output, "<p>hi</p>");
        assert!(result.warnings.iter().any(|w| w.contains("Script")));
    }

    /// Validates nested and split script tags cannot reassemble.
    #[test]
    fn test_allow_html_nested_script_reassembly() {
        let input = "<scr<script>x</script>ipt>alert(1)</scr<script>y</script>ipt>";
        let result = sanitize_html(input, &HtmlSanitizeOptions::allowing_html());
        let output = result.sanitized.unwrap_or_default().to_ascii_lowercase();
        assert!(!output.contains("<script"));
    }

    /// Validates unterminated script openings drop the remainder.
    #[test]
    fn test_allow_html_unterminated_script() {
        let result =
            sanitize_html("ok<SCRIPT>alert(1)", &HtmlSanitizeOptions::allowing_html());
        assert_eq!(result.sanitized.as_deref(), Some("ok"));
    }

    /// Validates event handler attributes are removed from kept tags.
    #[test]
    fn test_allow_html_strips_event_handlers() {
        let result = sanitize_html(
            r#"<b onclick="steal()" class="x">bold</b><a href='javascript:alert(1)'>x</a>"#,
            &HtmlSanitizeOptions::allowing_html(),
        );
        let output = result.sanitized.unwrap_or_default();
        assert_eq!(output, r#"<b class="x">bold</b><a>x</a>"#);
        assert!(result.warnings.iter().any(|w| w.contains("Event handler")));
    }

    /// Validates tags outside the allow-list are removed but text stays.
    #[test]
    fn test_allow_html_removes_disallowed_tags() {
        let options = HtmlSanitizeOptions::allowing_html().with_allowed_tags(["p"]);
        let result = sanitize_html("<p><img src=x onerror=alert(1)>text<iframe></iframe></p>", &options);
        assert_eq!(result.sanitized.as_deref(), Some("<p>text</p>"));
        assert!(result.valid);
    }

    /// Validates comments and trailing partial tags are dropped.
    #[test]
    fn test_allow_html_comments_and_partial_tags() {
        let result = sanitize_html(
            "<!-- <script>x</script> --><em>a</em><img src=x onerror=y",
            &HtmlSanitizeOptions::allowing_html(),
        );
        assert_eq!(result.sanitized.as_deref(), Some("<em>a</em>"));
    }

    /// Validates a `>` inside a quoted value does not end the tag early.
    #[test]
    fn test_allow_html_quoted_bracket_keeps_handler_visible() {
        let result = sanitize_html(
            r#"<a title="x>" onmouseover="alert(1)">hi</a>"#,
            &HtmlSanitizeOptions::allowing_html(),
        );
        let output = result.sanitized.unwrap_or_default();
        assert!(!output.to_ascii_lowercase().contains("onmouseover"));
        assert_eq!(output, r#"<a title="x>">hi</a>"#);
        assert!(result.warnings.iter().any(|w| w.contains("Event handler")));
    }

    /// Validates removing disallowed tags cannot splice a script tag together.
    #[test]
    fn test_allow_html_removed_tags_cannot_reassemble_script() {
        let result = sanitize_html(
            "<<x>script>alert(1)<</x>/script>",
            &HtmlSanitizeOptions::allowing_html(),
        );
        assert_eq!(result.sanitized.as_deref(), Some(""));
        assert!(result.warnings.iter().any(|w| w.contains("Script")));
    }

    /// Validates stray brackets in text are escaped.
    #[test]
    fn test_allow_html_stray_brackets_escaped() {
        let result = sanitize_html("1 < 2 <b>and</b> 3 > 2 <", &HtmlSanitizeOptions::allowing_html());
        assert_eq!(result.sanitized.as_deref(), Some("1 &lt; 2 <b>and</b> 3 &gt; 2 &lt;"));
    }

    /// Validates only real `on*` attributes count as event handlers.
    #[test]
    fn test_allow_html_data_attribute_named_like_handler() {
        let result = sanitize_html(
            r#"<b data-onclick="x" onclick=y>t</b>"#,
            &HtmlSanitizeOptions::allowing_html(),
        );
        assert_eq!(result.sanitized.as_deref(), Some(r#"<b data-onclick="x">t</b>"#));
    }

    /// Validates obfuscated script URLs are removed.
    #[test]
    fn test_allow_html_obfuscated_script_urls() {
        for input in [
            r#"<a href=" java	script:alert(1)">x</a>"#,
            r#"<a href="jav&#x61;script:alert(1)">x</a>"#,
            r#"<a/href="javascript&colon;alert(1)">x</a>"#,
        ] {
            let result = sanitize_html(input, &HtmlSanitizeOptions::allowing_html());
            assert_eq!(result.sanitized.as_deref(), Some("<a>x</a>"), "input: {input}");
        }
    }
}
