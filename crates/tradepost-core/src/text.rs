//! # Text Sanitizer
//!
//! Product and supplier text is scraped from source listings and often
//! carries markup. Everything shown in the storefront goes through
//! [`strip_html_tags`] first.
//!
//! ## Passes
//! ```text
//! "<p>Steel&nbsp;&amp;\r\n\r\nPipe</p>"
//!      │
//!      ▼  1. drop <script>/<style> blocks, tags, comments
//! "Steel&nbsp;&amp;\r\n\r\nPipe"
//!      │
//!      ▼  2. decode named, decimal and hex entities
//! "Steel & \r\n\r\nPipe"
//!      │
//!      ▼  3. normalize whitespace
//! "Steel &\nPipe"
//! ```
//!
//! Removal is regex based, not a parser. Malformed or nested markup can
//! leave stray characters behind; that is accepted.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("script regex should compile"));

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b.*?</style>").expect("style regex should compile"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex should compile"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex should compile"));

static DECIMAL_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(\d+);").expect("decimal entity regex should compile"));

static HEX_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#x([0-9A-Fa-f]+);").expect("hex entity regex should compile"));

static INLINE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]+").expect("inline space regex should compile"));

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").expect("line break regex should compile"));

/// Named entities, applied in order.
///
/// `&amp;` is decoded early, so `&amp;lt;` ends up as `<`.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&hellip;", "..."),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&rsquo;", "'"),
    ("&lsquo;", "'"),
    ("&rdquo;", "\""),
    ("&ldquo;", "\""),
    ("&cent;", "\u{00A2}"),
    ("&pound;", "\u{00A3}"),
    ("&yen;", "\u{00A5}"),
    ("&euro;", "\u{20AC}"),
    ("&copy;", "\u{00A9}"),
    ("&reg;", "\u{00AE}"),
    ("&trade;", "\u{2122}"),
    ("&deg;", "\u{00B0}"),
    ("&plusmn;", "\u{00B1}"),
    ("&times;", "\u{00D7}"),
    ("&divide;", "\u{00F7}"),
    ("&frac12;", "\u{00BD}"),
    ("&frac14;", "\u{00BC}"),
    ("&frac34;", "\u{00BE}"),
    ("&bull;", "\u{2022}"),
    ("&middot;", "\u{00B7}"),
    ("&lsaquo;", "\u{2039}"),
    ("&rsaquo;", "\u{203A}"),
    ("&laquo;", "\u{00AB}"),
    ("&raquo;", "\u{00BB}"),
    ("&dagger;", "\u{2020}"),
    ("&Dagger;", "\u{2021}"),
    ("&permil;", "\u{2030}"),
    ("&sbquo;", "\u{201A}"),
    ("&bdquo;", "\u{201E}"),
    ("&iexcl;", "\u{00A1}"),
    ("&iquest;", "\u{00BF}"),
    ("&sect;", "\u{00A7}"),
    ("&para;", "\u{00B6}"),
    ("&acute;", "\u{00B4}"),
    ("&cedil;", "\u{00B8}"),
    ("&uml;", "\u{00A8}"),
    ("&macr;", "\u{00AF}"),
];

/// Strips markup and decodes entities, returning display text.
///
/// ## Whitespace Rules
/// - CRLF and lone CR become LF
/// - Any run of line breaks (and the blank space around them) becomes one LF
/// - Tabs and runs of spaces become a single space
/// - Leading and trailing whitespace is removed
///
/// ## Example
/// ```rust
/// use tradepost_core::text::strip_html_tags;
///
/// assert_eq!(strip_html_tags("<b>Steel &amp; Pipe</b>"), "Steel & Pipe");
/// assert_eq!(strip_html_tags("Line1\r\n\r\n\r\nLine2"), "Line1\nLine2");
/// assert_eq!(strip_html_tags(""), "");
/// ```
pub fn strip_html_tags(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let without_markup = remove_markup(html);
    let decoded = decode_entities(&without_markup);
    normalize_whitespace(&decoded)
}

fn remove_markup(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    COMMENT.replace_all(&text, "").into_owned()
}

fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in NAMED_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }

    let decoded = DECIMAL_ENTITY.replace_all(&decoded, |caps: &Captures| {
        decode_code_point(&caps[0], &caps[1], 10)
    });
    HEX_ENTITY
        .replace_all(&decoded, |caps: &Captures| {
            decode_code_point(&caps[0], &caps[1], 16)
        })
        .into_owned()
}

/// Unparseable or invalid code points keep the original entity text.
fn decode_code_point(entity: &str, digits: &str, radix: u32) -> String {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| entity.to_string())
}

fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = INLINE_SPACE.replace_all(&text, " ");
    let text = LINE_BREAKS.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Cuts `text` to `max_chars` characters and appends "..." when it was longer.
///
/// ## Example
/// ```rust
/// use tradepost_core::text::truncate_text;
///
/// assert_eq!(truncate_text("Seamless steel pipe", 8), "Seamless...");
/// assert_eq!(truncate_text("Pipe", 8), "Pipe");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim())
}

/// Sanitizes then truncates, for listing cards.
pub fn clean_and_truncate_html(html: &str, max_chars: usize) -> String {
    truncate_text(&strip_html_tags(html), max_chars)
}

/// Uppercases the first character.
pub fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "INDUSTRIAL steel PIPES" → "Industrial Steel Pipes".
pub fn to_title_case(s: &str) -> String {
    s.to_lowercase()
        .split(' ')
        .map(capitalize_first_letter)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Unit Tests
// =============================================================================
