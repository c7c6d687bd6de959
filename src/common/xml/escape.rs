use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

/// Named entities followed by the character reference prefix
const ENTITY_PATTERNS: [&str; 6] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "&#"];
const ENTITY_REPLACEMENTS: [&str; 5] = ["&", "<", ">", "\"", "'"];

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(ENTITY_PATTERNS)
        .expect("Failed to build XML unescaper")
});

/// Unescape XML special characters.
///
/// Replaces the five standard XML entities and decimal (`&#10;`) or
/// hexadecimal (`&#x41;`) character references. Unknown or malformed
/// entities are left unchanged.
///
/// # Examples
///
/// ```
/// use kra::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("Sky &amp; Clouds"), "Sky & Clouds");
/// assert_eq!(unescape_xml("&lt;draft&gt;"), "<draft>");
/// assert_eq!(unescape_xml("A&#10;B&#x41;"), "A\nBA");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;");
/// ```
pub fn unescape_xml(s: &str) -> String {
    if memchr::memchr(b'&', s.as_bytes()).is_none() {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut last = 0;
    for entity in XML_UNESCAPER.find_iter(s) {
        result.push_str(&s[last..entity.start()]);
        last = entity.end();
        match ENTITY_REPLACEMENTS.get(entity.pattern().as_usize()) {
            Some(replacement) => result.push_str(replacement),
            None => match parse_character_reference(&s[last..]) {
                Some((ch, consumed)) => {
                    result.push(ch);
                    last += consumed;
                },
                None => result.push_str("&#"),
            },
        }
    }
    result.push_str(&s[last..]);
    result
}

/// Parse the body of a character reference following `&#`, returning the
/// character and the number of bytes consumed including the `;`.
fn parse_character_reference(rest: &str) -> Option<(char, usize)> {
    let end = memchr::memchr(b';', rest.as_bytes())?;
    let body = &rest[..end];
    let code = match body.strip_prefix('x') {
        Some(hex) => {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            u32::from_str_radix(hex, 16).ok()?
        },
        None => {
            if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            atoi_simd::parse::<u32, false, false>(body.as_bytes()).ok()?
        },
    };
    char::from_u32(code).map(|ch| (ch, end + 1))
}
