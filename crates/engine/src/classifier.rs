// ABOUTME: Decides whether a selector is exercised by a page's vocabulary.
// ABOUTME: Exact class/id/tag lookup on the simplified selector, then a conservative catch-all.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::vocabulary::HtmlVocabulary;

static PSEUDO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"::?[a-zA-Z-]+(\([^)]*\))?").unwrap());
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static LEADING_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9]*)").unwrap());

/// Strip pseudo-classes, pseudo-elements, and attribute predicates.
///
/// `a:hover::after` becomes `a`, `input[type=text]:focus` becomes `input`.
pub fn simplify(selector: &str) -> String {
    let without_pseudo = PSEUDO_RE.replace_all(selector, "");
    ATTRIBUTE_RE
        .replace_all(&without_pseudo, "")
        .trim()
        .to_string()
}

/// The name following a leading `.` or `#`, up to the first space, combinator, or colon.
fn leading_name(rest: &str) -> &str {
    rest.split(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~' | ':'))
        .next()
        .unwrap_or_default()
}

/// Returns true when `selector` may match something in the page.
///
/// Simple class, id, and tag selectors are checked by name. Anything else
/// that carries an attribute predicate, a pseudo selector, or `*` is
/// reported as used, since resolving it would need real selector matching.
pub fn is_used(selector: &str, vocabulary: &HtmlVocabulary) -> bool {
    let simplified = simplify(selector);

    if let Some(rest) = simplified.strip_prefix('.') {
        return vocabulary.has_class(leading_name(rest));
    }

    if let Some(rest) = simplified.strip_prefix('#') {
        return vocabulary.has_id(leading_name(rest));
    }

    if let Some(caps) = LEADING_TAG_RE.captures(&simplified) {
        return vocabulary.has_tag(&caps[1].to_lowercase());
    }

    selector.contains('[') || selector.contains(':') || selector.contains('*')
}
