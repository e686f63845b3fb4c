// ABOUTME: Harvests the class, id, and tag vocabulary applied in an HTML document.
// ABOUTME: Regex scanning over the markup with script and style contents removed first.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static STYLE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
// The attribute name must not continue a longer name, so `data-class` and `data-id` are skipped.
static CLASS_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|[^\w-])class\s*=\s*["']([^"']+)["']"#).unwrap());
static ID_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|[^\w-])id\s*=\s*["']([^"']+)["']"#).unwrap());
static OPEN_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\w+)(?:\s|>)").unwrap());

/// Class names, ids, and tag names literally present in a page's markup.
///
/// Classes and ids keep their authored case; tags are lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlVocabulary {
    pub classes: BTreeSet<String>,
    pub ids: BTreeSet<String>,
    pub tags: BTreeSet<String>,
}

impl HtmlVocabulary {
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn has_id(&self, name: &str) -> bool {
        self.ids.contains(name)
    }

    /// Tag lookup expects an already lower-cased name.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }
}

/// Template placeholders such as `{{ cls }}` or `{% if %}` are not literal names.
fn is_placeholder(token: &str) -> bool {
    token.contains("{{") || token.contains("{%")
}

/// Extract the vocabulary of an HTML document.
///
/// Never fails; malformed markup only yields fewer names.
pub fn extract_vocabulary(html: &str) -> HtmlVocabulary {
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(html, "");
    let cleaned = STYLE_BLOCK_RE.replace_all(&without_scripts, "");

    let mut vocabulary = HtmlVocabulary::default();

    for caps in CLASS_ATTR_RE.captures_iter(&cleaned) {
        for token in caps[1].split_whitespace() {
            if !is_placeholder(token) {
                vocabulary.classes.insert(token.to_string());
            }
        }
    }

    for caps in ID_ATTR_RE.captures_iter(&cleaned) {
        let id = caps[1].trim();
        if !id.is_empty() && !is_placeholder(id) {
            vocabulary.ids.insert(id.to_string());
        }
    }

    for caps in OPEN_TAG_RE.captures_iter(&cleaned) {
        vocabulary.tags.insert(caps[1].to_lowercase());
    }

    vocabulary
}
