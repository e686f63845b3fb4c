// ABOUTME: Splits CSS source into a sorted, deduplicated list of selector strings.
// ABOUTME: Mechanical brace splitting, not a CSS parser; at-rule preludes and keyframe steps are skipped.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn is_selector(candidate: &str) -> bool {
    !candidate.is_empty() && !candidate.starts_with('@') && !candidate.contains("keyframes")
}

/// Extract the selectors declared in `css`.
///
/// The text before each `{` (after the last `}` preceding it) is taken as a
/// selector list and split on commas. Nested rule bodies are split the same
/// way, so preprocessor-style nesting can yield fragments that are not valid
/// top-level selectors.
pub fn tokenize(css: &str) -> Vec<String> {
    let without_comments = BLOCK_COMMENT_RE.replace_all(css, "");
    let collapsed = WHITESPACE_RUN_RE.replace_all(&without_comments, " ");

    let mut selectors = BTreeSet::new();
    for fragment in collapsed.trim().split('{') {
        let prelude = fragment.rsplit('}').next().unwrap_or(fragment);
        for piece in prelude.split(',') {
            let piece = piece.trim();
            if is_selector(piece) {
                selectors.insert(piece.to_string());
            }
        }
    }

    selectors.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_rules_are_sorted() {
        let css = ".card{} .missing{} #intro{} p{} span{}";
        assert_eq!(tokenize(css), vec!["#intro", ".card", ".missing", "p", "span"]);
    }

    #[test]
    fn selector_lists_split_and_dedupe() {
        let css = "h1, h2 ,h1 { margin: 0 }\nh2{color:red}";
        assert_eq!(tokenize(css), vec!["h1", "h2"]);
    }

    #[test]
    fn comments_and_whitespace_are_normalized() {
        let css = "/* header */\n.nav\n  >  li ,\n.nav\ta { color: red; /* inner */ }\n/* .ghost { } */";
        assert_eq!(tokenize(css), vec![".nav > li", ".nav a"]);
    }

    #[test]
    fn media_prelude_is_skipped_but_body_selectors_kept() {
        let css = "@media (min-width:600px){.x{color:red}}";
        assert_eq!(tokenize(css), vec![".x"]);
    }

    #[test]
    fn keyframes_and_font_face_are_skipped() {
        let css = "@keyframes spin{from{transform:rotate(0)}to{transform:rotate(360deg)}} @font-face{font-family:x} .a{}";
        // Keyframe step names survive the filter; only the container is dropped.
        assert_eq!(tokenize(css), vec![".a", "from", "to"]);
    }

    #[test]
    fn keyframes_word_filters_selector() {
        let css = "@-webkit-keyframes pulse{50%{opacity:.5}} .keyframes-demo{} .b{}";
        assert_eq!(tokenize(css), vec![".b", "50%"]);
    }

    #[test]
    fn empty_and_garbage_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t").is_empty());
        assert!(tokenize("}}}{{{").is_empty());
    }

    #[test]
    fn nested_rules_are_split_mechanically() {
        let css = ".parent { color: red; .child { color: blue } }";
        assert_eq!(tokenize(css), vec![".parent", "color: red; .child"]);
    }

    #[test]
    fn tokenize_is_idempotent() {
        let css = "b{}a{}c, a{}";
        assert_eq!(tokenize(css), tokenize(css));
        assert_eq!(tokenize(css), vec!["a", "b", "c"]);
    }
}
