//! `@username` detection

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MENTION_RE: Regex =
        Regex::new(r"@([A-Za-z0-9_]+)").expect("mention pattern compiles");
}

/// Usernames mentioned in `text`, in order of first appearance.
///
/// A mention is `@` followed by one or more ASCII letters, digits or
/// underscores. The `@` may appear anywhere, including inside a word.
/// Case is preserved and duplicates are dropped.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for name in MENTION_RE.captures_iter(text).filter_map(|c| c.get(1)) {
        let name = name.as_str();
        if !found.iter().any(|n| n == name) {
            found.push(name.to_string());
        }
    }

    found
}
