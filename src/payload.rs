//! Payload derivation from memo content.
//!
//! Native authoring and snapshot import both go through [`rebuild_payload`]
//! so an imported memo carries exactly the tags and property flags a
//! hand-written memo with the same content would.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Location, MemoPayload, MemoProperty};

static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid fenced code regex"));
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]+`").expect("valid inline code regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([\p{L}\p{N}_\-/]+)").expect("valid tag regex")
});
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+|\[[^\]]*\]\([^)]+\)").expect("valid link regex")
});
static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+] \[( |x|X)\]").expect("valid task regex"));

/// Derive tags and property flags from `content`.
///
/// Pure and idempotent. Tags come from `#tag` tokens outside code spans,
/// deduplicated in order of first appearance. `location` is carried through
/// untouched since it cannot be derived from text.
pub fn rebuild_payload(content: &str, location: Option<Location>) -> MemoPayload {
    let has_code = FENCED_CODE_RE.is_match(content) || INLINE_CODE_RE.is_match(content);

    let without_fences = FENCED_CODE_RE.replace_all(content, " ");
    let prose = INLINE_CODE_RE.replace_all(&without_fences, " ");

    let mut seen = HashSet::new();
    let tags = TAG_RE
        .captures_iter(&prose)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect();

    let mut has_task_list = false;
    let mut has_incomplete_tasks = false;
    for caps in TASK_RE.captures_iter(&prose) {
        has_task_list = true;
        if caps.get(1).is_some_and(|m| m.as_str() == " ") {
            has_incomplete_tasks = true;
        }
    }

    MemoPayload {
        tags,
        property: MemoProperty {
            has_link: LINK_RE.is_match(&prose),
            has_task_list,
            has_code,
            has_incomplete_tasks,
        },
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_tags_in_order() {
        let payload = rebuild_payload("#work notes about #rust and #work again", None);
        assert_eq!(payload.tags, vec!["work", "rust"]);
    }

    #[test]
    fn test_heading_is_not_a_tag() {
        let payload = rebuild_payload("# Heading\nbody #real", None);
        assert_eq!(payload.tags, vec!["real"]);
    }

    #[test]
    fn test_tags_inside_code_are_ignored() {
        let payload = rebuild_payload("see `#notatag` and\n```\n#alsonot\n```\n#yes", None);
        assert_eq!(payload.tags, vec!["yes"]);
        assert!(payload.property.has_code);
    }

    #[test]
    fn test_nested_and_unicode_tags() {
        let payload = rebuild_payload("#projects/memoport #日本語", None);
        assert_eq!(payload.tags, vec!["projects/memoport", "日本語"]);
    }

    #[test]
    fn test_task_flags() {
        let done = rebuild_payload("- [x] shipped", None);
        assert!(done.property.has_task_list);
        assert!(!done.property.has_incomplete_tasks);

        let open = rebuild_payload("- [x] shipped\n- [ ] review", None);
        assert!(open.property.has_task_list);
        assert!(open.property.has_incomplete_tasks);
    }

    #[test]
    fn test_link_flag() {
        assert!(rebuild_payload("go to https://example.com", None).property.has_link);
        assert!(rebuild_payload("[docs](./README.md)", None).property.has_link);
        assert!(!rebuild_payload("plain text", None).property.has_link);
    }

    #[test]
    fn test_location_is_carried_through() {
        let location = Location {
            placeholder: "Oslo".to_string(),
            latitude: 59.91,
            longitude: 10.75,
        };
        let payload = rebuild_payload("hi", Some(location.clone()));
        assert_eq!(payload.location, Some(location));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let content = "#a - [ ] todo `code` https://x.y";
        assert_eq!(rebuild_payload(content, None), rebuild_payload(content, None));
    }
}
