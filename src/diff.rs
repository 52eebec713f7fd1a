//! Block-level content diffing.
//!
//! Splits source content into paragraph blocks (`\n\n` boundaries) and
//! reports which blocks appeared or disappeared relative to the previously
//! stored snapshot. The diff is advisory input to the analysis step — only
//! added blocks need re-analysis — and never gates storage.

use std::collections::HashSet;

use crate::models::ContentDiff;

/// Split content into trimmed, non-empty paragraph blocks.
pub fn split_into_blocks(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compare the previously stored content (if any) against a fresh fetch.
///
/// `added_blocks` preserves the order of the new content; with no previous
/// snapshot the entire new content counts as added.
pub fn content_diff(stored: Option<&str>, new_content: &str) -> ContentDiff {
    let old_blocks = stored.map(split_into_blocks).unwrap_or_default();
    let new_blocks = split_into_blocks(new_content);

    let old_set: HashSet<&str> = old_blocks.iter().map(String::as_str).collect();
    let new_set: HashSet<&str> = new_blocks.iter().map(String::as_str).collect();

    let added: Vec<String> = new_blocks
        .iter()
        .filter(|b| !old_set.contains(b.as_str()))
        .cloned()
        .collect();
    let removed: Vec<String> = old_blocks
        .iter()
        .filter(|b| !new_set.contains(b.as_str()))
        .cloned()
        .collect();

    ContentDiff {
        has_changes: !added.is_empty() || !removed.is_empty(),
        added_blocks: added,
        removed_blocks: removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_previous_everything_added() {
        let diff = content_diff(None, "First block.\n\nSecond block.");
        assert!(diff.has_changes);
        assert_eq!(diff.added_blocks, vec!["First block.", "Second block."]);
        assert!(diff.removed_blocks.is_empty());
    }

    #[test]
    fn test_unchanged_content_no_changes() {
        let content = "Alpha.\n\nBeta.";
        let diff = content_diff(Some(content), content);
        assert!(!diff.has_changes);
        assert!(diff.added_blocks.is_empty());
        assert!(diff.removed_blocks.is_empty());
    }

    #[test]
    fn test_added_and_removed_blocks() {
        let old = "Alpha.\n\nBeta.\n\nGamma.";
        let new = "Alpha.\n\nDelta.\n\nGamma.";
        let diff = content_diff(Some(old), new);
        assert!(diff.has_changes);
        assert_eq!(diff.added_blocks, vec!["Delta."]);
        assert_eq!(diff.removed_blocks, vec!["Beta."]);
    }

    #[test]
    fn test_added_blocks_keep_new_content_order() {
        let old = "Keep.";
        let new = "Zulu.\n\nKeep.\n\nAlpha.";
        let diff = content_diff(Some(old), new);
        assert_eq!(diff.added_blocks, vec!["Zulu.", "Alpha."]);
    }

    #[test]
    fn test_split_ignores_blank_blocks() {
        let blocks = split_into_blocks("  \n\nOne.\n\n\n\n  Two.  \n\n");
        assert_eq!(blocks, vec!["One.", "Two."]);
    }

    #[test]
    fn test_empty_new_content() {
        let diff = content_diff(Some("Old block."), "");
        assert!(diff.has_changes);
        assert!(diff.added_blocks.is_empty());
        assert_eq!(diff.removed_blocks, vec!["Old block."]);
    }
}
