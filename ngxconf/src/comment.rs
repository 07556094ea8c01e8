//! Comments attached to query results.

/// Where a comment sits relative to the entry it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPosition {
    /// On one of the lines immediately preceding the entry, with no
    /// blank line in between.
    Before,
    /// On the same source line, after the entry.
    Inline,
}

/// A comment attached to a found directive or block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub content: String,
    pub position: CommentPosition,
}

impl Comment {
    /// Builds a comment from its raw source text, stripping the `#`
    /// marker and surrounding whitespace from both ends.
    pub(crate) fn from_raw(text: &str, position: CommentPosition) -> Self {
        Self {
            content: text.trim_matches(['\n', '#', ' ']).to_string(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_strips_marker_and_newline() {
        let comment = Comment::from_raw("# block comment\n", CommentPosition::Before);
        assert_eq!(comment.content, "block comment");
        assert_eq!(comment.position, CommentPosition::Before);
    }

    #[test]
    fn test_from_raw_keeps_interior_markers() {
        let comment = Comment::from_raw("# a # b\n", CommentPosition::Inline);
        assert_eq!(comment.content, "a # b");
    }
}
