//! Cumulative text buffer for content and thinking chunks.

/// Append-only text accumulated over a run.
#[derive(Debug, Default, Clone)]
pub(crate) struct TextBuffer {
    text: String,
}

impl TextBuffer {
    /// Fold one chunk's `delta`/`content` pair into the buffer.
    ///
    /// A delta always wins and is appended. Without one, `content` that
    /// extends the current buffer is the provider's cumulative view, so only
    /// the new suffix is appended; any other `content` is appended whole.
    ///
    /// Returns the byte offset where the newly appended fragment starts.
    pub(crate) fn apply(&mut self, delta: Option<&str>, content: Option<&str>) -> usize {
        let start = self.text.len();
        match (delta, content) {
            (Some(delta), _) => self.text.push_str(delta),
            (None, Some(content)) => {
                if !self.text.is_empty() && content.starts_with(self.text.as_str()) {
                    self.text.push_str(&content[start..]);
                } else {
                    self.text.push_str(content);
                }
            }
            (None, None) => {}
        }
        start
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(steps: &[(Option<&str>, Option<&str>)]) -> (String, Vec<String>) {
        let mut buf = TextBuffer::default();
        let fragments = steps
            .iter()
            .map(|(delta, content)| {
                let start = buf.apply(*delta, *content);
                buf.as_str()[start..].to_string()
            })
            .collect();
        (buf.into_string(), fragments)
    }

    #[test]
    fn delta_takes_precedence_over_content() {
        let (text, fragments) = fold(&[
            (Some("Hello"), Some("")),
            (Some(" world"), Some("Hello")),
            (Some("!"), Some("")),
        ]);
        assert_eq!(text, "Hello world!");
        assert_eq!(fragments, vec!["Hello", " world", "!"]);
    }

    #[test]
    fn cumulative_content_appends_only_the_suffix() {
        let (text, fragments) = fold(&[
            (None, Some("Complete")),
            (None, Some("Complete!")),
            (None, Some("Complete! If")),
            (None, Some("Complete! If")),
        ]);
        assert_eq!(text, "Complete! If");
        assert_eq!(fragments, vec!["Complete", "!", " If", ""]);
    }

    #[test]
    fn fragment_style_content_is_appended() {
        let (text, _) = fold(&[(None, Some("Hello")), (None, Some(" world")), (None, Some("!"))]);
        assert_eq!(text, "Hello world!");
    }

    #[test]
    fn chunk_without_text_changes_nothing() {
        let (text, fragments) = fold(&[(None, None)]);
        assert!(text.is_empty());
        assert_eq!(fragments, vec![""]);
    }
}
