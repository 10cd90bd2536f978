pub mod html;

/// Text pulled out of a page's markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Text of the `<title>` element
    pub title: String,
    /// Text of `h1`, `h2` and `h3` elements, in document order
    pub headings: Vec<String>,
    /// Text of `p` elements, in document order
    pub paragraphs: Vec<String>,
}

impl ExtractedContent {
    /// Headings followed by paragraphs, newline-joined
    pub fn text(&self) -> String {
        self.headings
            .iter()
            .chain(self.paragraphs.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
