use crate::parsers::ExtractedContent;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2, h3").unwrap());
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Extracts title, heading and paragraph text from an HTML document.
///
/// Everything else in the markup is ignored.
pub fn parse(html: &str) -> ExtractedContent {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let headings = collect_text(&doc, &HEADINGS);
    let paragraphs = collect_text(&doc, &PARAGRAPHS);

    ::log::debug!(
        "HTML parser found {} headings and {} paragraphs",
        headings.len(),
        paragraphs.len()
    );

    ExtractedContent {
        title,
        headings,
        paragraphs,
    }
}

fn collect_text(doc: &Html, selector: &Selector) -> Vec<String> {
    doc.select(selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Whitespace-normalized text of an element and its descendants.
///
/// Text nodes are concatenated as-is so inline markup never splits words.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
