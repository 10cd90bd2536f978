use crate::error::MalformedSitemapError;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

/// One `<url>` entry of a sitemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    /// Value of `<loc>`
    pub location: String,

    /// Value of `<lastmod>`, kept as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,

    /// Value of `<priority>`; absent when missing or not a number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

impl PageDescriptor {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            last_modified: None,
            priority: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    LastMod,
    Priority,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Field::Loc),
            b"lastmod" => Some(Field::LastMod),
            b"priority" => Some(Field::Priority),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EntryBuilder {
    loc: String,
    lastmod: String,
    priority: String,
}

impl EntryBuilder {
    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Loc => self.loc.push_str(text),
            Field::LastMod => self.lastmod.push_str(text),
            Field::Priority => self.priority.push_str(text),
        }
    }

    fn finish(self, index: usize) -> Result<PageDescriptor, MalformedSitemapError> {
        let location = self.loc.trim();
        if location.is_empty() {
            return Err(MalformedSitemapError::new(format!(
                "<url> entry {} has no <loc>",
                index + 1
            )));
        }

        let lastmod = self.lastmod.trim();
        Ok(PageDescriptor {
            location: location.to_string(),
            last_modified: (!lastmod.is_empty()).then(|| lastmod.to_string()),
            priority: parse_priority(&self.priority),
        })
    }
}

/// Non-numeric priorities are treated as absent
fn parse_priority(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| !p.is_nan())
}

/// Parses a `<urlset>` sitemap into page descriptors, in document order.
///
/// A `urlset` without `url` children yields an empty list. Anything that is not
/// well-formed XML rooted at `urlset`, or a `url` without a `loc`, is rejected.
pub fn parse(xml: &str) -> Result<Vec<PageDescriptor>, MalformedSitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages = Vec::new();
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            MalformedSitemapError::new(format!("{} at byte {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match open.len() {
                    0 => {
                        check_root(&name, seen_root)?;
                        seen_root = true;
                    }
                    1 if name == b"url" => entry = Some(EntryBuilder::default()),
                    2 if entry.is_some() => field = Field::from_name(&name),
                    _ => {}
                }
                open.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                match open.len() {
                    0 => {
                        check_root(&name, seen_root)?;
                        seen_root = true;
                    }
                    1 if name == b"url" => {
                        return Err(MalformedSitemapError::new(format!(
                            "<url> entry {} has no <loc>",
                            pages.len() + 1
                        )));
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| MalformedSitemapError::new(e.to_string()))?;
                if open.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(MalformedSitemapError::new("text outside of <urlset>"));
                    }
                } else if let (Some(field), Some(entry)) = (field, entry.as_mut()) {
                    entry.push(field, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(field), Some(entry)) = (field, entry.as_mut()) {
                    entry.push(field, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                let name = open.pop().unwrap_or_default();
                match open.len() {
                    2 => field = None,
                    1 if name == b"url" => {
                        if let Some(done) = entry.take() {
                            pages.push(done.finish(pages.len())?);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(MalformedSitemapError::new("unexpected end of document"));
    }
    if !seen_root {
        return Err(MalformedSitemapError::new("missing <urlset> root element"));
    }

    ::log::debug!("Parsed {} sitemap entries", pages.len());
    Ok(pages)
}

fn check_root(name: &[u8], seen_root: bool) -> Result<(), MalformedSitemapError> {
    if seen_root {
        return Err(MalformedSitemapError::new("multiple root elements"));
    }
    if name != b"urlset" {
        return Err(MalformedSitemapError::new(format!(
            "root element is <{}>, expected <urlset>",
            String::from_utf8_lossy(name)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://ostrom.de/</loc>
    <lastmod>2024-05-01</lastmod>
    <priority>1.0</priority>
  </url>
  <url>
    <loc>https://ostrom.de/en/our-tariff</loc>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>https://ostrom.de/en/blog/heat-pumps?ref=a&amp;b=c</loc>
    <lastmod>2024-04-12T10:00:00+00:00</lastmod>
  </url>
</urlset>"#;

    #[test]
    fn test_entries_in_document_order() {
        let pages = parse(SITEMAP).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].location, "https://ostrom.de/");
        assert_eq!(pages[1].location, "https://ostrom.de/en/our-tariff");
        assert_eq!(
            pages[2].location,
            "https://ostrom.de/en/blog/heat-pumps?ref=a&b=c"
        );
    }

    #[test]
    fn test_optional_fields() {
        let pages = parse(SITEMAP).unwrap();
        assert_eq!(pages[0].last_modified.as_deref(), Some("2024-05-01"));
        assert_eq!(pages[0].priority, Some(1.0));
        assert_eq!(pages[1].last_modified, None);
        assert_eq!(pages[1].priority, Some(0.8));
        assert_eq!(pages[2].priority, None);
    }

    #[test]
    fn test_non_numeric_priority_is_absent() {
        let xml = "<urlset><url><loc>https://a.de/x</loc><priority>high</priority></url>\
                   <url><loc>https://a.de/y</loc><priority>NaN</priority></url></urlset>";
        let pages = parse(xml).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.priority.is_none()));
    }

    #[test]
    fn test_empty_urlset() {
        assert!(parse("<urlset></urlset>").unwrap().is_empty());
        assert!(parse("<urlset/>").unwrap().is_empty());
    }

    #[test]
    fn test_namespaced_elements() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
            <sm:url><sm:loc>https://a.de/</sm:loc></sm:url></sm:urlset>"#;
        let pages = parse(xml).unwrap();
        assert_eq!(pages, vec![PageDescriptor::new("https://a.de/")]);
    }

    #[test]
    fn test_malformed_documents() {
        let cases = [
            "",
            "this is not xml",
            "<urlset><url><loc>https://a.de/</loc></url>",
            "<urlset><url><loc>https://a.de/</url></urlset>",
            "<sitemapindex><sitemap><loc>https://a.de/s.xml</loc></sitemap></sitemapindex>",
            "<urlset><url><lastmod>2024-01-01</lastmod></url></urlset>",
            "<urlset><url/></urlset>",
        ];
        for xml in cases {
            assert!(parse(xml).is_err(), "expected an error for {:?}", xml);
        }
    }
}
