// =============================================================================
// RSS Parsing — <item> title / link / pubDate
// =============================================================================
//
// Only the fields the dashboard shows are read. Items come out in document
// order, capped at `limit`. Missing or blank fields get placeholders so the
// renderer never has to deal with absent values.
// =============================================================================

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::NewsError;

pub const UNTITLED: &str = "Untitled";
pub const NO_LINK: &str = "#";

/// One headline as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published: String,
}

#[derive(Default)]
struct PartialItem {
    title: Option<String>,
    link: Option<String>,
    published: Option<String>,
}

impl PartialItem {
    fn finish(self) -> NewsItem {
        fn non_blank(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        NewsItem {
            title: non_blank(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            link: non_blank(self.link).unwrap_or_else(|| NO_LINK.to_string()),
            published: non_blank(self.published).unwrap_or_default(),
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::PubDate => &mut self.published,
        }
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    PubDate,
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" => Some(Field::PubDate),
        _ => None,
    }
}

/// Parse an RSS document and return at most `limit` items.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsItem>, NewsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<PartialItem> = None;
    let mut field: Option<Field> = None;

    while items.len() < limit {
        let event = reader
            .read_event()
            .map_err(|e| NewsError::Parse(format!("at byte {}: {e}", reader.buffer_position())))?;

        match event {
            Event::Start(e) => {
                let name = e.name();
                if name.as_ref() == b"item" {
                    current = Some(PartialItem::default());
                } else if current.is_some() {
                    field = field_for(name.as_ref());
                }
            }
            Event::Text(t) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = t.unescape().map_err(|e| NewsError::Parse(e.to_string()))?;
                    item.slot(f).get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::CData(c) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let bytes = c.into_inner();
                    item.slot(f)
                        .get_or_insert_with(String::new)
                        .push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item.finish());
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"gold" - Google News</title>
    <link>https://news.google.com/search?q=gold</link>
    <item>
      <title>Gold climbs as dollar slips &amp; yields ease</title>
      <link>https://example.com/a</link>
      <pubDate>Wed, 01 May 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title><![CDATA[Central banks keep buying <gold>]]></title>
      <link>https://example.com/b</link>
    </item>
    <item>
      <link>https://example.com/c</link>
      <pubDate>Wed, 01 May 2024 08:00:00 GMT</pubDate>
    </item>
    <item>
      <title>   </title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn channel_title_is_not_an_item() {
        let items = parse_feed(FEED, 10).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].title, "Gold climbs as dollar slips & yields ease");
        assert_eq!(items[0].link, "https://example.com/a");
        assert_eq!(items[0].published, "Wed, 01 May 2024 10:00:00 GMT");
    }

    #[test]
    fn cdata_title_is_read() {
        let items = parse_feed(FEED, 10).unwrap();
        assert_eq!(items[1].title, "Central banks keep buying <gold>");
        assert_eq!(items[1].published, "");
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let items = parse_feed(FEED, 10).unwrap();
        assert_eq!(items[2].title, UNTITLED);
        assert_eq!(items[3].title, UNTITLED);
        assert_eq!(items[3].link, NO_LINK);
        assert_eq!(items[3].published, "");
    }

    #[test]
    fn limit_caps_items() {
        let items = parse_feed(FEED, 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].link, "https://example.com/b");
        assert!(parse_feed(FEED, 0).unwrap().is_empty());
    }

    #[test]
    fn feed_without_items_is_empty() {
        let xml = "<rss><channel><title>empty</title></channel></rss>";
        assert!(parse_feed(xml, 6).unwrap().is_empty());
    }

    #[test]
    fn mismatched_tags_are_a_parse_error() {
        let xml = "<rss><channel><item><title>x</link></item></channel></rss>";
        assert!(matches!(parse_feed(xml, 6), Err(NewsError::Parse(_))));
    }
}
