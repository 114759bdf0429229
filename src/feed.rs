use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::parser::InputItem;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// One RSS `<item>`, fields still raw (description may carry HTML).
#[derive(Debug, Default, Clone)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: String,
}

impl FeedItem {
    pub fn into_input_item(self) -> InputItem {
        InputItem {
            title: Some(self.title),
            summary: Some(strip_html(&self.summary)),
            body: String::new(),
            published: self.published,
            link: self.link,
        }
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    Summary,
    Published,
}

/// Parse an RSS 2.0 document into its items.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                // channel-level title/link are ignored: only tags
                // inside an open <item> are captured
                field = match e.name().as_ref() {
                    b"item" => {
                        current = Some(FeedItem::default());
                        None
                    }
                    b"title" if current.is_some() => Some(Field::Title),
                    b"link" if current.is_some() => Some(Field::Link),
                    b"description" if current.is_some() => Some(Field::Summary),
                    b"pubDate" if current.is_some() => Some(Field::Published),
                    _ => None,
                };
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    push_field(item, f, &e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    push_field(item, f, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(items)
}

fn push_field(item: &mut FeedItem, field: Field, text: &str) {
    let slot = match field {
        Field::Title => &mut item.title,
        Field::Link => &mut item.link,
        Field::Summary => &mut item.summary,
        Field::Published => &mut item.published,
    };
    slot.push_str(text);
}

/// Drop HTML tags and decode the entities feeds commonly emit.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#8217;", "\u{2019}")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

// ── Tests ──
