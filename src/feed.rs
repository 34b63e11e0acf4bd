//! RSS document model and the XML reader that produces it.
//!
//! Only the fields the rule set looks at are extracted. Everything else in a
//! feed (enclosures, categories, namespaced extensions) is skipped.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while turning raw bytes into a [`FeedDocument`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedParseError {
    #[error("feed is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("XML parse error at byte {position}: {details}")]
    Xml { position: u64, details: String },

    #[error("unexpected end of document: unclosed <{element}>")]
    UnclosedElement { element: String },

    #[error("document has no root element")]
    Empty,

    #[error("expected element type <rss> but have <{found}>")]
    UnexpectedRoot { found: String },
}

/// One `<item>` of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub pub_date: String,
    pub guid: String,
}

/// The `<channel>` of one feed file and its items in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    pub pub_date: String,
    pub items: Vec<FeedItem>,
}

impl FeedDocument {
    /// The item treated as most recent: the first one in the file.
    pub fn latest_item(&self) -> Option<&FeedItem> {
        self.items.first()
    }
}

/// Field of the channel or of an item that collects text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    PubDate,
    Guid,
}

impl Field {
    fn from_name(name: &[u8], in_item: bool) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"description" => Some(Field::Description),
            b"pubDate" => Some(Field::PubDate),
            b"guid" if in_item => Some(Field::Guid),
            _ => None,
        }
    }
}

/// Where the reader currently is, relative to the elements we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Channel,
    Item,
    Field(Field),
    Ignored,
}

/// Parse the raw bytes of an RSS file.
///
/// The root element must be `<rss>`. Missing fields come back as empty
/// strings; a field that appears twice keeps its last value. Markup nested
/// inside a field is skipped. quick-xml never expands `<!ENTITY>`
/// declarations, so only the predefined and numeric entities are decoded.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedDocument, FeedParseError> {
    let content =
        std::str::from_utf8(bytes).map_err(|e| FeedParseError::Encoding(e.to_string()))?;
    let mut reader = Reader::from_str(content);

    let mut doc = FeedDocument::default();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut current_item: Option<FeedItem> = None;
    let mut saw_root = false;

    let xml_error = |reader: &Reader<&[u8]>, e: quick_xml::Error| FeedParseError::Xml {
        position: reader.error_position(),
        details: e.to_string(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let scope = match scopes.last() {
                    None => {
                        if saw_root {
                            return Err(FeedParseError::Xml {
                                position: reader.buffer_position(),
                                details: "content after root element".to_string(),
                            });
                        }
                        saw_root = true;
                        check_root(name.as_ref())?;
                        Scope::Root
                    }
                    Some(Scope::Root) if name.as_ref() == b"channel" => Scope::Channel,
                    Some(Scope::Channel) if name.as_ref() == b"item" => {
                        current_item = Some(FeedItem::default());
                        Scope::Item
                    }
                    Some(Scope::Channel) => Field::from_name(name.as_ref(), false)
                        .map_or(Scope::Ignored, Scope::Field),
                    Some(Scope::Item) => Field::from_name(name.as_ref(), true)
                        .map_or(Scope::Ignored, Scope::Field),
                    Some(_) => Scope::Ignored,
                };
                if matches!(scope, Scope::Field(_)) {
                    text.clear();
                }
                names.push(String::from_utf8_lossy(name.as_ref()).into_owned());
                scopes.push(scope);
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                match scopes.last() {
                    None => {
                        if saw_root {
                            return Err(FeedParseError::Xml {
                                position: reader.buffer_position(),
                                details: "content after root element".to_string(),
                            });
                        }
                        saw_root = true;
                        check_root(name.as_ref())?;
                    }
                    Some(Scope::Channel) if name.as_ref() == b"item" => {
                        doc.items.push(FeedItem::default());
                    }
                    Some(Scope::Channel) => {
                        if let Some(field) = Field::from_name(name.as_ref(), false) {
                            assign_channel(&mut doc, field, String::new());
                        }
                    }
                    Some(Scope::Item) => {
                        if let (Some(field), Some(item)) =
                            (Field::from_name(name.as_ref(), true), current_item.as_mut())
                        {
                            assign_item(item, field, String::new());
                        }
                    }
                    Some(_) => {}
                }
            }
            Ok(Event::End(_)) => {
                names.pop();
                let Some(scope) = scopes.pop() else {
                    continue;
                };
                match (scope, scopes.last()) {
                    (Scope::Item, _) => {
                        if let Some(item) = current_item.take() {
                            doc.items.push(item);
                        }
                    }
                    (Scope::Field(field), Some(Scope::Channel)) => {
                        assign_channel(&mut doc, field, std::mem::take(&mut text));
                    }
                    (Scope::Field(field), Some(Scope::Item)) => {
                        if let Some(item) = current_item.as_mut() {
                            assign_item(item, field, std::mem::take(&mut text));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if matches!(scopes.last(), Some(Scope::Field(_))) {
                    let unescaped = e.unescape().map_err(|err| xml_error(&reader, err))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if matches!(scopes.last(), Some(Scope::Field(_))) {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
    }

    if let Some(element) = names.pop() {
        return Err(FeedParseError::UnclosedElement { element });
    }
    if !saw_root {
        return Err(FeedParseError::Empty);
    }

    Ok(doc)
}

fn check_root(name: &[u8]) -> Result<(), FeedParseError> {
    if name == b"rss" {
        Ok(())
    } else {
        Err(FeedParseError::UnexpectedRoot {
            found: String::from_utf8_lossy(name).into_owned(),
        })
    }
}

fn assign_channel(doc: &mut FeedDocument, field: Field, value: String) {
    match field {
        Field::Title => doc.title = value,
        Field::Description => doc.description = value,
        Field::PubDate => doc.pub_date = value,
        Field::Guid => {}
    }
}

fn assign_item(item: &mut FeedItem, field: Field, value: String) {
    match field {
        Field::Title => item.title = value,
        Field::Description => item.description = value,
        Field::PubDate => item.pub_date = value,
        Field::Guid => item.guid = value,
    }
}
