#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const JAN_1: &str = "Tue, 01 Jan 2019 00:00:00 +0000";
pub const JAN_2: &str = "Wed, 02 Jan 2019 00:00:00 +0000";

/// Builds RSS documents for tests
pub struct FeedBuilder {
    pub_date: String,
    items: Vec<(String, String, String)>,
}

impl FeedBuilder {
    pub fn new(pub_date: &str) -> Self {
        Self {
            pub_date: pub_date.to_string(),
            items: Vec::new(),
        }
    }

    pub fn item(mut self, title: &str, pub_date: &str, guid: &str) -> Self {
        self.items
            .push((title.to_string(), pub_date.to_string(), guid.to_string()));
        self
    }

    pub fn build(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n",
        );
        xml.push_str("  <title>Test Feed</title>\n");
        xml.push_str("  <description>Feed used in tests</description>\n");
        xml.push_str(&format!("  <pubDate>{}</pubDate>\n", self.pub_date));
        for (title, pub_date, guid) in &self.items {
            xml.push_str("  <item>\n");
            xml.push_str(&format!("    <title>{}</title>\n", title));
            xml.push_str("    <description>Item</description>\n");
            xml.push_str(&format!("    <pubDate>{}</pubDate>\n", pub_date));
            xml.push_str(&format!("    <guid>{}</guid>\n", guid));
            xml.push_str("  </item>\n");
        }
        xml.push_str("</channel>\n</rss>\n");
        xml
    }
}

/// A feed that passes every rule
pub fn valid_feed() -> String {
    FeedBuilder::new(JAN_2)
        .item("Second", JAN_2, "guid-2")
        .item("First", JAN_1, "guid-1")
        .build()
}

/// A feed whose only problem is a repeated GUID
pub fn duplicate_guid_feed() -> String {
    FeedBuilder::new(JAN_1)
        .item("One", JAN_1, "abc123")
        .item("Two", JAN_1, "abc123")
        .build()
}

pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
