use serde::{Deserialize, Serialize};

/// Top level of a feed, bound to `<channel>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    /// `pubDate`, raw RFC-822 text. See [`crate::date::parse_date`].
    pub pub_date: String,
    /// `lastBuildDate`, raw RFC-822 text.
    pub last_build_date: String,
    /// Every `<category>` in document order.
    pub categories: Vec<String>,
    pub copyright: String,
    pub managing_editor: String,
    pub web_master: String,
    pub generator: String,
    pub docs: String,
    /// Minutes the channel may be cached before refreshing.
    pub ttl: i32,
    pub image: Image,
    pub rating: String,
    pub skip_days: SkipDays,
    pub skip_hours: SkipHours,
    pub items: Vec<Item>,
}

/// `<image>` of a channel. Width and height are 0 when the feed omits them,
/// readers should fall back to [`Image::DEFAULT_WIDTH`] and
/// [`Image::DEFAULT_HEIGHT`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    /// URL of a GIF, JPEG or PNG representing the channel.
    pub url: String,
    /// ALT text when the channel is rendered in HTML.
    pub title: String,
    /// Site the image links to.
    pub link: String,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub const DEFAULT_WIDTH: u32 = 88;
    pub const MAX_WIDTH: u32 = 144;
    pub const DEFAULT_HEIGHT: u32 = 31;
    pub const MAX_HEIGHT: u32 = 400;
}

/// Weekday names (`Monday` .. `Sunday`) aggregators should not poll on.
/// Advisory, nothing is deduplicated or checked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkipDays {
    pub days: Vec<String>,
}

/// GMT hours, 0 being midnight, aggregators should not poll during.
/// Values are kept as given, including ones outside 0..=23.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkipHours {
    pub hours: Vec<i32>,
}

/// One `<item>` of a channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Unique per producer; not checked here.
    pub guid: String,
    pub title: String,
    pub link: String,
    pub description: String,
    /// Email address of the author.
    pub author: String,
    pub categories: Vec<String>,
    /// URL of the comments page.
    pub comments: String,
    pub enclosure: Enclosure,
    /// `pubDate`, raw RFC-822 text.
    pub pub_date: String,
    /// Name of the channel the item was syndicated from.
    pub source: String,
}

/// Media object attached to an item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    /// Size in bytes.
    pub length: u64,
    /// MIME type, e.g. `audio/mpeg`.
    #[serde(rename = "type")]
    pub mime_type: String,
}
