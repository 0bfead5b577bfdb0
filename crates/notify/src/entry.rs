//! Atom feed entry as pushed by the YouTube hub.

use {
    chrono::{DateTime, SecondsFormat, Utc},
    feed_rs::{model, parser},
    serde::{Deserialize, Serialize},
};

use crate::{Error, Result};

const VIDEO_ID_PREFIX: &str = "yt:video:";

/// The one entry a push notification carries.
///
/// `published` and `updated` are RFC3339 strings; they are empty when the
/// feed had no parsable timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "videoID")]
    pub video_id: String,
    #[serde(rename = "channelID")]
    pub channel_id: String,
    pub title: String,
    pub published: String,
    pub updated: String,
}

impl Entry {
    #[must_use]
    pub fn video_url(&self) -> String {
        ytrelay_common::youtube::video_url(&self.video_id)
    }
}

/// Parse a push body and return its first entry, if any.
///
/// A feed without entries (e.g. a deleted-video tombstone) is `Ok(None)`.
pub fn parse_feed(body: &[u8]) -> Result<Option<Entry>> {
    let feed = parser::parse(body).map_err(Error::invalid_xml)?;
    Ok(feed.entries.first().map(entry_from_atom))
}

fn entry_from_atom(entry: &model::Entry) -> Entry {
    Entry {
        video_id: video_id(entry),
        channel_id: entry
            .authors
            .iter()
            .filter_map(|a| a.uri.as_deref())
            .find_map(ytrelay_common::youtube::channel_id_from_uri)
            .unwrap_or_default()
            .to_string(),
        title: entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default(),
        published: rfc3339(entry.published),
        updated: rfc3339(entry.updated),
    }
}

/// `yt:video:<id>` entry id, falling back to the `watch?v=` link.
fn video_id(entry: &model::Entry) -> String {
    if let Some(id) = entry.id.trim().strip_prefix(VIDEO_ID_PREFIX) {
        return id.to_string();
    }
    entry
        .links
        .iter()
        .find_map(|l| l.href.split_once("watch?v=").map(|(_, v)| v))
        .map(|v| v.split('&').next().unwrap_or(v).to_string())
        .unwrap_or_default()
}

fn rfc3339(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn atom(video_id: &str, published: &str, updated: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <link rel="hub" href="https://pubsubhubbub.appspot.com"/>
  <link rel="self" href="https://www.youtube.com/xml/feeds/videos.xml?channel_id=UCXuqSBlHAE6Xw-yeJA0Tunw"/>
  <title>YouTube video feed</title>
  <updated>{updated}</updated>
  <entry>
    <id>yt:video:{video_id}</id>
    <yt:videoId>{video_id}</yt:videoId>
    <yt:channelId>UCXuqSBlHAE6Xw-yeJA0Tunw</yt:channelId>
    <title>Building a relay in Rust</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v={video_id}"/>
    <author>
      <name>Example Channel</name>
      <uri>https://www.youtube.com/channel/UCXuqSBlHAE6Xw-yeJA0Tunw</uri>
    </author>
    <published>{published}</published>
    <updated>{updated}</updated>
  </entry>
</feed>"#
        )
    }

    #[test]
    fn parses_youtube_push() {
        let body = atom(
            "dQw4w9WgXcQ",
            "2024-05-01T12:00:00+00:00",
            "2024-05-01T12:01:30.123456+00:00",
        );
        let entry = parse_feed(body.as_bytes()).unwrap().unwrap();
        assert_eq!(entry.video_id, "dQw4w9WgXcQ");
        assert_eq!(entry.channel_id, "UCXuqSBlHAE6Xw-yeJA0Tunw");
        assert_eq!(entry.title, "Building a relay in Rust");
        assert_eq!(entry.published, "2024-05-01T12:00:00Z");
        assert_eq!(entry.updated, "2024-05-01T12:01:30Z");
        assert_eq!(entry.video_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn feed_without_entries_is_none() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>YouTube video feed</title>
  <updated>2024-05-01T12:00:00+00:00</updated>
</feed>"#;
        assert!(parse_feed(body.as_bytes()).unwrap().is_none());
    }

    #[test]
    fn garbage_is_invalid_xml() {
        let err = parse_feed(b"this is not xml").unwrap_err();
        assert!(matches!(err, Error::InvalidXml { .. }));
        assert!(parse_feed(b"").is_err());
    }

    #[test]
    fn bad_timestamp_becomes_empty() {
        let body = atom("dQw4w9WgXcQ", "not a date", "2024-05-01T12:00:00+00:00");
        let entry = parse_feed(body.as_bytes()).unwrap().unwrap();
        assert_eq!(entry.published, "");
        assert_eq!(entry.updated, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn entry_serializes_with_wire_names() {
        let entry = Entry {
            video_id: "v".into(),
            channel_id: "c".into(),
            ..Entry::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["videoID"], "v");
        assert_eq!(json["channelID"], "c");
    }
}
