//! YouTube identifiers and the URLs derived from them.

/// Every channel id starts with this prefix.
pub const CHANNEL_ID_PREFIX: &str = "UC";

/// Number of characters after [`CHANNEL_ID_PREFIX`].
pub const CHANNEL_ID_SUFFIX_LEN: usize = 22;

const FEED_BASE: &str = "https://www.youtube.com/xml/feeds/videos.xml";
const WATCH_BASE: &str = "https://www.youtube.com/watch";

/// Returns `true` when `id` is `UC` followed by exactly 22 characters from
/// `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_channel_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix(CHANNEL_ID_PREFIX) else {
        return false;
    };
    rest.len() == CHANNEL_ID_SUFFIX_LEN
        && rest
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Hub topic for a channel's upload feed.
#[must_use]
pub fn topic_url(channel_id: &str) -> String {
    format!("{FEED_BASE}?channel_id={channel_id}")
}

#[must_use]
pub fn video_url(video_id: &str) -> String {
    format!("{WATCH_BASE}?v={video_id}")
}

/// Extract the channel id from an author URI such as
/// `https://www.youtube.com/channel/UC...`.
#[must_use]
pub fn channel_id_from_uri(uri: &str) -> Option<&str> {
    let (_, tail) = uri.trim_end_matches('/').rsplit_once("/channel/")?;
    (!tail.is_empty()).then_some(tail)
}
