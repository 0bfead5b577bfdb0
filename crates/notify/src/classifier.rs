//! New upload vs. metadata edit.
//!
//! The hub pushes the same entry shape for a fresh upload and for a later
//! title or description change. Only `published` and `updated` tell them
//! apart: a fresh upload is recent and both timestamps are close together.

use {
    chrono::{DateTime, TimeDelta, Utc},
    tracing::{debug, warn},
};

use crate::entry::Entry;

/// Uploads older than this are edits or re-pushes.
pub const MAX_AGE_MINUTES: i64 = 60;

/// `updated - published` must stay below this.
pub const MAX_UPDATE_DELTA_MINUTES: i64 = 60;

/// Tolerated clock skew for a `published` in the future, and for `updated`
/// preceding `published`.
pub const CLOCK_SKEW_MINUTES: i64 = 5;

#[must_use]
pub fn is_new_video(entry: &Entry) -> bool {
    is_new_video_at(entry, Utc::now())
}

#[must_use]
pub fn is_new_video_at(entry: &Entry, now: DateTime<Utc>) -> bool {
    let (Some(published), Some(updated)) = (parse(&entry.published), parse(&entry.updated)) else {
        warn!(
            video_id = %entry.video_id,
            published = %entry.published,
            updated = %entry.updated,
            "unparsable notification timestamps"
        );
        return false;
    };

    let age = now - published;
    let delta = updated - published;
    let skew = TimeDelta::minutes(CLOCK_SKEW_MINUTES);

    let verdict = age <= TimeDelta::minutes(MAX_AGE_MINUTES)
        && age >= -skew
        && delta < TimeDelta::minutes(MAX_UPDATE_DELTA_MINUTES)
        && delta >= -skew;

    debug!(
        video_id = %entry.video_id,
        age_secs = age.num_seconds(),
        delta_secs = delta.num_seconds(),
        new = verdict,
        "classified notification"
    );
    verdict
}

fn parse(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
