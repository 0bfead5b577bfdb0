use {thiserror::Error, ytrelay_common::ErrorKind};

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid channel id: {channel_id:?} (expected UC followed by 22 characters)")]
    InvalidChannelId { channel_id: String },

    #[error("channel {channel_id} already has an active subscription")]
    AlreadySubscribed { channel_id: String },

    #[error("no subscription for channel {channel_id}")]
    NotFound { channel_id: String },

    #[error("hub request failed: {message}")]
    HubUnavailable { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error(
        "hub accepted the change for {channel_id} but saving state failed: {source}; re-run the operation to reconcile"
    )]
    PartialFailure {
        channel_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_channel_id(channel_id: impl Into<String>) -> Self {
        Self::InvalidChannelId {
            channel_id: channel_id.into(),
        }
    }

    #[must_use]
    pub fn already_subscribed(channel_id: impl Into<String>) -> Self {
        Self::AlreadySubscribed {
            channel_id: channel_id.into(),
        }
    }

    #[must_use]
    pub fn not_found(channel_id: impl Into<String>) -> Self {
        Self::NotFound {
            channel_id: channel_id.into(),
        }
    }

    #[must_use]
    pub fn hub(message: impl std::fmt::Display) -> Self {
        Self::HubUnavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn partial(channel_id: impl Into<String>, source: Error) -> Self {
        Self::PartialFailure {
            channel_id: channel_id.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidChannelId { .. } => ErrorKind::InvalidInput,
            Self::AlreadySubscribed { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::HubUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::PartialFailure { .. } => ErrorKind::PartialFailure,
            Self::Storage { .. } | Self::Io(_) | Self::Json(_) => ErrorKind::Storage,
        }
    }
}

impl ytrelay_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Storage { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

ytrelay_common::impl_context!();

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::invalid_channel_id("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::already_subscribed("x").kind(), ErrorKind::Conflict);
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::hub("503").kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(Error::storage("disk").kind(), ErrorKind::Storage);
        assert_eq!(
            Error::partial("x", Error::storage("disk")).kind(),
            ErrorKind::PartialFailure
        );
        let io = std::io::Error::other("boom");
        assert_eq!(Error::from(io).kind(), ErrorKind::Storage);
    }

    #[test]
    fn context_wraps_as_storage() {
        let res: std::result::Result<(), &str> = Err("permission denied");
        let err = res.context("writing state").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("writing state: permission denied"));
    }
}
