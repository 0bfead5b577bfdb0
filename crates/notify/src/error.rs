use {thiserror::Error, ytrelay_common::ErrorKind};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {message}")]
    ReadBody { message: String },

    #[error("invalid Atom feed: {message}")]
    InvalidXml { message: String },

    #[error("feed entry has no video id")]
    InvalidEntry,

    #[error("workflow trigger failed: {message}")]
    Downstream { message: String },
}

impl Error {
    #[must_use]
    pub fn read_body(message: impl std::fmt::Display) -> Self {
        Self::ReadBody {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_xml(message: impl std::fmt::Display) -> Self {
        Self::InvalidXml {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn downstream(message: impl std::fmt::Display) -> Self {
        Self::Downstream {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadBody { .. } | Self::InvalidXml { .. } | Self::InvalidEntry => {
                ErrorKind::InvalidInput
            },
            Self::Downstream { .. } => ErrorKind::UpstreamUnavailable,
        }
    }
}

impl ytrelay_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Downstream { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

ytrelay_common::impl_context!();
