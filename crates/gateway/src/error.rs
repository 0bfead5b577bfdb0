use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde_json::json,
    tracing::{error, warn},
    ytrelay_common::ErrorKind,
};

/// Error returned by API handlers, rendered as `{"status":"error","message":...}`.
#[derive(Debug)]
pub enum ApiError {
    Subscriptions(ytrelay_subscriptions::Error),
    Notify(ytrelay_notify::Error),
    BadRequest(String),
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Hub failures are a bad gateway; a failed workflow trigger is ours.
            Self::Subscriptions(e) => status_for(e.kind(), StatusCode::BAD_GATEWAY),
            Self::Notify(e) => status_for(e.kind(), StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Subscriptions(e) => e.to_string(),
            Self::Notify(e) => e.to_string(),
            Self::BadRequest(m) => m.clone(),
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self.message(), "request failed");
        } else {
            warn!(%status, error = %self.message(), "request rejected");
        }
    }
}

fn status_for(kind: ErrorKind, upstream: StatusCode) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::UpstreamUnavailable => upstream,
        ErrorKind::Storage | ErrorKind::PartialFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<ytrelay_subscriptions::Error> for ApiError {
    fn from(e: ytrelay_subscriptions::Error) -> Self {
        Self::Subscriptions(e)
    }
}

impl From<ytrelay_notify::Error> for ApiError {
    fn from(e: ytrelay_notify::Error) -> Self {
        Self::Notify(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({
            "status": "error",
            "message": self.message(),
        }));
        (self.status(), body).into_response()
    }
}

/// Plain-text rendering for the hub-facing endpoints.
pub struct PlainError(pub ApiError);

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        self.0.log();
        (self.0.status(), self.0.message()).into_response()
    }
}

impl From<ApiError> for PlainError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<ytrelay_notify::Error> for PlainError {
    fn from(e: ytrelay_notify::Error) -> Self {
        Self(ApiError::Notify(e))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        ytrelay_notify::Error as NotifyError,
        ytrelay_subscriptions::Error as SubError,
    };

    #[test]
    fn subscription_errors_map_to_status() {
        let cases = [
            (SubError::invalid_channel_id("x"), StatusCode::BAD_REQUEST),
            (SubError::already_subscribed("x"), StatusCode::CONFLICT),
            (SubError::not_found("x"), StatusCode::NOT_FOUND),
            (SubError::hub("503"), StatusCode::BAD_GATEWAY),
            (SubError::storage("disk"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                SubError::partial("x", SubError::storage("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn notify_errors_map_to_status() {
        assert_eq!(
            ApiError::from(NotifyError::invalid_xml("eof")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(NotifyError::InvalidEntry).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(NotifyError::downstream("500")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
