use serde::Serialize;

/// Failure taxonomy shared by every crate.
///
/// Library errors report one of these through their `kind()` method; the
/// gateway turns a kind into an HTTP status in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad channel id, unparsable body, missing parameter. Never retried.
    InvalidInput,
    /// The channel already has an active subscription.
    Conflict,
    NotFound,
    /// The hub or the downstream workflow trigger rejected or failed the call.
    UpstreamUnavailable,
    Storage,
    /// The hub accepted a change that could not be persisted afterwards.
    PartialFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidInput => "invalid input",
            Self::Conflict => "conflict",
            Self::NotFound => "not found",
            Self::UpstreamUnavailable => "upstream unavailable",
            Self::Storage => "storage error",
            Self::PartialFailure => "partial failure",
        };
        f.write_str(s)
    }
}

/// Error types that can be built from a bare message.
///
/// Crates implement this for their own `Error` and then call
/// [`impl_context!`](crate::impl_context) inside their error module.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Expands to a crate-local `Context` trait adding `.context()` and
/// `.with_context()` to `Result` and `Option`.
///
/// Requires `Error: FromMessage` and `type Result<T> = std::result::Result<T, Error>`
/// to be in scope at the call site.
///
/// ```ignore
/// // crates/subscriptions/src/error.rs
/// ytrelay_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                let prefix = context.into();
                self.map_err(|e| {
                    <Error as $crate::FromMessage>::from_message(format!("{prefix}: {e}"))
                })
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|e| {
                    let prefix = f().into();
                    <Error as $crate::FromMessage>::from_message(format!("{prefix}: {e}"))
                })
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(context.into()))
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(f().into()))
            }
        }
    };
}
