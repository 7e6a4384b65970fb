//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }

        impl ::axum::response::IntoResponse for $name {
            fn into_response(self) -> ::axum::response::Response {
                $crate::Error::from(self).into_response()
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Code of an internal server [`Error`].
    pub const INTERNAL: Code = "INTERNAL_SERVER_ERROR";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: Self::INTERNAL,
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `400 Bad Request` [`Error`] with the provided `code` and
    /// the message of the provided `err`.
    #[must_use]
    pub fn bad_request(code: Code, err: &impl ToString) -> Self {
        Self {
            code,
            status_code: http::StatusCode::BAD_REQUEST,
            message: err.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// JSON body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body<'a> {
    /// [`Error`] code.
    code: Code,

    /// [`Error`] message.
    message: &'a str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = if self.status_code.is_server_error() {
            log::error!("{self}");
            "Internal server error"
        } else {
            &self.message
        };

        (
            self.status_code,
            Json(Body {
                code: self.code,
                message,
            }),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }

    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| {
            let mut error = Error::internal(&self);
            error.backtrace = Some(self.trace().clone());
            error
        })
    }
}

/// Implements [`From`] an extractor rejection for [`Error`] via its
/// [`AsError`] implementation, so the rejection can be used with
/// [`WithRejection`].
///
/// [`WithRejection`]: axum_extra::extract::WithRejection
macro_rules! impl_from_rejection {
    ($($rejection:ty),* $(,)?) => {$(
        impl From<$rejection> for Error {
            fn from(rejection: $rejection) -> Self {
                rejection.into_error()
            }
        }
    )*};
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request("BAD_REQUEST", self))
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request("INVALID_BODY", &self.body_text()))
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request("INVALID_QUERY", &self.body_text()))
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request("INVALID_PATH", &self.body_text()))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use axum::{body, response::IntoResponse as _};
    use tracerr::Traced;

    use super::{AsError as _, Error};
    use crate::define_error;

    define_error! {
        enum TestError {
            #[code = "TEST_NOT_FOUND"]
            #[status = NOT_FOUND]
            #[message = "Thing not found"]
            NotFound,
        }
    }

    async fn body_of(err: Error) -> (http::StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_error_keeps_message() {
        let (status, json) = body_of(TestError::NotFound.into()).await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "TEST_NOT_FOUND");
        assert_eq!(json["message"], "Thing not found");
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let traced: Traced<service::infra::database::Error> =
            tracerr::new!(service::infra::database::Error::from(
                service::infra::database::memory::Error::UniqueViolation("x"),
            ));

        let err = traced.as_error();
        assert_eq!(err.code, Error::INTERNAL);
        assert!(err.backtrace.is_some());

        let (status, json) = body_of(err).await;
        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(json["message"], "Internal server error");
    }
}
