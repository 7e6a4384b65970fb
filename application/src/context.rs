//! Request context extractors.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::user::{self, session},
};

use crate::{define_error, AsError, Error, Service};

/// Authenticated user session, extracted from the `Authorization: Bearer`
/// header of a request.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the authenticated user.
    pub user_id: user::Id,

    /// [`user::Email`] of the authenticated user.
    pub email: user::Email,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::AuthorizationRequired.into()
                } else {
                    e.into_error()
                }
            })?;

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token =
            unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };

        let claims = service
            .execute(command::AuthorizeUserSession { token })
            .await
            .map_err(AsError::into_error)?;

        Ok(Self {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::InvalidToken.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid or expired token"]
        InvalidToken,
    }
}
