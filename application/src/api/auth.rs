//! Authentication endpoints.

use axum::{extract::Path, Extension, Json};
use axum_extra::extract::WithRejection;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, create_user_session, Command as _},
    domain::user::{self, session},
    query, Query as _,
};

use crate::{define_error, AsError, Error, Service, Session};

/// Credentials of a user, provided on registration and login.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email address of the user.
    pub email: String,

    /// Plain password of the user.
    pub password: String,
}

/// Issued session token.
#[derive(Debug, Serialize)]
pub struct Token {
    /// JSON Web Token to be sent as `Authorization: Bearer`.
    pub token: String,

    /// Expiration of the [`Token`].
    pub expiration: session::ExpirationDateTime,

    /// Email of the authenticated user.
    pub email: String,
}

impl From<create_user_session::Output> for Token {
    fn from(out: create_user_session::Output) -> Self {
        Self {
            token: out.token.to_string(),
            expiration: out.expires_at,
            email: out.user.email.to_string(),
        }
    }
}

/// Currently authenticated user.
#[derive(Debug, Serialize)]
pub struct Me {
    /// ID of the user.
    pub id: user::Id,

    /// Email of the user.
    pub email: String,
}

/// Public profile of a user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ID of the user.
    pub id: user::Id,

    /// Email of the user.
    pub email: String,

    /// Registration time of the user.
    pub created_at: user::CreationDateTime,
}

/// Registers a new user and signs them in.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_EMAIL` - if the provided email is malformed;
/// - `INVALID_PASSWORD` - if the provided password is too short or too long;
/// - `EMAIL_OCCUPIED` - if the provided email is already registered.
#[tracing::instrument(skip_all)]
pub async fn register(
    Extension(service): Extension<Service>,
    WithRejection(Json(creds), _): WithRejection<Json<Credentials>, Error>,
) -> Result<Json<Token>, Error> {
    let email =
        user::Email::new(creds.email.trim()).ok_or(UserError::InvalidEmail)?;
    let password = user::Password::new(creds.password)
        .ok_or(UserError::InvalidPassword)?;

    let user = service
        .execute(command::CreateUser {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    service
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map(|out| Json(out.into()))
        .map_err(AsError::into_error)
}

/// Signs in an existing user by their credentials.
///
/// # Errors
///
/// Possible error codes:
/// - `WRONG_CREDENTIALS` - if no user matches the provided credentials.
#[tracing::instrument(skip_all)]
pub async fn login(
    Extension(service): Extension<Service>,
    WithRejection(Json(creds), _): WithRejection<Json<Credentials>, Error>,
) -> Result<Json<Token>, Error> {
    // Malformed credentials can't match anyone.
    let email = user::Email::new(creds.email.trim())
        .ok_or(UserError::WrongCredentials)?;
    let password = user::Password::new(creds.password)
        .ok_or(UserError::WrongCredentials)?;

    service
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map(|out| Json(out.into()))
        .map_err(AsError::into_error)
}

/// Returns the currently authenticated user.
#[tracing::instrument(skip_all, fields(user.id = %session.user_id))]
pub async fn me(session: Session) -> Json<Me> {
    Json(Me {
        id: session.user_id,
        email: session.email.to_string(),
    })
}

/// Returns the public profile of the user with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `USER_NOT_EXISTS` - if the user doesn't exist.
#[tracing::instrument(skip(service))]
pub async fn user(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<user::Id>, Error>,
) -> Result<Json<User>, Error> {
    let user = service
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(UserError::NotExists)?;

    Ok(Json(User {
        id: user.id,
        email: user.email.to_string(),
        created_at: user.created_at,
    }))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::Blocking(_) | Self::PasswordHashing(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Blocking(_) | Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::WrongCredentials => Some(UserError::WrongCredentials.into()),
        }
    }
}

define_error! {
    enum UserError {
        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Invalid email address"]
        InvalidEmail,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Password must be between 6 and 100 characters"]
        InvalidPassword,

        #[code = "EMAIL_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Email already registered"]
        EmailOccupied,

        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid email or password"]
        WrongCredentials,

        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "User not found"]
        NotExists,
    }
}
