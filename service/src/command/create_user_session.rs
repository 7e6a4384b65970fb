//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                let hash = user.password_hash.clone();
                let matches = tokio::task::spawn_blocking(move || {
                    hash.verify(password.expose_secret())
                })
                .await
                .map_err(tracerr::from_and_wrap!(=> E))?;
                if !matches {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let config = self.config();
        let expires_at = (DateTime::now() + config.session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                email: user.email.clone(),
                expires_at,
                issuer: config.jwt_issuer.clone(),
                audience: config.jwt_audience.clone(),
            },
            &config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// Blocking password verification task failed to complete.
    #[display("Verification task failed: {_0}")]
    Blocking(tokio::task::JoinError),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Invalid email or password")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{AuthorizeUserSession, CreateUser},
        domain::user,
        spec::service,
        Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    fn credentials(email: &str, password: &str) -> CreateUserSession {
        CreateUserSession::ByCredentials {
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new(password).unwrap(),
            )),
        }
    }

    async fn register(
        svc: &crate::Service<crate::infra::Memory>,
        email: &str,
        password: &str,
    ) -> crate::domain::User {
        svc.execute(CreateUser {
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new(password).unwrap(),
            )),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn issues_token_for_valid_credentials() {
        let svc = service();
        let user = register(&svc, "john@example.com", "hunter22").await;

        let out = svc
            .execute(credentials("john@example.com", "hunter22"))
            .await
            .unwrap();

        assert_eq!(out.user.id, user.id);
        assert!(out.expires_at > common::DateTime::now().coerce());

        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.email, user.email);
        assert_eq!(session.issuer, "portal");
        assert_eq!(session.audience, "portal-users");
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let svc = service();
        _ = register(&svc, "john@example.com", "hunter22").await;

        let err = svc
            .execute(credentials("john@example.com", "hunter23"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
        assert_eq!(err.as_ref().to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn rejects_unknown_email() {
        let svc = service();

        let err = svc
            .execute(credentials("nobody@example.com", "hunter22"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn creates_session_by_user_id() {
        let svc = service();
        let user = register(&svc, "john@example.com", "hunter22").await;

        let out = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();
        assert_eq!(out.user.email, user.email);

        let missing = user::Id::new();
        let err = svc
            .execute(CreateUserSession::ByUserId(missing))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == missing,
        ));
    }
}
