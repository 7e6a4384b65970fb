//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let config = self.config();
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &config.jwt_decoding_key,
            &validation,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        drop(
            self.database()
                .execute(Select(By::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::{
        domain::user::{self, session, Session},
        spec::service,
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn sign(claims: &Session) -> session::Token {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        token.parse().unwrap()
    }

    fn claims(user_id: user::Id) -> Session {
        Session {
            user_id,
            email: user::Email::new("ghost@example.com").unwrap(),
            expires_at: (DateTime::now() + Duration::from_secs(600)).coerce(),
            issuer: "portal".into(),
            audience: "portal-users".into(),
        }
    }

    #[tokio::test]
    async fn rejects_session_of_missing_user() {
        let svc = service();
        let user_id = user::Id::new();

        let err = svc
            .execute(AuthorizeUserSession {
                token: sign(&claims(user_id)),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == user_id,
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_issuer() {
        let svc = service();
        let mut foreign = claims(user::Id::new());
        foreign.issuer = "elsewhere".into();

        let err = svc
            .execute(AuthorizeUserSession {
                token: sign(&foreign),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let svc = service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: "not-a-token".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
