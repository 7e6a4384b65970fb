//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser { email, password } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        // Argon2 is CPU-bound, so it mustn't block the async runtime.
        let password_hash = tokio::task::spawn_blocking(move || {
            user::PasswordHash::new(password.expose_secret())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> E))?
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            email,
            password_hash,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx.execute(Insert(user.clone())).await;
        if let Err(e) = &inserted {
            // Concurrent registration won the race for the same email.
            if e.as_ref()
                .is_unique_violation(Some(database::USERS_EMAIL_CONSTRAINT))
            {
                return Err(tracerr::new!(E::EmailOccupied(user.email)));
            }
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is already registered.
    #[display("Email `{_0}` is already registered")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Password`] hashing failed.
    #[display("Failed to hash a `Password`: {_0}")]
    PasswordHashing(argon2::password_hash::Error),

    /// Blocking hashing task failed to complete.
    #[display("Hashing task failed: {_0}")]
    Blocking(tokio::task::JoinError),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};
    use secrecy::SecretBox;

    use crate::{
        domain::{user, User},
        spec::service,
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn create_user(email: &str, password: &str) -> CreateUser {
        CreateUser {
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new(password).unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let svc = service();

        let user = svc
            .execute(create_user("jane@example.com", "secret-pass"))
            .await
            .unwrap();

        assert_eq!(user.email.to_string(), "jane@example.com");
        assert_ne!(user.password_hash.to_string(), "secret-pass");
        assert!(user
            .password_hash
            .verify(&user::Password::new("secret-pass").unwrap()));

        let stored = svc
            .database()
            .execute(Select(By::<Option<User>, _>::new(&user.email)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, user.id);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let svc = service();
        let first = svc
            .execute(create_user("jane@example.com", "secret-pass"))
            .await
            .unwrap();

        let err = svc
            .execute(create_user("jane@example.com", "another-pass"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::EmailOccupied(e) if e.to_string() == "jane@example.com",
        ));

        let email = user::Email::new("jane@example.com").unwrap();
        let stored = svc
            .database()
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.id);
        assert!(stored
            .password_hash
            .verify(&user::Password::new("secret-pass").unwrap()));
    }
}
