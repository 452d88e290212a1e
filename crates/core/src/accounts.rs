//! Local account registration and login

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::models::User;
use crate::storage::UserRepository;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Register a new account
#[instrument(skip(storage, password))]
pub fn register<S>(storage: &S, username: &str, password: &str) -> Result<User>
where
    S: UserRepository + ?Sized,
{
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(Error::InvalidArgument(format!(
            "username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidArgument(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if storage.find_user_by_username(username)?.is_some() {
        return Err(Error::InvalidOperation(format!(
            "username '{}' already exists",
            username
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Authentication(format!("failed to hash password: {}", e)))?
        .to_string();

    let user = User::new(username.to_string(), password_hash);
    storage.create_user(&user)?;
    info!(user_id = %user.id, "Registered user");

    Ok(user)
}

/// Verify credentials and stamp the login time
#[instrument(skip(storage, password))]
pub fn login<S>(storage: &S, username: &str, password: &str) -> Result<User>
where
    S: UserRepository + ?Sized,
{
    let user = storage
        .find_user_by_username(username.trim())?
        .ok_or_else(|| Error::Authentication("invalid username or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| Error::Authentication(format!("stored hash is unreadable: {}", e)))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(Error::Authentication("invalid username or password".into()));
    }

    storage.update_last_login(user.id)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_register_and_login() {
        let db = Database::open_in_memory().unwrap();
        let user = register(&db, "mira", "hunter22").unwrap();
        assert_ne!(user.password_hash, "hunter22");

        let logged_in = login(&db, "mira", "hunter22").unwrap();
        assert_eq!(logged_in.id, user.id);

        let stored = db.users().find_by_id(user.id).unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[test]
    fn test_wrong_password() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "mira", "hunter22").unwrap();

        assert!(matches!(
            login(&db, "mira", "wrong-password"),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            login(&db, "nobody", "hunter22"),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_register_validation() {
        let db = Database::open_in_memory().unwrap();

        assert!(matches!(
            register(&db, "ab", "hunter22"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            register(&db, "mira", "short"),
            Err(Error::InvalidArgument(_))
        ));

        register(&db, "mira", "hunter22").unwrap();
        assert!(matches!(
            register(&db, "mira", "another1"),
            Err(Error::InvalidOperation(_))
        ));
    }
}
