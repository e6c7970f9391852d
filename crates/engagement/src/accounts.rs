//! Account registration and login
//!
//! This module creates user documents and authenticates callers. The
//! credential primitives (hashing, tokens) come from the identity crate;
//! this layer owns validation, uniqueness, and the sanitized views that
//! leave the system.

use identity::password::{self, PasswordError};
use identity::tokens::{TokenError, TokenIssuer};
use serde::{Deserialize, Serialize};
use storage::{Collection, StorageError};
use thiserror::Error;

use crate::models::{User, UserProfile};

/// Account service error types
#[derive(Debug, Error)]
pub enum AccountError {
    /// A required registration field is missing or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password validation or hashing error
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// Username or email already taken
    #[error("User with the same email or username already exists")]
    AlreadyRegistered,

    /// No user under the given username
    #[error("User not found: {0}")]
    UnknownUser(String),

    /// Username/password mismatch
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token issuance or verification error
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Document store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for account operations
pub type Result<T> = std::result::Result<T, AccountError>;

/// Registration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterParams {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
    /// Plain-text password (hashed before storage)
    pub password: String,
}

/// Login parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginParams {
    /// Username
    pub username: String,
    /// Plain-text password
    pub password: String,
}

/// Login result: the sanitized user plus a signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// The logged-in user, without the password hash
    pub user: UserProfile,
    /// Signed token carrying the user id
    pub token: String,
}

/// Account service
///
/// # Example
///
/// ```rust,no_run
/// use engagement::accounts::{AccountService, LoginParams, RegisterParams};
/// use identity::tokens::{TokenConfig, TokenIssuer};
/// use storage::DocumentStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = DocumentStore::in_memory()?;
/// let service = AccountService::new(
///     store.collection(engagement::USERS_COLLECTION)?,
///     TokenIssuer::new(TokenConfig::new("secret")),
/// );
///
/// service.register(RegisterParams {
///     name: "Alice".into(),
///     email: "alice@example.com".into(),
///     username: "alice".into(),
///     password: "hunter22".into(),
/// })?;
///
/// let session = service.login(LoginParams {
///     username: "alice".into(),
///     password: "hunter22".into(),
/// })?;
/// assert_eq!(service.authenticate(&session.token)?, session.user.id);
/// # Ok(())
/// # }
/// ```
pub struct AccountService {
    users: Collection<User>,
    tokens: TokenIssuer,
}

impl AccountService {
    /// Create a new account service
    pub fn new(users: Collection<User>, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Register a new user
    ///
    /// The duplicate check covers username and email in one pass, so the
    /// conflict error does not disclose which of the two collided.
    ///
    /// # Errors
    ///
    /// - `AccountError::MissingField` - any empty field
    /// - `AccountError::Password` - password below the minimum length
    /// - `AccountError::AlreadyRegistered` - username or email taken
    pub fn register(&self, params: RegisterParams) -> Result<UserProfile> {
        if params.name.is_empty() {
            return Err(AccountError::MissingField("Name"));
        }
        if params.email.is_empty() {
            return Err(AccountError::MissingField("Email"));
        }
        if params.username.is_empty() {
            return Err(AccountError::MissingField("Username"));
        }
        if params.password.is_empty() {
            return Err(AccountError::MissingField("Password"));
        }
        password::validate_password(&params.password)?;

        let existing = self
            .users
            .find_one(|u| u.username == params.username || u.email == params.email)?;
        if existing.is_some() {
            return Err(AccountError::AlreadyRegistered);
        }

        let hash = password::hash_password(&params.password)?;
        let user = User::new(params.name, params.email, params.username, hash);
        self.users.insert(&user.id, &user)?;

        Ok(user.profile())
    }

    /// Log a user in
    ///
    /// # Errors
    ///
    /// - `AccountError::InvalidCredentials` - empty credentials or
    ///   password mismatch
    /// - `AccountError::UnknownUser` - no user under the username
    pub fn login(&self, params: LoginParams) -> Result<AuthenticatedUser> {
        if params.username.is_empty() || params.password.is_empty() {
            return Err(AccountError::InvalidCredentials);
        }

        let user = self
            .users
            .find_one(|u| u.username == params.username)?
            .ok_or_else(|| AccountError::UnknownUser(params.username.clone()))?;

        let matches = password::verify_password(&params.password, &user.password_hash)?;
        if !matches {
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id)?;

        Ok(AuthenticatedUser { user: user.profile(), token })
    }

    /// Resolve a token to the user id it carries
    ///
    /// This is the identity every mutating operation trusts; the user
    /// document is not re-checked here.
    pub fn authenticate(&self, token: &str) -> Result<String> {
        Ok(self.tokens.verify(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity::tokens::TokenConfig;
    use storage::DocumentStore;

    fn service() -> AccountService {
        let store = DocumentStore::in_memory().unwrap();
        AccountService::new(
            store.collection(crate::USERS_COLLECTION).unwrap(),
            TokenIssuer::new(TokenConfig::new("test-secret")),
        )
    }

    fn alice() -> RegisterParams {
        RegisterParams {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            username: "alice".into(),
            password: "hunter22".into(),
        }
    }

    #[test]
    fn test_register_returns_sanitized_profile() {
        let service = service();

        let profile = service.register(alice()).unwrap();

        assert_eq!(profile.username, "alice");
        assert!(profile.followers.is_empty());
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let service = service();

        let result = service.register(RegisterParams { name: String::new(), ..alice() });
        assert!(matches!(result, Err(AccountError::MissingField("Name"))));

        let result = service.register(RegisterParams { email: String::new(), ..alice() });
        assert!(matches!(result, Err(AccountError::MissingField("Email"))));

        let result = service.register(RegisterParams { username: String::new(), ..alice() });
        assert!(matches!(result, Err(AccountError::MissingField("Username"))));

        let result = service.register(RegisterParams { password: String::new(), ..alice() });
        assert!(matches!(result, Err(AccountError::MissingField("Password"))));
    }

    #[test]
    fn test_register_rejects_short_password() {
        let service = service();

        let result = service.register(RegisterParams { password: "12345".into(), ..alice() });
        assert!(matches!(result, Err(AccountError::Password(PasswordError::TooShort { .. }))));
    }

    #[test]
    fn test_register_duplicate_username_conflicts() {
        let service = service();
        service.register(alice()).unwrap();

        let result = service.register(RegisterParams {
            email: "other@example.com".into(),
            ..alice()
        });
        assert!(matches!(result, Err(AccountError::AlreadyRegistered)));
    }

    #[test]
    fn test_register_duplicate_email_conflicts() {
        let service = service();
        service.register(alice()).unwrap();

        let result = service.register(RegisterParams { username: "alice2".into(), ..alice() });
        assert!(matches!(result, Err(AccountError::AlreadyRegistered)));
    }

    #[test]
    fn test_login_round_trip() {
        let service = service();
        let registered = service.register(alice()).unwrap();

        let session = service
            .login(LoginParams { username: "alice".into(), password: "hunter22".into() })
            .unwrap();

        assert_eq!(session.user.id, registered.id);
        assert_eq!(service.authenticate(&session.token).unwrap(), registered.id);
    }

    #[test]
    fn test_login_unknown_user() {
        let service = service();

        let result =
            service.login(LoginParams { username: "nobody".into(), password: "hunter22".into() });
        assert!(matches!(result, Err(AccountError::UnknownUser(_))));
    }

    #[test]
    fn test_login_wrong_password() {
        let service = service();
        service.register(alice()).unwrap();

        let result =
            service.login(LoginParams { username: "alice".into(), password: "hunter23".into() });
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[test]
    fn test_login_empty_credentials() {
        let service = service();

        let result =
            service.login(LoginParams { username: String::new(), password: String::new() });
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[test]
    fn test_authenticate_rejects_garbage() {
        let service = service();

        assert!(service.authenticate("not-a-token").is_err());
    }

    #[test]
    fn test_login_response_omits_password_hash() {
        let service = service();
        service.register(alice()).unwrap();

        let session = service
            .login(LoginParams { username: "alice".into(), password: "hunter22".into() })
            .unwrap();

        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("\"token\""));
    }
}
