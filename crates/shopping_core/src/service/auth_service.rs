//! Account use-cases: login, logout, registration and request authentication.
//!
//! # Responsibility
//! - Turn credentials into server-side sessions and back.
//! - Enforce registration rules in a fixed order so the first failure wins.
//! - Resolve `X-API-Key` secrets against the session user's active client.
//!
//! # Invariants
//! - Passwords and secrets are never logged or returned.
//! - Inactive users can neither log in nor authenticate an existing session.

use crate::model::clock::now_ms;
use crate::model::user::{validate_username, ApiClient, NewUser, Session, User};
use crate::model::validation::ValidationError;
use crate::password::{hash_password, verify_password};
use crate::repo::client_repo::ClientRepository;
use crate::repo::session_repo::SessionRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::schema::input::{NewUserInput, UserCredentials};
use crate::schema::output::MessageSchema;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Two weeks, matching the browser session cookie lifetime.
pub const DEFAULT_SESSION_TTL_MS: i64 = 14 * 24 * 60 * 60 * 1000;

#[derive(Debug)]
pub enum AuthServiceError {
    AlreadyLoggedIn,
    InvalidCredentials,
    NotLoggedIn,
    MissingUserDetails,
    InvalidUsername,
    EmptyPassword,
    UsernameTaken,
    EmailTaken,
    PasswordMismatch,
    /// Any session or API key failure; deliberately carries no detail.
    Unauthorized,
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyLoggedIn => write!(f, "User is already logged in."),
            Self::InvalidCredentials => write!(f, "Invalid Credentials."),
            Self::NotLoggedIn => write!(f, "User is not logged in."),
            Self::MissingUserDetails => write!(
                f,
                "Please ensure username, email, first name and last name are provided."
            ),
            Self::InvalidUsername => write!(f, "Username is invalid."),
            Self::EmptyPassword => write!(f, "Password must not be empty."),
            Self::UsernameTaken => write!(f, "Username already exists."),
            Self::EmailTaken => write!(f, "Email already exists."),
            Self::PasswordMismatch => {
                write!(f, "Password and password confirmation do not match.")
            }
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Successful login: the new session plus the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    pub response: MessageSchema,
}

pub struct AuthService<U, S, C>
where
    U: UserRepository,
    S: SessionRepository,
    C: ClientRepository,
{
    users: U,
    sessions: S,
    clients: C,
    session_ttl_ms: i64,
}

impl<U, S, C> AuthService<U, S, C>
where
    U: UserRepository,
    S: SessionRepository,
    C: ClientRepository,
{
    pub fn new(users: U, sessions: S, clients: C, session_ttl_ms: i64) -> Self {
        Self {
            users,
            sessions,
            clients,
            session_ttl_ms,
        }
    }

    /// Logs `credentials` in unless `current` already holds a session user.
    pub fn login(
        &self,
        current: Option<&User>,
        credentials: &UserCredentials,
    ) -> Result<LoginOutcome, AuthServiceError> {
        if current.is_some() {
            warn!("event=auth_login module=auth status=error reason=already_logged_in");
            return Err(AuthServiceError::AlreadyLoggedIn);
        }

        let Some((user, password_hash)) = self.users.find_credentials(&credentials.username)?
        else {
            warn!("event=auth_login module=auth status=error reason=unknown_user");
            return Err(AuthServiceError::InvalidCredentials);
        };
        if !user.is_active || !verify_password(&credentials.password, &password_hash) {
            warn!(
                "event=auth_login module=auth status=error reason=bad_credentials user_id={}",
                user.id
            );
            return Err(AuthServiceError::InvalidCredentials);
        }

        let now = now_ms();
        let purged = self.sessions.purge_expired_sessions(now)?;
        if purged > 0 {
            debug!("event=session_purge module=auth status=ok removed={purged}");
        }
        let session = self
            .sessions
            .create_session(user.id, now, self.session_ttl_ms)?;
        info!("event=auth_login module=auth status=ok user_id={}", user.id);

        Ok(LoginOutcome {
            session,
            response: MessageSchema::new("User successfully logged in.", ""),
        })
    }

    /// Ends the session identified by `session_key`.
    pub fn logout(&self, session_key: Option<&str>) -> Result<MessageSchema, AuthServiceError> {
        let Some(session_key) = session_key else {
            return Err(AuthServiceError::NotLoggedIn);
        };
        let Some(user) = self.sessions.find_session_user(session_key, now_ms())? else {
            warn!("event=auth_logout module=auth status=error reason=not_logged_in");
            return Err(AuthServiceError::NotLoggedIn);
        };

        self.sessions.delete_session(session_key)?;
        info!("event=auth_logout module=auth status=ok user_id={}", user.id);
        Ok(MessageSchema::new("User successfully logged out.", ""))
    }

    pub fn register(
        &self,
        logged_in: bool,
        input: &NewUserInput,
    ) -> Result<MessageSchema, AuthServiceError> {
        if logged_in {
            return Err(AuthServiceError::AlreadyLoggedIn);
        }
        if [
            &input.username,
            &input.email,
            &input.first_name,
            &input.last_name,
        ]
        .iter()
        .any(|value| value.trim().is_empty())
        {
            return Err(AuthServiceError::MissingUserDetails);
        }
        if validate_username(&input.username).is_err() {
            return Err(AuthServiceError::InvalidUsername);
        }
        if input.password.is_empty() {
            return Err(AuthServiceError::EmptyPassword);
        }
        if self.users.username_exists(&input.username)? {
            return Err(AuthServiceError::UsernameTaken);
        }
        if self.users.email_exists(&input.email)? {
            return Err(AuthServiceError::EmailTaken);
        }
        if input.password != input.password_confirmation {
            return Err(AuthServiceError::PasswordMismatch);
        }

        let user = self.users.create_user(&NewUser {
            username: input.username.clone(),
            email: input.email.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            password_hash: hash_password(&input.password),
            is_staff: false,
        })?;
        info!("event=auth_register module=auth status=ok user_id={}", user.id);

        Ok(MessageSchema::new("User successfully registered.", ""))
    }

    /// Resolves a session cookie value to its user, if still valid.
    pub fn authenticate_session(&self, session_key: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self.sessions.find_session_user(session_key, now_ms())?)
    }

    /// Checks `api_key` against the active client of `user`.
    pub fn authenticate_api_key(
        &self,
        user: &User,
        api_key: Option<&str>,
    ) -> Result<ApiClient, AuthServiceError> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or(AuthServiceError::Unauthorized)?;
        let client = self
            .clients
            .find_for_user(user.id)?
            .filter(|client| client.is_active)
            .ok_or(AuthServiceError::Unauthorized)?;

        if verify_password(api_key, &client.client_secret) {
            Ok(client)
        } else {
            warn!(
                "event=auth_api_key module=auth status=error reason=secret_mismatch user_id={}",
                user.id
            );
            Err(AuthServiceError::Unauthorized)
        }
    }
}
