//! API client enable/disable use-cases.
//!
//! # Invariants
//! - The plain secret is returned once, at enable time, and only its hash is kept.
//! - Re-enabling an inactive client rotates its secret.

use crate::model::user::{client_name_for, User};
use crate::password::hash_with_iterations;
use crate::repo::client_repo::ClientRepository;
use crate::repo::RepoError;
use crate::schema::output::{MessageSchema, TokenSchema};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stretch applied to random client secrets.
const CLIENT_SECRET_ITERATIONS: u32 = 1_000;

#[derive(Debug)]
pub enum ClientServiceError {
    AlreadyRegistered,
    ClientNotFound,
    Repo(RepoError),
}

impl Display for ClientServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered => write!(f, "Api Client is already registered."),
            Self::ClientNotFound => write!(f, "Client does not exist."),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClientServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ClientServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct ClientService<C: ClientRepository> {
    clients: C,
}

impl<C: ClientRepository> ClientService<C> {
    pub fn new(clients: C) -> Self {
        Self { clients }
    }

    /// Issues a fresh secret for `user`, creating the client on first use.
    pub fn enable_client(&self, user: &User) -> Result<TokenSchema, ClientServiceError> {
        let secret = Uuid::new_v4().simple().to_string();
        let secret_hash = hash_with_iterations(&secret, CLIENT_SECRET_ITERATIONS);

        match self.clients.find_for_user(user.id)? {
            Some(client) if client.is_active => return Err(ClientServiceError::AlreadyRegistered),
            Some(client) => {
                self.clients
                    .update_client(client.id, true, Some(secret_hash.as_str()))?;
            }
            None => {
                self.clients
                    .create_client(user.id, &client_name_for(&user.username), &secret_hash)?;
            }
        }

        info!("event=client_enable module=auth status=ok user_id={}", user.id);
        Ok(TokenSchema { token: secret })
    }

    pub fn disable_client(&self, user: &User) -> Result<MessageSchema, ClientServiceError> {
        let client = self
            .clients
            .find_for_user(user.id)?
            .ok_or(ClientServiceError::ClientNotFound)?;
        self.clients.update_client(client.id, false, None)?;

        info!("event=client_disable module=auth status=ok user_id={}", user.id);
        Ok(MessageSchema::new("Api Client disabled.", ""))
    }
}
