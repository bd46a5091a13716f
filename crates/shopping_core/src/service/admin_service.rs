//! Staff moderation over accounts and API clients.

use crate::model::user::UserId;
use crate::repo::client_repo::ClientRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::schema::output::{AdminClientSchema, AdminUserSchema};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AdminServiceError {
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for AdminServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "User with id '{id}' does not exist."),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdminServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UserNotFound(_) => None,
        }
    }
}

impl From<RepoError> for AdminServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "user", id } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct AdminService<U: UserRepository, C: ClientRepository> {
    users: U,
    clients: C,
}

impl<U: UserRepository, C: ClientRepository> AdminService<U, C> {
    pub fn new(users: U, clients: C) -> Self {
        Self { users, clients }
    }

    pub fn list_users(&self) -> Result<Vec<AdminUserSchema>, AdminServiceError> {
        Ok(self
            .users
            .list_users()?
            .iter()
            .map(AdminUserSchema::from)
            .collect())
    }

    /// Deactivated users lose every session at their next request.
    pub fn set_user_active(
        &self,
        id: UserId,
        is_active: bool,
    ) -> Result<AdminUserSchema, AdminServiceError> {
        let user = self.users.set_user_active(id, is_active)?;
        info!("event=user_set_active module=admin status=ok user_id={id} is_active={is_active}");
        Ok(AdminUserSchema::from(&user))
    }

    pub fn list_clients(&self) -> Result<Vec<AdminClientSchema>, AdminServiceError> {
        Ok(self
            .clients
            .list_clients()?
            .into_iter()
            .map(|(client, username)| AdminClientSchema::new(&client, username))
            .collect())
    }
}
