use super::error::{require, ModelError};
use items_framework::Model;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Users.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u32);

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user_{}", self.0)
    }
}

/// A registered customer.
///
/// Users have no filter scope and no transformer: the users resource serves the plain
/// paginator array form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

fn check_email(email: &str) -> Result<(), ModelError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ModelError::InvalidEmail(email.to_string())),
    }
}

impl Model for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Error = ModelError;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, ModelError> {
        require("name", &params.name)?;
        check_email(&params.email)?;
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
        })
    }

    fn apply_update(&mut self, update: UserUpdate) -> Result<(), ModelError> {
        if let Some(name) = update.name {
            require("name", &name)?;
            self.name = name;
        }
        if let Some(email) = update.email {
            check_email(&email)?;
            self.email = email;
        }
        Ok(())
    }
}
