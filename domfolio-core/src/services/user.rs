//! User service - profile of the portfolio owner

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;

use crate::domain::result::Error;
use crate::domain::User;
use crate::ports::DomainStore;

/// Profile fields to change; None leaves a field as is, Some("") clears it
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

pub struct UserService {
    store: Arc<dyn DomainStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DomainStore>) -> Self {
        Self { store }
    }

    /// The stored user, created on first access
    pub fn current(&self, user_id: &str) -> Result<User> {
        match self.store.get_user(user_id)? {
            Some(user) => Ok(user),
            None => Ok(self.store.upsert_user(&User::new(user_id))?),
        }
    }

    pub fn update(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        let mut user = self.current(user_id)?;

        if let Some(email) = update.email {
            let email = email.trim();
            if !email.is_empty() && !is_plausible_email(email) {
                return Err(Error::validation(format!("invalid email '{}'", email)).into());
            }
            user.email = non_empty(email);
        }
        if let Some(first) = update.first_name {
            user.first_name = non_empty(&first);
        }
        if let Some(last) = update.last_name {
            user.last_name = non_empty(&last);
        }
        if let Some(url) = update.profile_image_url {
            user.profile_image_url = non_empty(&url);
        }

        Ok(self.store.upsert_user(&user)?)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
