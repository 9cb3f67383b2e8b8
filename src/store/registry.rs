use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

use crate::news::{Preferences, User};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Email is required")]
    MissingEmail,

    #[error("User '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Registered users and their current preferences, keyed by email.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: DashMap<String, Preferences>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, email: &str, preferences: Preferences) -> Result<User, RegistryError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RegistryError::MissingEmail);
        }

        match self.users.entry(email.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(email.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(preferences.clone());
                Ok(User {
                    email: email.to_string(),
                    preferences,
                })
            }
        }
    }

    pub fn get(&self, email: &str) -> Option<User> {
        self.users.get(email).map(|preferences| User {
            email: email.to_string(),
            preferences: preferences.clone(),
        })
    }

    /// Replaces the user's preferences; `None` if the user is unknown.
    pub fn update_preferences(&self, email: &str, preferences: Preferences) -> Option<User> {
        let mut current = self.users.get_mut(email)?;
        *current = preferences.clone();

        Some(User {
            email: email.to_string(),
            preferences,
        })
    }

    /// Point-in-time copy of every user. No lock outlives the call.
    pub fn snapshot(&self) -> Vec<User> {
        self.users
            .iter()
            .map(|entry| User {
                email: entry.key().clone(),
                preferences: entry.value().clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
