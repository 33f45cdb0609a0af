//! User domain entity.

use serde::{Deserialize, Serialize};

use crate::constants::KIND_USER;
use crate::record::Record;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Not required to be unique
    pub email: String,
}

impl User {
    pub fn new(
        id: i32,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// First and last name separated by a space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for User {
    const KIND: &'static str = KIND_USER;

    fn id(&self) -> i32 {
        self.id
    }
}
