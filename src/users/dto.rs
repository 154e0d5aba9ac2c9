use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo::User;
use crate::validation::{double_option, is_valid_email, parse_birth_date};

/// Registration payload. Required fields stay `Option` here so a missing
/// field reports as a 400 validation error rather than a decode failure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
}

impl RegisterRequest {
    pub fn validated(self) -> Result<ValidRegistration, ApiError> {
        let username = self.username.ok_or_else(ApiError::invalid_data)?;
        let password = self.password.ok_or_else(ApiError::invalid_data)?;
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::invalid_data());
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(ApiError::invalid_data());
            }
        }
        let birth_date = self.birth_date.as_deref().map(parse_birth_date).transpose()?;
        Ok(ValidRegistration {
            username,
            password,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date,
        })
    }
}

#[derive(Debug)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<time::Date>,
}

/// Profile patch: absent fields are left untouched, a field present with
/// `null` clears it (for nullable columns).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<String>>,
}

impl UserPatch {
    /// Merges everything except the password, which the handler re-hashes.
    pub fn apply_to(&self, user: &mut User) -> Result<(), ApiError> {
        if let Some(username) = &self.username {
            if username.is_empty() {
                return Err(ApiError::invalid_data());
            }
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            if let Some(email) = email {
                if !is_valid_email(email) {
                    return Err(ApiError::invalid_data());
                }
            }
            user.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(birth_date) = &self.birth_date {
            user.birth_date = birth_date.as_deref().map(parse_birth_date).transpose()?;
        }
        Ok(())
    }
}

/// Public projection of a user; hash and token never appear here.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub user_id: Uuid,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            birth_date: user.birth_date.map(|d| d.to_string()),
            user_id: user.user_id,
        }
    }
}
