//! crates/growify_core/src/forms.rs
//!
//! Presence and format checks for the sign-in and registration forms.
//! Nothing is verified against a backend; a form that passes yields the session user.

use crate::domain::{User, UserType};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Passwords do not match")]
    PasswordMismatch,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::MissingField(field));
    }
    Ok(trimmed)
}

fn check_email(email: &str) -> Result<(), FormError> {
    if email_pattern().is_match(email) {
        Ok(())
    } else {
        Err(FormError::InvalidEmail)
    }
}

fn check_password(password: &str) -> Result<(), FormError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_type: UserType,
}

impl SignInForm {
    pub fn validate(&self) -> Result<User, FormError> {
        let email = require(&self.email, "email")?;
        require(&self.password, "password")?;
        check_email(email)?;
        check_password(&self.password)?;

        let name = email.split('@').next().unwrap_or(email).to_string();
        Ok(User {
            name,
            email: email.to_string(),
            user_type: self.user_type,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub user_type: UserType,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<User, FormError> {
        let name = require(&self.name, "name")?;
        let email = require(&self.email, "email")?;
        require(&self.password, "password")?;
        require(&self.confirm_password, "confirm password")?;
        check_email(email)?;
        check_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }

        Ok(User {
            name: name.to_string(),
            email: email.to_string(),
            user_type: self.user_type,
        })
    }
}
