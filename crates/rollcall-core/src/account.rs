//! Attendance accounts: registration input rules and credential checks.
//!
//! Emails are compared case-insensitively and stored lower-cased. Passwords
//! are kept as Argon2id PHC strings (default parameters), so the cost
//! settings travel with each stored hash.

use std::fmt;
use std::str::FromStr;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("All fields required")]
    MissingFields,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Role must be either admin or student")]
    InvalidRole,

    #[error("Could not secure password: {0}")]
    Hashing(String),

    #[error("Stored credentials are unreadable: {0}")]
    CorruptCredentials(String),
}

impl AccountError {
    /// True when the caller sent bad registration input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AccountError::MissingFields | AccountError::InvalidEmail | AccountError::InvalidRole
        )
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    let e = email.trim();
    if e.chars().any(char::is_whitespace) {
        return false;
    }

    match e.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            _ => Err(AccountError::InvalidRole),
        }
    }
}

/// Checked registration input, ready for the duplicate check and hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Registration {
    /// Validate raw form fields. Missing fields are reported before format errors.
    pub fn parse(name: &str, email: &str, password: &str, role: &str) -> Result<Self, AccountError> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() || email.is_empty() || password.is_empty() || role.trim().is_empty() {
            return Err(AccountError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(AccountError::InvalidEmail);
        }

        Ok(Self {
            name: name.to_string(),
            email,
            role: role.parse()?,
        })
    }
}

/// Turn a plaintext password into the PHC string stored on the user row.
pub fn seal_password(plain: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|sealed| sealed.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

/// Whether `plain` opens the stored PHC string.
///
/// A stored value that is not a PHC string is an error, not a mismatch.
pub fn password_matches(plain: &str, stored: &str) -> Result<bool, AccountError> {
    let sealed =
        PasswordHash::new(stored).map_err(|e| AccountError::CorruptCredentials(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &sealed)
        .is_ok())
}
