//! Login and registration form validation.
//!
//! Validation runs before any request leaves the client so obviously bad
//! input never reaches the backend.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating [`LoginCredentials`] or a [`Registration`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// Both fields were left blank.
    #[error("Enter your credentials to Login to Qkart")]
    Blank,
    /// The username is empty.
    #[error("Username is a required field")]
    MissingUsername,
    /// The password is empty.
    #[error("Password is a required field")]
    MissingPassword,
    /// The username is too short.
    #[error("Username must be at least {min} characters")]
    UsernameTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The password is too short.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Username and password submitted to `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl core::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginCredentials {
    /// Validate login form input.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both fields are empty
    /// - The username is empty
    /// - The password is empty
    pub fn parse(username: &str, password: &str) -> Result<Self, CredentialsError> {
        match (username.is_empty(), password.is_empty()) {
            (true, true) => Err(CredentialsError::Blank),
            (true, false) => Err(CredentialsError::MissingUsername),
            (false, true) => Err(CredentialsError::MissingPassword),
            (false, false) => Ok(Self {
                username: username.to_owned(),
                password: password.to_owned(),
            }),
        }
    }
}

/// A validated registration form, submitted to `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
}

impl Registration {
    /// Minimum username length.
    pub const MIN_USERNAME_LENGTH: usize = 6;
    /// Minimum password length.
    pub const MIN_PASSWORD_LENGTH: usize = 6;

    /// Validate registration form input.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password is empty or shorter than
    /// six characters, or if `confirm_password` differs from `password`.
    pub fn parse(
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, CredentialsError> {
        if username.is_empty() {
            return Err(CredentialsError::MissingUsername);
        }
        if username.chars().count() < Self::MIN_USERNAME_LENGTH {
            return Err(CredentialsError::UsernameTooShort {
                min: Self::MIN_USERNAME_LENGTH,
            });
        }
        if password.is_empty() {
            return Err(CredentialsError::MissingPassword);
        }
        if password.chars().count() < Self::MIN_PASSWORD_LENGTH {
            return Err(CredentialsError::PasswordTooShort {
                min: Self::MIN_PASSWORD_LENGTH,
            });
        }
        if password != confirm_password {
            return Err(CredentialsError::PasswordMismatch);
        }

        Ok(Self {
            credentials: LoginCredentials {
                username: username.to_owned(),
                password: password.to_owned(),
            },
        })
    }

    /// The credentials to send to the backend.
    #[must_use]
    pub const fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }
}
