//! Sign Up Use Case
//!
//! Validates the signup form and creates a new user account.

use std::sync::Arc;

use platform::password::{CredentialHasher, PasswordPolicyError};

use crate::application::credential_store::CredentialStore;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    display_name::{DISPLAY_NAME_MAX_LENGTH, DisplayName, DisplayNameError},
    email::{Email, EmailError},
    user_id::UserId,
    user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult, FieldErrors};

pub const MSG_BLANK: &str = "This field cannot be blank";
pub const MSG_INVALID: &str = "This field is invalid";
pub const MSG_PASSWORD_COMMON: &str = "This password is too common";
pub const MSG_EMAIL_IN_USE: &str = "Address is already in use";

/// Sign up input
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<R> {
    store: CredentialStore<R>,
}

impl<R> SignUpUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>) -> Self {
        Self {
            store: CredentialStore::new(repo, hasher),
        }
    }

    /// Validate and create the account
    ///
    /// Validation problems come back as `AuthError::Validation`; a taken
    /// email as `AuthError::DuplicateEmail`.
    pub async fn execute(&self, input: SignUpInput) -> AuthResult<UserId> {
        let mut errors = FieldErrors::new();

        let name = DisplayName::new(&input.name)
            .map_err(|e| errors.add("name", name_message(&e)))
            .ok();
        let email = Email::new(&input.email)
            .map_err(|e| errors.add("email", email_message(&e)))
            .ok();
        let password = RawPassword::new(input.password)
            .map_err(|e| errors.add("password", password_message(&e)))
            .ok();

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(AuthError::Validation(errors));
        };

        let user_id = self.store.insert(name, email, password).await?;

        tracing::info!(user_id = %user_id, "User signed up");

        Ok(user_id)
    }
}

/// Errors for the signup form, with the duplicate email on `email`
pub fn duplicate_email_errors() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add("email", MSG_EMAIL_IN_USE);
    errors
}

fn name_message(err: &DisplayNameError) -> String {
    match err {
        DisplayNameError::Blank => MSG_BLANK.to_string(),
        DisplayNameError::TooLong { .. } => too_long(DISPLAY_NAME_MAX_LENGTH),
    }
}

fn email_message(err: &EmailError) -> String {
    match err {
        EmailError::Blank => MSG_BLANK.to_string(),
        EmailError::TooLong { max } => too_long(*max),
        EmailError::InvalidFormat => MSG_INVALID.to_string(),
    }
}

fn password_message(err: &PasswordPolicyError) -> String {
    match err {
        PasswordPolicyError::EmptyOrWhitespace => MSG_BLANK.to_string(),
        PasswordPolicyError::TooShort { min, .. } => {
            format!("This field is too short (minimum is {min} characters)")
        }
        PasswordPolicyError::TooLong { max, .. } => too_long(*max),
        PasswordPolicyError::InvalidCharacter => MSG_INVALID.to_string(),
        PasswordPolicyError::CommonPattern => MSG_PASSWORD_COMMON.to_string(),
    }
}

fn too_long(max: usize) -> String {
    format!("This field is too long (maximum is {max} characters)")
}
