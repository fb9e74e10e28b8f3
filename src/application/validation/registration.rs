use crate::application::dto::accounts::RegisterInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::AccountRepository;
use crate::application::validation::{
    FieldErrors, MSG_EMAIL_TAKEN, MSG_USERNAME_TAKEN, PASSWORD_MIN_CHARS, check_email,
    check_min_chars, check_username, optional_name, required_secret, required_text,
};

pub const MSG_PASSWORD_MISMATCH: &str = "Password and password confirmation do not match.";

/// Registration payload that passed every rule. The confirmation is dropped.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct RegistrationValidator<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> RegistrationValidator<'a, R> {
    pub async fn validate(&self, input: &RegisterInput) -> Result<ValidRegistration, ServiceError> {
        let mut errors = FieldErrors::new();

        let username = required_text(&mut errors, "username", input.username.as_deref())
            .filter(|u| check_username(&mut errors, "username", u));
        let email = required_text(&mut errors, "email", input.email.as_deref())
            .filter(|e| check_email(&mut errors, "email", e));
        let password = required_secret(&mut errors, "password", input.password.as_deref())
            .filter(|p| check_min_chars(&mut errors, "password", p, PASSWORD_MIN_CHARS));
        let password_confirm = required_secret(
            &mut errors,
            "password_confirm",
            input.password_confirm.as_deref(),
        );
        let first_name = optional_name(&mut errors, "first_name", input.first_name.as_deref());
        let last_name = optional_name(&mut errors, "last_name", input.last_name.as_deref());

        if let Some(email) = email.as_deref() {
            if self.repo.email_taken(email, None).await? {
                errors.add("email", MSG_EMAIL_TAKEN);
            }
        }
        if let Some(username) = username.as_deref() {
            if self.repo.username_taken(username, None).await? {
                errors.add("username", MSG_USERNAME_TAKEN);
            }
        }
        errors.into_result()?;

        // Field rules passed, so every mandatory value is present.
        let (Some(username), Some(email), Some(password), Some(password_confirm)) =
            (username, email, password, password_confirm)
        else {
            return Err(FieldErrors::non_field(super::MSG_REQUIRED).into());
        };
        if password != password_confirm {
            return Err(FieldErrors::non_field(MSG_PASSWORD_MISMATCH).into());
        }

        Ok(ValidRegistration {
            username,
            email,
            password,
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
        })
    }
}
