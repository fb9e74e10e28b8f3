use crate::application::dto::accounts::LoginInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::AccountRepository;
use crate::application::services::passwords::verify_password;
use crate::application::validation::{FieldErrors, check_email, required_secret, required_text};
use crate::domain::accounts::account::AccountWithProfile;

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const MSG_ACCOUNT_DISABLED: &str = "User account is disabled.";

pub struct LoginValidator<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> LoginValidator<'a, R> {
    /// Resolves the account behind a set of credentials.
    ///
    /// An unknown email and a wrong password produce the same error so the
    /// response never reveals which addresses are registered.
    pub async fn validate(&self, input: &LoginInput) -> Result<AccountWithProfile, ServiceError> {
        let mut errors = FieldErrors::new();
        let email = required_text(&mut errors, "email", input.email.as_deref())
            .filter(|e| check_email(&mut errors, "email", e));
        let password = required_secret(&mut errors, "password", input.password.as_deref());
        errors.into_result()?;

        let (Some(email), Some(password)) = (email, password) else {
            return Err(FieldErrors::non_field("Must include email and password.").into());
        };

        let Some(found) = self.repo.find_by_email(&email).await? else {
            return Err(FieldErrors::non_field(MSG_INVALID_CREDENTIALS).into());
        };
        if !verify_password(&password, &found.account.password_hash) {
            return Err(FieldErrors::non_field(MSG_INVALID_CREDENTIALS).into());
        }
        if !found.account.is_active {
            return Err(FieldErrors::non_field(MSG_ACCOUNT_DISABLED).into());
        }
        Ok(found)
    }
}
