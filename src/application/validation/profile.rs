use uuid::Uuid;

use crate::application::dto::accounts::ProfileUpdateInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::{AccountChanges, AccountRepository};
use crate::application::validation::{
    FieldErrors, MSG_BLANK, MSG_EMAIL_TAKEN, MSG_USERNAME_TAKEN, check_email, check_max_chars,
    check_no_null, check_username, optional_name,
};
use crate::domain::accounts::account::BIO_MAX_CHARS;

const AVATAR_MAX_CHARS: usize = 255;

/// Validates a partial profile update. Only supplied fields are checked and
/// only they end up in the returned [`AccountChanges`].
pub struct ProfileUpdateValidator<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> ProfileUpdateValidator<'a, R> {
    pub async fn validate(
        &self,
        caller_id: Uuid,
        input: &ProfileUpdateInput,
    ) -> Result<AccountChanges, ServiceError> {
        let mut errors = FieldErrors::new();
        let mut changes = AccountChanges::default();

        if let Some(raw) = input.username.as_deref() {
            let username = raw.trim();
            if username.is_empty() {
                errors.add("username", MSG_BLANK);
            } else if check_username(&mut errors, "username", username) {
                if self.repo.username_taken(username, Some(caller_id)).await? {
                    errors.add("username", MSG_USERNAME_TAKEN);
                } else {
                    changes.username = Some(username.to_string());
                }
            }
        }

        if let Some(raw) = input.email.as_deref() {
            let email = raw.trim();
            if email.is_empty() {
                errors.add("email", MSG_BLANK);
            } else if check_email(&mut errors, "email", email) {
                if self.repo.email_taken(email, Some(caller_id)).await? {
                    errors.add("email", MSG_EMAIL_TAKEN);
                } else {
                    changes.email = Some(email.to_string());
                }
            }
        }

        changes.first_name = optional_name(&mut errors, "first_name", input.first_name.as_deref());
        changes.last_name = optional_name(&mut errors, "last_name", input.last_name.as_deref());

        if let Some(profile) = &input.profile {
            let mut nested = FieldErrors::new();
            if let Some(bio) = profile.bio.as_deref() {
                if check_no_null(&mut nested, "bio", bio)
                    && check_max_chars(&mut nested, "bio", bio, BIO_MAX_CHARS)
                {
                    changes.bio = Some(bio.to_string());
                }
            }
            if let Some(avatar) = &profile.avatar {
                let avatar = avatar
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty());
                match avatar {
                    Some(a)
                        if !(check_no_null(&mut nested, "avatar", a)
                            && check_max_chars(&mut nested, "avatar", a, AVATAR_MAX_CHARS)) => {}
                    other => changes.avatar = Some(other.map(str::to_string)),
                }
            }
            for field in ["bio", "avatar"] {
                if let Some(msgs) = nested.get(field) {
                    for msg in msgs {
                        errors.add(&format!("profile.{field}"), msg.clone());
                    }
                }
            }
        }

        errors.into_result()?;
        Ok(changes)
    }
}
