use crate::application::dto::accounts::ChangePasswordInput;
use crate::application::validation::{
    FieldErrors, PASSWORD_MIN_CHARS, check_min_chars, required_secret,
};
use crate::application::services::passwords::verify_password;
use crate::domain::accounts::account::Account;

pub const MSG_OLD_PASSWORD_INCORRECT: &str = "Old password is incorrect.";
pub const MSG_NEW_PASSWORD_MISMATCH: &str = "New password and confirmation do not match.";

/// Validates a password change for `caller`, returning the new password.
pub fn validate_password_change(
    caller: &Account,
    input: &ChangePasswordInput,
) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();

    let old_password = required_secret(&mut errors, "old_password", input.old_password.as_deref());
    if let Some(old) = old_password.as_deref() {
        if !verify_password(old, &caller.password_hash) {
            errors.add("old_password", MSG_OLD_PASSWORD_INCORRECT);
        }
    }
    let new_password = required_secret(&mut errors, "new_password", input.new_password.as_deref())
        .filter(|p| check_min_chars(&mut errors, "new_password", p, PASSWORD_MIN_CHARS));
    let new_password_confirm = required_secret(
        &mut errors,
        "new_password_confirm",
        input.new_password_confirm.as_deref(),
    );
    errors.into_result()?;

    match (new_password, new_password_confirm) {
        (Some(new), Some(confirm)) if new == confirm => Ok(new),
        _ => Err(FieldErrors::non_field(MSG_NEW_PASSWORD_MISMATCH)),
    }
}
