//! Request payload validation.
//!
//! Errors are collected per field into a [`FieldErrors`] map so the HTTP layer
//! can return every problem at once. Object-level rules (those spanning
//! several fields) are reported under [`NON_FIELD_ERRORS`] and only run once
//! every field passed on its own.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub mod login;
pub mod password_change;
pub mod profile;
pub mod registration;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const PASSWORD_MIN_CHARS: usize = 8;
pub const USERNAME_MAX_CHARS: usize = 150;
pub const NAME_MAX_CHARS: usize = 150;
pub const EMAIL_MAX_CHARS: usize = 254;

pub(crate) const MSG_REQUIRED: &str = "This field is required.";
pub(crate) const MSG_BLANK: &str = "This field may not be blank.";
pub(crate) const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
pub(crate) const MSG_INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub(crate) const MSG_EMAIL_TAKEN: &str = "A user with this email already exists.";
pub(crate) const MSG_USERNAME_TAKEN: &str = "A user with this username already exists.";
pub(crate) const MSG_NULL_CHARACTERS: &str = "Null characters are not allowed.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("valid regex")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Trims a mandatory text field, recording a required/blank error when it
/// carries no content.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        None => {
            errors.add(field, MSG_REQUIRED);
            None
        }
        Some("") => {
            errors.add(field, MSG_BLANK);
            None
        }
        Some(v) if !check_no_null(errors, field, v) => None,
        Some(v) => Some(v.to_string()),
    }
}

/// Like [`required_text`] but keeps the value untrimmed. Used for secrets.
pub(crate) fn required_secret(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, MSG_REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, MSG_BLANK);
            None
        }
        Some(v) if !check_no_null(errors, field, v) => None,
        Some(v) => Some(v.to_string()),
    }
}

/// Postgres text columns cannot hold NUL, so it is refused at the edge.
pub(crate) fn check_no_null(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.contains('\0') {
        errors.add(field, MSG_NULL_CHARACTERS);
        return false;
    }
    true
}

pub(crate) fn check_min_chars(errors: &mut FieldErrors, field: &str, value: &str, min: usize) -> bool {
    if value.chars().count() < min {
        errors.add(
            field,
            format!("Ensure this field has at least {min} characters."),
        );
        return false;
    }
    true
}

pub(crate) fn check_max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
        return false;
    }
    true
}

pub(crate) fn check_email(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if !check_max_chars(errors, field, value, EMAIL_MAX_CHARS) {
        return false;
    }
    if !EMAIL_RE.is_match(value) {
        errors.add(field, MSG_INVALID_EMAIL);
        return false;
    }
    true
}

pub(crate) fn check_username(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if !check_max_chars(errors, field, value, USERNAME_MAX_CHARS) {
        return false;
    }
    if !USERNAME_RE.is_match(value) {
        errors.add(field, MSG_INVALID_USERNAME);
        return false;
    }
    true
}

/// Optional free-text name: trimmed, may be blank, bounded in length.
pub(crate) fn optional_name(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let v = value?.trim();
    if check_no_null(errors, field, v) && check_max_chars(errors, field, v, NAME_MAX_CHARS) {
        Some(v.to_string())
    } else {
        None
    }
}
